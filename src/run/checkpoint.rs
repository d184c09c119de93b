use super::week_start;
use crate::config::Zone;
use crate::error::Fault;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Map a checkpoint was taken on: its name and fingerprint digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStamp {
    pub name: String,
    pub digest: String,
}

/// Progress counters carried from run to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counters {
    /// Completed runs, ever.
    pub runs: u64,
    /// Completed runs since `week_start`.
    pub week_runs: u32,
    /// Unix seconds of the current tally week's reset.
    pub week_start: i64,
    pub stages: u64,
    pub decisions: u64,
}

impl Counters {
    /// Counts one completed run at `now`, starting a new week if the reset
    /// passed since the last one.
    pub fn tally(&mut self, now: i64, zone: Zone) {
        let start = week_start(now, zone);
        if start != self.week_start {
            log::info!("[tally] new week, {} runs last week", self.week_runs);
            self.week_start = start;
            self.week_runs = 0;
        }
        self.runs += 1;
        self.week_runs += 1;
    }
}

/// Persisted progress of a run. Every save replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCheckpoint {
    pub world: u32,
    /// 1 to 5; 0 in checkpoints that predate it.
    #[serde(default)]
    pub difficulty: u8,
    pub stage: u32,
    /// Waypoints already visited on the current map.
    pub step: usize,
    /// Recording indices of those waypoints.
    #[serde(default)]
    pub visited: Vec<usize>,
    pub counters: Counters,
    pub map: Option<MapStamp>,
    /// Fingerprint of the configuration the run was started with.
    pub config: String,
}

impl RunCheckpoint {
    pub fn new(world: u32, config: impl Into<String>) -> Self {
        Self {
            world,
            difficulty: 0,
            stage: 1,
            step: 0,
            visited: Vec::new(),
            counters: Counters::default(),
            map: None,
            config: config.into(),
        }
    }
    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }
    /// Refuses checkpoints written under another configuration.
    pub fn validate(&self, config: &str) -> Result<(), Fault> {
        if self.config == config {
            Ok(())
        } else {
            Err(Fault::ConfigurationDrift {
                stored: self.config.clone(),
                current: config.to_string(),
            })
        }
    }
}

impl std::fmt::Display for RunCheckpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "world {} difficulty {} stage {} step {}",
            self.world, self.difficulty, self.stage, self.step
        )
    }
}

/// A single JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Writes next to the target, then renames over it, so a crash leaves
    /// either the old checkpoint or the new one.
    pub fn save(&self, checkpoint: &RunCheckpoint) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let staging = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(checkpoint).context("encode checkpoint")?;
        std::fs::write(&staging, bytes).with_context(|| format!("write {}", staging.display()))?;
        std::fs::rename(&staging, &self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        log::debug!("[checkpoint] saved {}", checkpoint);
        Ok(())
    }
    pub fn load(&self) -> anyhow::Result<Option<RunCheckpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let checkpoint = serde_json::from_str::<RunCheckpoint>(&text)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(checkpoint))
    }
    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint() -> RunCheckpoint {
        RunCheckpoint {
            world: 6,
            difficulty: 3,
            stage: 4,
            step: 3,
            visited: vec![0, 2, 3],
            counters: Counters {
                runs: 12,
                ..Counters::default()
            },
            map: Some(MapStamp {
                name: "6-4-a".into(),
                digest: "ab".repeat(32),
            }),
            config: "cafe".into(),
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("state").join("checkpoint.json"));
        assert_eq!(store.load().unwrap(), None);
        store.save(&checkpoint()).unwrap();
        assert_eq!(store.load().unwrap(), Some(checkpoint()));
        assert!(!dir.path().join("state").join("checkpoint.tmp").exists());
    }

    #[test]
    fn saves_supersede() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        store.save(&checkpoint()).unwrap();
        let later = RunCheckpoint {
            stage: 5,
            step: 0,
            visited: Vec::new(),
            map: None,
            ..checkpoint()
        };
        store.save(&later).unwrap();
        assert_eq!(store.load().unwrap(), Some(later));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn checkpoints_without_visits_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        let mut json = serde_json::to_value(checkpoint()).unwrap();
        json.as_object_mut().unwrap().remove("visited");
        json.as_object_mut().unwrap().remove("difficulty");
        std::fs::write(&path, json.to_string()).unwrap();
        let loaded = CheckpointStore::new(path).load().unwrap().unwrap();
        assert_eq!(loaded.visited, Vec::<usize>::new());
        assert_eq!(loaded.step, 3);
        assert_eq!(loaded.difficulty, 0);
        assert_eq!(loaded.to_string(), "world 6 difficulty 0 stage 4 step 3");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(CheckpointStore::new(path).load().is_err());
    }

    #[test]
    fn drift_is_reported() {
        assert_eq!(checkpoint().validate("cafe"), Ok(()));
        assert_eq!(
            checkpoint().validate("beef"),
            Err(Fault::ConfigurationDrift {
                stored: "cafe".into(),
                current: "beef".into(),
            })
        );
    }

    #[test]
    fn weekly_tally_resets() {
        let monday = 1_704_067_200 + 4 * 3600;
        let mut counters = Counters::default();
        counters.tally(monday + 60, Zone::Europe);
        counters.tally(monday + 3 * 86_400, Zone::Europe);
        assert_eq!((counters.runs, counters.week_runs), (2, 2));
        counters.tally(monday + 7 * 86_400, Zone::Europe);
        assert_eq!((counters.runs, counters.week_runs), (3, 1));
        assert_eq!(counters.week_start, monday + 7 * 86_400);
    }
}
