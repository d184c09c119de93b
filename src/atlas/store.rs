use super::RecordedMap;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// All recorded maps, keyed by name. Read-only during a run.
#[derive(Debug, Clone, Default)]
pub struct Atlas(BTreeMap<String, RecordedMap>);

impl Atlas {
    /// Loads every `<dir>/<name>/` holding a `reference.png`.
    /// Directories without one are skipped; broken maps are errors.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let mut atlas = Self::default();
        let entries = std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))?;
        for entry in entries {
            let path = entry.with_context(|| format!("list {}", dir.display()))?.path();
            if !path.join("reference.png").exists() {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("name of {}", path.display()))?;
            atlas.insert(RecordedMap::open(name, &path)?);
        }
        log::info!("[atlas] loaded {} maps from {}", atlas.len(), dir.display());
        Ok(atlas)
    }
    pub fn insert(&mut self, map: RecordedMap) {
        self.0.insert(map.name().to_string(), map);
    }
    pub fn get(&self, name: &str) -> Option<&RecordedMap> {
        self.0.get(name)
    }
    /// Maps in name order.
    pub fn maps(&self) -> impl Iterator<Item = &RecordedMap> {
        self.0.values()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<RecordedMap> for Atlas {
    fn from_iter<I: IntoIterator<Item = RecordedMap>>(iter: I) -> Self {
        let mut atlas = Self::default();
        for map in iter {
            atlas.insert(map);
        }
        atlas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::sketch;

    #[test]
    fn loads_map_directories() {
        let root = tempfile::tempdir().unwrap();
        for (name, seed) in [("alpha", 1), ("beta", 2)] {
            let dir = root.path().join(name);
            std::fs::create_dir(&dir).unwrap();
            let (reference, annotation) = sketch::stage(seed);
            reference.save(dir.join("reference.png")).unwrap();
            annotation.save(dir.join("annotation.png")).unwrap();
        }
        std::fs::write(root.path().join("beta").join("order.json"), "[1, 0]").unwrap();
        std::fs::create_dir(root.path().join("scratch")).unwrap();
        let atlas = Atlas::load(root.path()).unwrap();
        assert_eq!(atlas.len(), 2);
        let names = atlas.maps().map(|m| m.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["alpha", "beta"]);
        let beta = atlas.get("beta").unwrap();
        assert_eq!(beta.waypoints()[0].kind, crate::atlas::Kind::Destination);
    }

    #[test]
    fn missing_annotation_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("broken");
        std::fs::create_dir(&dir).unwrap();
        sketch::stage(3).0.save(dir.join("reference.png")).unwrap();
        assert!(Atlas::load(root.path()).is_err());
    }
}
