//! Diver Binary
//!
//! Offline tooling around the engine: configuration checks, annotation
//! decoding, map matching, checkpoint inspection and frame replays.

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use robodiver::atlas::Atlas;
use robodiver::atlas::decode;
use robodiver::calibrate::Calibrator;
use robodiver::capability::Blank;
use robodiver::capability::Narrator;
use robodiver::capability::Reel;
use robodiver::capability::signals;
use robodiver::config::Config;
use robodiver::locate::Matcher;
use robodiver::run::CheckpointStore;
use robodiver::run::Outcome;
use robodiver::run::Pilot;
use robodiver::run::Rig;
use robodiver::vision::Extractor;
use robodiver::vision::Palette;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Validate a configuration and print its fingerprint", alias = "cfg")]
    Config {
        #[arg(required = true)]
        path: PathBuf,
    },
    #[command(about = "List the waypoints of an annotation image", alias = "dec")]
    Decode {
        #[arg(required = true)]
        annotation: PathBuf,
        #[arg(long)]
        order: Option<PathBuf>,
    },
    #[command(about = "Match a minimap capture against the recorded maps")]
    Match {
        #[arg(required = true)]
        minimap: PathBuf,
        #[arg(long, default_value = "maps")]
        atlas: PathBuf,
        #[arg(long, default_value_t = robodiver::REFERENCE_ACCURACY)]
        accuracy: u32,
    },
    #[command(about = "Show a checkpoint and whether it can be resumed", alias = "ckpt")]
    Checkpoint {
        #[arg(long, default_value = "checkpoint.json")]
        store: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    #[command(about = "Drive a run from a directory of screen captures")]
    Replay {
        #[arg(required = true)]
        frames: PathBuf,
        #[arg(long, default_value = "info.yml")]
        config: PathBuf,
        #[arg(long, default_value = "maps")]
        atlas: PathBuf,
        #[arg(long, default_value = "checkpoint.json")]
        store: PathBuf,
        /// Ignore any stored checkpoint.
        #[arg(long)]
        fresh: bool,
        /// Measure the camera gain before the first stage.
        #[arg(long)]
        calibrate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    robodiver::log()?;
    match Args::parse().command {
        Command::Config { path } => {
            let config = Config::load(&path)?;
            println!("fingerprint  {}", config.fingerprint()?);
            println!("gain         {:.2} counts/deg", config.gain());
            println!("difficulty   {}", config.difficulty());
            println!("accuracy     {} (stride {})", config.accuracy(), Extractor::stride_for(config.accuracy()));
            println!("techniques   {:?}", config.techniques());
            println!("portals      {:?}", config.portal_policy().weights());
        }
        Command::Decode { annotation, order } => {
            let image = image::open(&annotation)
                .with_context(|| format!("open {}", annotation.display()))?
                .to_rgb8();
            let order = match order {
                Some(path) => {
                    let text = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
                    Some(serde_json::from_str::<Vec<usize>>(&text).with_context(|| format!("parse {}", path.display()))?)
                }
                None => None,
            };
            for (i, waypoint) in decode(&image, order.as_deref()).iter().enumerate() {
                println!("{:>3}. {}", i, waypoint);
            }
        }
        Command::Match {
            minimap,
            atlas,
            accuracy,
        } => {
            let atlas = Atlas::load(&atlas)?;
            let image = image::open(&minimap)
                .with_context(|| format!("open {}", minimap.display()))?
                .to_rgb8();
            let observation = Extractor::new(Palette::live(), accuracy).observe(&image, Duration::ZERO)?;
            let selection = Matcher::default().select(&observation, &atlas)?;
            println!("{} ({:.3}) at {}", selection.map, selection.confidence, selection.pose);
        }
        Command::Checkpoint { store, config } => match CheckpointStore::new(store).load()? {
            None => println!("no checkpoint"),
            Some(checkpoint) => {
                println!("{}", checkpoint);
                println!("{}", serde_json::to_string_pretty(&checkpoint)?);
                if let Some(path) = config {
                    let current = Config::load(&path)?.fingerprint()?;
                    match checkpoint.validate(&current) {
                        Ok(()) => println!("resumable"),
                        Err(fault) => println!("not resumable: {}", fault),
                    }
                }
            }
        },
        Command::Replay {
            frames,
            config,
            atlas,
            store,
            fresh,
            calibrate,
        } => {
            let config = Config::load(&config)?;
            let atlas = Atlas::load(&atlas)?;
            let (remote, signals) = signals();
            remote.on_ctrl_c();
            remote.on_stdin();
            let rig = Rig {
                frames: Reel::open(&frames, Reel::MINIMAP, config.tuning.tick())?,
                actuator: Narrator,
                ocr: Arc::new(Blank),
                signals,
            };
            let pilot = Pilot::new(config, atlas, rig, CheckpointStore::new(store))?;
            let pilot = match calibrate {
                true => pilot.with_calibration(Calibrator::default()),
                false => pilot,
            };
            let mut pilot = if fresh { pilot } else { pilot.resume()? };
            match pilot.run().await? {
                Outcome::Completed(checkpoint) => log::info!("completed, next run starts at {}", checkpoint),
                Outcome::Stopped(checkpoint) => log::info!("stopped at {}", checkpoint),
            }
        }
    }
    Ok(())
}
