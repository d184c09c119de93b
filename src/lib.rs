//! Perception, navigation and decision engine for an unattended roguelite run.
//!
//! The crate turns minimap captures into observations, localizes the player
//! on a recorded map, follows the map's waypoints, classifies decision screens
//! and resolves them against priority lists read through OCR. Screen capture,
//! input injection and the OCR backend itself are consumed through the traits
//! in [`capability`].

pub mod atlas;
pub mod calibrate;
pub mod capability;
pub mod config;
pub mod decide;
pub mod detect;
pub mod error;
pub mod locate;
pub mod navigate;
pub mod run;
pub mod vision;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Angles, headings and bearings in degrees.
pub type Degrees = f32;
/// Distances in map or minimap pixels.
pub type Pixels = f32;
/// Normalized similarity and correlation scores in [0, 1].
pub type Confidence = f32;
/// Mouse counts emitted per degree of camera rotation.
pub type Gain = f32;

// ============================================================================
// SIGNAL EXTRACTION
// Squared RGB distance tolerances and minimap geometry.
// ============================================================================
/// Fewer classified edge pixels than this marks a frame unreadable.
pub const MIN_EDGE_PIXELS: usize = 48;
/// Radius of the circular minimap window, relative to the crop half-width.
pub const MINIMAP_WINDOW: f32 = 0.965;
/// Edge pixels only count when a floor pixel lies within this many pixels.
pub const EDGE_FLOOR_REACH: i32 = 2;
/// Accuracy value at which every pixel is sampled (stride 1).
pub const REFERENCE_ACCURACY: u32 = 1440;
/// Coarsest sampling stride the accuracy knob may select.
pub const MAX_SAMPLING_STRIDE: usize = 8;
/// Fewest arrow pixels required before a heading is reported.
pub const MIN_ARROW_PIXELS: usize = 6;

// ============================================================================
// MAP MATCHING
// Ring-histogram prefilter followed by binary normalized cross-correlation.
// ============================================================================
/// Concentric rings in a map fingerprint.
pub const FINGERPRINT_RINGS: usize = 16;
/// Candidates kept after the fingerprint prefilter.
pub const PREFILTER_CANDIDATES: usize = 3;
/// Translation window (pixels, each direction) for global selection.
pub const SELECT_TRANSLATION: i32 = 14;
/// Translation step for global selection.
pub const SELECT_TRANSLATION_STEP: i32 = 2;
/// Rotation window (degrees, each direction) for global selection.
pub const SELECT_ROTATION: Degrees = 6.0;
/// Rotation step for global selection.
pub const SELECT_ROTATION_STEP: Degrees = 3.0;
/// Default minimum correlation for a map to count as matched.
pub const MIN_MAP_CONFIDENCE: Confidence = 0.4;
/// Radius (pixels) of the local pose search around the previous estimate.
pub const TRACK_RADIUS: i32 = 10;
/// Per-tick tracking confidence below which the tick counts as a miss.
pub const MIN_TRACK_CONFIDENCE: Confidence = 0.35;
/// Consecutive tracking misses before the pose is declared lost.
pub const LOST_STREAK: usize = 5;

// ============================================================================
// PATH FOLLOWING
// ============================================================================
/// Mouse counts per degree at multiplier 1.0.
pub const MOUSE_SENSITIVITY: Gain = 16.5;
/// Largest camera rotation issued in a single tick.
pub const MAX_ROTATION_PER_TICK: Degrees = 30.0;
/// Arrival radius for path waypoints.
pub const ARRIVE_PATH: Pixels = 13.0;
/// Arrival radius for interaction waypoints.
pub const ARRIVE_INTERACTION: Pixels = 9.0;
/// Arrival radius for danger waypoints.
pub const ARRIVE_DANGER: Pixels = 11.0;
/// Arrival radius for the destination waypoint.
pub const ARRIVE_DESTINATION: Pixels = 7.0;
/// Clearance kept from danger waypoints that are not the current target.
pub const DANGER_CLEARANCE: Pixels = 12.0;
/// Distances within this margin count as equidistant.
pub const TIE_EPSILON: Pixels = 0.5;
/// Ticks of near-zero displacement before the stall recovery kicks in.
pub const STALL_TICKS: usize = 12;
/// Displacement below which a held movement key counts as stalled.
pub const STALL_DISTANCE: Pixels = 1.5;

// ============================================================================
// SCREEN CLASSIFICATION AND DECISIONS
// ============================================================================
/// Default bounded wait for an expected screen transition.
pub const STUCK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
/// Portal weight forced for boss and rest branches.
pub const FORCED_PORTAL_WEIGHT: i32 = 4;
/// Bonus applied to a portal whose type was explicitly requested.
pub const REQUESTED_PORTAL_BONUS: i32 = 10;
/// Appended to a fate's name to name its seal curio.
pub const FATE_SEAL_SUFFIX: &str = "火漆";
/// Horizontal centre of the reference 1920-wide screen.
pub const SCREEN_CENTRE_X: i32 = 950;
/// Degrees of camera rotation per pixel of portal offset.
pub const PORTAL_AIM_GAIN: Degrees = 0.08;

// ============================================================================
// RUN LOOP
// ============================================================================
/// Default sleep between control ticks.
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);
/// Global map selection attempts before escalating.
pub const MAP_RETRY_BUDGET: usize = 8;
/// Ticks waited after the n-th failed selection: n × this.
pub const MAP_RETRY_BACKOFF: usize = 2;
/// Stages that make up a full run.
pub const STAGES_PER_RUN: u32 = 13;
/// Ticks a hand-off or an answered screen may linger before acting again.
pub const HANDOFF_PATIENCE: usize = 20;

// ============================================================================
// CALIBRATION
// ============================================================================
/// Camera rotation requested per calibration trial.
pub const CALIBRATION_SWEEP: Degrees = 45.0;
/// Relative error under which calibration is considered converged.
pub const CALIBRATION_TOLERANCE: f32 = 0.02;
/// Calibration trials before giving up.
pub const CALIBRATION_TRIALS: usize = 8;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "cli")]
pub fn log() -> anyhow::Result<()> {
    use anyhow::Context;
    std::fs::create_dir_all("logs").context("create logs directory")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("time moves slow")?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).context("create log file")?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).context("initialize logger")
}
