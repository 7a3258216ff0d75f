use std::path::PathBuf;

/// Studio configuration, loaded from environment variables.
pub struct Config {
    /// Synthetic camera frame interval in milliseconds.
    pub tick_ms: u64,
    /// Number of synthetic faces in view.
    pub face_count: usize,
    /// Frame size the synthetic rig reports, in pixels.
    pub frame_width: f32,
    pub frame_height: f32,
    /// Cheek-to-cheek width of each synthetic face, in pixels.
    pub face_width_px: f32,
    /// Horizontal sweep amplitude in pixels.
    pub sweep_px: f32,
    /// Sweep period in seconds.
    pub sweep_period_secs: f32,
    /// Per-coordinate landmark jitter amplitude in pixels.
    pub jitter_px: f32,
    /// Seed for the jitter stream.
    pub seed: u64,
    /// Directory product asset urls resolve against.
    pub asset_dir: PathBuf,
    /// Projection depth offset applied to placements.
    pub camera_depth_bias: f32,
}

impl Config {
    /// Load configuration from `ADORN_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            tick_ms: env_u64("ADORN_TICK_MS", 33),
            face_count: env_usize("ADORN_FACE_COUNT", 1),
            frame_width: env_f32("ADORN_FRAME_WIDTH", 640.0),
            frame_height: env_f32("ADORN_FRAME_HEIGHT", 480.0),
            face_width_px: env_f32("ADORN_FACE_WIDTH_PX", 170.0),
            sweep_px: env_f32("ADORN_SWEEP_PX", 60.0),
            sweep_period_secs: env_f32("ADORN_SWEEP_PERIOD_SECS", 4.0),
            jitter_px: env_f32("ADORN_JITTER_PX", 1.5),
            seed: env_u64("ADORN_SEED", 42),
            asset_dir: std::env::var("ADORN_ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets")),
            camera_depth_bias: env_f32(
                "ADORN_CAMERA_DEPTH_BIAS",
                adorn_core::placement::DEFAULT_CAMERA_DEPTH_BIAS,
            ),
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
