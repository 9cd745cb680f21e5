//! Session configuration, loaded from environment variables at startup.

use std::time::Duration;

use tracing::warn;

/// Runtime configuration for the session core.
///
/// Every field has a sensible default so the core works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credits granted at session start and restored on sign-out
    /// (default: `150`).
    pub starting_credits: u32,

    /// Cost of one image-to-3D generation (default: `25`).
    pub model_cost: u32,

    /// Cost of one text-to-image generation (default: `5`).
    pub image_cost: u32,

    /// Wall-clock gap between progress ticks (default: `250 ms`).
    pub tick_interval: Duration,

    /// Percentage points added per tick (default: `4.0`, i.e. 25 ticks
    /// from submission to completion).
    pub tick_increment: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_credits: 150,
            model_cost: 25,
            image_cost: 5,
            tick_interval: Duration::from_millis(250),
            tick_increment: 4.0,
        }
    }
}

impl Config {
    /// Build [`Config`] from `GENFORGE_*` environment variables, falling
    /// back to defaults.  A non-positive tick increment would leave tasks
    /// processing forever, so it is rejected in favour of the default.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let mut tick_increment = parse_env("GENFORGE_TICK_INCREMENT", defaults.tick_increment);
        if tick_increment <= 0.0 {
            warn!(
                tick_increment,
                default = defaults.tick_increment,
                "GENFORGE_TICK_INCREMENT must be positive; using default"
            );
            tick_increment = defaults.tick_increment;
        }
        Self {
            starting_credits: parse_env("GENFORGE_STARTING_CREDITS", defaults.starting_credits),
            model_cost: parse_env("GENFORGE_MODEL_COST", defaults.model_cost),
            image_cost: parse_env("GENFORGE_IMAGE_COST", defaults.image_cost),
            tick_interval: Duration::from_millis(parse_env(
                "GENFORGE_TICK_INTERVAL_MS",
                defaults.tick_interval.as_millis() as u64,
            )),
            tick_increment,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
