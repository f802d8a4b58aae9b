use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Lanes per heat when a coverage file gives only a heat count.
    pub default_lane_count: u32,
    pub pretty: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            default_lane_count: match std::env::var("LEADERBOARD_DEFAULT_LANES") {
                Ok(value) => value
                    .parse()
                    .context("LEADERBOARD_DEFAULT_LANES must be a number")?,
                Err(_) => 10,
            },
            pretty: std::env::var("LEADERBOARD_PRETTY")
                .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
                .unwrap_or_default(),
        })
    }
}
