//! NFL win probability features from play-by-play data
//!
//! Builds per-team efficiency features (EPA per play, smoothed with a
//! dynamic-window EWMA) and joins them onto games for a downstream classifier.

pub mod data;
pub mod features;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::features::EwmaParams;

/// Team abbreviation as it appears in play-by-play data (e.g. "KC")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn new(code: impl Into<String>) -> Self {
        TeamId(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in the schedule, ordered season first, then week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub season: u16,
    pub week: u32,
}

impl Period {
    pub fn new(season: u16, week: u32) -> Self {
        Period { season, week }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} week {}", self.season, self.week)
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum GridironError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GridironError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ewma: EwmaConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EwmaConfig {
    pub base_span: u32,
    pub threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub plays_path: String,
    pub regular_season_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        let params = EwmaParams::default();
        Config {
            ewma: EwmaConfig {
                base_span: params.base_span,
                threshold: params.threshold,
            },
            data: DataConfig {
                plays_path: "data/play_by_play.csv".to_string(),
                regular_season_only: true,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridironError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GridironError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GridironError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Smoothing parameters, validated
    pub fn ewma_params(&self) -> Result<EwmaParams> {
        EwmaParams::new(self.ewma.base_span, self.ewma.threshold)
    }
}
