//! Feature extraction
//!
//! Smooths per-game team efficiency and turns it into game-level
//! feature rows.

pub mod ewma;
pub mod game_features;
pub mod team_efficiency;

pub use ewma::{EwmaParams, Observation, SmoothedSeries};
pub use game_features::{FeatureMatrix, GameFeatureRow};
pub use team_efficiency::TeamEfficiency;
