//! Data ingestion
//!
//! Play-by-play records and what is derived from them: games and per-game
//! team efficiency.

pub mod dataset;
pub mod efficiency;
pub mod games;
pub mod plays;

pub use dataset::FeatureDataset;
pub use efficiency::{EfficiencyCategory, EntityKey};
pub use games::Game;
pub use plays::{Play, PlayFilter};
