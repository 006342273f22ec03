//! `redline-recon`: hierarchical redline reconciliation.
//!
//! Pure engine crate: receives two loaded documents and a key hierarchy,
//! returns an annotated document in which every grouped value is marked
//! unchanged, added or removed. No CLI or IO dependencies.

pub mod assemble;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod hierarchy;
pub mod indexer;
pub mod matcher;
pub mod model;
pub mod presets;
pub mod reconcile;

pub use config::{ColumnGroup, KeyLevel, MatchScope, OrderingPolicy, RedlineConfig, StyleConfig};
pub use engine::{reconcile, run};
pub use error::RedlineError;
pub use model::{RedlineReport, RedlineResult, Status};
