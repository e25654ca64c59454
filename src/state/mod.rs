//! State module for tracking harvest progress
//!
//! - `HarvestState`: the per-candidate state machine used by the harvester

mod harvest_state;

pub use harvest_state::{FailureKind, HarvestState, SkipReason};
