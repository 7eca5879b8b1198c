//! # openmemory-core
//!
//! Foundation crate for the OpenMemory Hierarchical Storage Graph (HSG).
//! Defines the data model, traits, errors, config, and constants shared by
//! every other crate in the workspace.

pub mod config;
pub mod constants;
pub mod errors;
pub mod ids;
pub mod memory;
pub mod models;
pub mod telemetry;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::OpenMemoryConfig;
pub use errors::{OmError, OmResult};
pub use memory::{Memory, Salience, Sector};
pub use models::{EmbedLog, EmbedStatus, Stats, TemporalEdge, TemporalFact, User, Vector, Waypoint};
