//! # openmemory-hsg
//!
//! Hierarchical Storage Graph orchestrator (§4.6): owns `add`/`query`/
//! `update`/`delete`/`reinforce` over a `Store`+`VectorStore` pair, the
//! classifier, the embedding engine, and the dynamics formulas, plus the
//! always-on waypoint-maintenance background task.

mod coactivation;
pub mod engine;
mod maintenance_task;
mod query_cache;
mod scoring;
mod types;

pub use coactivation::CoactivationBuffer;
pub use engine::HsgEngine;
pub use maintenance_task::spawn as spawn_waypoint_maintenance;
pub use types::{AddOverrides, AddResult, HsgEvent, QueryFilters, RankedMemory, UpdateFields};
