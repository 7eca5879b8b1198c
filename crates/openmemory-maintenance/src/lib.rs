//! # openmemory-maintenance
//!
//! Background lifecycle jobs that keep the Hierarchical Storage Graph
//! healthy between requests (§4.7): the dual-phase decay scan, orphan
//! vector pruning, and waypoint pruning. None of these sit on the
//! request path — they're scheduled, either as always-on loops via
//! [`scheduler::spawn`] or as a single pass via [`scheduler::run_once`]
//! for callers driving their own cron.

pub mod decay_job;
pub mod orphan_prune_job;
pub mod scheduler;
pub mod waypoint_prune_job;

pub use scheduler::{spawn, run_once, MaintenanceHandles, MaintenanceRunSummary};
