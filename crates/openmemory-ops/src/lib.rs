//! # openmemory-ops
//!
//! The stable, thin public API of the core (§4.8): `add`, `add_batch`,
//! `query`, `update`, `delete`, `reinforce`, `get_user_summary`,
//! `get_stats`. Validates input, attaches tenant context, bounds query
//! concurrency, and is the only crate an external caller (HTTP layer, SDK)
//! should ever depend on — it re-exports nothing storage- or SQL-shaped.

mod facade;
mod types;
mod validation;

pub use facade::OpsFacade;
pub use types::{AddBatchItem, StatsEntry, StatsReport, UserSummary};

// Re-exported so callers can build requests without reaching into
// `openmemory-hsg` directly.
pub use openmemory_hsg::{AddResult, QueryFilters, RankedMemory, UpdateFields};
