//! # openmemory-embeddings
//!
//! Produces dense vectors per `(text, sector)` across a deduplicated
//! fallback chain of providers (synthetic hashing-trick, cloud, local),
//! with sector routing, weighted fusion, and a short-TTL result cache.

mod cache;
mod chain;
mod fusion;
mod health;
mod providers;
mod router;

pub mod engine;

pub use engine::EmbeddingEngine;
pub use fusion::{fuse, sector_fusion_weights};
pub use providers::{CloudKind, CloudProvider, LocalProvider, SyntheticProvider};
