//! # openmemory-classifier
//!
//! Maps memory/query text to a cognitive sector via an ordered set of
//! regular expressions per sector (§4.3). Pure and synchronous: no I/O,
//! no async.

mod classifier;
mod learned;
mod patterns;

pub use classifier::PatternClassifier;
pub use learned::{apply_override, LearnedOverride};
