//! # openmemory-dynamics
//!
//! Pure, I/O-free scalar functions and the spreading-activation algorithm
//! that together implement the HSG's biologically-inspired lifecycle:
//! decay, recency, cross-sector resonance, reinforcement, and energy
//! propagation over the waypoint graph.

pub mod decay;
pub mod engine;
pub mod recency;
pub mod reinforcement;
pub mod resonance;
pub mod sigmoid;
pub mod spreading;

pub use decay::dual_phase_decay;
pub use engine::DynamicsEngine;
pub use recency::recency;
pub use reinforcement::{propagate, retrieval_reinforcement};
pub use resonance::cross_sector_resonance;
pub use sigmoid::sigmoid;
pub use spreading::{spreading_activation, SpreadingActivationResult};
