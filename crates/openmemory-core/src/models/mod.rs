pub mod classification;
pub mod embed_log;
pub mod stats;
pub mod temporal;
pub mod user;
pub mod vector;
pub mod waypoint;

pub use classification::Classification;
pub use embed_log::{EmbedLog, EmbedStatus};
pub use stats::Stats;
pub use temporal::{TemporalEdge, TemporalFact};
pub use user::User;
pub use vector::{Vector, VectorHit};
pub use waypoint::Waypoint;
