//! Shared numeric defaults referenced by more than one config struct.
//! Keeping these in one place avoids silently-diverging magic numbers
//! between e.g. `RetrievalConfig` and `DynamicsConfig`.

pub const DEFAULT_VEC_DIM: usize = 256;
pub const DEFAULT_SEG_SIZE: usize = 10_000;
pub const DEFAULT_SUMMARY_MAX_LENGTH: usize = 4_000;
pub const DEFAULT_MAX_ACTIVE: usize = 64;
pub const DEFAULT_DECAY_INTERVAL_MINUTES: u64 = 1440;
pub const DEFAULT_DECAY_RATIO: f64 = 1.0;
pub const DEFAULT_DECAY_SLEEP_MS: u64 = 0;
pub const DEFAULT_KEYWORD_BOOST: f64 = 0.0;
pub const DEFAULT_ADV_EMBED_PARALLEL_LIMIT: usize = 4;
pub const DEFAULT_ADV_EMBED_PARALLEL_LIMIT_CPU: usize = 2;
