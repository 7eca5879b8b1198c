use serde::{Deserialize, Serialize};

use crate::memory::Sector;

/// A per-(memory, sector) embedding row. Composite key `(id, sector, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vector {
    pub id: String,
    pub sector: Sector,
    pub user_id: Option<String>,
    pub v: Vec<f32>,
    pub dim: usize,
}

impl Vector {
    pub fn new(id: String, sector: Sector, user_id: Option<String>, v: Vec<f32>) -> Self {
        let dim = v.len();
        Self {
            id,
            sector,
            user_id,
            v,
            dim,
        }
    }
}

/// A single vector-search hit, higher score is better. Ties break by `id`
/// ascending (callers sort with this in mind; see
/// `openmemory-storage::queries::vector_search`).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub id: String,
    pub score: f64,
}
