use async_trait::async_trait;

use crate::errors::OmResult;
use crate::memory::Sector;
use crate::models::VectorHit;

/// Persists per-(memory, sector) vectors and answers "top-K similar
/// vectors in sector S, scoped to user U". See §4.2 for the two-path
/// search contract (native ANN index vs. in-memory cosine scan) — both
/// are hidden behind this trait; callers never know which path ran.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn store(
        &self,
        id: &str,
        sector: Sector,
        vector: &[f32],
        user_id: Option<&str>,
    ) -> OmResult<()>;

    /// Removes all sectors for a memory.
    async fn delete(&self, id: &str, user_id: Option<&str>) -> OmResult<()>;

    /// Empty sector returns an empty list, never an error. A query vector
    /// of mismatched dimension is an error.
    async fn search_similar(
        &self,
        sector: Sector,
        query_vec: &[f32],
        top_k: usize,
        user_id: Option<&str>,
    ) -> OmResult<Vec<VectorHit>>;

    async fn get_vector(
        &self,
        id: &str,
        sector: Sector,
        user_id: Option<&str>,
    ) -> OmResult<Option<Vec<f32>>>;

    async fn get_vectors_by_id(
        &self,
        id: &str,
        user_id: Option<&str>,
    ) -> OmResult<Vec<(Sector, Vec<f32>)>>;

    async fn get_vectors_by_sector(
        &self,
        sector: Sector,
        user_id: Option<&str>,
    ) -> OmResult<Vec<(String, Vec<f32>)>>;

    /// For maintenance (orphan pruning): every `(id, sector, user_id)` key
    /// currently stored, regardless of tenant.
    async fn iterate_all_ids(&self) -> OmResult<Vec<(String, Sector, Option<String>)>>;

    /// Maintenance-only: deletes the given keys without a tenant check
    /// (the caller has already verified they're orphaned).
    async fn delete_by_keys(&self, keys: &[(String, Sector, Option<String>)]) -> OmResult<usize>;
}
