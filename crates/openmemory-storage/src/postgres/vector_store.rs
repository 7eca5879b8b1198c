use std::sync::Arc;

use async_trait::async_trait;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::memory::Sector;
use openmemory_core::models::VectorHit;
use openmemory_core::traits::VectorStore;
use pgvector::Vector as PgVector;

use super::conn::PgConn;

/// `VectorStore` over the `vectors` table, using pgvector's native `vector`
/// column type and an `ivfflat` index (`migrations/postgres/V2__init_vectors.sql`).
/// `search_similar` takes the ANN path of §4.2: the `<=>` cosine-distance
/// operator does the ranking inside Postgres instead of an in-process scan.
pub struct PostgresVectorStore {
    shared: Arc<PgConn>,
}

impl PostgresVectorStore {
    pub(crate) fn new(shared: Arc<PgConn>) -> Self {
        Self { shared }
    }
}

#[async_trait]
impl VectorStore for PostgresVectorStore {
    async fn store(&self, id: &str, sector: Sector, vector: &[f32], user_id: Option<&str>) -> OmResult<()> {
        let client = self.shared.client().await?;
        let v = PgVector::from(vector.to_vec());
        client
            .execute(
                "INSERT INTO vectors (id, sector, user_id, v, dim) VALUES ($1,$2,$3,$4,$5)
                 ON CONFLICT (id, sector) DO UPDATE SET v=excluded.v, dim=excluded.dim, user_id=excluded.user_id",
                &[&id, &sector.as_str(), &user_id, &v, &(vector.len() as i64)],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "DELETE FROM vectors WHERE id=$1 AND ($2::text IS NULL OR user_id=$2)",
                &[&id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn search_similar(
        &self,
        sector: Sector,
        query_vec: &[f32],
        top_k: usize,
        user_id: Option<&str>,
    ) -> OmResult<Vec<VectorHit>> {
        let client = self.shared.client().await?;
        let dim_mismatch = client
            .query_opt(
                "SELECT id FROM vectors WHERE sector=$1 AND ($2::text IS NULL OR user_id=$2) AND dim <> $3 LIMIT 1",
                &[&sector.as_str(), &user_id, &(query_vec.len() as i64)],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        if let Some(row) = dim_mismatch {
            let id: String = row.get(0);
            return Err(OmError::Validation(format!(
                "dimension mismatch: candidate {id} does not match query dim {}",
                query_vec.len()
            )));
        }

        let q = PgVector::from(query_vec.to_vec());
        let rows = client
            .query(
                "SELECT id, 1 - (v <=> $1) AS score FROM vectors
                 WHERE sector=$2 AND ($3::text IS NULL OR user_id=$3)
                 ORDER BY v <=> $1 ASC, id ASC LIMIT $4",
                &[&q, &sector.as_str(), &user_id, &(top_k as i64)],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows.iter().map(|row| VectorHit { id: row.get(0), score: row.get(1) }).collect())
    }

    async fn get_vector(&self, id: &str, sector: Sector, user_id: Option<&str>) -> OmResult<Option<Vec<f32>>> {
        let client = self.shared.client().await?;
        let row = client
            .query_opt(
                "SELECT v FROM vectors WHERE id=$1 AND sector=$2 AND ($3::text IS NULL OR user_id=$3)",
                &[&id, &sector.as_str(), &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(row.map(|r| r.get::<_, PgVector>(0).to_vec()))
    }

    async fn get_vectors_by_id(&self, id: &str, user_id: Option<&str>) -> OmResult<Vec<(Sector, Vec<f32>)>> {
        let client = self.shared.client().await?;
        let rows = client
            .query(
                "SELECT sector, v FROM vectors WHERE id=$1 AND ($2::text IS NULL OR user_id=$2)",
                &[&id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let sector_str: String = row.get(0);
                sector_str.parse::<Sector>().ok().map(|s| (s, row.get::<_, PgVector>(1).to_vec()))
            })
            .collect())
    }

    async fn get_vectors_by_sector(&self, sector: Sector, user_id: Option<&str>) -> OmResult<Vec<(String, Vec<f32>)>> {
        let client = self.shared.client().await?;
        let rows = client
            .query(
                "SELECT id, v FROM vectors WHERE sector=$1 AND ($2::text IS NULL OR user_id=$2)",
                &[&sector.as_str(), &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows.iter().map(|row| (row.get(0), row.get::<_, PgVector>(1).to_vec())).collect())
    }

    async fn iterate_all_ids(&self) -> OmResult<Vec<(String, Sector, Option<String>)>> {
        let client = self.shared.client().await?;
        let rows = client
            .query("SELECT id, sector, user_id FROM vectors", &[])
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let sector_str: String = row.get(1);
                sector_str.parse::<Sector>().ok().map(|s| (row.get(0), s, row.get(2)))
            })
            .collect())
    }

    async fn delete_by_keys(&self, keys: &[(String, Sector, Option<String>)]) -> OmResult<usize> {
        let client = self.shared.client().await?;
        let mut n = 0;
        for (id, sector, user_id) in keys {
            let affected = client
                .execute(
                    "DELETE FROM vectors WHERE id=$1 AND sector=$2 AND ($3::text IS NULL OR user_id=$3)",
                    &[&id, &sector.as_str(), &user_id],
                )
                .await
                .map_err(|e| OmError::Storage(e.to_string()))?;
            n += affected as usize;
        }
        Ok(n)
    }
}
