use std::sync::Arc;

use async_trait::async_trait;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::memory::Sector;
use openmemory_core::models::VectorHit;
use openmemory_core::traits::VectorStore;
use rusqlite::{params, OptionalExtension, Row};

use super::conn::SqliteConn;

/// `VectorStore` over the `vectors` table. SQLite carries no native ANN
/// index type here, so `search_similar` always takes the in-memory cosine
/// scan path described in §4.2 — loading every candidate scoped to
/// `(sector, user_id)` and ranking in process.
pub struct SqliteVectorStore {
    shared: Arc<SqliteConn>,
}

impl SqliteVectorStore {
    pub(crate) fn new(shared: Arc<SqliteConn>) -> Self {
        Self { shared }
    }
}

fn vec_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_vec(b: &[u8]) -> Vec<f32> {
    b.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        (dot / (na * nb)) as f64
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn store(&self, id: &str, sector: Sector, vector: &[f32], user_id: Option<&str>) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO vectors (id, sector, user_id, v, dim) VALUES (?1,?2,?3,?4,?5)
             ON CONFLICT(id, sector) DO UPDATE SET v=excluded.v, dim=excluded.dim, user_id=excluded.user_id",
            params![id, sector.as_str(), user_id, vec_to_blob(vector), vector.len() as i64],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "DELETE FROM vectors WHERE id=?1 AND user_id=?2",
            None => "DELETE FROM vectors WHERE id=?1 AND user_id IS NULL",
        };
        match user_id {
            Some(u) => conn.execute(sql, params![id, u]),
            None => conn.execute(sql, params![id]),
        }
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
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT id, v, dim FROM vectors WHERE sector=?1 AND user_id=?2",
            None => "SELECT id, v, dim FROM vectors WHERE sector=?1 AND user_id IS NULL",
        };
        let mut stmt = conn.prepare(sql).map_err(|e| OmError::Storage(e.to_string()))?;
        let mapper = |row: &Row| -> rusqlite::Result<(String, Vec<u8>, i64)> {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        };
        let rows = match user_id {
            Some(u) => stmt.query_map(params![sector.as_str(), u], mapper),
            None => stmt.query_map(params![sector.as_str()], mapper),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| OmError::Storage(e.to_string()))?;

        let mut hits = Vec::with_capacity(rows.len());
        for (id, blob, dim) in rows {
            if dim as usize != query_vec.len() {
                return Err(OmError::Validation(format!(
                    "dimension mismatch: candidate {id} has dim {dim}, query has dim {}",
                    query_vec.len()
                )));
            }
            let v = blob_to_vec(&blob);
            hits.push(VectorHit { id, score: cosine(query_vec, &v) });
        }
        hits.sort_by(|a, b| match b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal) {
            std::cmp::Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn get_vector(&self, id: &str, sector: Sector, user_id: Option<&str>) -> OmResult<Option<Vec<f32>>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT v FROM vectors WHERE id=?1 AND sector=?2 AND user_id=?3",
            None => "SELECT v FROM vectors WHERE id=?1 AND sector=?2 AND user_id IS NULL",
        };
        let result: Option<Vec<u8>> = match user_id {
            Some(u) => conn.query_row(sql, params![id, sector.as_str(), u], |r| r.get(0)),
            None => conn.query_row(sql, params![id, sector.as_str()], |r| r.get(0)),
        }
        .optional()
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(result.map(|b| blob_to_vec(&b)))
    }

    async fn get_vectors_by_id(&self, id: &str, user_id: Option<&str>) -> OmResult<Vec<(Sector, Vec<f32>)>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT sector, v FROM vectors WHERE id=?1 AND user_id=?2",
            None => "SELECT sector, v FROM vectors WHERE id=?1 AND user_id IS NULL",
        };
        let mapper = |row: &Row| -> rusqlite::Result<(String, Vec<u8>)> { Ok((row.get(0)?, row.get(1)?)) };
        let rows = match user_id {
            Some(u) => conn.prepare(sql).map_err(|e| OmError::Storage(e.to_string()))?.query_map(params![id, u], mapper).map_err(|e| OmError::Storage(e.to_string()))?.collect::<Result<Vec<_>, _>>(),
            None => conn.prepare(sql).map_err(|e| OmError::Storage(e.to_string()))?.query_map(params![id], mapper).map_err(|e| OmError::Storage(e.to_string()))?.collect::<Result<Vec<_>, _>>(),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows
            .into_iter()
            .filter_map(|(s, v)| s.parse::<Sector>().ok().map(|sector| (sector, blob_to_vec(&v))))
            .collect())
    }

    async fn get_vectors_by_sector(&self, sector: Sector, user_id: Option<&str>) -> OmResult<Vec<(String, Vec<f32>)>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT id, v FROM vectors WHERE sector=?1 AND user_id=?2",
            None => "SELECT id, v FROM vectors WHERE sector=?1 AND user_id IS NULL",
        };
        let mapper = |row: &Row| -> rusqlite::Result<(String, Vec<u8>)> { Ok((row.get(0)?, row.get(1)?)) };
        let rows = match user_id {
            Some(u) => conn.prepare(sql).map_err(|e| OmError::Storage(e.to_string()))?.query_map(params![sector.as_str(), u], mapper).map_err(|e| OmError::Storage(e.to_string()))?.collect::<Result<Vec<_>, _>>(),
            None => conn.prepare(sql).map_err(|e| OmError::Storage(e.to_string()))?.query_map(params![sector.as_str()], mapper).map_err(|e| OmError::Storage(e.to_string()))?.collect::<Result<Vec<_>, _>>(),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows.into_iter().map(|(id, v)| (id, blob_to_vec(&v))).collect())
    }

    async fn iterate_all_ids(&self) -> OmResult<Vec<(String, Sector, Option<String>)>> {
        let conn = self.shared.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id, sector, user_id FROM vectors")
            .map_err(|e| OmError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let sector: String = row.get(1)?;
                let user_id: Option<String> = row.get(2)?;
                Ok((id, sector, user_id))
            })
            .map_err(|e| OmError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, sector, user_id)| sector.parse::<Sector>().ok().map(|s| (id, s, user_id)))
            .collect())
    }

    async fn delete_by_keys(&self, keys: &[(String, Sector, Option<String>)]) -> OmResult<usize> {
        let conn = self.shared.conn.lock().await;
        let mut n = 0;
        for (id, sector, user_id) in keys {
            let sql = match user_id {
                Some(_) => "DELETE FROM vectors WHERE id=?1 AND sector=?2 AND user_id=?3",
                None => "DELETE FROM vectors WHERE id=?1 AND sector=?2 AND user_id IS NULL",
            };
            let affected = match user_id {
                Some(u) => conn.execute(sql, params![id, sector.as_str(), u]),
                None => conn.execute(sql, params![id, sector.as_str()]),
            }
            .map_err(|e| OmError::Storage(e.to_string()))?;
            n += affected;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::store::SqliteStore;

    fn vector_store(store: &SqliteStore) -> SqliteVectorStore {
        SqliteVectorStore::new(store.shared_conn())
    }

    #[tokio::test]
    async fn search_empty_sector_returns_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let vs = vector_store(&store);
        let hits = vs.search_similar(Sector::Episodic, &[1.0, 0.0], 5, Some("u1")).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_descending() {
        let store = SqliteStore::open_in_memory().unwrap();
        let vs = vector_store(&store);
        vs.store("a", Sector::Semantic, &[1.0, 0.0], Some("u1")).await.unwrap();
        vs.store("b", Sector::Semantic, &[0.0, 1.0], Some("u1")).await.unwrap();
        let hits = vs.search_similar(Sector::Semantic, &[1.0, 0.0], 5, Some("u1")).await.unwrap();
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn dimension_mismatch_errors() {
        let store = SqliteStore::open_in_memory().unwrap();
        let vs = vector_store(&store);
        vs.store("a", Sector::Semantic, &[1.0, 0.0, 0.0], Some("u1")).await.unwrap();
        let result = vs.search_similar(Sector::Semantic, &[1.0, 0.0], 5, Some("u1")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn tie_breaks_by_id_ascending() {
        let store = SqliteStore::open_in_memory().unwrap();
        let vs = vector_store(&store);
        vs.store("z", Sector::Semantic, &[1.0, 0.0], Some("u1")).await.unwrap();
        vs.store("a", Sector::Semantic, &[1.0, 0.0], Some("u1")).await.unwrap();
        let hits = vs.search_similar(Sector::Semantic, &[1.0, 0.0], 5, Some("u1")).await.unwrap();
        assert_eq!(hits[0].id, "a");
    }
}
