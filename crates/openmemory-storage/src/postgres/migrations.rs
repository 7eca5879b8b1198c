//! Schema migrations for the Postgres backend, embedded at compile time
//! via `refinery` from `migrations/postgres/V*.sql`. Same ordering and
//! idempotency contract as the SQLite path (§4.1): `refinery_schema_history`
//! plays the role SQLite's hand-rolled `schema_version` table plays there.

use deadpool_postgres::Object;
use openmemory_core::errors::{OmError, OmResult};

mod embedded {
    refinery::embed_migrations!("migrations/postgres");
}

pub async fn run_migrations(client: &mut Object) -> OmResult<()> {
    embedded::migrations::runner()
        .run_async(client.as_mut())
        .await
        .map_err(|e| OmError::Schema(e.to_string()))?;
    Ok(())
}
