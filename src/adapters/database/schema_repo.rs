use super::DbPool;
use crate::domain::schema::ResourceName;
use crate::error::StoreError;
use crate::services::schema_store::{SchemaSession, SchemaStore};
use async_trait::async_trait;
use sqlx::Postgres;
use sqlx::pool::PoolConnection;

#[derive(Clone, Debug)]
pub struct PgSchemaStore {
    pool: DbPool,
}

impl PgSchemaStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaStore for PgSchemaStore {
    async fn open_session(&self) -> Result<Box<dyn SchemaSession>, StoreError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSchemaSession { conn }))
    }
}

struct PgSchemaSession {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl SchemaSession for PgSchemaSession {
    async fn probe(&mut self, table: &ResourceName) -> Result<(), StoreError> {
        let sql = format!("SELECT * FROM {} LIMIT 0", quote_ident(table.as_str()));
        sqlx::query(&sql).execute(&mut *self.conn).await?;
        Ok(())
    }

    async fn sample(&mut self, table: &ResourceName, limit: u32) -> Result<usize, StoreError> {
        let sql = format!("SELECT 1 FROM {} LIMIT $1", quote_ident(table.as_str()));
        let rows = sqlx::query(&sql).bind(i64::from(limit)).fetch_all(&mut *self.conn).await?;
        Ok(rows.len())
    }
}

/// Quotes a possibly schema-qualified table name as a Postgres identifier.
fn quote_ident(name: &str) -> String {
    name.split('.').map(|part| format!("\"{}\"", part.replace('"', "\"\""))).collect::<Vec<_>>().join(".")
}
