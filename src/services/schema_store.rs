use crate::domain::schema::ResourceName;
use crate::error::StoreError;
use async_trait::async_trait;

/// Storage backend the health probes read from.
#[async_trait]
pub trait SchemaStore: Send + Sync + std::fmt::Debug {
    /// Opens a session for one probe invocation.
    ///
    /// # Errors
    /// Returns `StoreError` if no connection can be established.
    async fn open_session(&self) -> Result<Box<dyn SchemaSession>, StoreError>;
}

#[async_trait]
pub trait SchemaSession: Send {
    /// Reads zero rows from `table`. Succeeds iff the table exists and is readable.
    ///
    /// # Errors
    /// Returns the backend's error signal for a missing or unreadable table.
    async fn probe(&mut self, table: &ResourceName) -> Result<(), StoreError>;

    /// Reads at most `limit` rows from `table` and returns how many came back.
    ///
    /// # Errors
    /// Returns the backend's error signal if the read fails.
    async fn sample(&mut self, table: &ResourceName, limit: u32) -> Result<usize, StoreError>;
}
