use super::error::StoreError;
use rusqlite::types::Value;

/// One result row, columns in SELECT order.
pub type SqlRow = Vec<Value>;

/// Transactional statement execution against the underlying database.
pub trait RecordStore: Send + Sync {
    /// Opens a write transaction. The returned handle rolls back when dropped
    /// without an explicit commit or rollback.
    fn begin_transaction(&self) -> Result<Box<dyn RecordTransaction + '_>, StoreError>;
}

pub trait RecordTransaction {
    /// Runs a statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, StoreError>;

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<SqlRow>, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
