use thiserror::Error;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist or has been soft-deleted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The backing store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if this error means the record is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Failure of a transactional order write, tagged with the stage that failed.
///
/// Whichever stage fails, nothing from the attempt is left persisted.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The order header insert was rejected.
    #[error("failed to write order header: {0}")]
    Header(#[source] StoreError),

    /// An order item insert was rejected.
    #[error("failed to write order item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: StoreError,
    },

    /// All rows were accepted but the transaction did not commit.
    #[error("failed to commit order: {0}")]
    Commit(#[source] StoreError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
