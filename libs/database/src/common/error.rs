/// Connector-level error shared by every backend in this crate
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// MongoDB driver errors, including malformed connection strings
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The client was built but the server never answered
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
