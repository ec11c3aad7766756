//! Error types for catalog-service operations

use thiserror::Error;
use uuid::Uuid;

/// Result type for catalog-service operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cache (Redis) connection or operation error
    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Serialization/deserialization of a cached payload failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Book does not exist
    #[error("book not found: {0}")]
    BookNotFound(Uuid),

    /// Review rating outside the accepted range
    #[error("rating {0} outside allowed range 1..=5")]
    InvalidRating(i32),
}
