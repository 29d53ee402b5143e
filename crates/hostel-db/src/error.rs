//! # Store & Service Error Types
//!
//! Error types for persistence and for the ledger service.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / serde_json::Error / sqlx::Error                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError ← Adds context and categorization                          │
//! │       │                                                                 │
//! │       │          LedgerError (hostel-core)                             │
//! │       │                │                                                │
//! │       ▼                ▼                                                │
//! │  ServiceError ── code() ──► HTTP layer picks a status code             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use hostel_core::LedgerError;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Unit store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Anything else (e.g. an injected failure in tests).
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StoreError::ConnectionFailed
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("Connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Service Error
// =============================================================================

/// What a [`CheckoutLedger`](crate::CheckoutLedger) call can fail with.
///
/// `Ledger` errors are the caller's problem (bad id, unit busy, ...).
/// `Store` errors mean the change could not be made durable; the ledger was
/// left unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Machine-readable code for the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Ledger(err) => err.code(),
            ServiceError::Store(_) => "STORE_ERROR",
        }
    }

    /// The ledger error, if this is one.
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            ServiceError::Ledger(err) => Some(err),
            ServiceError::Store(_) => None,
        }
    }
}

impl From<hostel_core::ValidationError> for ServiceError {
    fn from(err: hostel_core::ValidationError) -> Self {
        ServiceError::Ledger(err.into())
    }
}

/// Result type for ledger service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Config Error
// =============================================================================

/// Problems loading, validating or saving `ledger.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or unparseable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
