//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                  (busy/locked → SerializationFailure)          │
//! │       ▼                                                                 │
//! │  LedgerError (ledger module) ← kind + status class for callers         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use agro_core::Quantity;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A lot change that would leave the lot negative.
    ///
    /// ## When This Occurs
    /// - Decrement larger than the lot's current quantity
    /// - Concurrent writer emptied the lot between plan and write
    #[error("Lot {lot_id} of product {product_id} holds {available}, cannot apply {requested}")]
    InsufficientQuantity {
        lot_id: String,
        product_id: String,
        branch_id: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Increment/decrement/append called with a zero or negative amount.
    #[error("Amount for lot {lot_id} must be positive, got {amount}")]
    InvalidAmount { lot_id: String, amount: Quantity },

    /// An increment that would push a lot past the quantity ceiling.
    #[error("Lot {lot_id} holds {on_hand}, adding {amount} exceeds the maximum of {max}")]
    QuantityOverflow {
        lot_id: String,
        on_hand: Quantity,
        amount: Quantity,
        max: Quantity,
    },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Attempt to update or delete an append-only row.
    ///
    /// ## When This Occurs
    /// - `UPDATE`/`DELETE` on `stock_movements` or `transfer_audits`
    ///   (rejected by the append-only triggers)
    #[error("Immutable record: {0}")]
    ImmutableRecord(String),

    /// The transaction lost a write race or waited past the busy timeout.
    ///
    /// ## When This Occurs
    /// ```text
    /// Tx A: BEGIN ── read lot ────────── UPDATE lot ── COMMIT
    /// Tx B: BEGIN ── read lot ── (wait) ─────────────────────── UPDATE lot
    ///                                                              │
    ///                                       snapshot is stale ◄────┘
    ///                                       SQLITE_BUSY_SNAPSHOT
    /// ```
    /// Safe to retry in a fresh transaction.
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be decoded.
    #[error("Corrupt value in {column}: {reason}")]
    Decode { column: String, reason: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// SQLite Result Codes
// =============================================================================
// Extended result codes reported by sqlx as the error `code()`.

/// SQLITE_BUSY, SQLITE_BUSY_RECOVERY, SQLITE_BUSY_SNAPSHOT, SQLITE_BUSY_TIMEOUT
const SQLITE_BUSY_CODES: &[&str] = &["5", "261", "517", "773"];

/// SQLITE_LOCKED, SQLITE_LOCKED_SHAREDCACHE, SQLITE_LOCKED_VTAB
const SQLITE_LOCKED_CODES: &[&str] = &["6", "262", "518"];

fn is_busy_or_locked(code: Option<&str>, msg: &str) -> bool {
    if let Some(code) = code {
        if SQLITE_BUSY_CODES.contains(&code) || SQLITE_LOCKED_CODES.contains(&code) {
            return true;
        }
    }
    msg.contains("database is locked") || msg.contains("database table is locked")
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound       → DbError::NotFound
/// sqlx::Error::Database          → busy/locked   → SerializationFailure
///                                  append-only   → ImmutableRecord
///                                  UNIQUE / FK   → constraint variants
/// sqlx::Error::ColumnDecode      → DbError::Decode
/// sqlx::Error::PoolTimedOut      → DbError::PoolExhausted
/// Other                          → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();

                if is_busy_or_locked(code.as_deref(), msg) {
                    DbError::SerializationFailure(msg.to_string())
                } else if msg.contains("append-only") {
                    DbError::ImmutableRecord(msg.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::ColumnDecode { index, source } => DbError::Decode {
                column: index,
                reason: source.to_string(),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
