//! # Ledger Errors
//!
//! What callers of [`crate::Ledger`] see.
//!
//! ## Taxonomy
//! ```text
//! ┌──────────────────────┬──────────────────────┬────────┬───────────────────┐
//! │ Variant              │ Kind                 │ Status │ Retried?          │
//! ├──────────────────────┼──────────────────────┼────────┼───────────────────┤
//! │ Validation           │ VALIDATION           │ 400    │ no (no tx opened) │
//! │ NotFound             │ NOT_FOUND            │ 404    │ no                │
//! │ StockInsufficient    │ STOCK_INSUFFICIENT   │ 409    │ no                │
//! │ TransientConflict    │ TRANSIENT_CONFLICT   │ 503    │ yes, bounded      │
//! │ Timeout              │ TRANSIENT_CONFLICT   │ 503    │ no                │
//! │ InternalConsistency  │ INTERNAL_CONSISTENCY │ 500    │ no                │
//! │ Database             │ DATABASE             │ 500    │ no                │
//! └──────────────────────┴──────────────────────┴────────┴───────────────────┘
//! ```
//!
//! Every variant except `Validation` means the transaction was rolled back.

use serde::Serialize;
use thiserror::Error;

use crate::error::DbError;
use agro_core::{CoreError, Quantity, ValidationError};

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    StockInsufficient,
    InternalConsistency,
    TransientConflict,
    Database,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::StockInsufficient => "STOCK_INSUFFICIENT",
            ErrorKind::InternalConsistency => "INTERNAL_CONSISTENCY",
            ErrorKind::TransientConflict => "TRANSIENT_CONFLICT",
            ErrorKind::Database => "DATABASE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger operation errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request was rejected before any transaction opened.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Not enough stock for a sale line, a transfer or a negative adjustment.
    ///
    /// `lot_id` is set when a single lot was the limit (transfers,
    /// adjustments); sales report the product-wide sum.
    #[error(
        "Insufficient stock for product {product_id} at branch {branch_id}: available {available}, required {required}"
    )]
    StockInsufficient {
        product_id: String,
        branch_id: String,
        lot_id: Option<String>,
        available: Quantity,
        required: Quantity,
    },

    /// The ledger's own arithmetic disagrees with itself. Server fault.
    #[error("Internal consistency failure: {message}")]
    InternalConsistency { message: String },

    /// Lost a serialization race; a fresh attempt may succeed.
    #[error("Transient conflict: {message}")]
    TransientConflict { message: String },

    /// The transaction ran past its time bound and was rolled back.
    #[error("{operation} exceeded its {seconds}s time bound")]
    Timeout { operation: String, seconds: u64 },

    #[error("Database error: {0}")]
    Database(DbError),
}

impl LedgerError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::StockInsufficient { .. } => ErrorKind::StockInsufficient,
            LedgerError::InternalConsistency { .. } => ErrorKind::InternalConsistency,
            LedgerError::TransientConflict { .. } | LedgerError::Timeout { .. } => {
                ErrorKind::TransientConflict
            }
            LedgerError::Database(_) => ErrorKind::Database,
        }
    }

    /// Whether the ledger may retry the operation in a new transaction.
    ///
    /// Timeouts share the transient kind but are not retried: the time
    /// bound is the caller's budget for the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::TransientConflict { .. })
    }

    /// HTTP-like status class for an intake layer.
    pub fn status_class(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::StockInsufficient => 409,
            ErrorKind::TransientConflict => 503,
            ErrorKind::InternalConsistency | ErrorKind::Database => 500,
        }
    }

    /// Whether the failure is the server's fault rather than the request's.
    pub fn is_server_fault(&self) -> bool {
        self.status_class() >= 500
    }
}

/// Converts storage errors.
///
/// ## Error Mapping
/// ```text
/// DbError::NotFound              → NotFound
/// DbError::InsufficientQuantity  → StockInsufficient (with lot_id)
/// DbError::InvalidAmount         → Validation
/// DbError::QuantityOverflow      → Validation
/// DbError::SerializationFailure  → TransientConflict
/// DbError::PoolExhausted         → TransientConflict
/// Other                          → Database
/// ```
impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LedgerError::NotFound { entity, id },
            DbError::InsufficientQuantity {
                lot_id,
                product_id,
                branch_id,
                available,
                requested,
            } => LedgerError::StockInsufficient {
                product_id,
                branch_id,
                lot_id: Some(lot_id),
                available,
                required: requested,
            },
            DbError::InvalidAmount { .. } => LedgerError::Validation(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }),
            DbError::QuantityOverflow { max, .. } => LedgerError::Validation(ValidationError::TooLarge {
                field: "quantity".to_string(),
                max,
            }),
            DbError::SerializationFailure(message) => LedgerError::TransientConflict { message },
            DbError::PoolExhausted => LedgerError::TransientConflict {
                message: "connection pool exhausted".to_string(),
            },
            other => LedgerError::Database(other),
        }
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                product_id,
                branch_id,
                available,
                required,
            } => LedgerError::StockInsufficient {
                product_id,
                branch_id,
                lot_id: None,
                available,
                required,
            },
            err @ CoreError::ResidualExceeded { .. } => LedgerError::InternalConsistency {
                message: err.to_string(),
            },
            CoreError::Validation(e) => LedgerError::Validation(e),
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
