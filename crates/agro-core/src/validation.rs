//! # Validation Module
//!
//! Request validation for the ledger. Runs before any transaction opens,
//! so a rejected request never touches the database.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Types and decimal formats                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required ids, positive quantities, distinct branches              │
//! │  └── Raised as VALIDATION, nothing persisted                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0) on lots                                     │
//! │  ├── UNIQUE (product, branch, lot code)                                │
//! │  └── Append-only triggers on movements and audits                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agro_core::validation::validate_transfer_request;
//! use agro_core::{Quantity, TransferRequest};
//!
//! let req = TransferRequest {
//!     product_id: "UREA-25".into(),
//!     source_branch_id: "SUC-NORTE".into(),
//!     dest_branch_id: "SUC-NORTE".into(),
//!     quantity: Quantity::from_units(4),
//!     source_lot_id: None,
//!     lot_code: None,
//!     dest_lot_code: None,
//!     unit_cost: None,
//!     costing_method: None,
//!     reference: None,
//! };
//! assert!(validate_transfer_request(&req).is_err());
//! ```

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::request::{AdjustStockRequest, ReceiveStockRequest, SaleRequest, TransferRequest};
use crate::{MAX_ID_LENGTH, MAX_QUANTITY, MAX_REFERENCE_LENGTH, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an identifier (product, branch, lot code, folio).
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_ID_LENGTH`] characters
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional identifier: absent is fine, present must be valid.
pub fn validate_optional_id(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) => validate_id(field, v),
        None => Ok(()),
    }
}

/// Validates free text such as a reference or reason.
pub fn validate_text(field: &str, value: &str, required: bool) -> ValidationResult<()> {
    if required && value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_REFERENCE_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_REFERENCE_LENGTH,
        });
    }

    Ok(())
}

/// Validates a quantity that must be strictly positive and at most
/// [`MAX_QUANTITY`].
///
/// ## Example
/// ```rust
/// use agro_core::validation::validate_positive_quantity;
/// use agro_core::Quantity;
///
/// assert!(validate_positive_quantity("quantity", Quantity::from_parts(5, 1)).is_ok());
/// assert!(validate_positive_quantity("quantity", Quantity::ZERO).is_err());
/// ```
pub fn validate_positive_quantity(field: &str, qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    validate_within_max(field, qty)
}

/// Rejects quantities whose magnitude exceeds [`MAX_QUANTITY`].
pub fn validate_within_max(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.abs() > MAX_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost in cents (zero allowed).
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use agro_core::validation::validate_uuid;
///
/// assert!(validate_uuid("lotId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("lotId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a sale before fulfillment.
///
/// ## Rules
/// - folio and branch present
/// - 1..=[`MAX_SALE_ITEMS`] items
/// - each item: product present, quantity > 0, base quantity > 0 when
///   given, unit price ≥ 0
/// - header totals ≥ 0
pub fn validate_sale_request(req: &SaleRequest) -> ValidationResult<()> {
    validate_id("folio", &req.folio)?;
    validate_id("branchId", &req.branch_id)?;
    validate_optional_id("originModule", req.origin_module.as_deref())?;

    if req.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if req.items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    validate_non_negative_cents("subtotal", req.subtotal.cents())?;
    validate_non_negative_cents("tax", req.tax.cents())?;
    validate_non_negative_cents("total", req.total.cents())?;

    for (idx, item) in req.items.iter().enumerate() {
        let prefix = format!("items[{}]", idx);
        validate_id(&format!("{prefix}.productId"), &item.product_id)?;
        validate_positive_quantity(&format!("{prefix}.quantity"), item.quantity)?;
        if let Some(base) = item.base_quantity {
            validate_positive_quantity(&format!("{prefix}.baseQuantity"), base)?;
        }
        validate_non_negative_cents(&format!("{prefix}.unitPrice"), item.unit_price.cents())?;
    }

    Ok(())
}

/// Validates a transfer before the transaction opens.
///
/// ## Rules
/// - product, source branch and destination branch present
/// - source and destination differ
/// - quantity > 0
/// - `source_lot_id`, when given, is a UUID
pub fn validate_transfer_request(req: &TransferRequest) -> ValidationResult<()> {
    validate_id("productId", &req.product_id)?;
    validate_id("sourceBranchId", &req.source_branch_id)?;
    validate_id("destBranchId", &req.dest_branch_id)?;

    if req.source_branch_id.trim() == req.dest_branch_id.trim() {
        return Err(ValidationError::SameBranch {
            branch_id: req.source_branch_id.trim().to_string(),
        });
    }

    validate_positive_quantity("quantity", req.quantity)?;

    if let Some(lot_id) = req.source_lot_id.as_deref() {
        validate_uuid("sourceLotId", lot_id)?;
    }
    validate_optional_id("lotCode", req.lot_code.as_deref())?;
    validate_optional_id("destLotCode", req.dest_lot_code.as_deref())?;
    if let Some(cost) = req.unit_cost {
        validate_non_negative_cents("unitCost", cost.cents())?;
    }
    if let Some(text) = req.reference.as_deref() {
        validate_text("reference", text, false)?;
    }

    Ok(())
}

/// Validates a stock receipt.
pub fn validate_receive_request(req: &ReceiveStockRequest) -> ValidationResult<()> {
    validate_id("productId", &req.product_id)?;
    validate_id("branchId", &req.branch_id)?;
    validate_positive_quantity("quantity", req.quantity)?;
    validate_optional_id("lotCode", req.lot_code.as_deref())?;
    if let Some(cost) = req.unit_cost {
        validate_non_negative_cents("unitCost", cost.cents())?;
    }
    validate_text("reference", &req.reference, true)?;
    validate_optional_id("originModule", req.origin_module.as_deref())?;

    Ok(())
}

/// Validates a stock adjustment.
pub fn validate_adjust_request(req: &AdjustStockRequest) -> ValidationResult<()> {
    validate_uuid("lotId", &req.lot_id)?;

    if req.delta.is_zero() {
        return Err(ValidationError::MustNotBeZero {
            field: "delta".to_string(),
        });
    }
    validate_within_max("delta", req.delta)?;

    validate_text("reason", &req.reason, true)?;
    validate_optional_id("originModule", req.origin_module.as_deref())?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
