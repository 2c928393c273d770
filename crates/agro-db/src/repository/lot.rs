//! # Lot Store
//!
//! Stock quantities per (product, branch, lot code).
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Write operations take the CALLER's connection:                         │
//! │                                                                         │
//! │    let mut tx = db.begin().await?;                                      │
//! │    let lots = lot::find_available_lots(&mut tx, "UREA-25", "SUC-01")?;  │
//! │    lot::decrement(&mut tx, &lots[0].id, qty).await?;                    │
//! │    movement::append(&mut tx, &new_movement).await?;                     │
//! │    tx.commit().await?;                                                  │
//! │                                                                         │
//! │  The store never begins or commits. `LotRepository` wraps the same     │
//! │  queries on a pooled connection for read-only use.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agro_core::{Lot, Money, NewLot, Quantity, MAX_QUANTITY};

// =============================================================================
// In-Transaction Operations
// =============================================================================

/// Lots with stock for a product at a branch, oldest first.
///
/// Ordered by `received_at` ascending, ties broken by lot id.
pub async fn find_available_lots(
    conn: &mut SqliteConnection,
    product_id: &str,
    branch_id: &str,
) -> DbResult<Vec<Lot>> {
    let lots: Vec<Lot> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, quantity, lot_code, unit_cost,
               costing_method, received_at, last_updated_at, location
        FROM lots
        WHERE product_id = ?1
          AND branch_id = ?2
          AND CAST(quantity AS REAL) > 0
        ORDER BY received_at ASC, id ASC
        "#,
    )
    .bind(product_id)
    .bind(branch_id)
    .fetch_all(&mut *conn)
    .await?;

    // The SQL filter is coarse (REAL); the decimal check is authoritative.
    Ok(lots.into_iter().filter(Lot::has_stock).collect())
}

/// Exact lookup by (product, branch, lot code). `None` matches the uncoded lot.
pub async fn find_lot(
    conn: &mut SqliteConnection,
    product_id: &str,
    branch_id: &str,
    lot_code: Option<&str>,
) -> DbResult<Option<Lot>> {
    let lot: Option<Lot> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, quantity, lot_code, unit_cost,
               costing_method, received_at, last_updated_at, location
        FROM lots
        WHERE product_id = ?1
          AND branch_id = ?2
          AND COALESCE(lot_code, '') = COALESCE(?3, '')
        "#,
    )
    .bind(product_id)
    .bind(branch_id)
    .bind(lot_code)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(lot)
}

/// Lookup by lot id.
pub async fn find_lot_by_id(conn: &mut SqliteConnection, lot_id: &str) -> DbResult<Option<Lot>> {
    let lot: Option<Lot> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, quantity, lot_code, unit_cost,
               costing_method, received_at, last_updated_at, location
        FROM lots
        WHERE id = ?1
        "#,
    )
    .bind(lot_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(lot)
}

/// Inserts an empty lot. Stock arrives through [`increment`] so that it is
/// always paired with an entrada movement.
///
/// ## Errors
/// - `UniqueViolation` if the (product, branch, lot code) already exists
pub async fn create_lot(
    conn: &mut SqliteConnection,
    new_lot: &NewLot,
    now: DateTime<Utc>,
) -> DbResult<Lot> {
    let lot = Lot {
        id: Uuid::new_v4().to_string(),
        product_id: new_lot.product_id.clone(),
        branch_id: new_lot.branch_id.clone(),
        quantity: Quantity::ZERO,
        lot_code: new_lot.lot_code.clone(),
        unit_cost: new_lot.unit_cost,
        costing_method: new_lot.costing_method,
        received_at: new_lot.received_at,
        last_updated_at: now,
        location: new_lot.location.clone(),
    };

    debug!(
        lot_id = %lot.id,
        product_id = %lot.product_id,
        branch_id = %lot.branch_id,
        lot_code = ?lot.lot_code,
        "Creating lot"
    );

    sqlx::query(
        r#"
        INSERT INTO lots (
            id, product_id, branch_id, quantity, lot_code, unit_cost,
            costing_method, received_at, last_updated_at, location
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&lot.id)
    .bind(&lot.product_id)
    .bind(&lot.branch_id)
    .bind(lot.quantity)
    .bind(&lot.lot_code)
    .bind(lot.unit_cost)
    .bind(lot.costing_method)
    .bind(lot.received_at)
    .bind(lot.last_updated_at)
    .bind(&lot.location)
    .execute(&mut *conn)
    .await?;

    Ok(lot)
}

/// Removes `amount` from a lot.
///
/// ## Errors
/// - `NotFound` if the lot doesn't exist
/// - `InvalidAmount` if `amount` is not positive
/// - `InsufficientQuantity` if the lot would go negative
pub async fn decrement(
    conn: &mut SqliteConnection,
    lot_id: &str,
    amount: Quantity,
) -> DbResult<Lot> {
    let lot = require_lot(conn, lot_id).await?;
    ensure_positive(&lot, amount)?;

    let new_quantity =
        lot.quantity
            .checked_sub_non_negative(amount)
            .ok_or_else(|| DbError::InsufficientQuantity {
                lot_id: lot.id.clone(),
                product_id: lot.product_id.clone(),
                branch_id: lot.branch_id.clone(),
                available: lot.quantity,
                requested: amount,
            })?;

    debug!(lot_id = %lot.id, amount = %amount, remaining = %new_quantity, "Decrementing lot");
    write_quantity(conn, lot, new_quantity).await
}

/// Adds `amount` to a lot.
///
/// ## Errors
/// - `NotFound` if the lot doesn't exist
/// - `InvalidAmount` if `amount` is not positive
/// - `QuantityOverflow` if the lot would exceed [`MAX_QUANTITY`]
pub async fn increment(
    conn: &mut SqliteConnection,
    lot_id: &str,
    amount: Quantity,
) -> DbResult<Lot> {
    let lot = require_lot(conn, lot_id).await?;
    ensure_positive(&lot, amount)?;

    let new_quantity = lot
        .quantity
        .checked_add(amount)
        .filter(|total| *total <= MAX_QUANTITY)
        .ok_or_else(|| DbError::QuantityOverflow {
            lot_id: lot.id.clone(),
            on_hand: lot.quantity,
            amount,
            max: MAX_QUANTITY,
        })?;

    debug!(lot_id = %lot.id, amount = %amount, total = %new_quantity, "Incrementing lot");
    write_quantity(conn, lot, new_quantity).await
}

/// Replaces a lot's unit cost (weighted-average receipts).
pub async fn set_unit_cost(
    conn: &mut SqliteConnection,
    lot_id: &str,
    unit_cost: Option<Money>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE lots SET unit_cost = ?1 WHERE id = ?2")
        .bind(unit_cost)
        .bind(lot_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Lot", lot_id));
    }

    Ok(())
}

/// All lots, optionally narrowed by product and/or branch.
pub async fn list_lots(
    conn: &mut SqliteConnection,
    product_id: Option<&str>,
    branch_id: Option<&str>,
) -> DbResult<Vec<Lot>> {
    let lots: Vec<Lot> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, quantity, lot_code, unit_cost,
               costing_method, received_at, last_updated_at, location
        FROM lots
        WHERE (?1 IS NULL OR product_id = ?1)
          AND (?2 IS NULL OR branch_id = ?2)
        ORDER BY product_id ASC, branch_id ASC, received_at ASC, id ASC
        "#,
    )
    .bind(product_id)
    .bind(branch_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lots)
}

/// Σ quantity over every lot of a product at a branch.
pub async fn stock_level(
    conn: &mut SqliteConnection,
    product_id: &str,
    branch_id: &str,
) -> DbResult<Quantity> {
    let lots = list_lots(conn, Some(product_id), Some(branch_id)).await?;
    Ok(lots.iter().map(|lot| lot.quantity).sum())
}

// =============================================================================
// Helpers
// =============================================================================

async fn require_lot(conn: &mut SqliteConnection, lot_id: &str) -> DbResult<Lot> {
    find_lot_by_id(conn, lot_id)
        .await?
        .ok_or_else(|| DbError::not_found("Lot", lot_id))
}

fn ensure_positive(lot: &Lot, amount: Quantity) -> DbResult<()> {
    if !amount.is_positive() {
        return Err(DbError::InvalidAmount {
            lot_id: lot.id.clone(),
            amount,
        });
    }
    Ok(())
}

/// Compare-and-set on the quantity read by the caller.
async fn write_quantity(
    conn: &mut SqliteConnection,
    mut lot: Lot,
    new_quantity: Quantity,
) -> DbResult<Lot> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE lots
        SET quantity = ?1, last_updated_at = ?2
        WHERE id = ?3 AND quantity = ?4
        "#,
    )
    .bind(new_quantity)
    .bind(now)
    .bind(&lot.id)
    .bind(lot.quantity)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::SerializationFailure(format!(
            "lot {} changed while being updated",
            lot.id
        )));
    }

    lot.quantity = new_quantity;
    lot.last_updated_at = now;
    Ok(lot)
}

// =============================================================================
// Read-Only Repository
// =============================================================================

/// Pool-backed, read-only access to lots.
#[derive(Debug, Clone)]
pub struct LotRepository {
    pool: SqlitePool,
}

impl LotRepository {
    /// Creates a new LotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LotRepository { pool }
    }

    /// Gets a lot by ID.
    pub async fn get_by_id(&self, lot_id: &str) -> DbResult<Option<Lot>> {
        let mut conn = self.pool.acquire().await?;
        find_lot_by_id(&mut conn, lot_id).await
    }

    /// Gets the exact (product, branch, lot code) lot.
    pub async fn find(
        &self,
        product_id: &str,
        branch_id: &str,
        lot_code: Option<&str>,
    ) -> DbResult<Option<Lot>> {
        let mut conn = self.pool.acquire().await?;
        find_lot(&mut conn, product_id, branch_id, lot_code).await
    }

    /// Lots with stock, oldest first.
    pub async fn available(&self, product_id: &str, branch_id: &str) -> DbResult<Vec<Lot>> {
        let mut conn = self.pool.acquire().await?;
        find_available_lots(&mut conn, product_id, branch_id).await
    }

    /// All lots, optionally narrowed.
    pub async fn list(
        &self,
        product_id: Option<&str>,
        branch_id: Option<&str>,
    ) -> DbResult<Vec<Lot>> {
        let mut conn = self.pool.acquire().await?;
        list_lots(&mut conn, product_id, branch_id).await
    }

    /// Σ quantity of a product at a branch.
    pub async fn stock_level(&self, product_id: &str, branch_id: &str) -> DbResult<Quantity> {
        let mut conn = self.pool.acquire().await?;
        stock_level(&mut conn, product_id, branch_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
