//! # Movement Log
//!
//! Append-only record of every lot quantity change.
//!
//! Only inserts and reads live here. The `002_append_only.sql` triggers
//! abort any `UPDATE`/`DELETE` issued by hand.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agro_core::reconcile::derive_balance;
use agro_core::{Movement, MovementFilter, NewMovement, Page, Quantity};

/// Appends one movement and returns it with its id and timestamp.
///
/// ## Errors
/// - `InvalidAmount` if the quantity is not positive
/// - `ForeignKeyViolation` if the lot doesn't exist
pub async fn append(conn: &mut SqliteConnection, new: &NewMovement) -> DbResult<Movement> {
    if !new.quantity.is_positive() {
        return Err(DbError::InvalidAmount {
            lot_id: new.lot_id.clone(),
            amount: new.quantity,
        });
    }

    let movement = Movement {
        id: Uuid::new_v4().to_string(),
        product_id: new.product_id.clone(),
        branch_id: new.branch_id.clone(),
        lot_id: new.lot_id.clone(),
        movement_type: new.movement_type,
        quantity: new.quantity,
        unit_cost: new.unit_cost,
        reference: new.reference.clone(),
        origin_module: new.origin_module.clone(),
        created_at: Utc::now(),
    };

    debug!(
        movement_id = %movement.id,
        lot_id = %movement.lot_id,
        movement_type = movement.movement_type.as_str(),
        quantity = %movement.quantity,
        reference = %movement.reference,
        "Appending movement"
    );

    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, branch_id, lot_id, movement_type, quantity,
            unit_cost, reference, origin_module, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.branch_id)
    .bind(&movement.lot_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.unit_cost)
    .bind(&movement.reference)
    .bind(&movement.origin_module)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(movement)
}

/// Movements matching `filter`, newest first (ties by id), paginated.
pub async fn query(
    conn: &mut SqliteConnection,
    filter: &MovementFilter,
    page: Page,
) -> DbResult<Vec<Movement>> {
    let movements: Vec<Movement> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, lot_id, movement_type, quantity,
               unit_cost, reference, origin_module, created_at
        FROM stock_movements
        WHERE (?1 IS NULL OR product_id = ?1)
          AND (?2 IS NULL OR branch_id = ?2)
          AND (?3 IS NULL OR lot_id = ?3)
          AND (?4 IS NULL OR created_at >= ?4)
          AND (?5 IS NULL OR created_at < ?5)
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?6 OFFSET ?7
        "#,
    )
    .bind(filter.product_id.as_deref())
    .bind(filter.branch_id.as_deref())
    .bind(filter.lot_id.as_deref())
    .bind(filter.from)
    .bind(filter.to)
    .bind(i64::from(page.limit))
    .bind(i64::from(page.offset))
    .fetch_all(&mut *conn)
    .await?;

    Ok(movements)
}

/// Every movement of one lot in insertion order.
pub async fn movements_for_lot(
    conn: &mut SqliteConnection,
    lot_id: &str,
) -> DbResult<Vec<Movement>> {
    let movements: Vec<Movement> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, lot_id, movement_type, quantity,
               unit_cost, reference, origin_module, created_at
        FROM stock_movements
        WHERE lot_id = ?1
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(lot_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(movements)
}

/// Σ entrada − Σ salida over a lot's movements.
pub async fn lot_balance(conn: &mut SqliteConnection, lot_id: &str) -> DbResult<Quantity> {
    let movements = movements_for_lot(conn, lot_id).await?;
    Ok(derive_balance(&movements))
}

/// Movements carrying an exact reference (all movements of one sale or
/// transfer share theirs).
pub async fn by_reference(conn: &mut SqliteConnection, reference: &str) -> DbResult<Vec<Movement>> {
    let movements: Vec<Movement> = sqlx::query_as(
        r#"
        SELECT id, product_id, branch_id, lot_id, movement_type, quantity,
               unit_cost, reference, origin_module, created_at
        FROM stock_movements
        WHERE reference = ?1
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(reference)
    .fetch_all(&mut *conn)
    .await?;

    Ok(movements)
}

/// Pool-backed, read-only access to the movement log.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    pub async fn query(&self, filter: &MovementFilter, page: Page) -> DbResult<Vec<Movement>> {
        let mut conn = self.pool.acquire().await?;
        query(&mut conn, filter, page).await
    }

    pub async fn for_lot(&self, lot_id: &str) -> DbResult<Vec<Movement>> {
        let mut conn = self.pool.acquire().await?;
        movements_for_lot(&mut conn, lot_id).await
    }

    pub async fn lot_balance(&self, lot_id: &str) -> DbResult<Quantity> {
        let mut conn = self.pool.acquire().await?;
        lot_balance(&mut conn, lot_id).await
    }

    pub async fn by_reference(&self, reference: &str) -> DbResult<Vec<Movement>> {
        let mut conn = self.pool.acquire().await?;
        by_reference(&mut conn, reference).await
    }

    /// Total number of movements (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::lot;
    use crate::test_support::{new_lot, test_db};
    use agro_core::{Lot, MovementType};

    async fn lot_with_stock(conn: &mut SqliteConnection, code: &str, qty: i64) -> Lot {
        let lot = lot::create_lot(conn, &new_lot("UREA-25", "SUC-01", Some(code), 0), Utc::now())
            .await
            .unwrap();
        let lot = lot::increment(conn, &lot.id, Quantity::from_units(qty)).await.unwrap();
        append(
            conn,
            &NewMovement::entrada(&lot, Quantity::from_units(qty), None, "OC-1", "ERP"),
        )
        .await
        .unwrap();
        lot
    }

    #[tokio::test]
    async fn test_append_and_balance() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let lot = lot_with_stock(&mut conn, "A", 10).await;

        let lot = lot::decrement(&mut conn, &lot.id, Quantity::from_units(4)).await.unwrap();
        let out = append(
            &mut conn,
            &NewMovement::salida(&lot, Quantity::from_units(4), "SALE:1", "POS"),
        )
        .await
        .unwrap();
        assert_eq!(out.movement_type, MovementType::Salida);

        let balance = lot_balance(&mut conn, &lot.id).await.unwrap();
        assert_eq!(balance, lot.quantity);
        assert_eq!(movements_for_lot(&mut conn, &lot.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let lot = lot_with_stock(&mut conn, "A", 1).await;

        let err = append(&mut conn, &NewMovement::salida(&lot, Quantity::ZERO, "x", "POS"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn test_movements_are_immutable() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let lot = lot_with_stock(&mut conn, "A", 5).await;
        let movement = &movements_for_lot(&mut conn, &lot.id).await.unwrap()[0];

        let update = sqlx::query("UPDATE stock_movements SET quantity = '50' WHERE id = ?1")
            .bind(&movement.id)
            .execute(&mut *conn)
            .await;
        let err: DbError = update.unwrap_err().into();
        assert!(matches!(err, DbError::ImmutableRecord(_)));

        let delete = sqlx::query("DELETE FROM stock_movements WHERE id = ?1")
            .bind(&movement.id)
            .execute(&mut *conn)
            .await;
        let err: DbError = delete.unwrap_err().into();
        assert!(matches!(err, DbError::ImmutableRecord(_)));
    }

    #[tokio::test]
    async fn test_query_filters_and_pages() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        lot_with_stock(&mut conn, "A", 5).await;
        lot_with_stock(&mut conn, "B", 6).await;
        lot_with_stock(&mut conn, "C", 7).await;

        let all = query(&mut conn, &MovementFilter::default(), Page::first(10)).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let page = query(&mut conn, &MovementFilter::default(), Page::new(2, 2)).await.unwrap();
        assert_eq!(page.len(), 1);

        let only_b = MovementFilter {
            lot_id: Some(all.iter().find(|m| m.quantity == Quantity::from_units(6)).unwrap().lot_id.clone()),
            ..Default::default()
        };
        let b = query(&mut conn, &only_b, Page::default()).await.unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].quantity, Quantity::from_units(6));

        let other_branch = MovementFilter {
            branch_id: Some("SUC-99".to_string()),
            ..Default::default()
        };
        assert!(query(&mut conn, &other_branch, Page::default()).await.unwrap().is_empty());

        let future = MovementFilter {
            from: Some(Utc::now() + chrono::Duration::days(1)),
            ..Default::default()
        };
        assert!(query(&mut conn, &future, Page::default()).await.unwrap().is_empty());
    }
}
