//! # Transfer Audit Repository
//!
//! One immutable row per inter-branch transfer, pointing at the salida and
//! entrada movements it produced.
//!
//! ```text
//! transfer_audits ──outbound_movement_id──► stock_movements (salida, source lot)
//!                 ──inbound_movement_id───► stock_movements (entrada, dest lot)
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use agro_core::{Page, TransferAudit, TransferFilter};

/// Inserts the audit row for a transfer.
///
/// ## Errors
/// - `UniqueViolation` if either movement is already referenced by an audit
/// - `ForeignKeyViolation` if a lot or movement id doesn't exist
pub async fn insert_audit(conn: &mut SqliteConnection, audit: &TransferAudit) -> DbResult<()> {
    debug!(
        transfer_id = %audit.transfer_id,
        product_id = %audit.product_id,
        source_branch_id = %audit.source_branch_id,
        dest_branch_id = %audit.dest_branch_id,
        quantity = %audit.quantity,
        "Recording transfer audit"
    );

    sqlx::query(
        r#"
        INSERT INTO transfer_audits (
            transfer_id, product_id, source_branch_id, dest_branch_id,
            source_lot_id, dest_lot_id, outbound_movement_id, inbound_movement_id,
            quantity, unit_cost, lot_code, reference, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&audit.transfer_id)
    .bind(&audit.product_id)
    .bind(&audit.source_branch_id)
    .bind(&audit.dest_branch_id)
    .bind(&audit.source_lot_id)
    .bind(&audit.dest_lot_id)
    .bind(&audit.outbound_movement_id)
    .bind(&audit.inbound_movement_id)
    .bind(audit.quantity)
    .bind(audit.unit_cost)
    .bind(&audit.lot_code)
    .bind(&audit.reference)
    .bind(audit.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets one transfer by id.
pub async fn find(conn: &mut SqliteConnection, transfer_id: &str) -> DbResult<Option<TransferAudit>> {
    let audit: Option<TransferAudit> = sqlx::query_as(
        r#"
        SELECT transfer_id, product_id, source_branch_id, dest_branch_id,
               source_lot_id, dest_lot_id, outbound_movement_id, inbound_movement_id,
               quantity, unit_cost, lot_code, reference, created_at
        FROM transfer_audits
        WHERE transfer_id = ?1
        "#,
    )
    .bind(transfer_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(audit)
}

/// Transfers matching `filter`, newest first. `branch_id` matches either side.
pub async fn query(
    conn: &mut SqliteConnection,
    filter: &TransferFilter,
    page: Page,
) -> DbResult<Vec<TransferAudit>> {
    let audits: Vec<TransferAudit> = sqlx::query_as(
        r#"
        SELECT transfer_id, product_id, source_branch_id, dest_branch_id,
               source_lot_id, dest_lot_id, outbound_movement_id, inbound_movement_id,
               quantity, unit_cost, lot_code, reference, created_at
        FROM transfer_audits
        WHERE (?1 IS NULL OR product_id = ?1)
          AND (?2 IS NULL OR source_branch_id = ?2 OR dest_branch_id = ?2)
          AND (?3 IS NULL OR created_at >= ?3)
          AND (?4 IS NULL OR created_at < ?4)
        ORDER BY created_at DESC, transfer_id DESC
        LIMIT ?5 OFFSET ?6
        "#,
    )
    .bind(filter.product_id.as_deref())
    .bind(filter.branch_id.as_deref())
    .bind(filter.from)
    .bind(filter.to)
    .bind(i64::from(page.limit))
    .bind(i64::from(page.offset))
    .fetch_all(&mut *conn)
    .await?;

    Ok(audits)
}

/// Pool-backed, read-only access to transfer audits.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    pub async fn get(&self, transfer_id: &str) -> DbResult<Option<TransferAudit>> {
        let mut conn = self.pool.acquire().await?;
        find(&mut conn, transfer_id).await
    }

    pub async fn query(&self, filter: &TransferFilter, page: Page) -> DbResult<Vec<TransferAudit>> {
        let mut conn = self.pool.acquire().await?;
        query(&mut conn, filter, page).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::{lot, movement};
    use crate::test_support::{new_lot, test_db};
    use agro_core::{NewMovement, Quantity};
    use chrono::Utc;

    /// Hand-built transfer of 4 from SUC-01 to SUC-02 (the ledger does this
    /// for real; here only the audit row is under test).
    async fn seed_transfer(conn: &mut SqliteConnection, transfer_id: &str) -> TransferAudit {
        let src = lot::create_lot(conn, &new_lot("UREA-25", "SUC-01", Some("L1"), 0), Utc::now())
            .await
            .unwrap();
        let dst = lot::create_lot(conn, &new_lot("UREA-25", "SUC-02", Some("L1"), 0), Utc::now())
            .await
            .unwrap();
        let qty = Quantity::from_units(4);
        let src = lot::increment(conn, &src.id, Quantity::from_units(10)).await.unwrap();
        let out = movement::append(conn, &NewMovement::salida(&src, qty, "TRF:1", "TRANSFER"))
            .await
            .unwrap();
        let inn = movement::append(conn, &NewMovement::entrada(&dst, qty, None, "TRF:1", "TRANSFER"))
            .await
            .unwrap();

        let audit = TransferAudit {
            transfer_id: transfer_id.to_string(),
            product_id: "UREA-25".to_string(),
            source_branch_id: "SUC-01".to_string(),
            dest_branch_id: "SUC-02".to_string(),
            source_lot_id: src.id.clone(),
            dest_lot_id: dst.id.clone(),
            outbound_movement_id: out.id,
            inbound_movement_id: inn.id,
            quantity: qty,
            unit_cost: None,
            lot_code: Some("L1".to_string()),
            reference: "TRF:1".to_string(),
            created_at: Utc::now(),
        };
        insert_audit(conn, &audit).await.unwrap();
        audit
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let audit = seed_transfer(&mut conn, "t-1").await;

        let found = find(&mut conn, "t-1").await.unwrap().unwrap();
        assert_eq!(found, audit);
        assert!(find(&mut conn, "t-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_branch_filter_matches_either_side() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        seed_transfer(&mut conn, "t-1").await;

        for branch in ["SUC-01", "SUC-02"] {
            let filter = TransferFilter {
                branch_id: Some(branch.to_string()),
                ..Default::default()
            };
            assert_eq!(query(&mut conn, &filter, Page::default()).await.unwrap().len(), 1);
        }

        let filter = TransferFilter {
            branch_id: Some("SUC-03".to_string()),
            ..Default::default()
        };
        assert!(query(&mut conn, &filter, Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_audits_are_immutable() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        seed_transfer(&mut conn, "t-1").await;

        let update = sqlx::query("UPDATE transfer_audits SET quantity = '40' WHERE transfer_id = 't-1'")
            .execute(&mut *conn)
            .await;
        let err: DbError = update.unwrap_err().into();
        assert!(matches!(err, DbError::ImmutableRecord(_)));

        let delete = sqlx::query("DELETE FROM transfer_audits WHERE transfer_id = 't-1'")
            .execute(&mut *conn)
            .await;
        let err: DbError = delete.unwrap_err().into();
        assert!(matches!(err, DbError::ImmutableRecord(_)));
    }
}
