//! # Sale Repository
//!
//! Persistence for the sale aggregate (header + line items).
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  One ledger transaction:                                                │
//! │                                                                         │
//! │  1. insert_sale()            header, status as received                 │
//! │  2. per line:                                                           │
//! │     ├── FIFO deductions      lot::decrement + movement::append          │
//! │     └── insert_item()        line_no 1, 2, ...                          │
//! │  3. COMMIT                   all of it, or none of it                   │
//! │                                                                         │
//! │  Sales are never updated afterwards; the ledger has no void/undo.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use agro_core::{Sale, SaleAggregate, SaleItem};

/// Inserts a sale header.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(sale_id = %sale.id, folio = %sale.folio, branch_id = %sale.branch_id, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, folio, branch_id, status, subtotal, tax, total,
            origin_module, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.folio)
    .bind(&sale.branch_id)
    .bind(sale.status)
    .bind(sale.subtotal)
    .bind(sale.tax)
    .bind(sale.total)
    .bind(&sale.origin_module)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts one sale line.
///
/// ## Errors
/// - `ForeignKeyViolation` if the sale header doesn't exist
/// - `UniqueViolation` if the line number is taken
pub async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    debug!(
        sale_id = %item.sale_id,
        line_no = item.line_no,
        product_id = %item.product_id,
        quantity = %item.quantity,
        "Inserting sale item"
    );

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, line_no, product_id, quantity, base_quantity,
            unit, unit_price, line_total, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(item.line_no)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.base_quantity)
    .bind(&item.unit)
    .bind(item.unit_price)
    .bind(item.line_total)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a sale header by ID.
pub async fn find_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Option<Sale>> {
    let sale: Option<Sale> = sqlx::query_as(
        r#"
        SELECT id, folio, branch_id, status, subtotal, tax, total,
               origin_module, notes, created_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Gets all items for a sale in line order.
pub async fn items_for_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items: Vec<SaleItem> = sqlx::query_as(
        r#"
        SELECT id, sale_id, line_no, product_id, quantity, base_quantity,
               unit, unit_price, line_total, created_at
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY line_no ASC
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Header and items together, or `None` if the sale doesn't exist.
pub async fn get_aggregate(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Option<SaleAggregate>> {
    let Some(sale) = find_sale(conn, sale_id).await? else {
        return Ok(None);
    };
    let items = items_for_sale(conn, sale_id).await?;
    Ok(Some(SaleAggregate { sale, items }))
}

/// Pool-backed, read-only access to sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its items.
    pub async fn get(&self, sale_id: &str) -> DbResult<Option<SaleAggregate>> {
        let mut conn = self.pool.acquire().await?;
        get_aggregate(&mut conn, sale_id).await
    }

    /// Number of stored sales (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
