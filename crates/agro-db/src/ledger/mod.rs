//! # Ledger
//!
//! Transaction boundary for every stock-changing operation.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Ledger::fulfill_sale(req)                                              │
//! │       │                                                                 │
//! │       ├── validate_sale_request(req) ──► Validation (no tx opened)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RetryPolicy::run ─────────────── TransientConflict? new attempt ──┐   │
//! │       │                                                            │   │
//! │       ▼                                                            │   │
//! │  bounded(sale_timeout)                                             │   │
//! │       │                                                            │   │
//! │       ├── BEGIN                                                    │   │
//! │       ├── sale::fulfill_sale_in(&mut tx, req)                      │   │
//! │       ├── COMMIT ──────────────── busy/stale snapshot ─────────────┘   │
//! │       └── (error) ROLLBACK                                             │
//! │                                                                         │
//! │  Same shape for transfer, receive_stock, adjust_stock.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `*_in` functions in the submodules take an open connection so that
//! callers can compose them inside a transaction of their own.

pub mod error;
pub mod intake;
pub mod retry;
pub mod sale;
pub mod transfer;

use sqlx::{Sqlite, Transaction};
use tracing::{info, warn};

use crate::config::{LedgerConfig, LedgerSettings};
use crate::pool::Database;
use crate::repository::{lot, movement};
use agro_core::reconcile::reconcile;
use agro_core::validation::{
    validate_adjust_request, validate_receive_request, validate_sale_request,
    validate_transfer_request,
};
use agro_core::{
    AdjustStockRequest, LotReconciliation, Movement, MovementFilter, Page, Quantity,
    ReceiveStockRequest, SaleAggregate, SaleFulfillment, SaleRequest, StockChange, TransferAudit,
    TransferFilter, TransferOutcome, TransferRequest,
};

use error::{LedgerError, LedgerResult};
use retry::{bounded, RetryPolicy};

/// Inventory ledger over one database.
///
/// Cheap to clone; clones share the pool.
///
/// ## Usage
/// ```rust,ignore
/// let config = LedgerConfig::load(None)?;
/// let db = Database::new(config.db_config()).await?;
/// let ledger = Ledger::new(db, &config);
///
/// let done = ledger.fulfill_sale(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    settings: LedgerSettings,
    retry: RetryPolicy,
}

impl Ledger {
    pub fn new(db: Database, config: &LedgerConfig) -> Self {
        Ledger {
            db,
            settings: config.ledger.clone(),
            retry: RetryPolicy::from(&config.retry),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    // =========================================================================
    // Stock-Changing Operations
    // =========================================================================

    /// Persists a sale and deducts its lines FIFO, atomically.
    ///
    /// ## Errors
    /// - `Validation` before any transaction opens
    /// - `StockInsufficient` if any line can't be covered (nothing persisted)
    /// - `InternalConsistency` if deductions drift from the request
    /// - `TransientConflict` after retries are exhausted
    /// - `Timeout` past `sale_timeout_secs`
    pub async fn fulfill_sale(&self, req: SaleRequest) -> LedgerResult<SaleFulfillment> {
        validate_sale_request(&req)?;

        let req = &req;
        let db = &self.db;
        let settings = &self.settings;
        let fulfilled = self
            .retry
            .run("fulfill_sale", move || async move {
                bounded("fulfill_sale", settings.sale_timeout(), async move {
                    let mut tx = db.begin().await?;
                    let result = sale::fulfill_sale_in(&mut tx, req, settings).await;
                    finish(tx, result).await
                })
                .await
            })
            .await?;

        info!(
            sale_id = %fulfilled.sale.sale.id,
            folio = %fulfilled.sale.sale.folio,
            branch_id = %fulfilled.sale.sale.branch_id,
            lines = fulfilled.lines.len(),
            "Sale fulfilled"
        );
        Ok(fulfilled)
    }

    /// Moves stock of one lot to another branch, atomically.
    ///
    /// ## Errors
    /// - `Validation` before any transaction opens (same branch, qty ≤ 0)
    /// - `NotFound` if the source lot can't be resolved
    /// - `StockInsufficient` if the source lot is short
    /// - `TransientConflict` / `Timeout`
    pub async fn transfer(&self, req: TransferRequest) -> LedgerResult<TransferOutcome> {
        validate_transfer_request(&req)?;

        let req = &req;
        let db = &self.db;
        let limit = self.settings.transfer_timeout();
        let outcome = self
            .retry
            .run("transfer", move || async move {
                bounded("transfer", limit, async move {
                    let mut tx = db.begin().await?;
                    let result = transfer::transfer_in(&mut tx, req).await;
                    finish(tx, result).await
                })
                .await
            })
            .await?;

        info!(
            transfer_id = %outcome.transfer_id,
            product_id = %outcome.audit.product_id,
            source_branch_id = %outcome.audit.source_branch_id,
            dest_branch_id = %outcome.audit.dest_branch_id,
            quantity = %outcome.audit.quantity,
            dest_lot_created = outcome.dest_lot_created,
            "Transfer committed"
        );
        Ok(outcome)
    }

    /// Receives purchased stock into a lot.
    pub async fn receive_stock(&self, req: ReceiveStockRequest) -> LedgerResult<StockChange> {
        validate_receive_request(&req)?;

        let req = &req;
        let db = &self.db;
        let settings = &self.settings;
        let change = self
            .retry
            .run("receive_stock", move || async move {
                bounded("receive_stock", settings.intake_timeout(), async move {
                    let mut tx = db.begin().await?;
                    let result = intake::receive_stock_in(&mut tx, req, settings).await;
                    finish(tx, result).await
                })
                .await
            })
            .await?;

        info!(
            lot_id = %change.lot.id,
            product_id = %change.lot.product_id,
            branch_id = %change.lot.branch_id,
            quantity = %change.movement.quantity,
            lot_created = change.lot_created,
            "Stock received"
        );
        Ok(change)
    }

    /// Applies a signed correction to a lot.
    pub async fn adjust_stock(&self, req: AdjustStockRequest) -> LedgerResult<StockChange> {
        validate_adjust_request(&req)?;

        let req = &req;
        let db = &self.db;
        let settings = &self.settings;
        let change = self
            .retry
            .run("adjust_stock", move || async move {
                bounded("adjust_stock", settings.intake_timeout(), async move {
                    let mut tx = db.begin().await?;
                    let result = intake::adjust_stock_in(&mut tx, req, settings).await;
                    finish(tx, result).await
                })
                .await
            })
            .await?;

        info!(
            lot_id = %change.lot.id,
            delta = %req.delta,
            quantity = %change.lot.quantity,
            "Stock adjusted"
        );
        Ok(change)
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Movements matching `filter`, newest first. `page.limit` is capped at
    /// `max_page_size`.
    pub async fn query_movements(
        &self,
        filter: &MovementFilter,
        page: Page,
    ) -> LedgerResult<Vec<Movement>> {
        let page = page.clamped(self.settings.max_page_size);
        Ok(self.db.movements().query(filter, page).await?)
    }

    /// Transfers matching `filter`, newest first.
    pub async fn query_transfers(
        &self,
        filter: &TransferFilter,
        page: Page,
    ) -> LedgerResult<Vec<TransferAudit>> {
        let page = page.clamped(self.settings.max_page_size);
        Ok(self.db.transfers().query(filter, page).await?)
    }

    pub async fn get_sale(&self, sale_id: &str) -> LedgerResult<Option<SaleAggregate>> {
        Ok(self.db.sales().get(sale_id).await?)
    }

    /// Σ quantity of a product at a branch.
    pub async fn stock_level(&self, product_id: &str, branch_id: &str) -> LedgerResult<Quantity> {
        Ok(self.db.lots().stock_level(product_id, branch_id).await?)
    }

    /// Compares one lot with its movements.
    pub async fn reconcile_lot(&self, lot_id: &str) -> LedgerResult<LotReconciliation> {
        let mut conn = self.db.pool().acquire().await.map_err(crate::DbError::from)?;
        let target = lot::find_lot_by_id(&mut conn, lot_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Lot", lot_id))?;
        let movements = movement::movements_for_lot(&mut conn, lot_id).await?;

        let result = reconcile(&target, &movements);
        if !result.balanced {
            warn_discrepancy(&result);
        }
        Ok(result)
    }

    /// Reconciles every lot, optionally narrowed by product and/or branch.
    pub async fn reconcile_all(
        &self,
        product_id: Option<&str>,
        branch_id: Option<&str>,
    ) -> LedgerResult<Vec<LotReconciliation>> {
        let mut conn = self.db.pool().acquire().await.map_err(crate::DbError::from)?;
        let lots = lot::list_lots(&mut conn, product_id, branch_id).await?;

        let mut results = Vec::with_capacity(lots.len());
        for target in &lots {
            let movements = movement::movements_for_lot(&mut conn, &target.id).await?;
            let result = reconcile(target, &movements);
            if !result.balanced {
                warn_discrepancy(&result);
            }
            results.push(result);
        }

        Ok(results)
    }
}

/// Commits on success, rolls back on error.
async fn finish<T>(tx: Transaction<'static, Sqlite>, result: LedgerResult<T>) -> LedgerResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(crate::DbError::from)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed; connection will discard the transaction");
            }
            Err(e)
        }
    }
}

fn warn_discrepancy(result: &LotReconciliation) {
    warn!(
        lot_id = %result.lot_id,
        product_id = %result.product_id,
        branch_id = %result.branch_id,
        recorded = %result.recorded,
        derived = %result.derived,
        difference = %result.difference,
        "Lot does not match its movements"
    );
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrySettings;
    use crate::pool::DbConfig;
    use crate::test_support::{day, test_db};
    use agro_core::{
        Money, MovementType, SaleLineRequest, SaleStatus, ValidationError, MAX_QUANTITY,
    };

    async fn ledger() -> Ledger {
        Ledger::new(test_db().await, &LedgerConfig::default())
    }

    fn receipt(branch: &str, code: &str, received_day: i64, qty: i64, cost: i64) -> ReceiveStockRequest {
        ReceiveStockRequest {
            product_id: "UREA-25".into(),
            branch_id: branch.into(),
            quantity: Quantity::from_units(qty),
            lot_code: Some(code.into()),
            unit_cost: Some(Money::from_cents(cost)),
            costing_method: None,
            received_at: Some(day(received_day)),
            location: None,
            reference: format!("OC-{code}"),
            origin_module: Some("ERP".into()),
        }
    }

    fn sale_of(qty: i64) -> SaleRequest {
        SaleRequest {
            folio: "T-0100".into(),
            branch_id: "SUC-01".into(),
            status: SaleStatus::Completed,
            subtotal: Money::from_cents(qty * 50_000),
            tax: Money::zero(),
            total: Money::from_cents(qty * 50_000),
            origin_module: Some("POS".into()),
            notes: None,
            items: vec![SaleLineRequest {
                product_id: "UREA-25".into(),
                quantity: Quantity::from_units(qty),
                base_quantity: None,
                unit: Some("sack".into()),
                unit_price: Money::from_cents(50_000),
            }],
        }
    }

    fn transfer_of(qty: i64, dest: &str) -> TransferRequest {
        TransferRequest {
            product_id: "UREA-25".into(),
            source_branch_id: "SUC-01".into(),
            dest_branch_id: dest.into(),
            quantity: Quantity::from_units(qty),
            source_lot_id: None,
            lot_code: Some("X".into()),
            dest_lot_code: None,
            unit_cost: None,
            costing_method: None,
            reference: None,
        }
    }

    async fn lot_qty(ledger: &Ledger, branch: &str, code: &str) -> Quantity {
        ledger
            .database()
            .lots()
            .find("UREA-25", branch, Some(code))
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    async fn assert_all_balanced(ledger: &Ledger) {
        let report = ledger.reconcile_all(None, None).await.unwrap();
        assert!(!report.is_empty());
        assert!(report.iter().all(|r| r.balanced), "{report:?}");
        assert!(report.iter().all(|r| !r.recorded.is_negative()));
    }

    // ----- Scenario A: FIFO split -----

    #[tokio::test]
    async fn test_sale_splits_across_lots_oldest_first() {
        let ledger = ledger().await;
        ledger.receive_stock(receipt("SUC-01", "A", 1, 10, 40_000)).await.unwrap();
        ledger.receive_stock(receipt("SUC-01", "B", 2, 5, 42_000)).await.unwrap();

        let done = ledger.fulfill_sale(sale_of(12)).await.unwrap();

        assert_eq!(lot_qty(&ledger, "SUC-01", "A").await, Quantity::ZERO);
        assert_eq!(lot_qty(&ledger, "SUC-01", "B").await, Quantity::from_units(3));

        let taken: Vec<Quantity> = done.lines[0].allocations.iter().map(|a| a.quantity).collect();
        assert_eq!(taken, vec![Quantity::from_units(10), Quantity::from_units(2)]);
        assert_eq!(done.lines[0].deducted(), Quantity::from_units(12));

        let stored = ledger.get_sale(&done.sale.sale.id).await.unwrap().unwrap();
        assert_eq!(stored, done.sale);

        let salidas = ledger
            .database()
            .movements()
            .by_reference(&format!("SALE:{} T-0100", done.sale.sale.id))
            .await
            .unwrap();
        assert_eq!(salidas.len(), 2);
        assert!(salidas.iter().all(|m| m.movement_type == MovementType::Salida));

        assert_all_balanced(&ledger).await;
    }

    // ----- Scenario B: insufficient stock -----

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let ledger = ledger().await;
        ledger.receive_stock(receipt("SUC-01", "A", 1, 10, 40_000)).await.unwrap();
        ledger.receive_stock(receipt("SUC-01", "B", 2, 5, 42_000)).await.unwrap();
        let movements_before = ledger.database().movements().count().await.unwrap();

        let err = ledger.fulfill_sale(sale_of(20)).await.unwrap_err();

        match &err {
            LedgerError::StockInsufficient {
                product_id,
                available,
                required,
                ..
            } => {
                assert_eq!(product_id, "UREA-25");
                assert_eq!(*available, Quantity::from_units(15));
                assert_eq!(*required, Quantity::from_units(20));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.status_class(), 409);

        assert_eq!(lot_qty(&ledger, "SUC-01", "A").await, Quantity::from_units(10));
        assert_eq!(lot_qty(&ledger, "SUC-01", "B").await, Quantity::from_units(5));
        assert_eq!(ledger.database().movements().count().await.unwrap(), movements_before);
        assert_eq!(ledger.database().sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_second_line_rolls_back_first() {
        let ledger = ledger().await;
        ledger.receive_stock(receipt("SUC-01", "A", 1, 10, 40_000)).await.unwrap();

        let mut req = sale_of(4);
        req.items.push(SaleLineRequest {
            product_id: "GLIFO-20L".into(),
            quantity: Quantity::from_units(1),
            base_quantity: None,
            unit: None,
            unit_price: Money::from_cents(90_000),
        });

        let err = ledger.fulfill_sale(req).await.unwrap_err();
        assert!(matches!(err, LedgerError::StockInsufficient { .. }));

        assert_eq!(lot_qty(&ledger, "SUC-01", "A").await, Quantity::from_units(10));
        assert_eq!(ledger.database().movements().count().await.unwrap(), 1);
        assert_eq!(ledger.database().sales().count().await.unwrap(), 0);
    }

    // ----- Scenario C: transfer creates the destination lot -----

    #[tokio::test]
    async fn test_transfer_creates_destination_lot() {
        let ledger = ledger().await;
        ledger.receive_stock(receipt("SUC-01", "X", 1, 10, 41_500)).await.unwrap();

        let outcome = ledger.transfer(transfer_of(4, "SUC-02")).await.unwrap();

        assert!(outcome.dest_lot_created);
        assert_eq!(outcome.source_lot.quantity, Quantity::from_units(6));
        assert_eq!(outcome.dest_lot.quantity, Quantity::from_units(4));
        assert_eq!(outcome.dest_lot.unit_cost, Some(Money::from_cents(41_500)));
        assert_eq!(outcome.dest_lot.lot_code.as_deref(), Some("X"));
        assert_eq!(outcome.dest_lot.received_at, day(1));
        assert_eq!(outcome.reference, format!("TRF:{}", outcome.transfer_id));

        let audits = ledger
            .query_transfers(&TransferFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].outbound_movement_id, outcome.outbound_movement_id);
        assert_eq!(audits[0].inbound_movement_id, outcome.inbound_movement_id);
        assert_eq!(audits[0].quantity, Quantity::from_units(4));

        // conservation: the product total across branches is unchanged
        let total = ledger.stock_level("UREA-25", "SUC-01").await.unwrap()
            + ledger.stock_level("UREA-25", "SUC-02").await.unwrap();
        assert_eq!(total, Quantity::from_units(10));

        assert_all_balanced(&ledger).await;
    }

    #[tokio::test]
    async fn test_transfer_cost_override_applies_to_new_lot() {
        let ledger = ledger().await;
        ledger.receive_stock(receipt("SUC-01", "X", 1, 10, 41_500)).await.unwrap();

        let mut req = transfer_of(2, "SUC-03");
        req.unit_cost = Some(Money::from_cents(43_000));
        let outcome = ledger.transfer(req).await.unwrap();

        assert_eq!(outcome.dest_lot.unit_cost, Some(Money::from_cents(43_000)));
        assert_eq!(outcome.audit.unit_cost, Some(Money::from_cents(43_000)));
        assert_eq!(outcome.source_lot.unit_cost, Some(Money::from_cents(41_500)));
    }

    // ----- Scenario D: same-branch transfer -----

    #[tokio::test]
    async fn test_same_branch_transfer_rejected_before_transaction() {
        let ledger = ledger().await;
        ledger.receive_stock(receipt("SUC-01", "X", 1, 10, 41_500)).await.unwrap();

        let err = ledger.transfer(transfer_of(4, "SUC-01")).await.unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::SameBranch { .. })
        ));
        assert_eq!(err.status_class(), 400);
        assert_eq!(lot_qty(&ledger, "SUC-01", "X").await, Quantity::from_units(10));
        assert_eq!(ledger.database().movements().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_requests_rejected() {
        let ledger = ledger().await;

        let mut empty = sale_of(1);
        empty.items.clear();
        let err = ledger.fulfill_sale(empty).await.unwrap_err();
        assert_eq!(err.kind(), error::ErrorKind::Validation);

        let err = ledger.transfer(transfer_of(0, "SUC-02")).await.unwrap_err();
        assert_eq!(err.kind(), error::ErrorKind::Validation);

        let err = ledger
            .adjust_stock(AdjustStockRequest {
                lot_id: "not-a-uuid".into(),
                delta: Quantity::from_units(1),
                reason: "x".into(),
                origin_module: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_oversized_receipts_rejected_without_panic() {
        let ledger = ledger().await;

        let mut huge = receipt("SUC-01", "A", 1, 0, 100);
        huge.quantity = "50000000000000000000000000000".parse().unwrap();
        let err = ledger.receive_stock(huge).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::TooLarge { .. })
        ));

        let mut full = receipt("SUC-01", "A", 1, 0, 100);
        full.quantity = MAX_QUANTITY;
        ledger.receive_stock(full.clone()).await.unwrap();

        let err = ledger.receive_stock(full).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::TooLarge { .. })
        ));
        assert_eq!(err.status_class(), 400);
        assert_eq!(lot_qty(&ledger, "SUC-01", "A").await, MAX_QUANTITY);
        assert_eq!(ledger.database().movements().count().await.unwrap(), 1);
        assert_all_balanced(&ledger).await;
    }

    // ----- Reporting -----

    #[tokio::test]
    async fn test_query_movements_filters_and_caps_page() {
        let ledger = ledger().await;
        let a = ledger.receive_stock(receipt("SUC-01", "A", 1, 10, 100)).await.unwrap();
        ledger.receive_stock(receipt("SUC-02", "A", 1, 10, 100)).await.unwrap();
        ledger.fulfill_sale(sale_of(3)).await.unwrap();

        let filter = MovementFilter {
            lot_id: Some(a.lot.id.clone()),
            ..Default::default()
        };
        let moves = ledger.query_movements(&filter, Page::new(10_000, 0)).await.unwrap();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].movement_type, MovementType::Salida);

        let by_branch = MovementFilter {
            branch_id: Some("SUC-02".into()),
            ..Default::default()
        };
        assert_eq!(ledger.query_movements(&by_branch, Page::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_lot_and_unknown_lot() {
        let ledger = ledger().await;
        let change = ledger.receive_stock(receipt("SUC-01", "A", 1, 10, 100)).await.unwrap();
        ledger
            .adjust_stock(AdjustStockRequest {
                lot_id: change.lot.id.clone(),
                delta: "-0.75".parse().unwrap(),
                reason: "merma".into(),
                origin_module: None,
            })
            .await
            .unwrap();

        let report = ledger.reconcile_lot(&change.lot.id).await.unwrap();
        assert!(report.balanced);
        assert_eq!(report.recorded, "9.25".parse().unwrap());
        assert_eq!(report.movement_count, 2);

        let err = ledger.reconcile_lot("missing").await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    // ----- Concurrency -----

    /// Two sales race for one lot on a file database. Whatever the
    /// interleaving, the lot never oversells.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sales_never_oversell() {
        let path = std::env::temp_dir().join(format!("agro-ledger-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let mut config = LedgerConfig::default();
        config.retry = RetrySettings {
            max_attempts: 5,
            initial_backoff_ms: 5,
            max_backoff_ms: 50,
        };
        let ledger = Ledger::new(db, &config);
        ledger.receive_stock(receipt("SUC-01", "A", 1, 10, 100)).await.unwrap();

        let (first, second) = tokio::join!(
            ledger.fulfill_sale(sale_of(8)),
            ledger.fulfill_sale(sale_of(8))
        );

        let outcomes = [&first, &second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        for failed in outcomes.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                failed,
                LedgerError::StockInsufficient { .. } | LedgerError::TransientConflict { .. }
            ));
        }

        assert_eq!(lot_qty(&ledger, "SUC-01", "A").await, Quantity::from_units(2));
        assert_eq!(ledger.database().sales().count().await.unwrap(), 1);
        assert_all_balanced(&ledger).await;

        ledger.database().close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
