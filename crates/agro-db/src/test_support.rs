//! Shared fixtures for the crate's tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::pool::{Database, DbConfig};
use agro_core::{CostingMethod, NewLot};

/// Fresh in-memory database with migrations applied.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Fixed reference date so FIFO order in tests never depends on the clock.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap() + Duration::days(n)
}

/// Empty uncosted lot received on `day(received_day)`.
pub fn new_lot(product_id: &str, branch_id: &str, lot_code: Option<&str>, received_day: i64) -> NewLot {
    NewLot {
        product_id: product_id.to_string(),
        branch_id: branch_id.to_string(),
        lot_code: lot_code.map(str::to_string),
        unit_cost: None,
        costing_method: CostingMethod::Average,
        received_at: day(received_day),
        location: None,
    }
}
