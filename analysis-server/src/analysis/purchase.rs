//! Purchase aggregation (inbound ledger)
//!
//! Unlike sales, the purchase amount is the plain signed sum: rebate rows
//! (negative price) reduce it directly instead of being reported separately.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::db::repository::ledger::{self, LedgerFilter, LedgerSide};
use crate::utils::AppResult;
use crate::utils::money::{round_amount, to_decimal};

pub async fn calculate_purchase_amount(pool: &SqlitePool, filter: &LedgerFilter) -> AppResult<Decimal> {
    let total = ledger::net_total(pool, LedgerSide::Inbound, filter).await?;
    Ok(round_amount(to_decimal(total)))
}
