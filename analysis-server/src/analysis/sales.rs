//! Net sales aggregation (outbound ledger)
//!
//! `sales = Σ(qty·price | price ≥ 0) − Σ|qty·price| (price < 0)`

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::db::repository::ledger::{self, LedgerFilter, LedgerSide};
use crate::utils::AppResult;
use crate::utils::money::{round_amount, to_decimal};

/// Sales split into normal and special (negative price) rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesTotals {
    pub normal_sales: Decimal,
    pub special_expense: Decimal,
    pub sales_amount: Decimal,
}

impl SalesTotals {
    /// Round both halves to 2 decimals, then net them
    pub fn from_raw(normal_sales: f64, special_expense: f64) -> Self {
        let normal_sales = round_amount(to_decimal(normal_sales));
        let special_expense = round_amount(to_decimal(special_expense));
        Self {
            normal_sales,
            special_expense,
            sales_amount: round_amount(normal_sales - special_expense),
        }
    }
}

pub async fn calculate_sales(pool: &SqlitePool, filter: &LedgerFilter) -> AppResult<SalesTotals> {
    let totals = ledger::split_totals(pool, LedgerSide::Outbound, filter).await?;
    Ok(SalesTotals::from_raw(totals.normal_amount, totals.special_amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nets_special_expense() {
        let totals = SalesTotals::from_raw(100.0, 12.346);
        assert_eq!(totals.special_expense, "12.35".parse::<Decimal>().unwrap());
        assert_eq!(totals.sales_amount, "87.65".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_pure_rebate_goes_negative() {
        let totals = SalesTotals::from_raw(0.0, 40.0);
        assert_eq!(totals.sales_amount, Decimal::from(-40));
    }
}
