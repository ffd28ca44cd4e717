//! Weighted-average cost of goods sold
//!
//! Each product's unit cost is `Σ(qty·price) / Σ(qty)` over its whole inbound
//! history with non-negative prices, independent of the analysis window.
//! Outbound quantities in the window are priced at that average; a product
//! with no qualifying inbound history is priced at its own selling price
//! (zero margin). Inbound rebates (negative prices) in the window reduce the
//! total, which is then clamped at zero.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::db::repository::ledger::{self, InboundCostRow, LedgerFilter, OutboundLine};
use crate::utils::AppResult;
use crate::utils::money::{opt_to_decimal, round_amount, round_price, to_decimal, try_add, try_mul, try_sub};

/// Lifetime weighted-average inbound cost of one product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAverageCost {
    pub product_model: String,
    /// 4 decimal places
    pub avg_cost_price: Decimal,
    pub total_inbound_quantity: i64,
}

/// product_model → average cost; built once per request and only read afterwards
pub type AverageCostMap = HashMap<String, ProductAverageCost>;

pub fn average_costs_from_rows(rows: Vec<InboundCostRow>) -> AverageCostMap {
    rows.into_iter()
        .filter(|row| row.total_quantity > 0)
        .map(|row| {
            let avg = opt_to_decimal(row.total_value) / Decimal::from(row.total_quantity);
            (
                row.product_model.clone(),
                ProductAverageCost {
                    product_model: row.product_model,
                    avg_cost_price: round_price(avg),
                    total_inbound_quantity: row.total_quantity,
                },
            )
        })
        .collect()
}

/// Average cost of every product with qualifying inbound history
pub async fn load_average_costs(pool: &SqlitePool) -> AppResult<AverageCostMap> {
    let rows = ledger::inbound_cost_basis(pool).await?;
    Ok(average_costs_from_rows(rows))
}

/// Σ line cost, unrounded
pub fn price_lines(lines: &[OutboundLine], averages: &AverageCostMap) -> AppResult<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        let quantity = Decimal::from(line.quantity);
        let unit_cost = line
            .product_model
            .as_deref()
            .and_then(|model| averages.get(model))
            .map(|avg| avg.avg_cost_price)
            .unwrap_or_else(|| round_price(to_decimal(line.unit_price)));
        try_add(total, try_mul(quantity, unit_cost)?)
    })
}

/// `max(0, total − special_income)`, 2 decimals
pub fn final_cost(total_cost: Decimal, special_income: Decimal) -> AppResult<Decimal> {
    Ok(round_amount(try_sub(total_cost, special_income)?.max(Decimal::ZERO)))
}

/// Cost of goods sold for the filter, computing the average-cost map first
pub async fn calculate_cost(pool: &SqlitePool, filter: &LedgerFilter) -> AppResult<Decimal> {
    let averages = load_average_costs(pool).await?;
    cost_with_averages(pool, &averages, filter).await
}

/// Cost of goods sold for the filter against a precomputed average-cost map
pub async fn cost_with_averages(
    pool: &SqlitePool,
    averages: &AverageCostMap,
    filter: &LedgerFilter,
) -> AppResult<Decimal> {
    let lines = ledger::outbound_lines(pool, filter).await?;
    if lines.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let total_cost = price_lines(&lines, averages)?;

    let special_income = ledger::inbound_special_income(
        pool,
        filter.product_model.as_deref(),
        &filter.start_date,
        &filter.end_date,
    )
    .await?;
    let special_income = round_amount(to_decimal(special_income));

    let cost = final_cost(total_cost, special_income)?;
    tracing::debug!(
        lines = lines.len(),
        %total_cost,
        %special_income,
        %cost,
        "Cost of goods sold calculated"
    );
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorCode;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(model: Option<&str>, quantity: i64, unit_price: f64) -> OutboundLine {
        OutboundLine {
            product_model: model.map(Into::into),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_average_cost_is_quantity_weighted() {
        let map = average_costs_from_rows(vec![InboundCostRow {
            product_model: "A".into(),
            total_value: Some(120.0),
            total_quantity: 20,
        }]);
        assert_eq!(map["A"].avg_cost_price, dec("6"));
        assert_eq!(map["A"].total_inbound_quantity, 20);
    }

    #[test]
    fn test_average_cost_rounds_to_four_places() {
        let map = average_costs_from_rows(vec![
            InboundCostRow {
                product_model: "B".into(),
                total_value: Some(20.0),
                total_quantity: 3,
            },
            InboundCostRow {
                product_model: "Z".into(),
                total_value: Some(0.0),
                total_quantity: 0,
            },
        ]);
        assert_eq!(map["B"].avg_cost_price, dec("6.6667"));
        assert!(!map.contains_key("Z"));
    }

    #[test]
    fn test_fallback_to_selling_price() {
        let averages = average_costs_from_rows(vec![InboundCostRow {
            product_model: "A".into(),
            total_value: Some(120.0),
            total_quantity: 20,
        }]);
        let lines = vec![line(Some("A"), 5, 20.0), line(Some("NEW"), 3, 50.0), line(None, 1, 9.5)];
        // 5×6 + 3×50 + 1×9.5
        assert_eq!(price_lines(&lines, &averages).unwrap(), dec("189.5"));
    }

    #[test]
    fn test_line_cost_out_of_range_is_an_error() {
        let averages = average_costs_from_rows(vec![InboundCostRow {
            product_model: "A".into(),
            total_value: Some(1e15),
            total_quantity: 1,
        }]);
        let lines = vec![line(Some("A"), i64::MAX, 1.0)];
        let err = price_lines(&lines, &averages).unwrap_err();
        assert_eq!(err.code, ErrorCode::AnalysisFailed);
    }

    #[test]
    fn test_line_cost_sum_out_of_range_is_an_error() {
        let averages = average_costs_from_rows(vec![InboundCostRow {
            product_model: "A".into(),
            total_value: Some(1e10),
            total_quantity: 1,
        }]);
        // each line fits on its own, the running total does not
        let lines = vec![line(Some("A"), i64::MAX / 2, 1.0); 2];
        let err = price_lines(&lines, &averages).unwrap_err();
        assert_eq!(err.code, ErrorCode::AnalysisFailed);
    }

    #[test]
    fn test_final_cost_never_negative() {
        assert_eq!(final_cost(dec("30"), dec("10")).unwrap(), dec("20"));
        assert_eq!(final_cost(dec("30"), dec("45.5")).unwrap(), Decimal::ZERO);
        assert_eq!(final_cost(dec("10.005"), Decimal::ZERO).unwrap(), dec("10.01"));
        assert_eq!(
            final_cost(Decimal::MIN, Decimal::ONE).unwrap_err().code,
            ErrorCode::AnalysisFailed
        );
    }
}
