//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic runs on `Decimal`; values are rounded half away from zero
//! and converted to `f64` only at the wire boundary. Products, sums and
//! differences of ledger amounts go through the `try_*` helpers so an
//! out-of-range amount surfaces as `AnalysisFailed` instead of a panic.

use rust_decimal::prelude::*;

use crate::utils::{AppError, AppResult};

/// Decimal places for amounts (sales, cost, profit, rate)
pub const AMOUNT_DP: u32 = 2;

/// Decimal places for unit prices (weighted average cost)
pub const PRICE_DP: u32 = 4;

/// Convert an f64 read from SQLite into Decimal
///
/// Non-finite input falls back to zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Same as [`to_decimal`] for nullable SQL aggregates (`SUM` over no rows)
#[inline]
pub fn opt_to_decimal(value: Option<f64>) -> Decimal {
    value.map(to_decimal).unwrap_or(Decimal::ZERO)
}

/// Round an amount to 2 decimal places (half away from zero)
#[inline]
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a unit price to 4 decimal places (half away from zero)
#[inline]
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for the wire, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_amount(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal not representable as f64, defaulting to zero");
        0.0
    })
}

fn overflow(op: &'static str, lhs: Decimal, rhs: Decimal) -> AppError {
    tracing::error!(op, %lhs, %rhs, "Amount out of range in monetary calculation");
    AppError::analysis_failed(format!("Amount out of range during {op}"))
}

#[inline]
pub fn try_add(lhs: Decimal, rhs: Decimal) -> AppResult<Decimal> {
    lhs.checked_add(rhs).ok_or_else(|| overflow("addition", lhs, rhs))
}

#[inline]
pub fn try_sub(lhs: Decimal, rhs: Decimal) -> AppResult<Decimal> {
    lhs.checked_sub(rhs).ok_or_else(|| overflow("subtraction", lhs, rhs))
}

#[inline]
pub fn try_mul(lhs: Decimal, rhs: Decimal) -> AppResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| overflow("multiplication", lhs, rhs))
}

/// `profit / sales × 100`, 2 decimals; zero when sales is not positive
pub fn profit_rate(profit: Decimal, sales: Decimal) -> AppResult<Decimal> {
    if sales <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let ratio = profit
        .checked_div(sales)
        .ok_or_else(|| overflow("division", profit, sales))?;
    Ok(round_amount(try_mul(ratio, Decimal::ONE_HUNDRED)?))
}
