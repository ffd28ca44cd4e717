//! Ledger Repository
//!
//! Aggregates over `inbound_records` / `outbound_records`. Every numeric
//! column is CAST explicitly so SQLite's dynamic typing never leaks into
//! the decoded row types.

use super::RepoResult;
use crate::utils::query_builder::{Column, QueryBuilder};
use sqlx::{FromRow, SqlitePool};

/// Which ledger a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSide {
    Inbound,
    Outbound,
}

impl LedgerSide {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound_records",
            Self::Outbound => "outbound_records",
        }
    }

    /// Supplier for inbound rows, customer for outbound rows
    pub fn partner_column(&self) -> Column {
        match self {
            Self::Inbound => Column::SupplierCode,
            Self::Outbound => Column::CustomerCode,
        }
    }

    pub fn date_column(&self) -> Column {
        match self {
            Self::Inbound => Column::InboundDate,
            Self::Outbound => Column::OutboundDate,
        }
    }
}

/// Inclusive date range plus optional partner/product constraints
///
/// `None` means unconstrained; the "All" sentinel never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFilter {
    pub start_date: String,
    pub end_date: String,
    pub partner_code: Option<String>,
    pub product_model: Option<String>,
}

impl LedgerFilter {
    pub fn new(
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        partner_code: Option<String>,
        product_model: Option<String>,
    ) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            partner_code,
            product_model,
        }
    }

    /// Partner + product + date predicates for the given ledger
    pub fn apply(&self, side: LedgerSide, builder: &mut QueryBuilder) {
        builder
            .eq_opt(side.partner_column(), self.partner_code.as_deref())
            .eq_opt(Column::ProductModel, self.product_model.as_deref())
            .date_between(side.date_column(), &self.start_date, &self.end_date);
    }
}

// =============================================================================
// Row types
// =============================================================================

/// Lifetime inbound totals of one product (non-negative prices only)
#[derive(Debug, Clone, FromRow)]
pub struct InboundCostRow {
    pub product_model: String,
    pub total_value: Option<f64>,
    pub total_quantity: i64,
}

/// A single outbound row as needed for costing
#[derive(Debug, Clone, FromRow)]
pub struct OutboundLine {
    pub product_model: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Normal (price ≥ 0) and special (price < 0, absolute) totals
#[derive(Debug, Clone, Default, FromRow)]
pub struct SplitTotals {
    pub normal_amount: f64,
    pub special_amount: f64,
}

/// [`SplitTotals`] for one group of a GROUP BY
#[derive(Debug, Clone, FromRow)]
pub struct GroupTotalsRow {
    pub group_key: Option<String>,
    pub normal_amount: f64,
    pub special_amount: f64,
}

const SPLIT_SUMS: &str = "CAST(COALESCE(SUM(CASE WHEN unit_price >= 0 THEN quantity * unit_price ELSE 0 END), 0) AS REAL) AS normal_amount, \
     CAST(COALESCE(SUM(CASE WHEN unit_price < 0 THEN ABS(quantity * unit_price) ELSE 0 END), 0) AS REAL) AS special_amount";

// =============================================================================
// Queries
// =============================================================================

/// Σ(quantity·price) and Σ(quantity) per product over the whole inbound
/// history with `unit_price >= 0`. Products whose total quantity is zero are
/// left out, so callers never divide by zero.
pub async fn inbound_cost_basis(pool: &SqlitePool) -> RepoResult<Vec<InboundCostRow>> {
    let mut builder = QueryBuilder::new();
    builder.non_negative_price();
    // HAVING drops zero-quantity products: they get no average and are costed at their selling price
    let sql = format!(
        "SELECT product_model, \
                CAST(SUM(quantity * unit_price) AS REAL) AS total_value, \
                CAST(SUM(quantity) AS INTEGER) AS total_quantity \
         FROM inbound_records{} AND product_model IS NOT NULL \
         GROUP BY product_model \
         HAVING SUM(quantity) > 0",
        builder.build_where_clause()
    );
    let rows = builder
        .apply_bindings_as(sqlx::query_as::<_, InboundCostRow>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Outbound rows matching the filter, any price sign
pub async fn outbound_lines(pool: &SqlitePool, filter: &LedgerFilter) -> RepoResult<Vec<OutboundLine>> {
    let mut builder = QueryBuilder::new();
    filter.apply(LedgerSide::Outbound, &mut builder);
    let sql = format!(
        "SELECT product_model, \
                CAST(quantity AS INTEGER) AS quantity, \
                CAST(unit_price AS REAL) AS unit_price \
         FROM outbound_records{}",
        builder.build_where_clause()
    );
    let rows = builder
        .apply_bindings_as(sqlx::query_as::<_, OutboundLine>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Σ|quantity·price| of negative-price inbound rows (rebates) for the
/// product filter within the inbound date range. Partner is ignored.
pub async fn inbound_special_income(
    pool: &SqlitePool,
    product_model: Option<&str>,
    start_date: &str,
    end_date: &str,
) -> RepoResult<f64> {
    let mut builder = QueryBuilder::new();
    builder
        .negative_price()
        .eq_opt(Column::ProductModel, product_model)
        .date_between(Column::InboundDate, start_date, end_date);
    let sql = format!(
        "SELECT CAST(COALESCE(SUM(ABS(quantity * unit_price)), 0) AS REAL) FROM inbound_records{}",
        builder.build_where_clause()
    );
    let total = builder
        .apply_bindings_scalar(sqlx::query_scalar::<_, f64>(&sql))
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Normal/special split totals for one ledger
pub async fn split_totals(
    pool: &SqlitePool,
    side: LedgerSide,
    filter: &LedgerFilter,
) -> RepoResult<SplitTotals> {
    let mut builder = QueryBuilder::new();
    filter.apply(side, &mut builder);
    let sql = format!(
        "SELECT {SPLIT_SUMS} FROM {}{}",
        side.table(),
        builder.build_where_clause()
    );
    let row = builder
        .apply_bindings_as(sqlx::query_as::<_, SplitTotals>(&sql))
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Σ(quantity·price) over all matching rows, signs included
pub async fn net_total(pool: &SqlitePool, side: LedgerSide, filter: &LedgerFilter) -> RepoResult<f64> {
    let mut builder = QueryBuilder::new();
    filter.apply(side, &mut builder);
    let sql = format!(
        "SELECT CAST(COALESCE(SUM(quantity * unit_price), 0) AS REAL) FROM {}{}",
        side.table(),
        builder.build_where_clause()
    );
    let total = builder
        .apply_bindings_scalar(sqlx::query_scalar::<_, f64>(&sql))
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Split totals grouped by `group_by`, keeping groups with any activity
pub async fn grouped_totals(
    pool: &SqlitePool,
    side: LedgerSide,
    group_by: Column,
    filter: &LedgerFilter,
) -> RepoResult<Vec<GroupTotalsRow>> {
    let mut builder = QueryBuilder::new();
    filter.apply(side, &mut builder);
    let group = group_by.as_sql();
    let sql = format!(
        "SELECT {group} AS group_key, {SPLIT_SUMS} \
         FROM {}{} \
         GROUP BY {group} \
         HAVING normal_amount > 0 OR special_amount > 0",
        side.table(),
        builder.build_where_clause()
    );
    let rows = builder
        .apply_bindings_as(sqlx::query_as::<_, GroupTotalsRow>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_predicates_follow_side() {
        let filter = LedgerFilter::new("2024-01-01", "2024-01-31", Some("P01".into()), None);

        let mut builder = QueryBuilder::new();
        filter.apply(LedgerSide::Outbound, &mut builder);
        assert_eq!(
            builder.build_where_clause(),
            " WHERE customer_code = ? AND date(outbound_date) BETWEEN ? AND ?"
        );

        let mut builder = QueryBuilder::new();
        filter.apply(LedgerSide::Inbound, &mut builder);
        assert_eq!(
            builder.build_where_clause(),
            " WHERE supplier_code = ? AND date(inbound_date) BETWEEN ? AND ?"
        );
    }
}
