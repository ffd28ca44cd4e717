//! Detail breakdown (by customer / supplier or by product)
//!
//! The grouping dimension is the one left unconstrained:
//!
//! | partner | product | breakdown |
//! |---------|---------|-----------|
//! | All | All | none |
//! | All | X | by partner, product = X |
//! | P | All | by product, partner = P |
//! | P | X | none |
//!
//! Outbound groups are costed concurrently, one query set per group, all
//! sharing one average-cost map. Any failing group fails the whole breakdown.

use futures::future::try_join_all;
use rust_decimal::Decimal;
use shared::models::{DetailItem, PurchaseDetailItem};
use sqlx::SqlitePool;

use super::cost::{self, AverageCostMap};
use super::sales::SalesTotals;
use crate::db::repository::ledger::{self, GroupTotalsRow, LedgerFilter, LedgerSide};
use crate::utils::AppResult;
use crate::utils::money::{profit_rate, round_amount, to_decimal, to_f64, try_sub};
use crate::utils::query_builder::Column;

/// Breakdown dimension derived from which filter is unconstrained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailGrouping {
    /// Both or neither filter set
    None,
    ByPartner,
    ByProduct,
}

impl DetailGrouping {
    pub fn resolve(partner_code: Option<&str>, product_model: Option<&str>) -> Self {
        match (partner_code.is_some(), product_model.is_some()) {
            (false, true) => Self::ByPartner,
            (true, false) => Self::ByProduct,
            _ => Self::None,
        }
    }

    pub fn of(filter: &LedgerFilter) -> Self {
        Self::resolve(filter.partner_code.as_deref(), filter.product_model.as_deref())
    }

    fn column(&self, side: LedgerSide) -> Option<Column> {
        match self {
            Self::None => None,
            Self::ByPartner => Some(side.partner_column()),
            Self::ByProduct => Some(Column::ProductModel),
        }
    }

    /// The filter narrowed to a single group
    fn narrow(&self, filter: &LedgerFilter, group_key: &str) -> LedgerFilter {
        let mut narrowed = filter.clone();
        match self {
            Self::ByPartner => narrowed.partner_code = Some(group_key.to_string()),
            Self::ByProduct => narrowed.product_model = Some(group_key.to_string()),
            Self::None => {}
        }
        narrowed
    }
}

/// Detail row for one outbound group, or `None` when its net sales are not positive
pub fn sales_detail_item(
    group_key: String,
    group_filter: &LedgerFilter,
    totals: SalesTotals,
    cost_amount: Decimal,
) -> AppResult<Option<DetailItem>> {
    let sales = totals.sales_amount;
    if sales <= Decimal::ZERO {
        return Ok(None);
    }
    let cost = round_amount(cost_amount);
    let profit = round_amount(try_sub(sales, cost)?);
    Ok(Some(DetailItem {
        group_key,
        customer_code: group_filter.partner_code.clone(),
        product_model: group_filter.product_model.clone(),
        sales_amount: to_f64(sales),
        cost_amount: to_f64(cost),
        profit_amount: to_f64(profit),
        profit_rate: to_f64(profit_rate(profit, sales)?),
    }))
}

/// Cost every keyed group concurrently with `cost_of(group_filter)`
///
/// All-or-nothing: the first failing group fails the whole breakdown.
async fn cost_groups<F, Fut>(
    groups: Vec<GroupTotalsRow>,
    grouping: DetailGrouping,
    filter: &LedgerFilter,
    cost_of: F,
) -> AppResult<Vec<DetailItem>>
where
    F: Fn(LedgerFilter) -> Fut,
    Fut: Future<Output = AppResult<Decimal>>,
{
    let group_count = groups.len();
    let pending = groups.into_iter().filter_map(|group| {
        let totals = SalesTotals::from_raw(group.normal_amount, group.special_amount);
        let group_key = group.group_key?;
        let group_filter = grouping.narrow(filter, &group_key);
        let cost = cost_of(group_filter.clone());
        Some(async move { sales_detail_item(group_key, &group_filter, totals, cost.await?) })
    });
    let results = try_join_all(pending).await?;

    let mut items: Vec<DetailItem> = results.into_iter().flatten().collect();
    items.sort_by(|a, b| b.sales_amount.total_cmp(&a.sales_amount));
    tracing::debug!(?grouping, groups = group_count, kept = items.len(), "Sales detail computed");
    Ok(items)
}

/// Outbound breakdown, sorted by sales amount descending
pub async fn sales_detail(pool: &SqlitePool, filter: &LedgerFilter) -> AppResult<Vec<DetailItem>> {
    if DetailGrouping::of(filter) == DetailGrouping::None {
        return Ok(Vec::new());
    }
    let averages = cost::load_average_costs(pool).await?;
    sales_detail_with_averages(pool, &averages, filter).await
}

/// [`sales_detail`] against an average-cost map the caller already holds
pub async fn sales_detail_with_averages(
    pool: &SqlitePool,
    averages: &AverageCostMap,
    filter: &LedgerFilter,
) -> AppResult<Vec<DetailItem>> {
    let grouping = DetailGrouping::of(filter);
    let Some(column) = grouping.column(LedgerSide::Outbound) else {
        return Ok(Vec::new());
    };

    let groups = ledger::grouped_totals(pool, LedgerSide::Outbound, column, filter).await?;
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    cost_groups(groups, grouping, filter, move |group_filter: LedgerFilter| async move {
        cost::cost_with_averages(pool, averages, &group_filter).await
    })
    .await
}

/// Inbound breakdown: one aggregate pass, purchase = normal − rebates
pub async fn purchase_detail(
    pool: &SqlitePool,
    filter: &LedgerFilter,
) -> AppResult<Vec<PurchaseDetailItem>> {
    let grouping = DetailGrouping::of(filter);
    let Some(column) = grouping.column(LedgerSide::Inbound) else {
        return Ok(Vec::new());
    };

    let groups = ledger::grouped_totals(pool, LedgerSide::Inbound, column, filter).await?;
    let mut items = Vec::with_capacity(groups.len());
    for group in groups {
        let Some(group_key) = group.group_key else {
            continue;
        };
        let normal = round_amount(to_decimal(group.normal_amount));
        let special = round_amount(to_decimal(group.special_amount));
        let purchase = round_amount(try_sub(normal, special)?);
        if purchase <= Decimal::ZERO {
            continue;
        }
        let group_filter = grouping.narrow(filter, &group_key);
        items.push(PurchaseDetailItem {
            group_key,
            supplier_code: group_filter.partner_code,
            product_model: group_filter.product_model,
            purchase_amount: to_f64(purchase),
        });
    }
    items.sort_by(|a, b| b.purchase_amount.total_cmp(&a.purchase_amount));
    Ok(items)
}
