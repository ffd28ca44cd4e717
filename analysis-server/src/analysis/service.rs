//! Analysis Service
//!
//! Read path: validate → cache lookup (miss is reported, never recomputed).
//! Refresh path: validate → compute summary and detail → overwrite both
//! cache entries → return the fresh summary.

use chrono::Utc;
use shared::models::{
    AnalysisRequest, AnalysisSummary, AnalysisType, CleanCacheReport, DetailBreakdown, DetailItem,
    FilterOption, FilterOptions, PartnerKind, PurchaseDetailItem, PurchaseSummary, QueryParams,
    SalesSummary, Timestamped,
};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::cache::{self, CacheStore};
use super::{cost, detail, purchase, sales, validator};
use crate::db::repository::ledger::LedgerFilter;
use crate::db::repository::partner;
use crate::utils::money::{profit_rate, round_amount, to_f64, try_sub};
use crate::utils::{AppError, AppResult};

/// Detail entry payload: `{ "detail_data": [...] }`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct DetailPayload<T> {
    detail_data: Vec<T>,
}

/// Validated, normalized request
struct Resolved {
    analysis_type: AnalysisType,
    filter: LedgerFilter,
    summary_key: String,
    detail_key: String,
}

impl Resolved {
    fn from_request(req: &AnalysisRequest) -> Self {
        let start = req.start_date.as_deref().unwrap_or_default().trim().to_string();
        let end = req.end_date.as_deref().unwrap_or_default().trim().to_string();
        let partner = req.partner_code();
        let product = req.product_model();
        let analysis_type = req.analysis_type;
        Self {
            summary_key: cache::summary_key(analysis_type, &start, &end, partner.as_deref(), product.as_deref()),
            detail_key: cache::detail_key(analysis_type, &start, &end, partner.as_deref(), product.as_deref()),
            filter: LedgerFilter::new(start, end, partner, product),
            analysis_type,
        }
    }

    fn query_params(&self) -> QueryParams {
        let (customer_code, supplier_code) = match self.analysis_type {
            AnalysisType::Outbound => (self.filter.partner_code.clone(), None),
            AnalysisType::Inbound => (None, self.filter.partner_code.clone()),
        };
        QueryParams {
            start_date: self.filter.start_date.clone(),
            end_date: self.filter.end_date.clone(),
            customer_code,
            supplier_code,
            product_model: self.filter.product_model.clone(),
            analysis_type: self.analysis_type,
        }
    }
}

fn ensure_valid(result: shared::models::ValidationResult) -> AppResult<()> {
    if result.is_valid {
        Ok(())
    } else {
        Err(AppError::validation(result.error.unwrap_or_default()))
    }
}

/// Cost & profitability analysis over the ledger store
#[derive(Clone)]
pub struct AnalysisService {
    pool: SqlitePool,
    cache: Arc<dyn CacheStore>,
}

impl AnalysisService {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CacheStore>) -> Self {
        Self { pool, cache }
    }

    // ========================================================================
    // Read path
    // ========================================================================

    /// Cached summary for the request; a miss is `AnalysisNotGenerated`
    pub async fn cached_summary(&self, req: &AnalysisRequest) -> AppResult<Timestamped<AnalysisSummary>> {
        ensure_valid(validator::validate_basic_params(
            req.start_date.as_deref(),
            req.end_date.as_deref(),
        ))?;
        let resolved = Resolved::from_request(req);
        let doc = self.cache.load().await;

        let hit = match resolved.analysis_type {
            AnalysisType::Outbound => cache::read_entry::<SalesSummary>(&doc, &resolved.summary_key)
                .map(|e| Timestamped {
                    payload: AnalysisSummary::Sales(e.payload),
                    last_updated: e.last_updated,
                }),
            AnalysisType::Inbound => cache::read_entry::<PurchaseSummary>(&doc, &resolved.summary_key)
                .map(|e| Timestamped {
                    payload: AnalysisSummary::Purchase(e.payload),
                    last_updated: e.last_updated,
                }),
        };

        hit.ok_or_else(|| {
            tracing::debug!(key = %resolved.summary_key, "Analysis cache miss");
            AppError::not_generated(resolved.summary_key.clone())
        })
    }

    /// Cached detail breakdown; a miss is an empty list
    pub async fn cached_detail(&self, req: &AnalysisRequest) -> AppResult<DetailBreakdown> {
        ensure_valid(validator::validate_basic_params(
            req.start_date.as_deref(),
            req.end_date.as_deref(),
        ))?;
        let resolved = Resolved::from_request(req);
        let doc = self.cache.load().await;

        Ok(match resolved.analysis_type {
            AnalysisType::Outbound => DetailBreakdown::Sales(
                cache::read_entry::<DetailPayload<DetailItem>>(&doc, &resolved.detail_key)
                    .map(|e| e.payload.detail_data)
                    .unwrap_or_default(),
            ),
            AnalysisType::Inbound => DetailBreakdown::Purchase(
                cache::read_entry::<DetailPayload<PurchaseDetailItem>>(&doc, &resolved.detail_key)
                    .map(|e| e.payload.detail_data)
                    .unwrap_or_default(),
            ),
        })
    }

    // ========================================================================
    // Refresh path
    // ========================================================================

    /// Recompute summary and detail, overwrite both cache entries
    ///
    /// A cache write failure is logged; the fresh result is still returned.
    pub async fn refresh(&self, req: &AnalysisRequest) -> AppResult<Timestamped<AnalysisSummary>> {
        ensure_valid(validator::validate_analysis_params(
            req.start_date.as_deref(),
            req.end_date.as_deref(),
        ))?;
        let resolved = Resolved::from_request(req);
        tracing::info!(key = %resolved.summary_key, "Refreshing analysis");

        let (summary, detail_entry) = match resolved.analysis_type {
            AnalysisType::Outbound => {
                let (summary, items) = self.compute_sales(&resolved).await?;
                let now = Utc::now();
                (
                    Timestamped {
                        payload: AnalysisSummary::Sales(summary),
                        last_updated: now,
                    },
                    cache::to_entry(DetailPayload { detail_data: items }, now)?,
                )
            }
            AnalysisType::Inbound => {
                let (summary, items) = self.compute_purchase(&resolved).await?;
                let now = Utc::now();
                (
                    Timestamped {
                        payload: AnalysisSummary::Purchase(summary),
                        last_updated: now,
                    },
                    cache::to_entry(DetailPayload { detail_data: items }, now)?,
                )
            }
        };

        let summary_entry = serde_json::to_value(&summary)
            .map_err(|e| AppError::internal(format!("Failed to serialize summary: {e}")))?;
        let entries = vec![
            (resolved.summary_key.clone(), summary_entry),
            (resolved.detail_key.clone(), detail_entry),
        ];
        match self.cache.put_entries(entries).await {
            Ok(()) => tracing::info!(key = %resolved.summary_key, "Analysis cache updated"),
            Err(e) => tracing::error!(
                key = %resolved.summary_key,
                error = %e,
                "Failed to persist analysis cache, returning uncached result"
            ),
        }

        Ok(summary)
    }

    async fn compute_sales(&self, resolved: &Resolved) -> AppResult<(SalesSummary, Vec<DetailItem>)> {
        let pool = &self.pool;
        let filter = &resolved.filter;
        let averages = cost::load_average_costs(pool).await?;

        let (totals, cost_amount, items) = tokio::try_join!(
            sales::calculate_sales(pool, filter),
            cost::cost_with_averages(pool, &averages, filter),
            detail::sales_detail_with_averages(pool, &averages, filter),
        )?;

        let sales_amount = totals.sales_amount;
        let cost_amount = round_amount(cost_amount);
        let profit = round_amount(try_sub(sales_amount, cost_amount)?);
        let summary = SalesSummary {
            sales_amount: to_f64(sales_amount),
            cost_amount: to_f64(cost_amount),
            profit_amount: to_f64(profit),
            profit_rate: to_f64(profit_rate(profit, sales_amount)?),
            query_params: resolved.query_params(),
        };
        Ok((summary, items))
    }

    async fn compute_purchase(
        &self,
        resolved: &Resolved,
    ) -> AppResult<(PurchaseSummary, Vec<PurchaseDetailItem>)> {
        let pool = &self.pool;
        let filter = &resolved.filter;

        let (purchase_amount, items) = tokio::try_join!(
            purchase::calculate_purchase_amount(pool, filter),
            detail::purchase_detail(pool, filter),
        )?;

        let summary = PurchaseSummary {
            purchase_amount: to_f64(purchase_amount),
            query_params: resolved.query_params(),
        };
        Ok((summary, items))
    }

    // ========================================================================
    // Maintenance & options
    // ========================================================================

    pub async fn clean_cache(&self) -> AppResult<CleanCacheReport> {
        let report = self.cache.clean().await?;
        tracing::info!(
            original = report.original_size,
            remaining = report.new_size,
            removed = report.removed,
            "Analysis cache cleaned"
        );
        Ok(report)
    }

    /// Customers, suppliers and products, each headed by an "All" option
    pub async fn filter_options(&self) -> AppResult<FilterOptions> {
        let (customers, suppliers, products) = tokio::try_join!(
            partner::find_partners_by_kind(&self.pool, PartnerKind::Customer),
            partner::find_partners_by_kind(&self.pool, PartnerKind::Supplier),
            partner::find_product_models(&self.pool),
        )?;

        let to_options = |partners: Vec<shared::models::Partner>| {
            std::iter::once(FilterOption::all())
                .chain(partners.into_iter().map(|p| FilterOption {
                    name: p.label(),
                    code: p.code,
                }))
                .collect::<Vec<_>>()
        };

        Ok(FilterOptions {
            customers: to_options(customers),
            suppliers: to_options(suppliers),
            products: std::iter::once(FilterOption::all())
                .chain(products.into_iter().map(|model| FilterOption {
                    code: model.clone(),
                    name: model,
                }))
                .collect(),
        })
    }
}
