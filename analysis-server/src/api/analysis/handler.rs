//! Analysis API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use shared::models::{
    AnalysisRequest, AnalysisSummary, CleanCacheReport, DetailBreakdown, FilterOptions, Timestamped,
};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/analysis/data - cached summary
pub async fn get_data(
    State(state): State<ServerState>,
    Query(req): Query<AnalysisRequest>,
) -> AppResult<Json<ApiResponse<Timestamped<AnalysisSummary>>>> {
    let summary = state.analysis.cached_summary(&req).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// GET /api/analysis/detail - cached detail list
pub async fn get_detail(
    State(state): State<ServerState>,
    Query(req): Query<AnalysisRequest>,
) -> AppResult<Json<ApiResponse<DetailBreakdown>>> {
    let detail = state.analysis.cached_detail(&req).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /api/analysis/refresh - recompute and cache
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<AnalysisRequest>,
) -> AppResult<Json<ApiResponse<Timestamped<AnalysisSummary>>>> {
    let summary = state.analysis.refresh(&req).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Analysis data refreshed",
        summary,
    )))
}

/// GET /api/analysis/filter-options
pub async fn filter_options(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<FilterOptions>>> {
    let options = state.analysis.filter_options().await?;
    Ok(Json(ApiResponse::success(options)))
}

/// POST /api/analysis/clean-cache
pub async fn clean_cache(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<CleanCacheReport>>> {
    let report = state.analysis.clean_cache().await?;
    Ok(Json(ApiResponse::success(report)))
}
