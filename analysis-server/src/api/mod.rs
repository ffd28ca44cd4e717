//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`analysis`] - 成本与利润分析接口

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod analysis;
pub mod health;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(analysis::router())
}

/// Build the application with middleware
///
/// Used by both the HTTP server and the integration tests
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - the analysis screen is served from another origin
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
