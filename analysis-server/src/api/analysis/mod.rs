//! Analysis API 模块 (成本与利润分析)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/analysis/data | GET | 读取缓存汇总，未生成返回 503 |
//! | /api/analysis/detail | GET | 读取缓存明细，未生成返回 [] |
//! | /api/analysis/refresh | POST | 重新计算并写入缓存 |
//! | /api/analysis/filter-options | GET | 客户/供应商/产品筛选项 |
//! | /api/analysis/clean-cache | POST | 清理过期缓存 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/analysis", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/data", get(handler::get_data))
        .route("/detail", get(handler::get_detail))
        .route("/refresh", post(handler::refresh))
        .route("/filter-options", get(handler::filter_options))
        .route("/clean-cache", post(handler::clean_cache))
}
