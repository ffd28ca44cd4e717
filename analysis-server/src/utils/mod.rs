//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`money`] - Decimal 金额计算
//! - [`query_builder`] - ledger 查询条件构造
//! - 日志、日期等工具

pub mod logger;
pub mod money;
pub mod query_builder;
pub mod result;
pub mod time;

pub use result::AppResult;
pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
