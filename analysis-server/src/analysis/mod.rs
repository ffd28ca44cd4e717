//! 成本与利润分析引擎
//!
//! # 模块结构
//!
//! - [`validator`] - 日期参数校验
//! - [`cache`] - JSON 文档缓存 (30 天保留)
//! - [`cost`] - 加权平均成本
//! - [`sales`] / [`purchase`] - 销售与采购汇总
//! - [`detail`] - 按客户/供应商或按产品的明细拆分
//! - [`service`] - 读取、刷新、筛选项

pub mod cache;
pub mod cost;
pub mod detail;
pub mod purchase;
pub mod sales;
pub mod service;
pub mod validator;

pub use cache::{CacheStore, JsonFileCache};
pub use service::AnalysisService;
