//! Analysis Server - 成本与利润分析引擎
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite ledger (入库/出库/往来单位/产品)
//! - **分析** (`analysis`): 加权平均成本、销售/采购汇总、明细拆分、JSON 缓存
//! - **HTTP API** (`api`): 读取缓存、刷新、筛选项、缓存清理
//!
//! # 模块结构
//!
//! ```text
//! analysis-server/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── analysis/      # 分析引擎
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、金额、日期、查询构造
//! └── db/            # 数据库层
//! ```

pub mod analysis;
pub mod api;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use analysis::AnalysisService;
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 按配置初始化日志 (stdout 或按天滚动的文件)
pub fn setup_environment(config: &Config) {
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json || config.is_production()),
        config.log_dir.as_deref(),
    );
}

pub fn print_banner() {
    println!(
        r#"
   ___                __           _
  / _ | ___  ___ _/ /_ _____ (_)__
 / __ |/ _ \/ _ `/ / // (_-</ (_-<
/_/ |_/_//_/\_,_/_/\_, /___/_/___/
                  /___/
    "#
    );
}
