use std::sync::Arc;

use crate::analysis::{AnalysisService, CacheStore, JsonFileCache};
use crate::core::{Config, Result};
use crate::db::DbService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，可直接作为 axum 的 `State`。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | ledger 数据库连接池 |
/// | analysis | Arc<AnalysisService> | 分析服务 (含缓存) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// ledger 数据库
    pub db: DbService,
    /// 分析服务
    pub analysis: Arc<AnalysisService>,
}

impl ServerState {
    /// 使用已有组件构造 (测试中可替换缓存实现)
    pub fn new(config: Config, db: DbService, cache: Arc<dyn CacheStore>) -> Self {
        let analysis = Arc::new(AnalysisService::new(db.pool.clone(), cache));
        Self {
            config,
            db,
            analysis,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开 ledger 数据库并执行 migration
    /// 3. 创建 JSON 文件缓存
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            anyhow::anyhow!("Failed to create work dir {}: {e}", config.work_dir)
        })?;

        let db = DbService::new(&config.database_url, config.db_max_connections).await?;
        let cache = Arc::new(JsonFileCache::new(
            config.cache_file.clone(),
            config.cache_retention(),
        ));
        tracing::info!(
            cache_file = %config.cache_file.display(),
            retention_days = config.cache_retention_days,
            "Analysis cache configured"
        );

        Ok(Self::new(config.clone(), db, cache))
    }
}
