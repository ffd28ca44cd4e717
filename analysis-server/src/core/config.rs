use std::path::PathBuf;

/// 服务器配置 - 分析引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite://{WORK_DIR}/ledger.db | ledger 数据库 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | CACHE_FILE | {WORK_DIR}/analysis-cache.json | 分析缓存文件 |
/// | CACHE_RETENTION_DAYS | 30 | 缓存保留天数 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | (无) | 按天滚动的日志目录 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/analysis HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库、缓存文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 连接串
    pub database_url: String,
    /// 连接池最大连接数
    pub db_max_connections: u32,
    /// 分析缓存文档路径
    pub cache_file: PathBuf,
    /// 缓存条目保留天数，超过即淘汰
    pub cache_retention_days: i64,
    /// 日志级别
    pub log_level: String,
    /// 是否输出 JSON 日志
    pub log_json: bool,
    /// 日志目录 (设置后写入按天滚动的文件)
    pub log_dir: Option<String>,
    /// 运行环境: development | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| format!("sqlite://{work_dir}/ledger.db")),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            cache_file: std::env::var("CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(&work_dir).join("analysis-cache.json")),
            cache_retention_days: std::env::var("CACHE_RETENTION_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|days: &i64| *days > 0)
                .unwrap_or(30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景：数据库和缓存文件都落在 `work_dir` 下
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        let work_dir = work_dir.into();
        config.database_url = format!("sqlite://{work_dir}/ledger.db");
        config.cache_file = PathBuf::from(&work_dir).join("analysis-cache.json");
        config.work_dir = work_dir;
        config.http_port = http_port;
        config
    }

    /// 缓存保留窗口
    pub fn cache_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.cache_retention_days)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
