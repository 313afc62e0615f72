//! 服务配置
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | ENVIRONMENT | development | 运行环境 |
//! | AUTH_VERIFY_URL | http://localhost:3001/api/verify | 身份校验服务地址 |
//! | PUSH_GATEWAY_URL | (未设置) | 推送网关地址；为空时禁用推送 |
//! | PUSH_SERVER_KEY | (空) | 推送网关服务端密钥 |
//! | ADMIN_FANOUT_LIMIT | 10 | 新订单通知的管理员上限 |
//! | CATEGORY_CACHE_TTL_SECS | 300 | 分类列表缓存时长(秒) |
//!
//! # 示例
//!
//! ```ignore
//! HTTP_PORT=8080 PUSH_GATEWAY_URL=https://push.internal/send cargo run
//! ```

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 身份校验服务地址 (外部协作者)
    pub auth_verify_url: String,
    /// 推送网关地址；`None` 时推送被禁用
    pub push_gateway_url: Option<String>,
    /// 推送网关服务端密钥
    pub push_server_key: String,
    /// 新订单 fan-out 的管理员接收者上限
    pub admin_fanout_limit: usize,
    /// 分类列表缓存时长（秒）
    pub category_cache_ttl_secs: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            auth_verify_url: std::env::var("AUTH_VERIFY_URL")
                .unwrap_or_else(|_| "http://localhost:3001/api/verify".into()),
            push_gateway_url: std::env::var("PUSH_GATEWAY_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            push_server_key: std::env::var("PUSH_SERVER_KEY").unwrap_or_default(),
            admin_fanout_limit: std::env::var("ADMIN_FANOUT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            category_cache_ttl_secs: std::env::var("CATEGORY_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
