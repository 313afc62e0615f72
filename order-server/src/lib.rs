//! Krill Order Server - 订单管理服务
//!
//! # 架构概述
//!
//! 移动端 App 与管理后台共用的 REST 服务。文档存储、推送网关、身份校验
//! 都是外部协作者，以 trait 边界接入；真正有并发正确性风险的只有
//! 计数器事务与通知 fan-out。
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/       # 配置、状态、服务器
//! ├── auth/       # 令牌校验边界、提取器
//! ├── store/      # 文档存储边界 + 内嵌实现
//! ├── orders/     # 序号分配、订单提交编排
//! ├── notify/     # 推送网关边界、通知服务
//! ├── services/   # 分类缓存
//! ├── api/        # HTTP 路由和处理器
//! └── utils/      # 日志、校验、时间
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod notify;
pub mod orders;
pub mod services;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{AdminUser, CurrentUser, StaticTokenVerifier, TokenVerifier};
pub use core::{Config, Server, ServerState, setup_environment};
pub use notify::{NotificationService, PushGateway};
pub use orders::{OrderService, SequenceAllocator};
pub use store::{DocumentStore, MemoryStore};
pub use utils::{AppError, AppResult};

pub fn print_banner() {
    println!(
        r#"
    __ __        _  __ __
   / //_/______ (_)/ // /
  / ,<  / ___/ / // // /
 / /| |/ /    / // // /
/_/ |_/_/    /_//_//_/
    Order Server
    "#
    );
}
