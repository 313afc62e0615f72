//! Core - 配置、状态、服务器

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;

/// 设置运行环境 (dotenv, 日志)
///
/// 必须在任何 tracing 调用之前执行一次。
pub fn setup_environment() {
    dotenv::dotenv().ok();
    crate::utils::logger::init_logger();
}
