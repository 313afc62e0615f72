//! Shared types for the Krill order platform
//!
//! 服务端与客户端（移动端 App / 管理后台）共用的类型：
//!
//! - **错误体系** (`error`): 统一错误码、[`AppError`]、[`AppResponse`]
//! - **数据模型** (`models`): 订单、商品、分类、用户、通知
//!
//! All wire types serialize as camelCase JSON, matching the mobile app's
//! existing payload format.

pub mod error;
pub mod models;

pub use error::{AppError, AppResponse, AppResult, ok};
pub use models::order::{Order, OrderItem, OrderReceipt, OrderStatus, OrderSubmit};
