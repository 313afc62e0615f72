//! 时间工具函数
//!
//! 全服务统一使用 Unix millis (`i64`)；仅健康检查对外暴露 RFC 3339。

/// Current time as Unix millis.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
