/// 错误预算键
pub const ERROR_LIMIT_KEY: &str = "esi_error_limit";

/// 节流标记键
pub const THROTTLE_KEY: &str = "esi_throttled";

/// 路由组限流键前缀
const RATE_LIMIT_PREFIX: &str = "esi_rate_limit:";

/// 生成路由组限流键
pub fn rate_limit_key(group: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, group)
}
