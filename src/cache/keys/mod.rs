/// 缓存键模块
/// 共享预算存储使用的固定键集合

pub mod budget_keys;

pub use budget_keys::{ERROR_LIMIT_KEY, THROTTLE_KEY, rate_limit_key};
