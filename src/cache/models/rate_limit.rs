use serde::{Deserialize, Serialize};

/// 按路由组缓存的上游限流快照
///
/// 总是保存最近一次观察到的值，不做累加。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub group: String,
    pub limit_spec: String, // e.g. "1200/15m"
    pub remaining: i64,
    pub used: i64,
    pub updated_at: i64, // Unix timestamp
}
