use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{
    BudgetRecord, BudgetStore, RateLimitRecord, StoreError, ThrottleFlag,
    keys::{ERROR_LIMIT_KEY, THROTTLE_KEY, rate_limit_key},
};

/// 预算缓存操作
///
/// 读取失败一律按不存在处理（fail open），并记录日志。
pub struct BudgetCacheOperations;

impl BudgetCacheOperations {
    /// 获取错误预算记录
    pub async fn get_error_limit(store: &dyn BudgetStore) -> Option<BudgetRecord> {
        Self::read(store, ERROR_LIMIT_KEY).await
    }

    /// 获取节流标记
    pub async fn get_throttle(store: &dyn BudgetStore) -> Option<ThrottleFlag> {
        Self::read(store, THROTTLE_KEY).await
    }

    /// 获取路由组限流快照
    pub async fn get_rate_limit(store: &dyn BudgetStore, group: &str) -> Option<RateLimitRecord> {
        Self::read(store, &rate_limit_key(group)).await
    }

    /// 以 JSON 整值写入
    pub async fn put<T: Serialize>(
        store: &dyn BudgetStore,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        store.set(key, &json).await
    }

    async fn read<T: DeserializeOwned>(store: &dyn BudgetStore, key: &str) -> Option<T> {
        let json = match store.get(key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read {} from budget store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed {} in budget store: {}", key, e);
                None
            }
        }
    }
}
