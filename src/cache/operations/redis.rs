use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::{BudgetStore, StoreError};

/// Redis 存储实现，延迟低但不保证持久化
#[derive(Clone)]
pub struct RedisBudgetStore {
    redis: Arc<RedisClient>,
}

impl RedisBudgetStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl BudgetStore for RedisBudgetStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(key).await?;

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        // 不设置过期时间，记录的有效性由时间戳决定
        let _: () = conn.set(key, value).await?;

        Ok(())
    }
}
