// 共享预算存储模块
// 跨进程的键值存储，保存上游错误预算、节流标记和路由组限流快照

pub mod keys;
pub mod models;
pub mod operations;

use async_trait::async_trait;
use thiserror::Error;

// 重新导出常用类型，方便其他模块使用
pub use models::{BudgetRecord, RateLimitRecord, ThrottleFlag};
pub use operations::{BudgetCacheOperations, DatabaseBudgetStore, MemoryBudgetStore, RedisBudgetStore};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    #[error("Failed to (de)serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 共享预算存储接口
///
/// 只有整值替换语义：同一个键的并发写入以最后一次为准，不提供跨键原子性。
/// 记录永不删除，是否过期由读取方根据时间戳判断。
#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
