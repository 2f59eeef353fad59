/// 缓存操作
/// 共享预算存储的各个后端实现与类型化读写

// 类型化读写
pub mod budget;

// Postgres 持久化后端
pub mod database;

// 进程内后端
pub mod memory;

// Redis 后端
pub mod redis;

// 重新导出常用操作
pub use budget::BudgetCacheOperations;
pub use database::DatabaseBudgetStore;
pub use memory::MemoryBudgetStore;
pub use self::redis::RedisBudgetStore;
