/// 缓存数据模型
/// 定义共享预算存储中保存的记录结构
// 错误预算
pub mod budget;

// 路由组限流快照
pub mod rate_limit;

// 节流标记
pub mod throttle;

// 重新导出常用类型
pub use budget::BudgetRecord;
pub use rate_limit::RateLimitRecord;
pub use throttle::ThrottleFlag;
