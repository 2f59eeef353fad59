//! ESI 请求网关。
//!
//! 所有发往 ESI 的请求都经过这里：参数校验、放行判断、带角色令牌的上游调用、
//! 响应观察者链，以及按白名单重建响应。跨请求的协调只通过共享预算存储完成。

pub mod admission;
pub mod client;
pub mod gateway;
pub mod observer;
pub mod paths;
pub mod target;

use std::time::Duration;

pub use admission::{Admission, AdmissionGate, Denial};
pub use client::{EsiClient, TransportError, UpstreamResponse};
pub use gateway::{Gateway, GatewayRequest, GatewayStatus};
pub use observer::ObserverChain;
pub use paths::{PublicPaths, RateLimitRoutes};
pub use target::EsiTarget;

/// ESI 使用的响应头
pub mod headers {
    pub const ERROR_LIMIT_REMAIN: &str = "x-esi-error-limit-remain";
    pub const ERROR_LIMIT_RESET: &str = "x-esi-error-limit-reset";
    pub const RATELIMIT_GROUP: &str = "x-ratelimit-group";
    pub const RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
    pub const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
    pub const RATELIMIT_USED: &str = "x-ratelimit-used";
    pub const PAGES: &str = "x-pages";
}

/// 网关运行参数
#[derive(Debug, Clone)]
pub struct EsiSettings {
    pub host: String,
    pub datasource: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub error_limit_threshold: i64,
    pub throttle_default_secs: i64,
}

impl Default for EsiSettings {
    fn default() -> Self {
        Self {
            host: "https://esi.evetech.net".to_string(),
            datasource: "tranquility".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            error_limit_threshold: 20,
            throttle_default_secs: 60,
        }
    }
}
