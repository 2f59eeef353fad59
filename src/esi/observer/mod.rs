//! 上游响应观察者链。
//!
//! 每次上游交换（无论成功、上游报错还是传输失败）结束后，按固定顺序运行所有观察者。
//! 观察者是纯函数：读取请求与响应，产出至多一条存储写入；解析失败只记录日志，
//! 不影响其余观察者，也不影响返回给调用方的响应。

mod deprecation;
mod error_limit;
mod rate_limit;
mod throttle;

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{HeaderMap, Method, StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::cache::BudgetStore;
use crate::esi::paths::RateLimitRoutes;

pub use deprecation::DeprecationObserver;
pub use error_limit::ErrorLimitObserver;
pub use rate_limit::RateLimitObserver;
pub use throttle::{ThrottleObserver, resolve_retry_after};

#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("Invalid {header} header value '{value}'")]
    InvalidHeader { header: &'static str, value: String },
    #[error("Missing {0} header")]
    MissingHeader(&'static str),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// 一次上游交换的结果
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Response {
        status: StatusCode,
        headers: &'a HeaderMap,
        body: &'a [u8],
    },
    TransportFailure {
        reason: &'a str,
    },
}

/// 观察者的输入
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub outcome: Outcome<'a>,
    pub now: DateTime<Utc>,
}

/// 观察者产出的整值写入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreWrite {
    pub key: String,
    pub value: String,
}

impl StoreWrite {
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self, ObservationError> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_string(value)?,
        })
    }
}

pub trait ResponseObserver: Send + Sync {
    fn name(&self) -> &'static str;

    fn observe(&self, exchange: &Exchange<'_>) -> Result<Option<StoreWrite>, ObservationError>;
}

/// 有序的观察者链，通过构造时显式组装
pub struct ObserverChain {
    store: Arc<dyn BudgetStore>,
    observers: Vec<Box<dyn ResponseObserver>>,
}

impl ObserverChain {
    pub fn new(store: Arc<dyn BudgetStore>) -> Self {
        Self {
            store,
            observers: Vec::new(),
        }
    }

    /// 错误预算、路由组限流、节流、弃用警告，按此顺序
    pub fn standard(
        store: Arc<dyn BudgetStore>,
        routes: Arc<RateLimitRoutes>,
        throttle_default_secs: i64,
    ) -> Self {
        Self::new(store)
            .with(ErrorLimitObserver)
            .with(RateLimitObserver::new(routes))
            .with(ThrottleObserver::new(throttle_default_secs))
            .with(DeprecationObserver)
    }

    pub fn with(mut self, observer: impl ResponseObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// 运行所有观察者并收集写入，不访问存储
    pub fn collect(&self, exchange: &Exchange<'_>) -> Vec<StoreWrite> {
        self.observers
            .iter()
            .filter_map(|observer| match observer.observe(exchange) {
                Ok(write) => write,
                Err(e) => {
                    tracing::warn!(
                        "{} failed on {} {}: {}",
                        observer.name(),
                        exchange.method,
                        exchange.path,
                        e
                    );
                    None
                }
            })
            .collect()
    }

    /// 运行观察者并把结果写入共享存储，写入失败只记录日志
    pub async fn observe(&self, exchange: &Exchange<'_>) {
        for write in self.collect(exchange) {
            if let Err(e) = self.store.set(&write.key, &write.value).await {
                tracing::error!("Failed to write {} to budget store: {}", write.key, e);
            }
        }
    }
}

/// 读取字符串形式的响应头
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

/// 解析响应头，缺失时返回 `Ok(None)`
pub(crate) fn parse_header<T: FromStr>(
    headers: &HeaderMap,
    name: &'static str,
) -> Result<Option<T>, ObservationError> {
    match headers.get(name) {
        None => Ok(None),
        Some(raw) => {
            let value = raw.to_str().map(str::trim).unwrap_or_default();
            value
                .parse()
                .map(Some)
                .map_err(|_| ObservationError::InvalidHeader {
                    header: name,
                    value: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
                })
        }
    }
}
