//! 发起上游请求前的放行判断。
//!
//! 只读取共享存储中最近一次观察到的状态，尽力而为：并发请求读到略旧的状态是可以接受的。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::{BudgetCacheOperations, BudgetRecord, BudgetStore, ThrottleFlag};

/// 拒绝原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    #[error("ESI is throttled until {unblock_at}")]
    Throttled { unblock_at: i64 },
    #[error("ESI error limit reached ({remain} remaining), resets at {reset_at}")]
    BudgetExhausted { remain: i64, reset_at: i64 },
}

impl Denial {
    /// 预计可以重试的时间戳
    pub fn retry_at(&self) -> i64 {
        match self {
            Denial::Throttled { unblock_at } => *unblock_at,
            Denial::BudgetExhausted { reset_at, .. } => *reset_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied(Denial),
}

pub struct AdmissionGate {
    store: Arc<dyn BudgetStore>,
    threshold: i64,
}

impl AdmissionGate {
    pub fn new(store: Arc<dyn BudgetStore>, threshold: i64) -> Self {
        Self { store, threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub async fn check(&self) -> Admission {
        self.check_at(Utc::now()).await
    }

    pub async fn check_at(&self, now: DateTime<Utc>) -> Admission {
        let throttle = BudgetCacheOperations::get_throttle(self.store.as_ref()).await;
        let budget = BudgetCacheOperations::get_error_limit(self.store.as_ref()).await;

        decide(throttle, budget, self.threshold, now.timestamp())
    }
}

/// 先看节流标记，再看仍在有效期内的错误预算
pub fn decide(
    throttle: Option<ThrottleFlag>,
    budget: Option<BudgetRecord>,
    threshold: i64,
    now: i64,
) -> Admission {
    if let Some(unblock_at) = throttle.and_then(|f| f.unblock_at).filter(|at| *at > now) {
        return Admission::Denied(Denial::Throttled { unblock_at });
    }

    if let Some(record) = budget {
        if record.is_valid_at(now) && record.remain <= threshold {
            return Admission::Denied(Denial::BudgetExhausted {
                remain: record.remain,
                reset_at: record.reset_at(),
            });
        }
    }

    Admission::Allowed
}
