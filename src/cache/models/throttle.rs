use serde::{Deserialize, Serialize};

/// 上游节流标记
///
/// `unblock_at` 为将来的时间时拒绝所有新请求；为空或已过去则不处于节流状态。
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrottleFlag {
    pub unblock_at: Option<i64>, // Unix timestamp
}

impl ThrottleFlag {
    pub fn until(unblock_at: i64) -> Self {
        Self {
            unblock_at: Some(unblock_at),
        }
    }

    pub fn cleared() -> Self {
        Self { unblock_at: None }
    }

    /// 在给定时间点是否仍处于节流状态
    pub fn is_active_at(&self, now: i64) -> bool {
        self.unblock_at.is_some_and(|at| at > now)
    }
}
