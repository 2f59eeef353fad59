use serde::{Deserialize, Serialize};

/// ESI 错误预算缓存数据模型
///
/// 上游通过 `X-Esi-Error-Limit-Remain` / `X-Esi-Error-Limit-Reset` 报告的剩余错误次数与重置窗口。
/// 只在 `now <= updated_at + reset_seconds` 时有效，过期后视为不存在。
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRecord {
    pub updated_at: i64, // Unix timestamp
    pub remain: i64,
    pub reset_seconds: i64,
}

impl BudgetRecord {
    /// 预计的重置时间
    pub fn reset_at(&self) -> i64 {
        self.updated_at + self.reset_seconds
    }

    /// 记录在给定时间点是否仍然有效
    pub fn is_valid_at(&self, now: i64) -> bool {
        now <= self.reset_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_until_reset_inclusive() {
        let record = BudgetRecord {
            updated_at: 1_000,
            remain: 10,
            reset_seconds: 60,
        };

        assert_eq!(record.reset_at(), 1_060);
        assert!(record.is_valid_at(1_000));
        assert!(record.is_valid_at(1_060));
        assert!(!record.is_valid_at(1_061));
    }
}
