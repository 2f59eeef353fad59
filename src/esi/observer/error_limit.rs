use crate::cache::{BudgetRecord, keys::ERROR_LIMIT_KEY};
use crate::esi::headers::{ERROR_LIMIT_REMAIN, ERROR_LIMIT_RESET};

use super::{Exchange, ObservationError, Outcome, ResponseObserver, StoreWrite, parse_header};

/// 上游错误窗口的长度，响应缺少重置头时使用
const DEFAULT_RESET_SECONDS: i64 = 60;

/// 记录上游报告的剩余错误次数
pub struct ErrorLimitObserver;

impl ResponseObserver for ErrorLimitObserver {
    fn name(&self) -> &'static str {
        "error_limit"
    }

    fn observe(&self, exchange: &Exchange<'_>) -> Result<Option<StoreWrite>, ObservationError> {
        let Outcome::Response { headers, .. } = exchange.outcome else {
            return Ok(None);
        };

        let Some(remain) = parse_header::<i64>(headers, ERROR_LIMIT_REMAIN)? else {
            return Ok(None);
        };
        let reset_seconds =
            parse_header::<i64>(headers, ERROR_LIMIT_RESET)?.unwrap_or(DEFAULT_RESET_SECONDS);

        let record = BudgetRecord {
            updated_at: exchange.now.timestamp(),
            remain,
            reset_seconds,
        };

        StoreWrite::json(ERROR_LIMIT_KEY, &record).map(Some)
    }
}
