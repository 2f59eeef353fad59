use axum::http::{StatusCode, header::RETRY_AFTER};
use chrono::{DateTime, Utc};

use crate::cache::{ThrottleFlag, keys::THROTTLE_KEY};

use super::{Exchange, ObservationError, Outcome, ResponseObserver, StoreWrite, header_str};

/// 上游把节流包装进 5xx 响应时，错误信息中包含的文字
const THROTTLED_MESSAGE: &str = "temporarily throttled";

/// 检测上游节流并写入解除时间，其他任何响应都会清除节流标记
pub struct ThrottleObserver {
    default_secs: i64,
}

impl ThrottleObserver {
    pub fn new(default_secs: i64) -> Self {
        Self { default_secs }
    }

    fn is_throttled(status: StatusCode, body: &[u8]) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
            || (status.is_server_error()
                && String::from_utf8_lossy(body)
                    .to_ascii_lowercase()
                    .contains(THROTTLED_MESSAGE))
    }
}

impl ResponseObserver for ThrottleObserver {
    fn name(&self) -> &'static str {
        "throttle"
    }

    fn observe(&self, exchange: &Exchange<'_>) -> Result<Option<StoreWrite>, ObservationError> {
        let Outcome::Response {
            status,
            headers,
            body,
        } = exchange.outcome
        else {
            return Ok(None);
        };

        if !Self::is_throttled(status, body) {
            return StoreWrite::json(THROTTLE_KEY, &ThrottleFlag::cleared()).map(Some);
        }

        let fallback = exchange.now.timestamp() + self.default_secs;
        let unblock_at = match header_str(headers, RETRY_AFTER.as_str()) {
            Some(value) => resolve_retry_after(value, exchange.now).unwrap_or_else(|| {
                tracing::warn!("Unparsable Retry-After '{}', throttling for {}s", value, self.default_secs);
                fallback
            }),
            None => fallback,
        };

        tracing::warn!(
            "ESI throttled on {} {} (status {}), blocking until {}",
            exchange.method,
            exchange.path,
            status,
            unblock_at
        );

        StoreWrite::json(THROTTLE_KEY, &ThrottleFlag::until(unblock_at)).map(Some)
    }
}

/// 把 `Retry-After`（秒数或 HTTP 日期）换算成绝对时间戳，结果不早于 `now`
pub fn resolve_retry_after(value: &str, now: DateTime<Utc>) -> Option<i64> {
    let value = value.trim();
    let now_ts = now.timestamp();

    let at = match value.parse::<i64>() {
        Ok(seconds) => now_ts.saturating_add(seconds),
        Err(_) => DateTime::parse_from_rfc2822(value).ok()?.timestamp(),
    };

    Some(at.max(now_ts))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::esi::observer::test_support::{header_map, response};

    fn flag(write: StoreWrite) -> ThrottleFlag {
        assert_eq!(write.key, THROTTLE_KEY);
        serde_json::from_str(&write.value).unwrap()
    }

    #[test]
    fn retry_after_seconds_are_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(resolve_retry_after("30", now), Some(now.timestamp() + 30));
    }

    #[test]
    fn retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 0, 0).unwrap();
        let at = resolve_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now).unwrap();
        assert_eq!(at, now.timestamp() + 28 * 60);
    }

    #[test]
    fn retry_after_in_the_past_is_clamped_to_now() {
        let now = Utc::now();
        let past = (now - Duration::hours(1)).to_rfc2822();

        let at = resolve_retry_after(&past, now).unwrap();
        assert!(at >= now.timestamp());
        assert!(at - now.timestamp() <= 1);

        assert_eq!(resolve_retry_after("-5", now), Some(now.timestamp()));
    }

    #[test]
    fn garbage_retry_after_is_none() {
        assert_eq!(resolve_retry_after("soon", Utc::now()), None);
    }

    #[test]
    fn too_many_requests_sets_flag() {
        let now = Utc::now();
        let method = Method::GET;
        let map = header_map(&[("retry-after", "120")]);
        let exchange = response(&method, "/v3/characters/1/assets/", 429, &map, b"", now);

        let written = flag(ThrottleObserver::new(60).observe(&exchange).unwrap().unwrap());
        assert_eq!(written.unblock_at, Some(now.timestamp() + 120));
    }

    #[test]
    fn throttle_message_inside_server_error() {
        let now = Utc::now();
        let method = Method::GET;
        let map = header_map(&[]);
        let body = br#"{"error":"Undefined 429 response. Original message: Too many errors.You have been temporarily throttled."}"#;
        let exchange = response(&method, "/v3/characters/1/assets/", 520, &map, body, now);

        let written = flag(ThrottleObserver::new(45).observe(&exchange).unwrap().unwrap());
        assert_eq!(written.unblock_at, Some(now.timestamp() + 45));
    }

    #[test]
    fn plain_server_error_clears_flag() {
        let method = Method::GET;
        let map = header_map(&[]);
        let exchange = response(&method, "/v1/status/", 502, &map, b"bad gateway", Utc::now());

        let written = flag(ThrottleObserver::new(60).observe(&exchange).unwrap().unwrap());
        assert_eq!(written, ThrottleFlag::cleared());
    }

    #[test]
    fn unparsable_retry_after_uses_default() {
        let now = Utc::now();
        let method = Method::GET;
        let map = header_map(&[("retry-after", "later")]);
        let exchange = response(&method, "/v1/status/", 429, &map, b"", now);

        let written = flag(ThrottleObserver::new(60).observe(&exchange).unwrap().unwrap());
        assert_eq!(written.unblock_at, Some(now.timestamp() + 60));
    }
}
