use std::sync::Arc;

use crate::cache::{RateLimitRecord, keys::rate_limit_key};
use crate::esi::headers::{RATELIMIT_GROUP, RATELIMIT_LIMIT, RATELIMIT_REMAINING, RATELIMIT_USED};
use crate::esi::paths::RateLimitRoutes;

use super::{
    Exchange, ObservationError, Outcome, ResponseObserver, StoreWrite, header_str, parse_header,
};

/// 按路由组记录上游限流快照
///
/// 响应缺少组名或限额头时，用限流表中匹配的路由补全。
pub struct RateLimitObserver {
    routes: Arc<RateLimitRoutes>,
}

impl RateLimitObserver {
    pub fn new(routes: Arc<RateLimitRoutes>) -> Self {
        Self { routes }
    }
}

impl ResponseObserver for RateLimitObserver {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn observe(&self, exchange: &Exchange<'_>) -> Result<Option<StoreWrite>, ObservationError> {
        let Outcome::Response { headers, .. } = exchange.outcome else {
            return Ok(None);
        };

        let Some(remaining) = parse_header::<i64>(headers, RATELIMIT_REMAINING)? else {
            return Ok(None);
        };
        let used = parse_header::<i64>(headers, RATELIMIT_USED)?.unwrap_or(0);

        let route = self.routes.find(exchange.method, exchange.path);

        let group = header_str(headers, RATELIMIT_GROUP)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .or_else(|| route.map(|r| r.group.clone()))
            .ok_or(ObservationError::MissingHeader(RATELIMIT_GROUP))?;

        let limit_spec = header_str(headers, RATELIMIT_LIMIT)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .or_else(|| route.map(|r| r.limit_spec()))
            .ok_or(ObservationError::MissingHeader(RATELIMIT_LIMIT))?;

        let record = RateLimitRecord {
            group,
            limit_spec,
            remaining,
            used,
            updated_at: exchange.now.timestamp(),
        };

        StoreWrite::json(rate_limit_key(&record.group), &record).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use chrono::Utc;

    use super::*;
    use crate::esi::observer::test_support::{header_map, response};

    fn observer() -> RateLimitObserver {
        RateLimitObserver::new(Arc::new(RateLimitRoutes::default()))
    }

    #[test]
    fn snapshot_from_headers() {
        let method = Method::GET;
        let map = header_map(&[
            (RATELIMIT_GROUP, "char-wallet"),
            (RATELIMIT_LIMIT, "150/15m"),
            (RATELIMIT_REMAINING, "148"),
            (RATELIMIT_USED, "2"),
        ]);
        let exchange = response(&method, "/v1/characters/1/wallet/", 200, &map, b"", Utc::now());

        let write = observer().observe(&exchange).unwrap().unwrap();
        let record: RateLimitRecord = serde_json::from_str(&write.value).unwrap();

        assert_eq!(write.key, rate_limit_key("char-wallet"));
        assert_eq!(record.limit_spec, "150/15m");
        assert_eq!(record.remaining, 148);
        assert_eq!(record.used, 2);
    }

    #[test]
    fn group_falls_back_to_route_table() {
        let method = Method::GET;
        let map = header_map(&[(RATELIMIT_REMAINING, "1000"), (RATELIMIT_USED, "800")]);
        let exchange = response(&method, "/v3/characters/1/assets/", 200, &map, b"", Utc::now());

        let write = observer().observe(&exchange).unwrap().unwrap();
        let record: RateLimitRecord = serde_json::from_str(&write.value).unwrap();

        assert_eq!(record.group, "char-asset");
        assert_eq!(record.limit_spec, "1800/15m");
    }

    #[test]
    fn unknown_group_is_an_error() {
        let method = Method::GET;
        let map = header_map(&[(RATELIMIT_REMAINING, "10")]);
        let exchange = response(&method, "/v1/fleets/1/", 200, &map, b"", Utc::now());

        assert!(matches!(
            observer().observe(&exchange),
            Err(ObservationError::MissingHeader(RATELIMIT_GROUP))
        ));
    }

    #[test]
    fn no_remaining_header_no_write() {
        let method = Method::GET;
        let map = header_map(&[(RATELIMIT_GROUP, "char-asset")]);
        let exchange = response(&method, "/v3/characters/1/assets/", 200, &map, b"", Utc::now());

        assert!(observer().observe(&exchange).unwrap().is_none());
    }
}
