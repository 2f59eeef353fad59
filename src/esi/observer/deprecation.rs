use axum::http::header::WARNING;

use super::{Exchange, ObservationError, Outcome, ResponseObserver, StoreWrite, header_str};

/// 记录上游的弃用警告，不产生任何写入
pub struct DeprecationObserver;

impl ResponseObserver for DeprecationObserver {
    fn name(&self) -> &'static str {
        "deprecation"
    }

    fn observe(&self, exchange: &Exchange<'_>) -> Result<Option<StoreWrite>, ObservationError> {
        if let Outcome::Response { headers, .. } = exchange.outcome {
            if let Some(warning) = header_str(headers, WARNING.as_str()) {
                tracing::warn!(
                    "ESI route {} {} returned warning: {}",
                    exchange.method,
                    exchange.path,
                    warning
                );
            }
        }
        Ok(None)
    }
}
