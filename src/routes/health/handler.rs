use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::AppState;
use crate::utils::{error_codes, error_to_api_response, success_to_api_response};

/// 健康检查响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: String,
    /// 服务器时间
    pub timestamp: i64,
}

/// 健康检查接口，同时确认共享预算存储可读
pub async fn ping(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    if !state.gateway.store_reachable().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            error_to_api_response::<PingResponse>(
                error_codes::INTERNAL_ERROR,
                "budget store unavailable".to_string(),
            ),
        );
    }

    (
        StatusCode::OK,
        success_to_api_response(PingResponse {
            status: "ok".to_string(),
            timestamp: now.timestamp(),
        }),
    )
}
