use axum::Json;
use serde::Serialize;

use crate::result::ApiResult;

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResult<T>> {
    Json(ApiResult::success(data))
}

pub fn error_to_api_response<T: Serialize>(code: i32, msg: String) -> Json<ApiResult<T>> {
    Json(ApiResult::error(code, &msg))
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const PUBLIC_ROUTE: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const THROTTLED: i32 = 1006;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const UPSTREAM_UNAVAILABLE: i32 = 5002;
}
