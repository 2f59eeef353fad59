use axum::{
    Router,
    routing::get,
};

use crate::{AppState, middleware::log_errors, routes};

// ESI 网关路由
pub fn esi_routes() -> Router<AppState> {
    Router::new()
        .route("/esi", get(routes::esi::proxy_target).post(routes::esi::proxy_target))
        .route(
            "/esi/{*path}",
            get(routes::esi::proxy_literal).post(routes::esi::proxy_literal),
        )
        .route("/gateway/status", get(routes::esi::status))
}

// 创建主路由
pub fn create_router(state: AppState, api_base_uri: &str) -> Router {
    let api = Router::new()
        .merge(esi_routes())
        .route("/health", get(routes::health::ping));

    // 根路径不能 nest
    let base = api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
