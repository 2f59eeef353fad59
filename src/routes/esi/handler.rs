use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    esi::{
        EsiTarget, GatewayRequest,
        target::{ACTOR_PARAM, TARGET_PARAM},
    },
    utils::success_to_api_response,
};

use super::model::reconstruct;

type QueryPairs = Vec<(String, String)>;

fn param(params: &QueryPairs, name: &str) -> Option<String> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

/// `GET|POST /esi?target=<编码后的路径和查询>&actor=<id>`
pub async fn proxy_target(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<QueryPairs>,
    body: Bytes,
) -> Response {
    let target = EsiTarget::from_encoded(&param(&params, TARGET_PARAM).unwrap_or_default(), &params);
    forward(state, method, target, &params, body).await
}

/// `GET|POST /esi/<上游路径>?...&actor=<id>`
pub async fn proxy_literal(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(params): Query<QueryPairs>,
    body: Bytes,
) -> Response {
    let target = EsiTarget::from_literal(&path, &params);
    forward(state, method, target, &params, body).await
}

async fn forward(
    state: AppState,
    method: Method,
    target: EsiTarget,
    params: &QueryPairs,
    body: Bytes,
) -> Response {
    let body = (method == Method::POST).then_some(body);

    let request = GatewayRequest {
        method,
        target,
        actor: param(params, ACTOR_PARAM),
        body,
    };

    match state.gateway.handle(request).await {
        Ok(upstream) => reconstruct(upstream),
        Err(e) => e.into_response(),
    }
}

/// 共享存储中的预算与节流状态
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(state.gateway.status().await),
    )
}
