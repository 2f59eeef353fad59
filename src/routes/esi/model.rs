use axum::{
    body::Body,
    http::{
        HeaderName,
        header::{CONTENT_TYPE, EXPIRES, WARNING},
    },
    response::Response,
};

use crate::esi::{UpstreamResponse, headers};

/// 会转发给调用方的上游响应头，其余响应头全部丢弃
pub const FORWARDED_HEADERS: [HeaderName; 6] = [
    CONTENT_TYPE,
    EXPIRES,
    HeaderName::from_static(headers::ERROR_LIMIT_REMAIN),
    HeaderName::from_static(headers::ERROR_LIMIT_RESET),
    HeaderName::from_static(headers::PAGES),
    WARNING,
];

/// 按上游响应重建返回给调用方的响应：状态码与原因短语原样保留，响应体不做解析
pub fn reconstruct(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;

    if let Some(reason) = upstream.reason {
        response.extensions_mut().insert(reason);
    }

    let headers = response.headers_mut();
    for name in &FORWARDED_HEADERS {
        for value in upstream.headers.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    response
}
