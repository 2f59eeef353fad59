use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use chrono::Utc;
use hyper::ext::ReasonPhrase;
use thiserror::Error;
use url::Url;

use super::observer::{Exchange, ObserverChain, Outcome};
use super::target::{DATASOURCE_PARAM, EsiTarget};
use super::EsiSettings;

/// 上游没有产生任何响应（超时、连接失败、响应体读取失败）
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(#[from] reqwest::Error);

/// 上游返回的完整响应
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// 非标准的原因短语，标准短语时为空
    pub reason: Option<ReasonPhrase>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// ESI HTTP 客户端
///
/// 每一次调用，不论调用方是谁，都会经过同一条观察者链。
pub struct EsiClient {
    http: reqwest::Client,
    host: String,
    datasource: String,
    observers: ObserverChain,
}

impl EsiClient {
    pub fn new(settings: &EsiSettings, observers: ObserverChain) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            host: settings.host.trim_end_matches('/').to_string(),
            datasource: settings.datasource.clone(),
            observers,
        })
    }

    /// 上游地址：主机 + 路径 + 强制的 datasource + 透传参数
    pub fn url(&self, target: &EsiTarget) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}{}", self.host, target.path))?;
        url.query_pairs_mut()
            .clear()
            .append_pair(DATASOURCE_PARAM, &self.datasource)
            .extend_pairs(target.query.iter());
        Ok(url)
    }

    pub async fn send(
        &self,
        method: Method,
        url: Url,
        path: &str,
        token: &str,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse, TransportError> {
        let mut request = self.http.request(method.clone(), url).bearer_auth(token);
        if let Some(body) = body {
            request = request.body(body);
        }

        let result = Self::execute(request).await;

        match &result {
            Ok(response) => {
                self.observers
                    .observe(&Exchange {
                        method: &method,
                        path,
                        outcome: Outcome::Response {
                            status: response.status,
                            headers: &response.headers,
                            body: &response.body,
                        },
                        now: Utc::now(),
                    })
                    .await
            }
            Err(e) => {
                let reason = e.to_string();
                self.observers
                    .observe(&Exchange {
                        method: &method,
                        path,
                        outcome: Outcome::TransportFailure { reason: &reason },
                        now: Utc::now(),
                    })
                    .await
            }
        }

        result
    }

    async fn execute(request: reqwest::RequestBuilder) -> Result<UpstreamResponse, TransportError> {
        let response = request.send().await?;

        let status = response.status();
        let reason = response.extensions().get::<ReasonPhrase>().cloned();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            reason,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::MemoryBudgetStore;

    fn client(host: &str) -> EsiClient {
        let settings = EsiSettings {
            host: host.to_string(),
            ..EsiSettings::default()
        };
        EsiClient::new(&settings, ObserverChain::new(Arc::new(MemoryBudgetStore::new()))).unwrap()
    }

    #[test]
    fn url_forces_datasource_first() {
        let target = EsiTarget::from_literal(
            "/v3/characters/96061222/assets/",
            &[
                ("page".to_string(), "2".to_string()),
                ("datasource".to_string(), "singularity".to_string()),
            ],
        );

        let url = client("https://esi.evetech.net/").url(&target).unwrap();
        assert_eq!(
            url.as_str(),
            "https://esi.evetech.net/v3/characters/96061222/assets/?datasource=tranquility&page=2"
        );
    }

    #[test]
    fn url_keeps_host_for_odd_paths() {
        let target = EsiTarget::from_literal("https://evil.example/x", &[]);
        let url = client("https://esi.evetech.net").url(&target).unwrap();
        assert_eq!(url.host_str(), Some("esi.evetech.net"));
    }
}
