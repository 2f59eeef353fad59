//! 网关请求的完整处理流程：
//! `received → validated → admission-checked → (denied | upstream-called → observed) → responded`。

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Method;
use chrono::Utc;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{
    BudgetCacheOperations, BudgetRecord, BudgetStore, RateLimitRecord, ThrottleFlag,
    keys::ERROR_LIMIT_KEY,
};
use crate::database::ActorDirectory;
use crate::error::GatewayError;
use crate::infrastructure::TokenProvider;

use super::admission::{self, Admission, AdmissionGate};
use super::client::{EsiClient, UpstreamResponse};
use super::observer::ObserverChain;
use super::paths::{PublicPaths, RateLimitRoutes};
use super::target::EsiTarget;
use super::EsiSettings;

/// 一次网关调用
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub target: EsiTarget,
    pub actor: Option<String>,
    pub body: Option<Bytes>,
}

/// 共享存储中的当前状态
#[derive(Debug, Serialize)]
pub struct GatewayStatus {
    pub now: i64,
    pub threshold: i64,
    pub admission: String,
    pub error_limit: Option<BudgetRecord>,
    pub error_limit_valid: bool,
    pub throttle: Option<ThrottleFlag>,
    pub rate_limits: Vec<RateLimitRecord>,
}

pub struct Gateway {
    client: EsiClient,
    gate: AdmissionGate,
    public_paths: PublicPaths,
    routes: Arc<RateLimitRoutes>,
    store: Arc<dyn BudgetStore>,
    actors: Arc<dyn ActorDirectory>,
    tokens: Arc<dyn TokenProvider>,
}

impl Gateway {
    pub fn new(
        settings: &EsiSettings,
        store: Arc<dyn BudgetStore>,
        actors: Arc<dyn ActorDirectory>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, reqwest::Error> {
        Self::with_tables(
            settings,
            store,
            actors,
            tokens,
            PublicPaths::default(),
            RateLimitRoutes::default(),
        )
    }

    pub fn with_tables(
        settings: &EsiSettings,
        store: Arc<dyn BudgetStore>,
        actors: Arc<dyn ActorDirectory>,
        tokens: Arc<dyn TokenProvider>,
        public_paths: PublicPaths,
        routes: RateLimitRoutes,
    ) -> Result<Self, reqwest::Error> {
        let routes = Arc::new(routes);
        let observers =
            ObserverChain::standard(store.clone(), routes.clone(), settings.throttle_default_secs);

        Ok(Self {
            client: EsiClient::new(settings, observers)?,
            gate: AdmissionGate::new(store.clone(), settings.error_limit_threshold),
            public_paths,
            routes,
            store,
            actors,
            tokens,
        })
    }

    pub async fn handle(&self, request: GatewayRequest) -> Result<UpstreamResponse, GatewayError> {
        let span = tracing::info_span!(
            "esi_request",
            request_id = %Uuid::new_v4(),
            actor = request.actor.as_deref().unwrap_or(""),
            method = %request.method,
            path = %request.target.path,
        );

        self.process(request).instrument(span).await
    }

    async fn process(&self, request: GatewayRequest) -> Result<UpstreamResponse, GatewayError> {
        let GatewayRequest {
            method,
            target,
            actor,
            body,
        } = request;

        if target.is_empty() {
            return Err(GatewayError::EmptyPath);
        }

        // 上游收到的是规范化后的路径，`..` 之类的片段会被解析掉
        let url = self.client.url(&target)?;
        if url.path() != target.path {
            return Err(GatewayError::NonCanonicalPath(target.path));
        }
        if let Some(pattern) = self.public_paths.find(url.path()) {
            tracing::debug!("Rejecting public route {} ({})", target.path, pattern.as_str());
            return Err(GatewayError::PublicPath(target.path));
        }

        let actor = actor.filter(|a| !a.trim().is_empty()).ok_or(GatewayError::MissingActor)?;
        let actor_id: i64 = actor
            .trim()
            .parse()
            .map_err(|_| GatewayError::InvalidActor(actor.clone()))?;
        let character = self
            .actors
            .find_actor(actor_id)
            .await?
            .ok_or(GatewayError::UnknownActor(actor_id))?;
        let token = self
            .tokens
            .access_token(&character)
            .await?
            .ok_or(GatewayError::NoToken(actor_id))?;

        if let Admission::Denied(denial) = self.gate.check().await {
            tracing::info!("ESI request blocked: {}", denial);
            return Err(GatewayError::AdmissionDenied(denial));
        }

        let response = self
            .client
            .send(method, url, &target.path, &token, body)
            .await
            .map_err(|e| {
                tracing::error!("ESI request for character {} failed: {}", character.id, e);
                GatewayError::Transport(e)
            })?;

        tracing::debug!("ESI responded {}", response.status);
        Ok(response)
    }

    /// 共享存储是否可读
    pub async fn store_reachable(&self) -> bool {
        match self.store.get(ERROR_LIMIT_KEY).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Budget store health check failed: {}", e);
                false
            }
        }
    }

    /// 读取共享存储中的预算、节流和各路由组的限流快照
    pub async fn status(&self) -> GatewayStatus {
        let now = Utc::now().timestamp();
        let store = self.store.as_ref();

        let error_limit = BudgetCacheOperations::get_error_limit(store).await;
        let throttle = BudgetCacheOperations::get_throttle(store).await;

        let mut rate_limits = Vec::new();
        for group in self.routes.groups() {
            if let Some(record) = BudgetCacheOperations::get_rate_limit(store, group).await {
                rate_limits.push(record);
            }
        }

        let admission = match admission::decide(throttle, error_limit, self.gate.threshold(), now) {
            Admission::Allowed => "allowed".to_string(),
            Admission::Denied(denial) => denial.to_string(),
        };

        GatewayStatus {
            now,
            threshold: self.gate.threshold(),
            admission,
            error_limit_valid: error_limit.is_some_and(|r| r.is_valid_at(now)),
            error_limit,
            throttle,
            rate_limits,
        }
    }
}
