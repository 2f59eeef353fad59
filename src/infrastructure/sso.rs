use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::database::{CharacterEntity, EsiTokenEntity, TokenStore};

/// 令牌剩余有效期低于该值时提前刷新
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("SSO token refresh failed: {0}")]
    Refresh(#[from] reqwest::Error),
}

/// 为角色提供可用的访问令牌，没有可用令牌时返回 `Ok(None)`
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, actor: &CharacterEntity) -> Result<Option<String>, TokenError>;
}

/// SSO 应用凭据
#[derive(Debug, Clone)]
pub struct SsoCredentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

/// 从 `esi_tokens` 读取令牌，过期前用 refresh_token 刷新
///
/// 同一角色的并发刷新不做去重，写回是整行替换。
pub struct SsoTokenProvider {
    store: Arc<dyn TokenStore>,
    http: reqwest::Client,
    credentials: Option<SsoCredentials>,
}

impl SsoTokenProvider {
    pub fn new(
        store: Arc<dyn TokenStore>,
        http: reqwest::Client,
        credentials: Option<SsoCredentials>,
    ) -> Self {
        Self {
            store,
            http,
            credentials,
        }
    }

    async fn refresh(
        &self,
        credentials: &SsoCredentials,
        stored: EsiTokenEntity,
    ) -> Result<Option<String>, TokenError> {
        let response = self
            .http
            .post(&credentials.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", stored.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if response.status().is_client_error() {
            tracing::warn!(
                "SSO rejected token refresh for character {}: {}",
                stored.character_id,
                response.status()
            );
            return Ok(None);
        }

        let refreshed: RefreshResponse = response.error_for_status()?.json().await?;

        let token = EsiTokenEntity {
            character_id: stored.character_id,
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token.unwrap_or(stored.refresh_token),
            expires_at: Utc::now() + Duration::seconds(refreshed.expires_in),
        };
        self.store.replace_token(&token).await?;

        tracing::debug!("Refreshed ESI token for character {}", token.character_id);
        Ok(Some(token.access_token))
    }
}

#[async_trait]
impl TokenProvider for SsoTokenProvider {
    async fn access_token(&self, actor: &CharacterEntity) -> Result<Option<String>, TokenError> {
        let Some(stored) = self.store.find_token(actor.id).await? else {
            return Ok(None);
        };

        if stored.expires_at > Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) {
            return Ok(Some(stored.access_token));
        }

        match &self.credentials {
            Some(credentials) => self.refresh(credentials, stored).await,
            None => {
                tracing::debug!(
                    "Token of character {} expired and SSO refresh is not configured",
                    actor.id
                );
                Ok(None)
            }
        }
    }
}
