use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::esi::EsiSettings;
use crate::infrastructure::SsoCredentials;

const DEFAULT_SSO_TOKEN_URL: &str = "https://login.eveonline.com/v2/oauth/token";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
}

/// 共享预算存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Database,
    Redis,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub budget_store: StoreKind,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub esi_host: String,
    pub esi_datasource: String,
    pub esi_timeout_secs: u64,
    pub esi_user_agent: Option<String>,
    pub error_limit_threshold: i64,
    pub throttle_default_secs: i64,
    pub sso_token_url: String,
    pub sso_client_id: Option<String>,
    pub sso_client_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let budget_store = match optional("BUDGET_STORE").as_deref() {
            None | Some("database") => StoreKind::Database,
            Some("redis") => StoreKind::Redis,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "BUDGET_STORE".to_string(),
                    value: other.to_string(),
                });
            }
        };
        let redis_url = optional("REDIS_URL");
        if budget_store == StoreKind::Redis && redis_url.is_none() {
            return Err(ConfigError::MissingEnvVar("REDIS_URL".to_string()));
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url,
            budget_store,
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "::".to_string()),
            server_port: parsed("SERVER_PORT", 3000)?,
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/api".to_string()),
            esi_host: optional("ESI_HOST").unwrap_or_else(|| "https://esi.evetech.net".to_string()),
            esi_datasource: optional("ESI_DATASOURCE").unwrap_or_else(|| "tranquility".to_string()),
            esi_timeout_secs: parsed("ESI_TIMEOUT", 30)?,
            esi_user_agent: optional("ESI_USER_AGENT"),
            error_limit_threshold: parsed("ESI_ERROR_LIMIT_THRESHOLD", 20)?,
            throttle_default_secs: parsed("ESI_THROTTLE_DEFAULT", 60)?,
            sso_token_url: optional("SSO_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SSO_TOKEN_URL.to_string()),
            sso_client_id: optional("SSO_CLIENT_ID"),
            sso_client_secret: optional("SSO_CLIENT_SECRET"),
        })
    }

    pub fn esi_timeout(&self) -> Duration {
        Duration::from_secs(self.esi_timeout_secs)
    }

    pub fn esi_settings(&self) -> EsiSettings {
        let defaults = EsiSettings::default();
        EsiSettings {
            host: self.esi_host.clone(),
            datasource: self.esi_datasource.clone(),
            timeout: self.esi_timeout(),
            user_agent: self.esi_user_agent.clone().unwrap_or(defaults.user_agent),
            error_limit_threshold: self.error_limit_threshold,
            throttle_default_secs: self.throttle_default_secs,
        }
    }

    /// 未配置客户端凭据时不刷新令牌
    pub fn sso_credentials(&self) -> Option<SsoCredentials> {
        match (&self.sso_client_id, &self.sso_client_secret) {
            (Some(client_id), Some(client_secret)) => Some(SsoCredentials {
                token_url: self.sso_token_url.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        }
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}
