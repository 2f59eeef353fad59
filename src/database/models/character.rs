use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 角色数据库实体，网关以角色的身份调用 ESI
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CharacterEntity {
    pub id: i64,
    pub name: String,
}

/// 角色的 SSO 令牌
#[derive(Debug, Clone, FromRow)]
pub struct EsiTokenEntity {
    pub character_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}
