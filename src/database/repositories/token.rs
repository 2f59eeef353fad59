use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{TokenStore, models::character::EsiTokenEntity};

/// 令牌存储库实现
#[derive(Clone)]
pub struct EsiTokenRepository {
    pool: PgPool,
}

impl EsiTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取角色当前的令牌
    pub async fn find_by_character(
        pool: &PgPool,
        character_id: i64,
    ) -> Result<Option<EsiTokenEntity>, sqlx::Error> {
        let token = sqlx::query_as::<_, EsiTokenEntity>(
            r#"
            SELECT character_id, access_token, refresh_token, expires_at
            FROM esi_tokens
            WHERE character_id = $1
            "#,
        )
        .bind(character_id)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// 整行替换令牌，并发刷新时以最后一次写入为准
    pub async fn replace(pool: &PgPool, token: &EsiTokenEntity) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO esi_tokens (character_id, access_token, refresh_token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (character_id) DO UPDATE
            SET access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.character_id)
        .bind(&token.access_token)
        .bind(&token.refresh_token)
        .bind(token.expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for EsiTokenRepository {
    async fn find_token(&self, character_id: i64) -> Result<Option<EsiTokenEntity>, sqlx::Error> {
        Self::find_by_character(&self.pool, character_id).await
    }

    async fn replace_token(&self, token: &EsiTokenEntity) -> Result<(), sqlx::Error> {
        Self::replace(&self.pool, token).await
    }
}
