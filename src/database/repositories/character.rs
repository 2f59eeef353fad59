use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{ActorDirectory, models::character::CharacterEntity};

/// 角色存储库实现
#[derive(Clone)]
pub struct CharacterRepository {
    pool: PgPool,
}

impl CharacterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按 ID 查询角色
    pub async fn find_by_id(
        pool: &PgPool,
        character_id: i64,
    ) -> Result<Option<CharacterEntity>, sqlx::Error> {
        let character = sqlx::query_as::<_, CharacterEntity>(
            r#"
            SELECT id, name
            FROM characters
            WHERE id = $1
            "#,
        )
        .bind(character_id)
        .fetch_optional(pool)
        .await?;

        Ok(character)
    }
}

#[async_trait]
impl ActorDirectory for CharacterRepository {
    async fn find_actor(&self, actor_id: i64) -> Result<Option<CharacterEntity>, sqlx::Error> {
        Self::find_by_id(&self.pool, actor_id).await
    }
}
