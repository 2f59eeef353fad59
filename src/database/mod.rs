// 数据库模块
// 网关读取的角色与令牌表，以及存储库实现

pub mod models; // 数据库实体定义
pub mod repositories; // 存储库实现

use async_trait::async_trait;

// 重新导出常用类型，方便其他模块使用
pub use models::{CharacterEntity, EsiTokenEntity};
pub use repositories::{CharacterRepository, EsiTokenRepository};

/// 本地角色目录，网关只需要按 ID 判断角色是否存在
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    async fn find_actor(&self, actor_id: i64) -> Result<Option<CharacterEntity>, sqlx::Error>;
}

/// 角色令牌的读取与整行替换
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn find_token(&self, character_id: i64) -> Result<Option<EsiTokenEntity>, sqlx::Error>;

    async fn replace_token(&self, token: &EsiTokenEntity) -> Result<(), sqlx::Error>;
}
