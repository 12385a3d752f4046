use async_trait::async_trait;

use super::entities::users;
use crate::errors::AppError;

/// 新建用户所需字段（密码已哈希）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// 管理后台可修改的用户资料
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub role: String,
}

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<users::Model, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<users::Model>, AppError>;

    /// 登录用：用户名不区分大小写
    async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, AppError>;

    /// 精确匹配（区分大小写）
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;

    /// 按创建时间倒序分页
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<users::Model>, AppError>;

    async fn update_profile(&self, id: i32, update: UserUpdate) -> Result<users::Model, AppError>;

    /// 按用户名（精确匹配）覆盖密码哈希、邮箱和角色，返回受影响行数
    async fn update_credentials(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        role: &str,
    ) -> Result<u64, AppError>;

    async fn delete(&self, id: i32) -> Result<(), AppError>;
}
