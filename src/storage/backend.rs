use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::sync::Arc;

use super::entities::{prelude::*, *};
use super::repository::*;
use crate::errors::AppError;

/// SeaORM 存储后端
pub struct SeaOrmBackend {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmBackend {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmBackend {
    async fn create(&self, user: NewUser) -> Result<users::Model, AppError> {
        let now = Utc::now().naive_utc();
        let model = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(self.db.as_ref()).await?;
        Ok(result)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<users::Model>, AppError> {
        let user = Users::find_by_id(id).one(self.db.as_ref()).await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, AppError> {
        let user = Users::find()
            .filter(Expr::cust_with_values(
                "LOWER(username) = ?",
                [username.to_lowercase()],
            ))
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<users::Model>, AppError> {
        let users = Users::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;
        Ok(users)
    }

    async fn update_profile(&self, id: i32, update: UserUpdate) -> Result<users::Model, AppError> {
        let user = Users::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: users::ActiveModel = user.into();
        active.username = Set(update.username);
        active.email = Set(update.email);
        active.role = Set(update.role);
        active.updated_at = Set(Utc::now().naive_utc());

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    async fn update_credentials(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        role: &str,
    ) -> Result<u64, AppError> {
        let result = Users::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::Email, Expr::value(email))
            .col_expr(users::Column::Role, Expr::value(role))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(users::Column::Username.eq(username))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let result = Users::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
