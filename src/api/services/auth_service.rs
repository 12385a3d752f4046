use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::AppError;
use crate::security::{Claims, JwtManager, PasswordManager};
use crate::storage::entities::users;
use crate::storage::{SeaOrmBackend, UserRepository};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<users::Model> for UserSummary {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserSummary,
}

/// POST /api/auth/login
pub async fn login(
    req: web::Json<LoginRequest>,
    storage: web::Data<Arc<SeaOrmBackend>>,
    jwt_manager: web::Data<Arc<JwtManager>>,
) -> Result<HttpResponse, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".into(),
        ));
    }

    // 用户名不区分大小写
    let user = storage
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !PasswordManager::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!("Failed login attempt for user: {}", user.username);
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt_manager.generate_token(user.id, &user.username, &user.role)?;

    tracing::info!("User logged in: {} (id: {})", user.username, user.id);

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/refresh
/// 为当前令牌对应的用户签发新令牌，用户已被删除时拒绝
pub async fn refresh(
    claims: web::ReqData<Claims>,
    storage: web::Data<Arc<SeaOrmBackend>>,
    jwt_manager: web::Data<Arc<JwtManager>>,
) -> Result<HttpResponse, AppError> {
    let user = storage
        .find_by_id(claims.user_id()?)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = jwt_manager.generate_token(user.id, &user.username, &user.role)?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        user: user.into(),
    }))
}
