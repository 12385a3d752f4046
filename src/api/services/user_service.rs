use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::AppError;
use crate::security::{Claims, PasswordManager};
use crate::storage::{NewUser, SeaOrmBackend, UserRepository, UserUpdate};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 100;
const DEFAULT_ROLE: &str = "user";

// ============= 请求结构体 =============

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListQuery {
    /// limit 缺省 50，且不超过 100
    fn window(&self) -> (u64, u64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (limit, self.offset.unwrap_or(0))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub role: String,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

// ============= 处理函数 =============

/// GET /api/admin/users
pub async fn list_users(
    query: web::Query<ListQuery>,
    storage: web::Data<Arc<SeaOrmBackend>>,
) -> Result<HttpResponse, AppError> {
    let (limit, offset) = query.window();
    let users = storage.list(limit, offset).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/admin/users
pub async fn create_user(
    req: web::Json<CreateUserRequest>,
    storage: web::Data<Arc<SeaOrmBackend>>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    require("username", &req.username)?;
    require("email", &req.email)?;
    require("password", &req.password)?;

    if storage.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::BadRequest("Username already exists".into()));
    }

    let password_hash = PasswordManager::hash_password(&req.password)?;
    let user = storage
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        })
        .await?;

    tracing::info!("User created: {} (id: {})", user.username, user.id);

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    path: web::Path<i32>,
    req: web::Json<UpdateUserRequest>,
    storage: web::Data<Arc<SeaOrmBackend>>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let req = req.into_inner();
    require("username", &req.username)?;
    require("email", &req.email)?;
    require("role", &req.role)?;

    let user = storage
        .update_profile(
            user_id,
            UserUpdate {
                username: req.username,
                email: req.email,
                role: req.role,
            },
        )
        .await?;

    tracing::info!("User updated: {} (id: {})", user.username, user.id);

    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    path: web::Path<i32>,
    claims: web::ReqData<Claims>,
    storage: web::Data<Arc<SeaOrmBackend>>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if claims.user_id()? == user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }

    storage.delete(user_id).await?;

    tracing::info!("User deleted: id {} by {}", user_id, claims.username);

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::JwtAuth;
    use crate::security::JwtManager;
    use crate::storage::backend_tests::setup_backend;
    use actix_web::{App, http::StatusCode, test as actix_test};

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    #[test]
    fn test_list_window() {
        let q = ListQuery {
            limit: None,
            offset: None,
        };
        assert_eq!(q.window(), (50, 0));

        let q = ListQuery {
            limit: Some(500),
            offset: Some(20),
        };
        assert_eq!(q.window(), (100, 20));

        let q = ListQuery {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(q.window(), (1, 0));
    }

    #[actix_web::test]
    async fn test_admin_user_lifecycle() {
        let storage = Arc::new(setup_backend().await);
        let jwt = Arc::new(JwtManager::new(SECRET, 3600));
        let token = jwt.generate_token(999, "root", "admin").unwrap();
        let auth = ("Authorization", format!("Bearer {}", token));

        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(storage.clone())).service(
                web::scope("/api/admin")
                    .wrap(JwtAuth::admin_only(jwt.clone()))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::post().to(create_user))
                    .route("/users/{id}", web::put().to(update_user))
                    .route("/users/{id}", web::delete().to(delete_user)),
            ),
        )
        .await;

        // 创建，角色缺省为 user
        let req = actix_test::TestRequest::post()
            .uri("/api/admin/users")
            .insert_header(auth.clone())
            .set_json(serde_json::json!({
                "username": "editor",
                "email": "editor@example.com",
                "password": "Editor@123",
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(created["role"], "user");
        assert!(created.get("password_hash").is_none());
        let id = created["id"].as_i64().unwrap();

        // 重名
        let req = actix_test::TestRequest::post()
            .uri("/api/admin/users")
            .insert_header(auth.clone())
            .set_json(serde_json::json!({
                "username": "EDITOR",
                "email": "other@example.com",
                "password": "Editor@123",
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 更新
        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/admin/users/{}", id))
            .insert_header(auth.clone())
            .set_json(serde_json::json!({
                "username": "editor",
                "email": "editor@example.com",
                "role": "editor",
            }))
            .to_request();
        let updated: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["role"], "editor");

        // 列表
        let req = actix_test::TestRequest::get()
            .uri("/api/admin/users?limit=10")
            .insert_header(auth.clone())
            .to_request();
        let listed: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().map(|a| a.len()), Some(1));

        // 删除
        let req = actix_test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{}", id))
            .insert_header(auth.clone())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = actix_test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{}", id))
            .insert_header(auth)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_admin_cannot_delete_self() {
        let storage = Arc::new(setup_backend().await);
        let jwt = Arc::new(JwtManager::new(SECRET, 3600));
        let token = jwt.generate_token(1, "root", "admin").unwrap();

        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(storage)).service(
                web::scope("/api/admin")
                    .wrap(JwtAuth::admin_only(jwt))
                    .route("/users/{id}", web::delete().to(delete_user)),
            ),
        )
        .await;

        let req = actix_test::TestRequest::delete()
            .uri("/api/admin/users/1")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
