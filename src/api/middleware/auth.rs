use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::errors::AppError;
use crate::security::{Claims, JwtManager};

/// JWT 认证中间件
///
/// 校验 `Authorization: Bearer <token>`，通过后把 [`Claims`] 注入请求扩展。
/// 设置了 `required_role` 时还要求角色一致，否则返回 403。
pub struct JwtAuth {
    jwt_manager: Arc<JwtManager>,
    required_role: Option<&'static str>,
}

impl JwtAuth {
    pub fn new(jwt_manager: Arc<JwtManager>) -> Self {
        Self {
            jwt_manager,
            required_role: None,
        }
    }

    /// 仅允许管理员访问
    pub fn admin_only(jwt_manager: Arc<JwtManager>) -> Self {
        Self {
            jwt_manager,
            required_role: Some("admin"),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            jwt_manager: self.jwt_manager.clone(),
            required_role: self.required_role,
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    jwt_manager: Arc<JwtManager>,
    required_role: Option<&'static str>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = match authorize(&req, &self.jwt_manager, self.required_role) {
            Ok(c) => c,
            Err(e) => return Box::pin(async move { Err(e.into()) }),
        };

        req.extensions_mut().insert(claims);

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

fn authorize(
    req: &ServiceRequest,
    jwt_manager: &JwtManager,
    required_role: Option<&str>,
) -> Result<Claims, AppError> {
    let token = extract_bearer_token(req)?;
    let claims = jwt_manager.verify_token(&token)?;

    if let Some(role) = required_role
        && claims.role != role
    {
        tracing::warn!(
            user = %claims.username,
            role = %claims.role,
            "Access denied: {} role required",
            role
        );
        return Err(AppError::Forbidden(format!("{} role required", role)));
    }

    Ok(claims)
}

/// 从请求中提取 Bearer Token
fn extract_bearer_token(req: &ServiceRequest) -> Result<String, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.username.clone())
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let jwt = Arc::new(JwtManager::new(SECRET, 3600));
        let app = test::init_service(
            App::new().service(
                web::scope("/p")
                    .wrap(JwtAuth::new(jwt))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/p").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_valid_token_injects_claims() {
        let jwt = Arc::new(JwtManager::new(SECRET, 3600));
        let token = jwt.generate_token(7, "alice", "user").unwrap();
        let app = test::init_service(
            App::new().service(
                web::scope("/p")
                    .wrap(JwtAuth::new(jwt))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/p")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"alice");
    }

    #[actix_web::test]
    async fn test_admin_only_rejects_other_roles() {
        let jwt = Arc::new(JwtManager::new(SECRET, 3600));
        let user_token = jwt.generate_token(7, "alice", "user").unwrap();
        let admin_token = jwt.generate_token(1, "admin", "admin").unwrap();
        let app = test::init_service(
            App::new().service(
                web::scope("/p")
                    .wrap(JwtAuth::admin_only(jwt))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/p")
            .insert_header(("Authorization", format!("Bearer {}", user_token)))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/p")
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
