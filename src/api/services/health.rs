use actix_web::{HttpResponse, http::StatusCode, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health/ready
pub async fn readiness(db: web::Data<Arc<DatabaseConnection>>) -> HttpResponse {
    let (status_code, status, database) = match db.ping().await {
        Ok(()) => (StatusCode::OK, "ready", "connected"),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "not_ready", "disconnected")
        }
    };

    HttpResponse::build(status_code).json(serde_json::json!({
        "status": status,
        "database": database,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use sea_orm::Database;

    #[actix_web::test]
    async fn test_health_check() {
        let app =
            test::init_service(App::new().route("/health", web::get().to(health_check))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_readiness_with_live_database() {
        let db = Arc::new(Database::connect("sqlite::memory:").await.unwrap());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .route("/health/ready", web::get().to(readiness)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
