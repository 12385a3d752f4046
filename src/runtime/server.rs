use actix_web::{App, HttpServer, middleware, web};

use crate::api::{middleware as app_middleware, services};
use crate::runtime::startup::StartupContext;

pub async fn run_server(ctx: StartupContext) -> std::io::Result<()> {
    let bind_addr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port);

    tracing::info!("Starting HTTP server on {}", bind_addr);

    let db = ctx.db.clone();
    let storage = ctx.storage.clone();
    let jwt_manager = ctx.jwt_manager.clone();

    HttpServer::new(move || {
        App::new()
            // 共享状态
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(jwt_manager.clone()))
            // 中间件
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::DefaultHeaders::new().add(("X-Version", env!("CARGO_PKG_VERSION"))))
            // 健康检查端点（无需认证）
            .service(
                web::scope("/health")
                    .route("", web::get().to(services::health_check))
                    .route("/ready", web::get().to(services::readiness)),
            )
            // 认证 API
            .service(
                web::scope("/api/auth")
                    .route("/login", web::post().to(services::login))
                    .service(
                        web::resource("/refresh")
                            .wrap(app_middleware::JwtAuth::new(jwt_manager.clone()))
                            .route(web::post().to(services::refresh)),
                    ),
            )
            // 管理员 API（需要管理员权限）
            .service(
                web::scope("/api/admin")
                    .wrap(app_middleware::JwtAuth::admin_only(jwt_manager.clone()))
                    .route("/users", web::get().to(services::admin_list_users))
                    .route("/users", web::post().to(services::admin_create_user))
                    .route("/users/{id}", web::put().to(services::admin_update_user))
                    .route("/users/{id}", web::delete().to(services::admin_delete_user)),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
