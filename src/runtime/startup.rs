use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::security::{JwtManager, PasswordManager};
use crate::storage::{SeaOrmBackend, connect, ensure_admin, run_migrations};
use crate::system::init_logging;

/// 服务器启动上下文
pub struct StartupContext {
    pub db: Arc<DatabaseConnection>,
    pub storage: Arc<SeaOrmBackend>,
    pub jwt_manager: Arc<JwtManager>,
    pub config: AppConfig,
    _log_guard: Option<WorkerGuard>,
}

/// 初始化服务器
///
/// 迁移失败直接返回错误；管理员账号初始化失败只记录警告。
pub async fn prepare_server(config: AppConfig) -> Result<StartupContext, AppError> {
    // 1. 初始化 Rust-TLS
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| AppError::Internal("Failed to install crypto provider".into()))?;

    // 2. 初始化日志
    let log_guard = init_logging(&config.log);
    tracing::info!("storefront-cms v{} starting...", env!("CARGO_PKG_VERSION"));

    // 3. 验证配置
    config.validate()?;

    // 4. 初始化数据库
    let db = Arc::new(connect(&config.database).await?);
    tracing::info!("Database connected");

    // 5. 运行数据库迁移
    run_migrations(&db, &config.database.migration_dir)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;

    // 6. 初始化管理员账号
    let storage = Arc::new(SeaOrmBackend::new(db.clone()));
    if config.admin.force_update && config.server.is_production() {
        tracing::warn!("FORCE_UPDATE_ADMIN is enabled in production, admin password will be reset");
    }
    match ensure_admin(
        storage.as_ref(),
        &config.admin,
        config.admin.force_update,
        PasswordManager::hash_password,
    )
    .await
    {
        Ok(outcome) => tracing::debug!("Admin seed outcome: {:?}", outcome),
        Err(e) => tracing::warn!("Failed to ensure admin user: {}", e),
    }

    // 7. 初始化 JWT 管理器
    let jwt_manager = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.access_token_expire,
    ));
    tracing::info!("JWT manager initialized");

    tracing::info!("Server initialization complete");

    Ok(StartupContext {
        db,
        storage,
        jwt_manager,
        config,
        _log_guard: log_guard,
    })
}
