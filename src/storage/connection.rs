use migration::{DirectorySource, MigrationOutcome, MigrationReport, Migrator, catalog};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::errors::AppError;

/// 数据库类型，由连接串前缀决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Postgres,
    MySql,
}

impl DatabaseKind {
    pub fn detect(url: &str) -> Option<Self> {
        if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("mysql://") {
            Some(Self::MySql)
        } else {
            None
        }
    }
}

/// 连接 SQLite（自动建库，WAL 模式）
async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opt)
        .await
        .map_err(|e| AppError::Internal(format!("无法连接到 SQLite 数据库: {}", e)))?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 PostgreSQL / MySQL 连接池
async fn connect_pooled(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Ok(Database::connect(opt).await?)
}

/// 按连接串类型建立数据库连接
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    match DatabaseKind::detect(&config.url) {
        Some(DatabaseKind::Sqlite) => {
            tracing::info!("使用 SQLite 数据库");
            connect_sqlite(&config.url).await
        }
        Some(DatabaseKind::Postgres) => {
            tracing::info!("使用 PostgreSQL 数据库");
            connect_pooled(config).await
        }
        Some(DatabaseKind::MySql) => {
            tracing::info!("使用 MySQL 数据库");
            connect_pooled(config).await
        }
        None => Err(AppError::Config(format!(
            "不支持的数据库类型: {}",
            config.url
        ))),
    }
}

/// 从脚本目录应用内置迁移列表
pub async fn run_migrations(
    db: &DatabaseConnection,
    migration_dir: impl AsRef<Path>,
) -> Result<MigrationReport, AppError> {
    let migration_dir = migration_dir.as_ref();
    tracing::info!("Running migrations from {}", migration_dir.display());

    let migrator = Migrator::new(DirectorySource::new(migration_dir), catalog());
    let report = migrator.apply_all(db).await?;

    if report.count(MigrationOutcome::ConflictRecovered) > 0 {
        tracing::warn!(
            "Some migrations were marked as applied after a conflict, check the schema manually"
        );
    }
    tracing::info!("✓ Database migrations completed");
    Ok(report)
}
