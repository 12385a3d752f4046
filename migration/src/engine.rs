//! 迁移执行器
//!
//! 日志经由当前 tracing dispatcher 输出；需要隔离时用
//! `tracing::subscriber::with_default` 换入局部 subscriber 即可。

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::conflict::{ConflictPolicy, MessageHeuristic};
use crate::error::{MigrationError, Phase};
use crate::schema_migration;
use crate::script::{MigrationScript, ScriptSource};

/// 单个迁移脚本的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// 跟踪表中已有记录，未执行
    Skipped,
    /// 脚本与版本记录在同一事务中提交
    Applied,
    /// 执行失败但目标对象已存在，单独写入了版本记录
    ConflictRecovered,
}

/// 一次 `apply_all` 的执行报告，按脚本顺序排列
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub entries: Vec<(String, MigrationOutcome)>,
}

impl MigrationReport {
    pub fn count(&self, outcome: MigrationOutcome) -> usize {
        self.entries.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn outcome(&self, version: &str) -> Option<MigrationOutcome> {
        self.entries
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, o)| *o)
    }
}

/// SQL 脚本迁移引擎
///
/// 按固定顺序逐个应用脚本，每个脚本独立一个事务。
pub struct Migrator<S> {
    source: S,
    scripts: Vec<MigrationScript>,
    conflict_policy: Box<dyn ConflictPolicy>,
}

impl<S: ScriptSource> Migrator<S> {
    pub fn new(source: S, scripts: Vec<MigrationScript>) -> Self {
        Self {
            source,
            scripts,
            conflict_policy: Box::new(MessageHeuristic),
        }
    }

    /// 替换默认的冲突判定策略
    pub fn with_conflict_policy(mut self, policy: impl ConflictPolicy + 'static) -> Self {
        self.conflict_policy = Box::new(policy);
        self
    }

    pub async fn ensure_migrations_table(
        &self,
        db: &DatabaseConnection,
    ) -> Result<(), MigrationError> {
        schema_migration::ensure_table(db)
            .await
            .map_err(MigrationError::TrackingTable)
    }

    /// 创建跟踪表并按顺序应用所有未应用的脚本
    ///
    /// 遇到第一个无法恢复的错误立即返回，之前已提交的脚本保持已记录状态。
    pub async fn apply_all(
        &self,
        db: &DatabaseConnection,
    ) -> Result<MigrationReport, MigrationError> {
        self.ensure_migrations_table(db).await?;

        let mut report = MigrationReport::default();
        for script in &self.scripts {
            let outcome = self.apply_one(db, script).await?;
            report.entries.push((script.version().to_string(), outcome));
        }

        tracing::info!(
            applied = report.count(MigrationOutcome::Applied),
            recovered = report.count(MigrationOutcome::ConflictRecovered),
            skipped = report.count(MigrationOutcome::Skipped),
            "Database migrations finished"
        );
        Ok(report)
    }

    #[tracing::instrument(skip_all, fields(migration = %script.name()))]
    async fn apply_one(
        &self,
        db: &DatabaseConnection,
        script: &MigrationScript,
    ) -> Result<MigrationOutcome, MigrationError> {
        let version = script.version();

        let applied = schema_migration::is_applied(db, version)
            .await
            .map_err(|e| MigrationError::database(version, Phase::CheckStatus, e))?;
        if applied {
            tracing::info!("Migration already applied: {}", script.name());
            return Ok(MigrationOutcome::Skipped);
        }

        let body = self
            .source
            .load(script)
            .map_err(|source| MigrationError::Load {
                version: version.to_string(),
                name: script.name().to_string(),
                source,
            })?;

        tracing::info!("Running migration: {}", script.name());

        let txn = db
            .begin()
            .await
            .map_err(|e| MigrationError::database(version, Phase::Begin, e))?;

        let executed = txn.execute_unprepared(&body).await;
        if let Err(exec_err) = executed {
            if let Err(e) = txn.rollback().await {
                tracing::warn!("Rollback after failed migration {} failed: {}", version, e);
            }

            if !self.conflict_policy.is_conflict(&exec_err) {
                tracing::error!("Failed to execute migration {}: {}", script.name(), exec_err);
                return Err(MigrationError::database(version, Phase::Execute, exec_err));
            }

            tracing::warn!(
                "Migration {} has objects that already exist, marking as applied",
                script.name()
            );
            // 事务已回滚，这里使用自动提交的连接单独写入
            schema_migration::mark_applied(db, version)
                .await
                .map_err(|e| MigrationError::database(version, Phase::MarkConflict, e))?;
            return Ok(MigrationOutcome::ConflictRecovered);
        }

        let recorded = schema_migration::mark_applied(&txn, version).await;
        if let Err(record_err) = recorded {
            if let Err(e) = txn.rollback().await {
                tracing::warn!("Rollback after failed record insert {} failed: {}", version, e);
            }
            return Err(MigrationError::database(version, Phase::Record, record_err));
        }

        txn.commit()
            .await
            .map_err(|e| MigrationError::database(version, Phase::Commit, e))?;

        tracing::info!("Migration completed successfully: {}", script.name());
        Ok(MigrationOutcome::Applied)
    }
}
