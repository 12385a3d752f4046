use std::fmt;
use std::io;

use sea_orm::DbErr;
use thiserror::Error;

/// 迁移失败所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CheckStatus,
    Load,
    Begin,
    Execute,
    Record,
    Commit,
    MarkConflict,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::CheckStatus => "check migration status",
            Phase::Load => "read migration file",
            Phase::Begin => "begin transaction",
            Phase::Execute => "run migration",
            Phase::Record => "mark migration as applied",
            Phase::Commit => "commit migration transaction",
            Phase::MarkConflict => "mark conflicting migration as applied",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to create migrations table: {0}")]
    TrackingTable(#[source] DbErr),

    #[error("failed to read migration file {name}: {source}")]
    Load {
        version: String,
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to {phase} for {version}: {source}")]
    Database {
        version: String,
        phase: Phase,
        #[source]
        source: DbErr,
    },
}

impl MigrationError {
    pub(crate) fn database(version: &str, phase: Phase, source: DbErr) -> Self {
        MigrationError::Database {
            version: version.to_string(),
            phase,
            source,
        }
    }

    /// 失败的迁移版本（建表失败时为 None）
    pub fn version(&self) -> Option<&str> {
        match self {
            MigrationError::TrackingTable(_) => None,
            MigrationError::Load { version, .. } => Some(version),
            MigrationError::Database { version, .. } => Some(version),
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            MigrationError::TrackingTable(_) => None,
            MigrationError::Load { .. } => Some(Phase::Load),
            MigrationError::Database { phase, .. } => Some(*phase),
        }
    }
}
