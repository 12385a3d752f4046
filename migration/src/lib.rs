//! 基于 SQL 脚本的数据库迁移引擎
//!
//! 迁移列表在编译期固定（见 [`catalog`]），脚本内容由 [`ScriptSource`] 加载，
//! 已应用的版本记录在 `schema_migrations` 表中。

mod catalog;
mod conflict;
mod engine;
mod error;
mod script;
pub mod schema_migration;

pub use catalog::catalog;
pub use conflict::{ConflictPolicy, MessageHeuristic};
pub use engine::{MigrationOutcome, MigrationReport, Migrator};
pub use error::{MigrationError, Phase};
pub use script::{DirectorySource, MigrationScript, ScriptSource, StaticSource};
