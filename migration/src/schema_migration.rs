//! `schema_migrations` 跟踪表

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue::Set, ConnectionTrait, DatabaseConnection, QueryOrder};
use sea_orm_migration::prelude::{
    ColumnDef as SchemaColumn, DeriveIden, Index, SchemaManager, Table,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "schema_migrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub version: String,
    pub applied_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(DeriveIden)]
enum SchemaMigrations {
    Table,
    Version,
    AppliedAt,
}

/// 创建跟踪表及其索引（IF NOT EXISTS）
pub(crate) async fn ensure_table(db: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(db);

    manager
        .create_table(
            Table::create()
                .table(SchemaMigrations::Table)
                .if_not_exists()
                .col(
                    SchemaColumn::new(SchemaMigrations::Version)
                        .string_len(255)
                        .not_null()
                        .primary_key(),
                )
                .col(
                    SchemaColumn::new(SchemaMigrations::AppliedAt)
                        .timestamp()
                        .not_null()
                        .default(Expr::current_timestamp()),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name("idx_schema_migrations_version")
                .table(SchemaMigrations::Table)
                .col(SchemaMigrations::Version)
                .to_owned(),
        )
        .await
}

pub(crate) async fn is_applied(db: &DatabaseConnection, version: &str) -> Result<bool, DbErr> {
    let record = Entity::find_by_id(version.to_owned()).one(db).await?;
    Ok(record.is_some())
}

/// 写入版本记录，已存在时不做任何事
///
/// `db` 既可以是事务也可以是自动提交的连接。
pub(crate) async fn mark_applied<C>(db: &C, version: &str) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let record = ActiveModel {
        version: Set(version.to_owned()),
        ..Default::default()
    };

    Entity::insert(record)
        .on_conflict(OnConflict::column(Column::Version).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// 按版本号排序列出已应用的迁移
pub async fn applied(db: &DatabaseConnection) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Version).all(db).await
}
