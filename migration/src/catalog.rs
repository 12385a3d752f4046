use crate::script::MigrationScript;

/// 按应用顺序排列的迁移文件
const MIGRATION_FILES: &[&str] = &[
    "001_init_schema.sql",
    "002_add_pgvector.sql",
    "003_add_blog_categories.sql",
    "004_add_video_demos.sql",
    "005_add_social_media_links.sql",
];

/// 服务已知的全部迁移，新增迁移只能追加到末尾
pub fn catalog() -> Vec<MigrationScript> {
    MIGRATION_FILES
        .iter()
        .map(|name| MigrationScript::new(*name))
        .collect()
}
