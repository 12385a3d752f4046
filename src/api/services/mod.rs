pub mod auth_service;
pub mod health;
pub mod user_service;

// 认证服务
pub use auth_service::{login, refresh};

// 健康检查
pub use health::{health_check, readiness};

// 管理员用户管理服务
pub use user_service::{
    create_user as admin_create_user, delete_user as admin_delete_user,
    list_users as admin_list_users, update_user as admin_update_user,
};
