//! 启动时的管理员账号初始化
//!
//! 日志经由当前 tracing dispatcher 输出；需要隔离时用
//! `tracing::subscriber::with_default` 换入局部 subscriber 即可。

use tracing_attributes::instrument;

use super::repository::{NewUser, UserRepository};
use crate::config::AdminConfig;
use crate::errors::AppError;

/// `ensure_admin` 实际执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeedOutcome {
    Created,
    Updated,
    Unchanged,
}

/// 确保管理员账号存在
///
/// | 已存在 | force_update | 动作 |
/// |---|---|---|
/// | 否 | 任意 | 创建 |
/// | 是 | true | 覆盖密码哈希、邮箱、角色 |
/// | 是 | false | 不做任何事 |
///
/// 用户名精确匹配。无论是否写入都会先计算密码哈希。
#[instrument(skip_all, fields(username = %admin.username, force_update = force_update))]
pub async fn ensure_admin<R, H>(
    repo: &R,
    admin: &AdminConfig,
    force_update: bool,
    hash_password: H,
) -> Result<AdminSeedOutcome, AppError>
where
    R: UserRepository + ?Sized,
    H: Fn(&str) -> Result<String, AppError>,
{
    let exists = repo.exists_by_username(&admin.username).await.map_err(|e| {
        tracing::error!("Failed to check admin user existence: {}", e);
        e
    })?;

    let password_hash = hash_password(&admin.password).map_err(|e| {
        tracing::error!("Failed to hash admin password: {}", e);
        e
    })?;

    if exists {
        if !force_update {
            tracing::debug!(
                "Admin user '{}' already exists, skipping creation",
                admin.username
            );
            return Ok(AdminSeedOutcome::Unchanged);
        }

        tracing::info!("Admin user '{}' exists, updating password...", admin.username);
        repo.update_credentials(&admin.username, &password_hash, &admin.email, &admin.role)
            .await?;
        tracing::info!("Admin user '{}' password updated successfully", admin.username);
        return Ok(AdminSeedOutcome::Updated);
    }

    tracing::info!("Creating admin user '{}'...", admin.username);
    repo.create(NewUser {
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash,
        role: admin.role.clone(),
    })
    .await?;
    tracing::info!("Admin user '{}' created successfully", admin.username);

    Ok(AdminSeedOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend_tests::setup_backend;
    use std::cell::Cell;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn admin() -> AdminConfig {
        AdminConfig {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "first-password".to_string(),
            role: "admin".to_string(),
            force_update: false,
        }
    }

    fn fake_hash(password: &str) -> Result<String, AppError> {
        Ok(format!("hash:{}", password))
    }

    #[tokio::test]
    async fn test_creates_missing_admin() {
        let backend = setup_backend().await;

        let outcome = ensure_admin(&backend, &admin(), false, fake_hash).await.unwrap();
        assert_eq!(outcome, AdminSeedOutcome::Created);

        let user = backend.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash:first-password");
        assert_eq!(user.role, "admin");
    }

    #[tokio::test]
    async fn test_force_update_creates_missing_admin() {
        let backend = setup_backend().await;

        let outcome = ensure_admin(&backend, &admin(), true, fake_hash).await.unwrap();
        assert_eq!(outcome, AdminSeedOutcome::Created);

        let user = backend.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash:first-password");
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(user.role, "admin");
        assert_eq!(backend.list(10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_admin_untouched_without_force() {
        let backend = setup_backend().await;
        ensure_admin(&backend, &admin(), false, fake_hash).await.unwrap();

        let mut changed = admin();
        changed.password = "second-password".to_string();
        let calls = Cell::new(0);
        let outcome = ensure_admin(&backend, &changed, false, |p: &str| {
            calls.set(calls.get() + 1);
            fake_hash(p)
        })
        .await
        .unwrap();

        assert_eq!(outcome, AdminSeedOutcome::Unchanged);
        assert_eq!(calls.get(), 1);
        let user = backend.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash:first-password");
    }

    #[tokio::test]
    async fn test_force_update_overwrites_credentials() {
        let backend = setup_backend().await;
        ensure_admin(&backend, &admin(), false, fake_hash).await.unwrap();

        let mut changed = admin();
        changed.password = "second-password".to_string();
        changed.email = "root@example.com".to_string();
        changed.role = "superadmin".to_string();
        let outcome = ensure_admin(&backend, &changed, true, fake_hash).await.unwrap();
        assert_eq!(outcome, AdminSeedOutcome::Updated);

        let user = backend.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash:second-password");
        assert_eq!(user.email, "root@example.com");
        assert_eq!(user.role, "superadmin");
        assert_eq!(backend.list(10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hash_failure_aborts() {
        let backend = setup_backend().await;

        let result = ensure_admin(&backend, &admin(), false, |_: &str| {
            Err(AppError::Internal("hasher unavailable".to_string()))
        })
        .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(!backend.exists_by_username("admin").await.unwrap());
    }

    #[derive(Clone)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_logs_go_to_scoped_subscriber() {
        let backend = setup_backend().await;
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer = Capture(buf.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        {
            let _guard = tracing::subscriber::set_default(subscriber);
            ensure_admin(&backend, &admin(), false, fake_hash).await.unwrap();
        }

        let output = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Admin user 'admin' created successfully"));
    }
}
