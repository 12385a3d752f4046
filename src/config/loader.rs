use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::AppConfig;
use crate::errors::AppError;

impl AppConfig {
    /// 从文件加载配置,支持环境变量覆盖
    ///
    /// # 参数
    /// * `config_path` - 可选的配置文件路径
    ///   - `Some(path)`: 使用指定文件（不存在则创建）
    ///   - `None`: 使用默认 "config.toml"（不存在则使用内存默认值）
    pub fn load(config_path: Option<&str>) -> Self {
        let mut config = Self::load_from_file(config_path);
        config.override_with(|key| env::var(key).ok());
        config
    }

    /// 从 TOML 文件加载配置
    ///
    /// 此时日志系统尚未初始化，只能输出到 stderr。
    fn load_from_file(config_path: Option<&str>) -> Self {
        let path = config_path.unwrap_or("config.toml");

        if !Path::new(path).exists() {
            if config_path.is_some() {
                eprintln!("[WARN] 配置文件不存在: {}, 正在创建默认配置文件", path);
                if let Err(e) = Self::default().save_to_file(path) {
                    eprintln!("[ERROR] 创建配置文件失败 {}: {}", path, e);
                }
            } else {
                eprintln!("[WARN] 未找到配置文件: {}, 使用内存默认配置", path);
                eprintln!("[HINT] 使用 -c/--config 指定自定义配置文件");
            }
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                eprintln!("[INFO] 配置已从文件加载: {}", path);
                config
            }
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                eprintln!("[WARN] 使用内存默认配置");
                Self::default()
            }
        }
    }

    /// 读取并解析指定 TOML 文件
    pub fn from_file(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {}: {}", path, e)))
    }

    /// 保存当前配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 按变量名返回取值，进程环境下即 `env::var`。
    pub fn override_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // 服务器配置
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            parse_into(&port, "SERVER_PORT", &mut self.server.port);
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.server.environment = environment;
        }

        // 数据库配置
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(n) = lookup("DATABASE_MAX_CONNECTIONS") {
            parse_into(&n, "DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        }
        if let Some(n) = lookup("DATABASE_MIN_CONNECTIONS") {
            parse_into(&n, "DATABASE_MIN_CONNECTIONS", &mut self.database.min_connections);
        }
        if let Some(dir) = lookup("MIGRATION_DIR").filter(|d| !d.is_empty()) {
            self.database.migration_dir = dir;
        }

        // 认证配置
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(expire) = lookup("ACCESS_TOKEN_EXPIRE") {
            parse_into(&expire, "ACCESS_TOKEN_EXPIRE", &mut self.auth.access_token_expire);
        }

        // 管理员账号
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Some(force) = lookup("FORCE_UPDATE_ADMIN") {
            self.admin.force_update = force == "true";
        }

        // 日志配置
        if let Some(level) = lookup("LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.log.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = format;
        }
        if let Some(file) = lookup("LOG_FILE") {
            self.log.file = Some(file);
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT secret must be at least 32 characters".into(),
            ));
        }

        if self.auth.access_token_expire <= 0 {
            return Err(AppError::Config(
                "Access token expire time must be positive".into(),
            ));
        }

        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            return Err(AppError::Config(
                "Admin username and password must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn parse_into<T: FromStr>(raw: &str, key: &str, target: &mut T) {
    match raw.parse() {
        Ok(value) => *target = value,
        Err(_) => eprintln!("[ERROR] 无效的 {}: {}", key, raw),
    }
}
