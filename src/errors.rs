use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use migration::MigrationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // 存储层
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    // 认证与授权
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // 通用
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// 每个错误变体的固定元信息
struct Descriptor {
    code: &'static str,
    title: &'static str,
    status: StatusCode,
    /// 响应体 `error` 字段
    slug: &'static str,
}

const fn describe(
    code: &'static str,
    title: &'static str,
    status: StatusCode,
    slug: &'static str,
) -> Descriptor {
    Descriptor {
        code,
        title,
        status,
        slug,
    }
}

impl AppError {
    fn descriptor(&self) -> Descriptor {
        use StatusCode as S;
        match self {
            AppError::Database(_) => describe(
                "E001",
                "Database Error",
                S::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
            AppError::Migration(_) => describe(
                "E002",
                "Migration Error",
                S::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
            AppError::InvalidCredentials => describe(
                "E003",
                "Invalid Credentials",
                S::UNAUTHORIZED,
                "invalid_credentials",
            ),
            AppError::TokenExpired => describe(
                "E004",
                "Token Expired",
                S::UNAUTHORIZED,
                "token_expired",
            ),
            AppError::InvalidToken => describe(
                "E005",
                "Invalid Token",
                S::UNAUTHORIZED,
                "invalid_token",
            ),
            AppError::Unauthorized => describe(
                "E006",
                "Unauthorized",
                S::UNAUTHORIZED,
                "unauthorized",
            ),
            AppError::Forbidden(_) => describe("E007", "Forbidden", S::FORBIDDEN, "forbidden"),
            AppError::NotFound => describe("E008", "Not Found", S::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => describe(
                "E009",
                "Bad Request",
                S::BAD_REQUEST,
                "bad_request",
            ),
            AppError::Internal(_) => describe(
                "E010",
                "Internal Server Error",
                S::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
            AppError::Config(_) => describe(
                "E011",
                "Configuration Error",
                S::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        }
    }

    /// 错误编号，如 `E001`
    pub fn code(&self) -> &'static str {
        self.descriptor().code
    }

    pub fn error_type(&self) -> &'static str {
        self.descriptor().title
    }

    /// 终端输出（启动失败时使用）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.to_string().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("[{}] {}: {}", self.code(), self.error_type(), self)
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.descriptor().status
    }

    fn error_response(&self) -> HttpResponse {
        let Descriptor { status, slug, .. } = self.descriptor();

        // 5xx 只记录日志，不把内部细节返回给客户端
        let message = if status.is_server_error() {
            tracing::error!("{}", self.format_simple());
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: slug,
            message,
        })
    }
}
