pub mod api;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod security;
pub mod storage;
pub mod system;

// 重新导出常用类型
pub use config::AppConfig;
pub use errors::AppError;
