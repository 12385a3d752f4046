pub mod args;
mod loader;
mod structs;

pub use structs::{AdminConfig, AppConfig, AuthConfig, DatabaseConfig, LogConfig, ServerConfig};
