use std::env;
use storefront_cms::AppError;
use storefront_cms::config::{AppConfig, args};
use storefront_cms::runtime::{listen_for_shutdown, prepare_server, run_server};
use storefront_cms::system::install_panic_hook;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    // 安装 panic hook
    install_panic_hook();

    // 解析命令行参数获取配置文件路径
    let cli_args: Vec<String> = env::args().collect();
    let config_path = args::parse_config_path(&cli_args);

    // 配置文件 + 环境变量
    let config = AppConfig::load(config_path.as_deref());

    let ctx = match prepare_server(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return Err(e);
        }
    };

    tracing::info!("storefront-cms is ready");

    // 启动 HTTP 服务器和优雅关闭监听
    tokio::select! {
        result = run_server(ctx) => {
            result.map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;
        }
        _ = listen_for_shutdown() => {
            tracing::info!("Server stopped");
        }
    }

    Ok(())
}
