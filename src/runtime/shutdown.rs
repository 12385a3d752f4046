use tokio::signal;
use tracing::warn;

/// 等待 Ctrl+C
pub async fn listen_for_shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        // 保持挂起，退出交给 HTTP 服务器自身的信号处理
        std::future::pending::<()>().await;
    }
    warn!("收到关闭信号，正在停止服务器...");
}
