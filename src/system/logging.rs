use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// 初始化日志系统
///
/// 最低日志级别在此处由配置一次性确定，之后不再修改。
/// 配置了 `log.file` 时额外写入文件，返回的 guard 必须存活到进程退出。
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter = build_filter(&config.level);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(console_layer(&config.format));

    let guard = config.file.as_deref().map(|file| {
        let (layer, guard) = file_layer(file, config.enable_rotation);
        layers.push(layer);
        guard
    });

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    tracing::info!("Logging initialized with level: {}", config.level);
    guard
}

/// 配置值无法解析时退回到 info
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn console_layer(format: &str) -> BoxedLayer {
    match format {
        "json" => fmt::layer().json().boxed(),
        "compact" => fmt::layer().compact().boxed(),
        _ => fmt::layer().pretty().boxed(),
    }
}

fn file_layer(path: &str, enable_rotation: bool) -> (BoxedLayer, WorkerGuard) {
    let path = std::path::Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "storefront-cms.log".to_string());

    let rotation = if enable_rotation {
        Rotation::DAILY
    } else {
        Rotation::NEVER
    };
    let appender = RollingFileAppender::new(rotation, dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
    (layer, guard)
}
