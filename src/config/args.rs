//! 命令行参数解析

/// 从命令行参数中取出配置文件路径
///
/// 识别 `-c path`、`--config path`、`-c=path`、`--config=path`，
/// 索引 0 的程序名会被跳过，多次指定时以第一个为准。
///
/// ```
/// use storefront_cms::config::args::parse_config_path;
///
/// let args = vec!["server".to_string(), "-c".to_string(), "cms.toml".to_string()];
/// assert_eq!(parse_config_path(&args), Some("cms.toml".to_string()));
/// ```
pub fn parse_config_path(args: &[String]) -> Option<String> {
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => return iter.next().cloned(),
            other => {
                let inline = other
                    .strip_prefix("--config=")
                    .or_else(|| other.strip_prefix("-c="));
                if let Some(path) = inline {
                    return Some(path.to_string());
                }
            }
        }
    }

    None
}
