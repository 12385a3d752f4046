//! Panic 处理
//!
//! 进程 panic 时打印彩色摘要、写入 tracing，并把完整报告追加到 crash.log。

use chrono::Utc;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{self, PanicHookInfo};

const CRASH_LOG: &str = "crash.log";

/// 安装自定义 panic hook
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let message = panic_message(info);
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        let backtrace = Backtrace::force_capture();

        tracing::error!(%location, "panic: {}", message);

        let report = crash_report(
            &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            &message,
            &location,
            &format!("{:?}", backtrace),
        );
        if let Err(e) = append_crash_log(&report) {
            eprintln!("Failed to write {}: {}", CRASH_LOG, e);
        }

        print_banner(&message, &location);
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn crash_report(timestamp: &str, message: &str, location: &str, backtrace: &str) -> String {
    format!(
        "==========================================\n\
         Crash Report - {timestamp}\n\
         Message: {message}\n\
         Location: {location}\n\
         \n\
         Backtrace:\n\
         {backtrace}\n\
         ==========================================\n"
    )
}

fn append_crash_log(report: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(CRASH_LOG)?;
    file.write_all(report.as_bytes())
}

fn print_banner(message: &str, location: &str) {
    use colored::Colorize;

    let rule = "═══════════════════════════════════════════════════".red().bold();
    eprintln!();
    eprintln!("{}", rule);
    eprintln!("{}", "PANIC".red().bold());
    eprintln!("{}", rule);
    eprintln!("{} {}", "原因:".yellow().bold(), message.white());
    eprintln!("{} {}", "位置:".yellow().bold(), location.white());
    eprintln!("{}", format!("完整堆栈已写入 {}", CRASH_LOG).cyan());
    eprintln!("{}", rule);
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crash_report_contains_fields() {
        let report = crash_report("2026-01-01 00:00:00 UTC", "boom", "src/main.rs:1:1", "<bt>");
        assert!(report.contains("Crash Report - 2026-01-01 00:00:00 UTC"));
        assert!(report.contains("Message: boom"));
        assert!(report.contains("Location: src/main.rs:1:1"));
        assert!(report.contains("<bt>"));
    }
}
