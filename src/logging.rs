//! 彩色日志，挂在 `log` 门面上。级别由 `MINIFS_LOG` 环境变量决定。

use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

pub const LOG_ENV: &str = "MINIFS_LOG";

struct MiniFsLogger;

static LOGGER: MiniFsLogger = MiniFsLogger;

impl Log for MiniFsLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = format!("{:>5}", record.level());
        let level = match record.level() {
            Level::Error => level.red().bold(),
            Level::Warn => level.bright_yellow(),
            Level::Info => level.blue(),
            Level::Debug => level.green(),
            Level::Trace => level.bright_black(),
        };
        let stamp = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        eprintln!(
            "{} [{}] {}: {}",
            stamp.bright_black(),
            level,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// 解析级别名，大小写不敏感；无法识别时返回 None
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// 安装全局 logger。重复调用时保留第一次的设置。
pub fn init() {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
