use log::{LevelFilter, Record};
use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

pub const LOG_FILE: &str = "bot.log";

fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_uppercase().as_str() {
        "ERROR" => Some(LevelFilter::Error),
        "WARN" | "WARNING" => Some(LevelFilter::Warn),
        "INFO" | "ALL" => Some(LevelFilter::Info),
        "DEBUG" => Some(LevelFilter::Debug),
        "TRACE" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn level_from_env(key: &str) -> Option<LevelFilter> {
    env::var(key).ok().as_deref().and_then(parse_level)
}

struct FileSink {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileSink {
    fn open(level: LevelFilter) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }

    fn write(&self, record: &Record, line: &str) {
        if record.level() > self.level {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

fn render(record: &Record) -> String {
    format!(
        "{} [{}] {}: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Installs the global logger. `CONSOLE_LOG_LEVEL` defaults to INFO;
/// `FILE_LOG_LEVEL` is off unless it names a level.
pub fn init_logger() -> std::io::Result<()> {
    let console_level = level_from_env("CONSOLE_LOG_LEVEL").unwrap_or(LevelFilter::Info);
    let file_sink = level_from_env("FILE_LOG_LEVEL").map(FileSink::open).transpose()?;

    let max_level = file_sink
        .as_ref()
        .map_or(console_level, |sink| sink.level.max(console_level));

    pretty_env_logger::formatted_builder()
        .filter(None, max_level)
        .format(move |buf, record| {
            let line = render(record);
            if record.level() <= console_level {
                writeln!(buf, "{}", line)?;
            }
            if let Some(sink) = &file_sink {
                sink.write(record, &line);
            }
            Ok(())
        })
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("error"), Some(LevelFilter::Error));
        assert_eq!(parse_level(" Info "), Some(LevelFilter::Info));
        assert_eq!(parse_level("ALL"), Some(LevelFilter::Info));
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("OFF"), None);
        assert_eq!(parse_level("verbose"), None);
    }
}
