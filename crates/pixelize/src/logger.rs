//! Minimal stderr backend for the `log` facade.

use log::{LevelFilter, Log, Metadata, Record};

/// Writes `[LEVEL] [target] message` lines to stderr.
struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_record(record));
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record<'_>) -> String {
    format!("[{}] [{}] {}", record.level(), record.target(), record.args())
}

/// Install the stderr logger. `verbose` lowers the threshold from
/// `Warn` to `Debug`.
///
/// Does nothing if a logger is already installed.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
