//! Logger shared by the unit tests.
//!
//! Records go to `env_logger` in test mode and are also kept in memory so
//! tests can check what the solvers report.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, OnceLock};

struct CapturingLogger {
    inner: env_logger::Logger,
    lines: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(record.args().to_string());
        }
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CapturingLogger> = OnceLock::new();

pub(crate) fn init_logger() {
    let logger = LOGGER.get_or_init(|| CapturingLogger {
        inner: env_logger::Builder::from_default_env().is_test(true).build(),
        lines: Mutex::new(Vec::new()),
    });
    // fails once a logger is installed, which is the case after the first call
    let _ = log::set_logger(logger);
    log::set_max_level(LevelFilter::Debug);
}

/// Whether any message logged so far, by any test, satisfies `predicate`.
pub(crate) fn logged(predicate: impl Fn(&str) -> bool) -> bool {
    LOGGER
        .get()
        .and_then(|logger| logger.lines.lock().ok())
        .map(|lines| lines.iter().any(|line| predicate(line.as_str())))
        .unwrap_or(false)
}
