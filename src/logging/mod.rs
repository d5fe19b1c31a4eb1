use std::{fmt::Write as _, thread};

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::logging::rotate::Rotate;

pub mod rotate;

/// 批次寫入的門檻
const BATCH_SIZE: usize = 4096;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Level::Info => "Info",
            Level::Warn => "Warn",
            Level::Error => "Error",
            Level::Debug => "Debug",
        };
        f.write_str(name)
    }
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

/// A named file logger.
///
/// Messages are pushed onto an unbounded channel and written by a dedicated
/// thread, so callers on the async runtime never block on file I/O.
pub struct Logger {
    writer: UnboundedSender<LogMessage>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        let (tx, mut rx) = unbounded_channel::<LogMessage>();
        let pattern = format!("log/%Y-%m-%d-{}.log", log_name);

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut rotate = Rotate::new(pattern);
            let mut batch = String::with_capacity(BATCH_SIZE);
            let mut batch_time = Local::now();

            while let Some(received) = rx.blocking_recv() {
                if batch.is_empty() {
                    batch_time = received.created_at;
                }

                if writeln!(
                    &mut batch,
                    "{} {} {}",
                    received.created_at.format("%F %X%.6f"),
                    received.level,
                    received.msg
                )
                .is_err()
                {
                    continue;
                }

                if rx.is_empty() || batch.len() >= BATCH_SIZE {
                    if let Err(why) = rotate.write_msg(batch_time, batch.as_bytes()) {
                        error_console(format!("Failed to write log file because {:?}", why));
                        info_console(batch.clone());
                    }

                    batch.clear();
                }
            }

            rotate.flush_current();
        });

        Logger { writer: tx }
    }

    pub fn info(&self, log: String) {
        self.send(Level::Info, log);
    }

    pub fn warn(&self, log: String) {
        self.send(Level::Warn, log);
    }

    pub fn error(&self, log: String) {
        self.send(Level::Error, log);
    }

    pub fn debug(&self, log: String) {
        self.send(Level::Debug, log);
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }
}

pub fn info_file_async<S: Into<String>>(log: S) {
    LOGGER.info(log.into());
}

pub fn warn_file_async<S: Into<String>>(log: S) {
    LOGGER.warn(log.into());
}

pub fn error_file_async<S: Into<String>>(log: S) {
    LOGGER.error(log.into());
}

pub fn debug_file_async<S: Into<String>>(log: S) {
    LOGGER.debug(log.into());
}

pub fn info_console<S: AsRef<str>>(log: S) {
    println!(
        "{} {} {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        Level::Info,
        log.as_ref()
    );
}

pub fn error_console<S: AsRef<str>>(log: S) {
    println!(
        "{} {} {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        Level::Error,
        log.as_ref()
    );
}
