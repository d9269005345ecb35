use chrono::Utc;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }
    fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }
    fn warn(&self, msg: &str) {
        self.log(LogLevel::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }
}

pub struct StdoutLogger {
    min_level: LogLevel,
    captured: Option<Mutex<Vec<String>>>,
}

impl StdoutLogger {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            captured: None,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Keep every line written, at any level, so it can be searched with `contains`.
    pub fn with_capture(mut self) -> Self {
        self.captured = Some(Mutex::new(Vec::new()));
        self
    }

    pub fn contains(&self, needle: &str) -> bool {
        let Some(captured) = &self.captured else {
            return false;
        };
        captured.lock().iter().any(|line| line.contains(needle))
    }
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for StdoutLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let msg = format!("[{}] {:?}: {}", timestamp, level, message);

        if level >= self.min_level {
            println!("{}", msg);
        }

        if let Some(captured) = &self.captured {
            captured.lock().push(msg);
        }
    }
}
