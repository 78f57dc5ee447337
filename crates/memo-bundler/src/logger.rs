//! Leveled, prefixed build logger.
//!
//! Every build target gets its own [`Logger`]. The default implementation,
//! [`FriendlyLogger`], filters records by [`LogLevel`], prefixes them with the
//! target name and remembers warnings so `warn_once` can drop repeats for the
//! lifetime of that logger instance.
//!
//! Diagnostics that are not meant for the person running the build go through
//! `tracing` instead.
//!
//! # Example
//!
//! ```
//! use memo_bundler::logger::{create_logger, LogLevel};
//!
//! let logger = create_logger(Some("my-lib"), LogLevel::Warn);
//! logger.info("hidden at warn level");
//! logger.warn_once("deprecated option `foo`");
//! logger.warn_once("deprecated option `foo`"); // swallowed
//! ```

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Log level for build output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No output at all
    Silent,
    /// Only errors
    Error,
    /// Errors and warnings
    Warn,
    /// Everything (default)
    #[default]
    Info,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Silent,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
    ];

    /// Numeric weight used for filtering: silent(0) < error(1) < warn(2) < info(3).
    pub fn weight(self) -> u8 {
        match self {
            LogLevel::Silent => 0,
            LogLevel::Error => 1,
            LogLevel::Warn => 2,
            LogLevel::Info => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
        }
    }

    fn from_weight(weight: u8) -> Self {
        match weight {
            0 => LogLevel::Silent,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lenient deserializer for `logLevel` fields in user config.
///
/// Unknown strings (and non-strings) become `None` so normalization can fall
/// back to `info` instead of rejecting the whole file.
pub(crate) fn deserialize_lenient_level<'de, D>(deserializer: D) -> Result<Option<LogLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => normalize_known(&s),
        _ => None,
    })
}

fn normalize_known(raw: &str) -> Option<LogLevel> {
    match raw.parse() {
        Ok(level) => Some(level),
        Err(_) => {
            tracing::debug!("ignoring unknown log level '{}'", raw);
            None
        }
    }
}

/// Map an optional, possibly unknown level name onto one of the four levels.
///
/// ```
/// use memo_bundler::logger::{normalize_log_level, LogLevel};
///
/// assert_eq!(normalize_log_level(None), LogLevel::Info);
/// assert_eq!(normalize_log_level(Some("WARN")), LogLevel::Warn);
/// assert_eq!(normalize_log_level(Some("verbose")), LogLevel::Info);
/// ```
pub fn normalize_log_level(level: Option<&str>) -> LogLevel {
    level.and_then(normalize_known).unwrap_or_default()
}

/// Kind of a single log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Warn,
    Error,
    Success,
}

impl LogKind {
    /// Level a record of this kind needs in order to be shown.
    pub fn threshold(self) -> LogLevel {
        match self {
            LogKind::Info | LogKind::Success => LogLevel::Info,
            LogKind::Warn => LogLevel::Warn,
            LogKind::Error => LogLevel::Error,
        }
    }
}

/// One emitted log line, before colouring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub kind: LogKind,
    pub name: Option<String>,
    pub message: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            LogKind::Info => "[info]",
            LogKind::Warn => "[warn]",
            LogKind::Error => "[error]",
            LogKind::Success => "[success]",
        };
        match &self.name {
            Some(name) => write!(f, "{} [{}] {}", tag, name, self.message),
            None => write!(f, "{} {}", tag, self.message),
        }
    }
}

/// Destination for records that passed the level filter.
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Write a record. Implementations must not panic.
    fn write(&self, record: &LogRecord);
}

/// Coloured terminal output: info and success on stdout, warnings and errors on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl LogSink for TerminalSink {
    fn write(&self, record: &LogRecord) {
        let stream = match record.kind {
            LogKind::Info | LogKind::Success => Stream::Stdout,
            LogKind::Warn | LogKind::Error => Stream::Stderr,
        };
        let prefix = record
            .name
            .as_ref()
            .map(|name| {
                let tag = format!("[{}]", name);
                format!("{} ", tag.if_supports_color(stream, |t| t.cyan()))
            })
            .unwrap_or_default();

        let tag = match record.kind {
            LogKind::Info => "[info]".if_supports_color(stream, |t| t.blue()).to_string(),
            LogKind::Success => "✓ success"
                .if_supports_color(stream, |t| t.green().bold().to_string())
                .to_string(),
            LogKind::Warn => "[warn]".if_supports_color(stream, |t| t.yellow()).to_string(),
            LogKind::Error => "[error]".if_supports_color(stream, |t| t.red()).to_string(),
        };

        // Broken pipes are ignored: a log call never fails the build.
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout(), "{} {}{}", tag, prefix, record.message),
            _ => writeln!(std::io::stderr(), "{} {}{}", tag, prefix, record.message),
        };
    }
}

/// In-memory sink, mostly for tests and for embedding the driver.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages of a single kind, in order.
    pub fn messages(&self, kind: LogKind) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.message.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Build logger handed to every target.
///
/// Implementors provide the two `*_parts` methods; every message is joined
/// with [`format_message`] before it is filtered, deduplicated or written.
pub trait Logger: Send + Sync + fmt::Debug {
    fn level(&self) -> LogLevel;
    fn set_level(&self, level: LogLevel);

    /// Emit a record built from loosely-typed message parts.
    fn log_parts(&self, kind: LogKind, parts: &[Value]);

    /// Like [`Logger::log_parts`] with [`LogKind::Warn`], but identical
    /// formatted text is only shown once.
    fn warn_once_parts(&self, parts: &[Value]);

    fn info(&self, message: &str) {
        self.log_parts(LogKind::Info, &[Value::from(message)]);
    }

    fn warn(&self, message: &str) {
        self.log_parts(LogKind::Warn, &[Value::from(message)]);
    }

    fn warn_once(&self, message: &str) {
        self.warn_once_parts(&[Value::from(message)]);
    }

    fn error(&self, message: &str) {
        self.log_parts(LogKind::Error, &[Value::from(message)]);
    }

    fn success(&self, message: &str) {
        self.log_parts(LogKind::Success, &[Value::from(message)]);
    }
}

/// Default [`Logger`] implementation.
#[derive(Debug)]
pub struct FriendlyLogger {
    name: Option<String>,
    level: AtomicU8,
    warned: Mutex<HashSet<String>>,
    sink: Arc<dyn LogSink>,
}

impl FriendlyLogger {
    pub fn new(name: Option<&str>, level: LogLevel) -> Self {
        Self::with_sink(name, level, Arc::new(TerminalSink))
    }

    pub fn with_sink(name: Option<&str>, level: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            level: AtomicU8::new(level.weight()),
            warned: Mutex::new(HashSet::new()),
            sink,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn output(&self, kind: LogKind, message: String) {
        if self.level().weight() < kind.threshold().weight() {
            return;
        }
        self.sink.write(&LogRecord {
            kind,
            name: self.name.clone(),
            message,
        });
    }
}

impl Logger for FriendlyLogger {
    fn level(&self) -> LogLevel {
        LogLevel::from_weight(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: LogLevel) {
        self.level.store(level.weight(), Ordering::Relaxed);
    }

    fn log_parts(&self, kind: LogKind, parts: &[Value]) {
        let message = format_message(parts);
        if kind == LogKind::Warn {
            self.warned.lock().insert(message.clone());
        }
        self.output(kind, message);
    }

    fn warn_once_parts(&self, parts: &[Value]) {
        let message = format_message(parts);
        // insert() is false when the text was already seen
        if !self.warned.lock().insert(message.clone()) {
            return;
        }
        self.output(LogKind::Warn, message);
    }
}

/// Create a logger writing coloured output to the terminal.
pub fn create_logger(name: Option<&str>, level: LogLevel) -> Arc<dyn Logger> {
    Arc::new(FriendlyLogger::new(name, level))
}

/// Join loosely-typed message parts into a single line.
///
/// Arrays are flattened one level, `null` and empty strings are dropped,
/// strings are kept verbatim and everything else is JSON-encoded.
///
/// ```
/// use memo_bundler::logger::format_message;
/// use serde_json::json;
///
/// let parts = [json!("entry:"), json!(["a.ts", "b.ts"]), json!(null), json!(""), json!(3)];
/// assert_eq!(format_message(&parts), "entry: a.ts b.ts 3");
/// ```
pub fn format_message(parts: &[Value]) -> String {
    parts
        .iter()
        .flat_map(|part| match part {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .filter(|part| !matches!(part, Value::Null) && part.as_str() != Some(""))
        .map(|part| match part {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_logger(level: LogLevel) -> (FriendlyLogger, MemorySink) {
        let sink = MemorySink::new();
        let logger = FriendlyLogger::with_sink(Some("pkg"), level, Arc::new(sink.clone()));
        (logger, sink)
    }

    #[test]
    fn warn_once_deduplicates_identical_text() {
        let (logger, sink) = memory_logger(LogLevel::Info);
        logger.warn_once("same");
        logger.warn_once("same");
        assert_eq!(sink.messages(LogKind::Warn), vec!["same".to_string()]);
    }

    #[test]
    fn warn_once_emits_distinct_text() {
        let (logger, sink) = memory_logger(LogLevel::Info);
        logger.warn_once("first");
        logger.warn_once("second");
        assert_eq!(sink.messages(LogKind::Warn).len(), 2);
    }

    #[test]
    fn plain_warn_is_remembered_by_warn_once() {
        let (logger, sink) = memory_logger(LogLevel::Info);
        logger.warn("dup");
        logger.warn_once("dup");
        assert_eq!(sink.messages(LogKind::Warn).len(), 1);
    }

    #[test]
    fn warn_once_compares_formatted_text() {
        let (logger, sink) = memory_logger(LogLevel::Info);
        logger.warn_once_parts(&[json!("a"), json!(null), json!("")]);
        logger.warn_once_parts(&[json!("a")]);
        logger.warn_once("a");
        assert_eq!(sink.messages(LogKind::Warn), vec!["a".to_string()]);
    }

    #[test]
    fn parts_are_joined_for_every_kind() {
        let (logger, sink) = memory_logger(LogLevel::Info);
        logger.log_parts(LogKind::Info, &[json!("built"), json!(["a.js", "b.js"])]);
        logger.log_parts(LogKind::Error, &[json!("exit code"), json!(1)]);
        assert_eq!(sink.messages(LogKind::Info), vec!["built a.js b.js".to_string()]);
        assert_eq!(sink.messages(LogKind::Error), vec!["exit code 1".to_string()]);
    }

    #[test]
    fn dedup_is_per_instance() {
        let sink = MemorySink::new();
        let a = FriendlyLogger::with_sink(None, LogLevel::Info, Arc::new(sink.clone()));
        let b = FriendlyLogger::with_sink(None, LogLevel::Info, Arc::new(sink.clone()));
        a.warn_once("shared");
        b.warn_once("shared");
        assert_eq!(sink.messages(LogKind::Warn).len(), 2);
    }

    #[test]
    fn level_filters_records() {
        let (logger, sink) = memory_logger(LogLevel::Warn);
        logger.info("hidden");
        logger.success("hidden too");
        logger.warn("shown");
        logger.error("shown");
        assert_eq!(sink.records().len(), 2);

        logger.set_level(LogLevel::Silent);
        logger.error("nothing");
        assert_eq!(sink.records().len(), 2);
        assert_eq!(logger.level(), LogLevel::Silent);
    }

    #[test]
    fn records_carry_the_name_prefix() {
        let (logger, sink) = memory_logger(LogLevel::Info);
        logger.info("hello");
        let record = &sink.records()[0];
        assert_eq!(record.to_string(), "[info] [pkg] hello");
    }

    #[test]
    fn empty_name_has_no_prefix() {
        let sink = MemorySink::new();
        let logger = FriendlyLogger::with_sink(Some(""), LogLevel::Info, Arc::new(sink.clone()));
        logger.error("boom");
        assert_eq!(sink.records()[0].to_string(), "[error] boom");
    }

    #[test]
    fn level_weights_are_ordered() {
        let weights: Vec<u8> = LogLevel::ALL.iter().map(|l| l.weight()).collect();
        assert_eq!(weights, vec![0, 1, 2, 3]);
    }

    #[test]
    fn format_message_keeps_false_and_zero() {
        let parts = [json!(false), json!(0), json!({"a": 1})];
        assert_eq!(format_message(&parts), r#"false 0 {"a":1}"#);
    }

    #[test]
    fn format_message_only_flattens_one_level() {
        let parts = [json!([["nested"], "flat"])];
        assert_eq!(format_message(&parts), r#"["nested"] flat"#);
    }

    #[test]
    fn lenient_level_parsing() {
        assert_eq!(normalize_log_level(Some("silent")), LogLevel::Silent);
        assert_eq!(normalize_log_level(Some("")), LogLevel::Info);
        assert_eq!(normalize_log_level(Some("debug")), LogLevel::Info);
    }
}
