//! Structured Logging
//!
//! Lightweight structured logging for schema and encoding events:
//! - Leveled entries with key/value fields
//! - UTC timestamps
//! - Long hex digests abbreviated in field output

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to enable/disable debug logging
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (hash-like keys are abbreviated)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value_str = value.to_string();
        let shown = abbreviate_if_digest(key, &value_str);
        self.fields.push((key, shown));
        self
    }

    /// Add a raw digest field, hex encoded and abbreviated
    pub fn digest_field(mut self, key: &'static str, digest: &[u8]) -> Self {
        let encoded = format!("0x{}", hex::encode(digest));
        self.fields.push((key, abbreviate_hash(&encoded)));
        self
    }

    /// Render the entry without the timestamp prefix
    pub fn render(&self) -> String {
        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields_str.is_empty() {
            format!("{} [{}] {}", self.level, self.module, self.message)
        } else {
            format!("{} [{}] {} | {}", self.level, self.module, self.message, fields_str)
        }
    }

    /// Log the entry
    pub fn log(self) {
        // Skip debug logs if not enabled
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

/// Abbreviate a value if the key names a hash or digest
fn abbreviate_if_digest(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    let hash_keys = ["hash", "digest", "separator"];
    for hash_key in &hash_keys {
        if key_lower.contains(hash_key) {
            return abbreviate_hash(value);
        }
    }

    value.to_string()
}

/// Partially show a hash (first 10 and last 6 chars)
fn abbreviate_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if trimmed.len() <= 20 {
        return trimmed.to_string(); // Short hashes shown fully
    }

    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    let suffix_len = 6;

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Convenience macro for debug logging
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for info logging
#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for warning logging
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for error logging
#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate_hash() {
        let hash = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        let shown = abbreviate_hash(hash);
        assert!(shown.starts_with("0x1234567890"));
        assert!(shown.ends_with("abcdef"));
        assert!(shown.contains("..."));

        assert_eq!(abbreviate_hash(""), "[EMPTY]");
        assert_eq!(abbreviate_hash("0xabc"), "0xabc");
    }

    #[test]
    fn test_abbreviate_if_digest() {
        let long = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        assert!(abbreviate_if_digest("type_hash", long).contains("..."));
        assert_eq!(abbreviate_if_digest("struct_name", "Mail"), "Mail");
    }

    #[test]
    fn test_log_entry_render() {
        let entry = LogEntry::new(LogLevel::Warn, "resolver", "Rejected cyclic schema")
            .field("struct_name", "Node")
            .digest_field("type_hash", &[0xab; 32]);

        let rendered = entry.render();
        assert!(rendered.starts_with("WARN [resolver] Rejected cyclic schema | "));
        assert!(rendered.contains("struct_name=Node"));
        assert!(rendered.contains("type_hash=0xabababab..."));
    }

    #[test]
    fn test_log_entry_without_fields() {
        let entry = LogEntry::new(LogLevel::Info, "codec", "ready");
        assert_eq!(entry.render(), "INFO [codec] ready");
    }
}
