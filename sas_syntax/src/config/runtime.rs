// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether `%* ... ;` is a comment at statement start
    pub recognize_macro_comments: bool,

    /// Whether double quotes delimit literals in addition to single quotes
    pub double_quoted_strings: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            recognize_macro_comments: env::var("SAS_SYNTAX_MACRO_COMMENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            double_quoted_strings: env::var("SAS_SYNTAX_DOUBLE_QUOTED_STRINGS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPreferences {
    /// Only accept `proc`/`data`/`%macro`/`run;` at the start of a statement
    pub anchor_keywords_at_statement_start: bool,

    /// Whether `quit;` closes a step the same way `run;` does
    pub quit_closes_steps: bool,

    /// Emit a debug event for every rejected keyword match
    pub log_rejected_matches: bool,
}

impl Default for ScanPreferences {
    fn default() -> Self {
        Self {
            anchor_keywords_at_statement_start: env::var("SAS_SYNTAX_ANCHOR_KEYWORDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            quit_closes_steps: env::var("SAS_SYNTAX_QUIT_CLOSES_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_rejected_matches: env::var("SAS_SYNTAX_LOG_REJECTED_MATCHES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentPreferences {
    /// Columns per basic indentation unit
    pub basic_offset: usize,

    /// Units added to continuation lines of a statement
    pub continuation_units: usize,
}

impl Default for IndentPreferences {
    fn default() -> Self {
        Self {
            basic_offset: env::var("SAS_SYNTAX_INDENT_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            continuation_units: env::var("SAS_SYNTAX_CONTINUATION_UNITS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to attach the active buffer name to each event
    pub include_buffer_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("SAS_SYNTAX_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("SAS_SYNTAX_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("SAS_SYNTAX_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_buffer_context: env::var("SAS_SYNTAX_LOGGING_BUFFER_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Indent width {width} outside 1..={max}")]
    IndentWidth { width: usize, max: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub scanning: ScanPreferences,
    pub indentation: IndentPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load preferences from TOML; missing tables and keys fall back to
    /// the environment-derived defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = crate::config::compile_time::indentation::MAX_INDENT_WIDTH;
        let width = self.indentation.basic_offset;
        if width == 0 || width > max {
            return Err(ConfigError::IndentWidth { width, max });
        }
        Ok(())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const MACRO_COMMENTS: &str = "SAS_SYNTAX_MACRO_COMMENTS";
    pub const DOUBLE_QUOTED_STRINGS: &str = "SAS_SYNTAX_DOUBLE_QUOTED_STRINGS";

    // Scanning
    pub const ANCHOR_KEYWORDS: &str = "SAS_SYNTAX_ANCHOR_KEYWORDS";
    pub const QUIT_CLOSES_STEPS: &str = "SAS_SYNTAX_QUIT_CLOSES_STEPS";
    pub const LOG_REJECTED_MATCHES: &str = "SAS_SYNTAX_LOG_REJECTED_MATCHES";

    // Indentation
    pub const INDENT_WIDTH: &str = "SAS_SYNTAX_INDENT_WIDTH";
    pub const CONTINUATION_UNITS: &str = "SAS_SYNTAX_CONTINUATION_UNITS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SAS_SYNTAX_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SAS_SYNTAX_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SAS_SYNTAX_LOGGING_MIN_LEVEL";
    pub const LOGGING_BUFFER_CONTEXT: &str = "SAS_SYNTAX_LOGGING_BUFFER_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str("[indentation]\nbasic_offset = 2\n").unwrap();
        assert_eq!(config.indentation.basic_offset, 2);
        assert_eq!(
            config.scanning.quit_closes_steps,
            ScanPreferences::default().quit_closes_steps
        );
    }

    #[test]
    fn test_toml_log_level_is_lowercase() {
        let config =
            RuntimeConfig::from_toml_str("[indentation]\nbasic_offset = 3\n[logging]\nmin_log_level = \"debug\"\n")
                .unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_zero_indent_width_rejected() {
        let result = RuntimeConfig::from_toml_str("[indentation]\nbasic_offset = 0\n");
        assert_matches!(result, Err(ConfigError::IndentWidth { width: 0, .. }));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = RuntimeConfig::from_toml_str("[indentation\nbasic_offset = 2");
        assert_matches!(result, Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(!env_vars::INDENT_WIDTH.is_empty());
        assert!(!env_vars::LOGGING_MIN_LEVEL.is_empty());
    }
}
