//! Engine session configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::DumpLayout;

pub const DEFAULT_ENGINE: &str = "./solitaire.exe";
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine executable.
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Line order the engine writes each turn in.
    pub layout: DumpLayout,
    /// Upper bound on one full turn read.
    pub read_timeout: Duration,
    /// Refuse ids missing from the last legal set before they reach the engine.
    pub enforce_legal: bool,
    /// Append every line sent and received to this file.
    pub wire_log: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_ENGINE),
            args: Vec::new(),
            layout: DumpLayout::Standard,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            enforce_legal: true,
            wire_log: None,
        }
    }
}

fn env_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl EngineConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let program = env::var("SOLITAIRE_ENGINE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.program);

        let args = env::var("SOLITAIRE_ENGINE_ARGS")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let layout = env::var("SOLITAIRE_DUMP_LAYOUT")
            .ok()
            .and_then(|s| DumpLayout::from_str(&s))
            .unwrap_or(defaults.layout);

        let read_timeout = env::var("SOLITAIRE_READ_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.read_timeout);

        let enforce_legal = env::var("SOLITAIRE_ENFORCE_LEGAL")
            .ok()
            .and_then(|s| env_flag(&s))
            .unwrap_or(defaults.enforce_legal);

        let wire_log = env::var("SOLITAIRE_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(PathBuf::from(s)) });

        Self {
            program,
            args,
            layout,
            read_timeout,
            enforce_legal,
            wire_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.program, PathBuf::from("./solitaire.exe"));
        assert_eq!(config.layout, DumpLayout::Standard);
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert!(config.enforce_legal);
        assert!(config.wire_log.is_none());
    }

    #[test]
    fn new_keeps_other_defaults() {
        let config = EngineConfig::new("/bin/engine");
        assert_eq!(config.program, PathBuf::from("/bin/engine"));
        assert!(config.args.is_empty());
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(env_flag("1"), Some(true));
        assert_eq!(env_flag(" TRUE "), Some(true));
        assert_eq!(env_flag("off"), Some(false));
        assert_eq!(env_flag("maybe"), None);
    }

    #[test]
    fn from_env_does_not_panic() {
        let _config = EngineConfig::from_env();
    }
}
