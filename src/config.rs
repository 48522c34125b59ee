use crate::filters::LanguageRule;
use crate::store::{DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_DIST};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Default name source used when `PKGNAME_SOURCES` is unset.
pub const DEFAULT_SOURCE: &str = "seed/names.flatfile";
/// Default number of entries returned by `/history`.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Runtime configuration for the pkgname server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Flat files (optionally gzipped) holding candidate names.
    pub sources: Vec<PathBuf>,
    /// Capacity of each history buffer.
    pub history_capacity: usize,
    /// Number of entries returned per list by `/history`.
    pub history_window: usize,
    /// Length threshold, in standard deviations above the mean.
    pub max_dist: f64,
    /// Language the joke rules refuse to see mentioned.
    pub language: LanguageRule,
    /// Root directory of the static front-end.
    pub static_dir: PathBuf,
    /// Serve static files from disk on every request instead of preloading them.
    pub dev_mode: bool,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// File receiving a copy of the logs; `None` logs to stdout only.
    pub log_file: Option<PathBuf>,
}

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "logs/pkgname.log";

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from(DEFAULT_SOURCE)],
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_window: DEFAULT_HISTORY_WINDOW,
            max_dist: DEFAULT_MAX_DIST,
            language: LanguageRule::default(),
            static_dir: PathBuf::from("static"),
            dev_mode: false,
            server_port: None,
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let language = LanguageRule {
            name: load_env_optional("PKGNAME_LANGUAGE").unwrap_or(defaults.language.name),
            alias: load_env_optional("PKGNAME_LANGUAGE_ALIAS").unwrap_or(defaults.language.alias),
        };
        let config = Self {
            sources: load_env_optional("PKGNAME_SOURCES")
                .map(|value| parse_sources(&value))
                .unwrap_or(defaults.sources),
            history_capacity: load_parsed("PKGNAME_HISTORY_CAPACITY")?
                .unwrap_or(defaults.history_capacity),
            history_window: load_parsed("PKGNAME_HISTORY_WINDOW")?
                .unwrap_or(defaults.history_window),
            max_dist: load_parsed("PKGNAME_MAX_DIST")?.unwrap_or(defaults.max_dist),
            language,
            static_dir: load_env_optional("PKGNAME_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            dev_mode: load_parsed("PKGNAME_DEV")?.unwrap_or(defaults.dev_mode),
            server_port: load_parsed("SERVER_PORT")?,
            log_file: match load_env_optional("PKGNAME_LOG_FILE") {
                Some(value) => parse_log_file(&value),
                None => defaults.log_file,
            },
        };

        if config.sources.is_empty() {
            return Err(ConfigError::MissingVariable("PKGNAME_SOURCES".into()));
        }
        if !config.max_dist.is_finite() || config.max_dist < 0.0 {
            return Err(ConfigError::InvalidValue("PKGNAME_MAX_DIST".into()));
        }
        Ok(config)
    }
}

fn parse_sources(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// `off` or `none` disables file logging; anything else is a path.
fn parse_log_file(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("off") || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_parsed<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Load `.env` (if present) and read the configuration from the environment.
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_comma_separated_and_trimmed() {
        assert_eq!(
            parse_sources(" seed/a.flatfile, seed/b.flatfile.gz ,,"),
            vec![
                PathBuf::from("seed/a.flatfile"),
                PathBuf::from("seed/b.flatfile.gz")
            ]
        );
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.sources, vec![PathBuf::from(DEFAULT_SOURCE)]);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.history_window, 10);
        assert_eq!(config.max_dist, 2.0);
        assert_eq!(config.language.name, "rust");
        assert!(!config.dev_mode);
    }

    #[test]
    fn log_file_can_be_disabled() {
        assert_eq!(parse_log_file("OFF"), None);
        assert_eq!(parse_log_file("none"), None);
        assert_eq!(
            parse_log_file(" /var/log/pkgname.log "),
            Some(PathBuf::from("/var/log/pkgname.log"))
        );
        assert_eq!(
            Config::default().log_file,
            Some(PathBuf::from(DEFAULT_LOG_FILE))
        );
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let key = "PKGNAME_TEST_ONLY_NUMBER";
        // SAFETY: the key is unique to this test.
        unsafe { env::set_var(key, "lots") };
        let result: Result<Option<usize>, _> = load_parsed(key);
        assert!(matches!(result, Err(ConfigError::InvalidValue(name)) if name == key));
        unsafe { env::remove_var(key) };
    }
}
