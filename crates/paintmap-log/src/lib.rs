//! Structured logging for the paintmap tools.
//!
//! Console output with an uptime timer, plus a JSON log file in debug builds.
//! The level comes from `RUST_LOG` when set, otherwise from the config's
//! `debug.log_level`.

use std::path::Path;

use paintmap_config::Config;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config set a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "paintmap.log";

/// Filter directives for a config: its log level, or [`DEFAULT_FILTER`].
pub fn filter_directives(config: Option<&Config>) -> &str {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => config.debug.log_level.trim(),
        _ => DEFAULT_FILTER,
    }
}

/// Install the global tracing subscriber.
///
/// - console layer with target, thread names, and uptime timestamps
/// - JSON file layer at `log_dir/paintmap.log` when `debug_build` is set
/// - `RUST_LOG` takes precedence over the config's level
///
/// If the log file cannot be created, logging continues on the console only.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let log_file = log_dir
        .filter(|_| debug_build)
        .and_then(|dir| std::fs::create_dir_all(dir).ok().map(|()| dir.join(LOG_FILE_NAME)))
        .and_then(|path| std::fs::File::create(path).ok());

    match log_file {
        Some(file) => {
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime())
                .json();
            subscriber.with(file_layer).try_init()
        }
        None => subscriber.try_init(),
    }
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_filter_follows_config() {
        let mut config = Config::default();
        assert_eq!(filter_directives(Some(&config)), "info");

        config.debug.log_level = "warn,paintmap_terrain=trace".to_string();
        assert_eq!(filter_directives(Some(&config)), "warn,paintmap_terrain=trace");

        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_subsystem_filter() {
        let filter = EnvFilter::new("info,paintmap_terrain=debug");
        let filter_str = format!("{filter}");
        assert!(filter_str.contains("paintmap_terrain=debug"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,paintmap_terrain=trace",
            "warn,paintmap_cli=debug,paintmap_terrain=trace",
            "error",
        ];
        for filter_str in &valid_filters {
            let result = EnvFilter::try_new(filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {filter_str}");
        }
    }

    #[test]
    fn test_init_writes_json_log_in_debug_builds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");

        // Only one test may install the global subscriber.
        init_logging(Some(&log_dir), true, None).unwrap();
        tracing::info!(answer = 42, "hello from the test");

        let log_path = log_dir.join(LOG_FILE_NAME);
        assert!(log_path.exists());
        assert!(init_logging(None, false, None).is_err());
    }
}
