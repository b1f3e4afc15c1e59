use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate when RUST_LOG is unset (default: INFO)
    pub level: Level,
    /// Whether to use json format for logs (default: false)
    pub json_format: bool,
    /// Whether to colorize logs (default: true only when stderr is a terminal)
    pub colorize: bool,
    /// Targets the level applies to (default: "chatsplit")
    pub log_targets: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            colorize: std::io::stderr().is_terminal(),
            log_targets: vec!["chatsplit".to_string()],
        }
    }
}

impl LoggingConfig {
    /// Build from a level name, falling back to INFO for unknown names
    pub fn with_level_name(name: &str) -> Self {
        Self {
            level: parse_level(name),
            ..Self::default()
        }
    }
}

/// Map a level name to a tracing level; unknown names map to INFO
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" | "fatal" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn filter_string(config: &LoggingConfig) -> String {
    let level = config.level.as_str().to_lowercase();
    config
        .log_targets
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber; later calls are ignored
///
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(config: LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_string(&config)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.colorize)
        .with_target(false)
        .with_timer(ChronoUtc::new("%Y-%m-%d %H:%M:%S".to_string()));

    let layer = if config.json_format {
        layer.json().flatten_event(true).boxed()
    } else {
        layer.boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}
