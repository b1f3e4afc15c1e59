use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Ceiling out of range: {max_chars} characters (min: {min})")]
    CeilingOutOfRange { max_chars: usize, min: usize },

    #[error("Sentinel token must not be empty: {0}")]
    EmptySentinel(&'static str),

    #[error("Thinking sentinels must differ: {0}")]
    IdenticalSentinels(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}
