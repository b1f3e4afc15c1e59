use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Token source failed: {0}")]
    TokenSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
