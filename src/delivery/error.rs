use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to send part {} of {total}: {source}", .index + 1)]
    Send {
        index: usize,
        total: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
