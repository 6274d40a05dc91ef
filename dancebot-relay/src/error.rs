use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to bind relay to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Relay server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
