use thiserror::Error;

/// Errors raised by the channel itself, as opposed to method results.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// A payload could not be decoded or encoded.
    #[error("invalid channel payload: {0}")]
    Codec(#[from] serde_json::Error),

    /// The channel was used before it was initialized.
    #[error("channel not initialized")]
    NotInitialized,

    /// An error occurred in the underlying platform implementation.
    #[error("platform error: {0}")]
    Platform(String),
}
