//! Errors returned by the [`Store`](crate::Store).

use thiserror::Error;

/// Errors that can occur during Store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store no longer accepts actions
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed
    #[error("Shutdown timed out with {0} effects still running")]
    ShutdownTimeout(usize),

    /// No matching action arrived before the deadline
    #[error("Timeout waiting for action")]
    Timeout,

    /// Action broadcast channel closed
    #[error("Action broadcast channel closed")]
    ChannelClosed,
}
