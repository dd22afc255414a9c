//! Error types for board construction.

/// Errors raised while building a board model.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The requested board family is not known.
    #[error("unknown board family: {0:?}. Supported: uniform")]
    UnknownFamily(String),

    /// The board parameters describe an impossible geometry.
    #[error("invalid board parameters: {0}")]
    InvalidParams(String),
}
