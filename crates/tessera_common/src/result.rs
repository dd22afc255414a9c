//! Common result and error types for the Tessera backend.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in Tessera), not a
/// problem with the user's design. Design problems are either reported through
/// the diagnostic sink or surface as the typed error enum of the stage that
/// detected them.
pub type TesseraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Tessera, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal backend error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("slot registry out of sync");
        assert_eq!(
            format!("{err}"),
            "internal backend error: slot registry out of sync"
        );
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> TesseraResult<u32> {
            Err(InternalError::new("bin index overflow"))
        }
        fn outer() -> TesseraResult<u32> {
            let v = inner()?;
            Ok(v + 1)
        }
        let err = outer().unwrap_err();
        assert_eq!(err.message, "bin index overflow");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
