//! Error taxonomy shared by the facade, the dispatch layer and the
//! derivative engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AlgebraError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlgebraError {
    /// The type neither implements the operation natively nor admits a
    /// derived formula for it.
    #[error("operation `{operation}` is not supported by `{type_name}`")]
    UnsupportedOperation {
        operation: String,
        type_name: &'static str,
    },

    #[error("derivative order must be non-negative, got {order}")]
    InvalidOrder { order: i64 },

    /// Neither the base contract nor the component extension could bind the
    /// operation value to the type.
    #[error("cannot bind `{operation}` to `{type_name}`: {reason}")]
    UnresolvedDispatch {
        operation: String,
        type_name: &'static str,
        reason: String,
    },

    #[error("`{operation}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        got: usize,
    },
}

impl AlgebraError {
    pub fn unsupported(operation: impl ToString, type_name: &'static str) -> Self {
        AlgebraError::UnsupportedOperation {
            operation: operation.to_string(),
            type_name,
        }
    }

    pub fn unresolved(
        operation: impl ToString,
        type_name: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        AlgebraError::UnresolvedDispatch {
            operation: operation.to_string(),
            type_name,
            reason: reason.into(),
        }
    }

    /// "This type can't do X."
    pub fn is_unsupported(&self) -> bool {
        matches!(self, AlgebraError::UnsupportedOperation { .. })
    }

    /// The request itself was malformed (bad order, unbindable operation,
    /// wrong argument count), independent of the number type's abilities.
    pub fn is_structural(&self) -> bool {
        !self.is_unsupported()
    }
}
