use alloc::boxed::Box;
use alloc::string::{String, ToString};

use thiserror::Error;

use crate::value::Id;

// -----------------------------------------------------------------------------
// Error

/// An error raised while archiving or unarchiving a value graph.
///
/// Every error is first passed to the session's [`ErrorCallback`], which
/// decides whether the traversal stops ([`ErrorAction::Raise`]) or keeps
/// going with a fallback value ([`ErrorAction::Ignore`]).
///
/// See [`Error::kind`] for the coarse classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No element with this key exists in the current scope.
    #[error("missing element with key `{key}`")]
    MissingElement { key: String },
    /// No element in the archive carries this id.
    #[error("no element carries the id {id}")]
    MissingId { id: Id },
    /// An element lacks an attribute it must carry.
    #[error("element `{tag}` has no `{attribute}` attribute")]
    MissingAttribute { tag: String, attribute: &'static str },
    /// The element found at a key is not the kind the reader asked for.
    #[error("expected `{expected}` at key `{key}`, found `{found}`")]
    UnexpectedElement {
        key: String,
        expected: &'static str,
        found: String,
    },
    /// The text or an attribute of an element cannot be parsed.
    #[error("malformed `{tag}` value `{text}` at key `{key}`")]
    MalformedValue {
        key: String,
        tag: String,
        text: String,
    },
    /// The archive as a whole is not well formed.
    #[error("malformed archive: {0}")]
    Malformed(String),
    /// The archived value cannot be stored in the requested type.
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    /// A runtime type name was not registered in the `TypeRegistry`.
    #[error("type `{name}` is not registered")]
    UnregisteredType { name: String },
    /// A type that needs a registered codec has none.
    #[error("no codec registered for `{type_name}`")]
    MissingCodec { type_name: String },
    /// The value kind cannot be represented by the engine or the backend.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// An operation was called while the session was in the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The archive is missing or duplicating an element or attribute.
    Structural,
    /// A static type cannot represent the archived runtime type.
    Type,
    /// A codec was required but never provided.
    Policy,
    /// The engine or backend was driven out of order.
    State,
}

impl Error {
    #[inline]
    pub fn missing_element(key: &str) -> Self {
        Self::MissingElement {
            key: key.to_string(),
        }
    }

    #[inline]
    pub fn unexpected(key: &str, expected: &'static str, found: impl ToString) -> Self {
        Self::UnexpectedElement {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }

    #[inline]
    pub fn malformed_value(key: &str, tag: &str, text: &str) -> Self {
        Self::MalformedValue {
            key: key.to_string(),
            tag: tag.to_string(),
            text: text.to_string(),
        }
    }

    /// An enum node whose value matches no variant of `ty`.
    #[inline]
    pub fn unknown_discriminant(key: &str, ty: &str, value: impl ToString) -> Self {
        Self::MalformedValue {
            key: key.to_string(),
            tag: ty.to_string(),
            text: value.to_string(),
        }
    }

    #[inline]
    pub fn malformed(reason: impl ToString) -> Self {
        Self::Malformed(reason.to_string())
    }

    #[inline]
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    #[inline]
    pub fn unregistered(name: &str) -> Self {
        Self::UnregisteredType {
            name: name.to_string(),
        }
    }

    #[inline]
    pub fn missing_codec(type_name: &str) -> Self {
        Self::MissingCodec {
            type_name: type_name.to_string(),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingElement { .. }
            | Self::MissingId { .. }
            | Self::MissingAttribute { .. }
            | Self::UnexpectedElement { .. }
            | Self::MalformedValue { .. }
            | Self::Malformed(_) => ErrorKind::Structural,
            Self::TypeMismatch { .. } | Self::UnregisteredType { .. } | Self::Unsupported(_) => {
                ErrorKind::Type
            }
            Self::MissingCodec { .. } => ErrorKind::Policy,
            Self::InvalidState(_) => ErrorKind::State,
        }
    }
}

// -----------------------------------------------------------------------------
// ErrorCallback

/// What the engine does after an [`Error`] was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Abort the traversal and return the error to the caller.
    #[default]
    Raise,
    /// Substitute the failing value's fallback and continue.
    Ignore,
}

/// The injectable error policy of a session.
///
/// It is called once per error, at the innermost value that failed.
pub type ErrorCallback = Box<dyn FnMut(&Error) -> ErrorAction>;

/// The default policy: every error aborts the traversal.
#[inline]
pub fn raise(_: &Error) -> ErrorAction {
    ErrorAction::Raise
}

/// Logs the error and continues with the failing value's fallback.
///
/// Useful to recover what is left of a partially corrupt archive.
pub fn warn_and_ignore(error: &Error) -> ErrorAction {
    log::warn!("ignored archive error: {error}");
    ErrorAction::Ignore
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Error::missing_element("a").kind(), ErrorKind::Structural);
        assert_eq!(Error::unregistered("Circle").kind(), ErrorKind::Type);
        assert_eq!(Error::missing_codec("Handle").kind(), ErrorKind::Policy);
        assert_eq!(Error::InvalidState("flush").kind(), ErrorKind::State);
    }

    #[test]
    fn messages() {
        let err = Error::unexpected("ints", "array", "int");
        assert_eq!(
            err.to_string(),
            "expected `array` at key `ints`, found `int`"
        );
        let err = Error::malformed_value("x", "int", "abc");
        assert_eq!(err.to_string(), "malformed `int` value `abc` at key `x`");
    }

    #[test]
    fn builtin_callbacks() {
        let err = Error::missing_element("a");
        assert_eq!(raise(&err), ErrorAction::Raise);
        assert_eq!(warn_and_ignore(&err), ErrorAction::Ignore);
    }
}
