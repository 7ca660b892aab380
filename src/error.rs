use std::fmt::Display;

use thiserror::Error;

///
/// Reason why a call to an [`crate::engine::EngineBridge`] failed.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EngineErrorKind {
    /// the request could not be translated, or the engine rejected it as malformed
    Malformed,
    /// the engine process could not be started, or terminated abnormally
    Crashed,
    /// the computation did not finish within the configured timeout
    Timeout,
    /// the engine does not support the requested operation for the given ring
    Unsupported,
    /// the engine produced output that could not be parsed into the expected result type
    Unparseable
}

impl Display for EngineErrorKind {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineErrorKind::Malformed => write!(f, "malformed request"),
            EngineErrorKind::Crashed => write!(f, "engine crashed"),
            EngineErrorKind::Timeout => write!(f, "timeout"),
            EngineErrorKind::Unsupported => write!(f, "unsupported"),
            EngineErrorKind::Unparseable => write!(f, "unparseable output")
        }
    }
}

///
/// Failure of the external computation engine. Contains the kind of failure
/// and a human-readable reason, which is usually (a part of) the engine output.
///
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("{kind}: {reason}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub reason: String
}

impl EngineError {

    pub fn new<S: Into<String>>(kind: EngineErrorKind, reason: S) -> Self {
        Self { kind, reason: reason.into() }
    }

    pub fn timeout<S: Into<String>>(reason: S) -> Self {
        Self::new(EngineErrorKind::Timeout, reason)
    }

    pub fn unsupported<S: Into<String>>(reason: S) -> Self {
        Self::new(EngineErrorKind::Unsupported, reason)
    }

    pub fn unparseable<S: Into<String>>(reason: S) -> Self {
        Self::new(EngineErrorKind::Unparseable, reason)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == EngineErrorKind::Timeout
    }
}

///
/// The product of two monomials has an exponent that does not fit into
/// [`crate::multivariate::MonomialExponent`].
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exponent overflow")]
pub struct ExponentOverflow;

impl From<ExponentOverflow> for EngineError {

    fn from(_: ExponentOverflow) -> Self {
        EngineError::unsupported("exponent overflow")
    }
}

///
/// All errors that can occur when working with fields, rings and ideals.
///
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    /// a value cannot be represented as element of the given field
    #[error("cannot coerce into field: {0}")]
    Coercion(String),
    /// an operation is not defined over the given field, e.g. square root of a non-residue
    #[error("operation undefined over field: {0}")]
    Domain(String),
    /// the number of variables does not match the ring, or a variable is unknown
    #[error("arity mismatch: {0}")]
    Arity(String),
    /// two objects were required to live over structurally equal rings
    #[error("rings differ: {0}")]
    RingMismatch(String),
    /// the operation is not supported for the monomial ordering of the ring
    #[error("unsupported monomial ordering: {0}")]
    Ordering(String),
    /// malformed textual input
    #[error("parse error at position {position}: {message}")]
    Parse { position: usize, message: String },
    /// the field configuration passed to [`crate::field::Field::new()`] was rejected
    #[error("invalid field configuration: {0}")]
    InvalidField(String),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError)
}

impl AlgebraError {

    pub fn parse<S: Into<String>>(position: usize, message: S) -> Self {
        AlgebraError::Parse { position, message: message.into() }
    }
}

impl From<ExponentOverflow> for AlgebraError {

    fn from(_: ExponentOverflow) -> Self {
        AlgebraError::Domain("exponent overflow".to_owned())
    }
}

pub type Result<T> = std::result::Result<T, AlgebraError>;

#[test]
fn test_error_display() {
    let err = AlgebraError::from(EngineError::timeout("300 s"));
    assert_eq!("engine error: timeout: 300 s", format!("{}", err));
    assert_eq!("parse error at position 3: unexpected `)`", format!("{}", AlgebraError::parse(3, "unexpected `)`")));
    assert_eq!(AlgebraError::Domain("exponent overflow".to_owned()), AlgebraError::from(ExponentOverflow));
    assert_eq!(EngineErrorKind::Unsupported, EngineError::from(ExponentOverflow).kind);
}
