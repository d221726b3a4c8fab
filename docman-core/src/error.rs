//! Error types and result types for document store operations.
//!
//! Every fallible operation in the workspace returns [`DocumentStoreResult<T>`].
//! The error kinds form a closed set: a document that does not exist, a document
//! that already exists, an operation that ran out of time, and everything else.

use bson::error::Error as BsonError;
use quick_xml::{Error as XmlReadError, de::DeError as XmlDeError, se::SeError as XmlSeError};
use rmp_serde::{decode::Error as MsgPackDecodeError, encode::Error as MsgPackEncodeError};
use serde_json::Error as SerdeJsonError;
use std::{fmt, str::Utf8Error};
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// The referenced document does not exist.
    #[error("Document {0} not found")]
    NotFound(String),
    /// A document with the given ID already exists.
    #[error("Document {0} already exists")]
    Conflict(String),
    /// The operation did not complete within its allotted time, or its caller
    /// cancelled it before it started.
    #[error("Operation timed out: {0}")]
    Timeout(String),
    /// Any other failure: encoding errors, broken invariants, backend faults.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

/// The kind of a [`DocumentStoreError`], without its detail.
///
/// Transport layers match on this to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Timeout,
    Unexpected,
}

impl ErrorKind {
    /// The HTTP status code a transport layer reports for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Timeout => 504,
            ErrorKind::Unexpected => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unexpected => "unexpected",
        };

        f.write_str(name)
    }
}

impl DocumentStoreError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentStoreError::NotFound(_) => ErrorKind::NotFound,
            DocumentStoreError::Conflict(_) => ErrorKind::Conflict,
            DocumentStoreError::Timeout(_) => ErrorKind::Timeout,
            DocumentStoreError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentStoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DocumentStoreError::Conflict(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DocumentStoreError::Timeout(_))
    }
}

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Unexpected(format!("BSON encoding: {err}"))
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Unexpected(format!("JSON encoding: {err}"))
    }
}

impl From<MsgPackEncodeError> for DocumentStoreError {
    fn from(err: MsgPackEncodeError) -> Self {
        DocumentStoreError::Unexpected(format!("MessagePack encoding: {err}"))
    }
}

impl From<MsgPackDecodeError> for DocumentStoreError {
    fn from(err: MsgPackDecodeError) -> Self {
        DocumentStoreError::Unexpected(format!("MessagePack decoding: {err}"))
    }
}

impl From<XmlSeError> for DocumentStoreError {
    fn from(err: XmlSeError) -> Self {
        DocumentStoreError::Unexpected(format!("XML encoding: {err}"))
    }
}

impl From<XmlDeError> for DocumentStoreError {
    fn from(err: XmlDeError) -> Self {
        DocumentStoreError::Unexpected(format!("XML decoding: {err}"))
    }
}

impl From<XmlReadError> for DocumentStoreError {
    fn from(err: XmlReadError) -> Self {
        DocumentStoreError::Unexpected(format!("XML decoding: {err}"))
    }
}

impl From<Utf8Error> for DocumentStoreError {
    fn from(err: Utf8Error) -> Self {
        DocumentStoreError::Unexpected(format!("XML payload is not UTF-8: {err}"))
    }
}
