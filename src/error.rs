// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{DecodeError, EncodeError};
use crate::version::MessagingVersion;

/// Represents errors that can occur in the row index engine.
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Serialization failed
    Encode(EncodeError),

    /// Deserialization failed; the caller should treat the SSTable as corrupt
    Decode(DecodeError),

    /// A new partition key was not strictly greater than the previous one.
    ///
    /// Fatal: the appender's caller must abort the whole SSTable.
    OrderViolation,

    /// A partition key exceeded the 16-bit length prefix (> 65535 bytes).
    ///
    /// Non-fatal: the partition is skipped and the SSTable continues.
    KeyTooLarge,

    /// An on-disk format version could not be transcoded to the latest
    /// `MessagingVersion`.
    VersionMismatch(MessagingVersion),

    /// A downstream checksum sink reported a mismatch.
    ///
    /// Checksum computation itself is out of scope for this crate (it is
    /// layered below the sequential writer); this variant only exists so a
    /// `ChecksumSink` collaborator can surface a failure through our
    /// `Result`.
    ChecksumMismatch,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "RowIndexError::Io({e})"),
            Self::Encode(e) => write!(f, "RowIndexError::Encode({e})"),
            Self::Decode(e) => write!(f, "RowIndexError::Decode({e})"),
            Self::OrderViolation => write!(f, "RowIndexError::OrderViolation"),
            Self::KeyTooLarge => write!(f, "RowIndexError::KeyTooLarge"),
            Self::VersionMismatch(v) => write!(f, "RowIndexError::VersionMismatch({v:?})"),
            Self::ChecksumMismatch => write!(f, "RowIndexError::ChecksumMismatch"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<EncodeError> for Error {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<DecodeError> for Error {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

/// Row index engine result
pub type Result<T> = std::result::Result<T, Error>;
