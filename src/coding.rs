// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::io::{Read, Write};

/// Error during serialization
#[derive(Debug)]
pub enum EncodeError {
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EncodeError({})",
            match self {
                Self::Io(e) => e.to_string(),
            }
        )
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
        }
    }
}

/// Error during deserialization.
///
/// `Truncated` and `Malformed` cover the two broad failure shapes a codec
/// sees on corrupt input; `InvalidTag` covers the narrower "one bad byte"
/// case (e.g. an unrecognized `value_type`-like discriminant).
#[derive(Debug)]
pub enum DecodeError {
    /// I/O error
    Io(std::io::Error),

    /// Source ended before a self-delimited value was fully read
    Truncated,

    /// Length tags or discriminants were internally inconsistent
    Malformed(&'static str),

    /// An enum-like discriminant byte had no known mapping
    InvalidTag(&'static str, u8),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "DecodeError::Io({e})"),
            Self::Truncated => write!(f, "DecodeError::Truncated"),
            Self::Malformed(why) => write!(f, "DecodeError::Malformed({why})"),
            Self::InvalidTag(field, tag) => write!(f, "DecodeError::InvalidTag({field}, {tag})"),
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(value: std::io::Error) -> Self {
        if value.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(value)
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Trait to serialize stuff
pub trait Encode {
    /// Serializes into writer.
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError>;

    /// Returns the exact number of bytes `encode_into` would write.
    fn serialized_size(&self) -> usize {
        self.encode_into_vec().len()
    }

    /// Serializes into vector.
    fn encode_into_vec(&self) -> Vec<u8> {
        let mut v = vec![];
        self.encode_into(&mut v).expect("writing into a Vec cannot fail");
        v
    }
}

/// Trait to deserialize stuff
pub trait Decode {
    /// Deserializes from reader.
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError>
    where
        Self: Sized;

    /// Advances past one encoded value without materializing it.
    ///
    /// The default implementation just decodes and drops the result; codecs
    /// that can skip without allocating (see `IndexInfo`) override this.
    fn skip<R: Read>(reader: &mut R) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        Self::decode_from(reader).map(|_| ())
    }
}
