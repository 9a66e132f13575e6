// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The clustering codec: bit-exact encode/decode of a `ClusteringPrefix`
//! against a fixed ordered list of clustering column types, parameterized
//! by a `MessagingVersion`.

use crate::coding::DecodeError;
use crate::slice::Slice;
use crate::version::MessagingVersion;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::cmp::Ordering;
use std::io::{Read, Write};

/// Describes how a single clustering column is framed on the wire.
///
/// A real schema would carry richer type information (the actual CQL type);
/// all this codec needs to stay self-delimiting is the width discipline.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClusteringType {
    /// Fixed-width column, `n` bytes, no length tag needed.
    Fixed(u8),

    /// Variable-width column, length-prefixed.
    Variable,
}

/// The ordered list of clustering column types for one table, plus whether
/// it declares a static row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusteringSchema {
    pub types: Vec<ClusteringType>,
    pub has_static: bool,
}

impl ClusteringSchema {
    #[must_use]
    pub fn new(types: Vec<ClusteringType>, has_static: bool) -> Self {
        Self { types, has_static }
    }
}

/// An ordered tuple of byte-string values positioning an atom within a
/// partition. May be shorter than the full schema (a genuine *prefix*).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusteringPrefix(pub Vec<Slice>);

impl ClusteringPrefix {
    #[must_use]
    pub fn new(values: Vec<Slice>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Orders `ClusteringPrefix` values component-by-component, shorter prefix
/// sorting before a longer one that shares its leading components (so a
/// prefix of `name` is always `<= name`).
#[derive(Copy, Clone, Debug, Default)]
pub struct ClusteringComparator;

impl ClusteringComparator {
    #[must_use]
    pub fn compare(&self, a: &ClusteringPrefix, b: &ClusteringPrefix) -> Ordering {
        for (x, y) in a.0.iter().zip(b.0.iter()) {
            match x.as_ref().cmp(y.as_ref()) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        a.0.len().cmp(&b.0.len())
    }
}

/// Per-version framing of variable-width components.
///
/// `V1`/`V2` cap variable components at 255 bytes (`u8` length tag); `V3`
/// widens the tag to `u16` (matching the 65535-byte cap used elsewhere for
/// partition keys). This is the one place the clustering codec's wire
/// format actually changes across `MessagingVersion`s, giving the
/// transcode path something concrete to exercise.
fn variable_len_is_wide(version: MessagingVersion) -> bool {
    matches!(version, MessagingVersion::V3)
}

/// Encodes `prefix` against `types`/`version`, self-delimiting.
pub fn encode<W: Write>(
    prefix: &ClusteringPrefix,
    types: &[ClusteringType],
    version: MessagingVersion,
    writer: &mut W,
) -> Result<(), DecodeError> {
    // NOTE: truncation is fine, a ClusteringPrefix is bound by the schema's
    // column count, which never approaches 256.
    #[allow(clippy::cast_possible_truncation)]
    writer.write_u8(prefix.len() as u8)?;

    let wide = variable_len_is_wide(version);

    for (value, ty) in prefix.0.iter().zip(types.iter()) {
        match ty {
            ClusteringType::Fixed(width) => {
                if value.len() != usize::from(*width) {
                    return Err(DecodeError::Malformed(
                        "fixed-width clustering column value did not match declared width",
                    ));
                }
                writer.write_all(value)?;
            }
            ClusteringType::Variable => {
                if wide {
                    #[allow(clippy::cast_possible_truncation)]
                    writer.write_u16::<BigEndian>(value.len() as u16)?;
                } else {
                    if value.len() > usize::from(u8::MAX) {
                        return Err(DecodeError::Malformed(
                            "variable-width clustering column too long for this MessagingVersion",
                        ));
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    writer.write_u8(value.len() as u8)?;
                }
                writer.write_all(value)?;
            }
        }
    }

    Ok(())
}

/// Decodes a `ClusteringPrefix` written by `encode` with the same
/// `types`/`version`.
pub fn decode<R: Read>(
    types: &[ClusteringType],
    version: MessagingVersion,
    reader: &mut R,
) -> Result<ClusteringPrefix, DecodeError> {
    let count = reader.read_u8()?;
    let wide = variable_len_is_wide(version);

    let mut values = Vec::with_capacity(count.into());

    for i in 0..count {
        let ty = types
            .get(usize::from(i))
            .ok_or(DecodeError::Malformed("clustering prefix longer than schema"))?;

        let value = match ty {
            ClusteringType::Fixed(width) => {
                let mut buf = vec![0u8; usize::from(*width)];
                reader.read_exact(&mut buf)?;
                Slice::from(buf)
            }
            ClusteringType::Variable => {
                let len = if wide {
                    reader.read_u16::<BigEndian>()? as usize
                } else {
                    usize::from(reader.read_u8()?)
                };
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf)?;
                Slice::from(buf)
            }
        };

        values.push(value);
    }

    Ok(ClusteringPrefix(values))
}

/// Advances past one encoded `ClusteringPrefix` without materializing it
/// (used by `IndexInfo::skip`).
pub fn skip<R: Read>(
    types: &[ClusteringType],
    version: MessagingVersion,
    reader: &mut R,
) -> Result<(), DecodeError> {
    let count = reader.read_u8()?;
    let wide = variable_len_is_wide(version);

    for i in 0..count {
        let ty = types
            .get(usize::from(i))
            .ok_or(DecodeError::Malformed("clustering prefix longer than schema"))?;

        let len = match ty {
            ClusteringType::Fixed(width) => usize::from(*width),
            ClusteringType::Variable => {
                if wide {
                    reader.read_u16::<BigEndian>()? as usize
                } else {
                    usize::from(reader.read_u8()?)
                }
            }
        };

        std::io::copy(&mut reader.by_ref().take(len as u64), &mut std::io::sink())?;
    }

    Ok(())
}

/// Returns the exact number of bytes `encode` would write for `prefix`.
#[must_use]
pub fn serialized_size(
    prefix: &ClusteringPrefix,
    types: &[ClusteringType],
    version: MessagingVersion,
) -> usize {
    let wide = variable_len_is_wide(version);
    let mut size = 1; // component count tag

    for (value, ty) in prefix.0.iter().zip(types.iter()) {
        size += match ty {
            ClusteringType::Fixed(width) => usize::from(*width),
            ClusteringType::Variable => value.len() + if wide { 2 } else { 1 },
        };
    }

    size
}
