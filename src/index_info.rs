// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The IndexInfo codec: one block descriptor bounding a contiguous byte
//! range of a partition's atoms region.

use crate::clustering::{self, ClusteringPrefix, ClusteringType};
use crate::coding::DecodeError;
use crate::deletion_time::DeletionTime;
use crate::version::MessagingVersion;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// A single index block descriptor.
///
/// Invariants: `width > 0`; `first_name <= last_name` under the
/// partition's `ClusteringComparator`; for consecutive blocks `B_i`,
/// `B_{i+1}` in the same partition, `B_i.last_name < B_{i+1}.first_name` and
/// `B_i.offset + B_i.width == B_{i+1}.offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexInfo {
    pub first_name: ClusteringPrefix,
    pub last_name: ClusteringPrefix,
    pub offset: i64,
    pub width: i64,
    pub open_marker: Option<DeletionTime>,
}

/// Encodes one `IndexInfo` record.
pub fn encode<W: Write>(
    info: &IndexInfo,
    types: &[ClusteringType],
    version: MessagingVersion,
    writer: &mut W,
) -> Result<(), DecodeError> {
    clustering::encode(&info.first_name, types, version, writer)?;
    clustering::encode(&info.last_name, types, version, writer)?;
    writer.write_i64::<BigEndian>(info.offset)?;
    writer.write_i64::<BigEndian>(info.width)?;

    match info.open_marker {
        Some(dt) => {
            writer.write_u8(1)?;
            use crate::coding::Encode;
            dt.encode_into(writer).map_err(|e| match e {
                crate::coding::EncodeError::Io(io) => DecodeError::Io(io),
            })?;
        }
        None => writer.write_u8(0)?,
    }

    Ok(())
}

/// Decodes one `IndexInfo` record written by `encode`.
pub fn decode<R: Read>(
    types: &[ClusteringType],
    version: MessagingVersion,
    reader: &mut R,
) -> Result<IndexInfo, DecodeError> {
    let first_name = clustering::decode(types, version, reader)?;
    let last_name = clustering::decode(types, version, reader)?;
    let offset = reader.read_i64::<BigEndian>()?;
    let width = reader.read_i64::<BigEndian>()?;

    let has_open_marker = reader.read_u8()?;
    let open_marker = match has_open_marker {
        0 => None,
        1 => {
            use crate::coding::Decode;
            Some(DeletionTime::decode_from(reader)?)
        }
        tag => return Err(DecodeError::InvalidTag("hasOpenMarker", tag)),
    };

    Ok(IndexInfo {
        first_name,
        last_name,
        offset,
        width,
        open_marker,
    })
}

/// Advances `reader` past one `IndexInfo` record without materializing any
/// `ClusteringPrefix`.
pub fn skip<R: Read>(
    types: &[ClusteringType],
    version: MessagingVersion,
    reader: &mut R,
) -> Result<(), DecodeError> {
    clustering::skip(types, version, reader)?;
    clustering::skip(types, version, reader)?;

    // offset + width
    std::io::copy(&mut reader.by_ref().take(16), &mut std::io::sink())?;

    let has_open_marker = reader.read_u8()?;
    match has_open_marker {
        0 => {}
        1 => DeletionTime::skip(reader)?,
        tag => return Err(DecodeError::InvalidTag("hasOpenMarker", tag)),
    }

    Ok(())
}
