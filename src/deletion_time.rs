// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The DeletionTime codec: a fixed 12-byte
//! `(localDeletionTime: i32, markedForDeletionAt: i64)` pair.

use crate::coding::{Decode, DecodeError, Encode, EncodeError};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Always exactly 12 bytes on the wire.
pub const SERIALIZED_SIZE: usize = 12;

/// A range-tombstone or partition-level deletion marker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeletionTime {
    pub local_deletion_time: i32,
    pub marked_for_deletion_at: i64,
}

impl DeletionTime {
    /// The sentinel "no deletion" value. Serializes to the same 12 bytes as
    /// any other deletion time.
    pub const LIVE: Self = Self {
        local_deletion_time: i32::MAX,
        marked_for_deletion_at: i64::MIN,
    };

    #[must_use]
    pub fn new(local_deletion_time: i32, marked_for_deletion_at: i64) -> Self {
        Self {
            local_deletion_time,
            marked_for_deletion_at,
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        *self == Self::LIVE
    }
}

impl Default for DeletionTime {
    fn default() -> Self {
        Self::LIVE
    }
}

impl Encode for DeletionTime {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_i32::<BigEndian>(self.local_deletion_time)?;
        writer.write_i64::<BigEndian>(self.marked_for_deletion_at)?;
        Ok(())
    }

    fn serialized_size(&self) -> usize {
        SERIALIZED_SIZE
    }
}

impl Decode for DeletionTime {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let local_deletion_time = reader.read_i32::<BigEndian>()?;
        let marked_for_deletion_at = reader.read_i64::<BigEndian>()?;
        Ok(Self {
            local_deletion_time,
            marked_for_deletion_at,
        })
    }

    fn skip<R: Read>(reader: &mut R) -> Result<(), DecodeError> {
        std::io::copy(&mut reader.by_ref().take(SERIALIZED_SIZE as u64), &mut std::io::sink())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn roundtrip() {
        let dt = DeletionTime::new(1_700_000_000, 42);
        let bytes = dt.encode_into_vec();
        assert_eq!(bytes.len(), SERIALIZED_SIZE);

        let decoded = DeletionTime::decode_from(&mut &bytes[..]).unwrap();
        assert_eq!(dt, decoded);
    }

    #[test]
    fn live_roundtrips_too() {
        let bytes = DeletionTime::LIVE.encode_into_vec();
        assert_eq!(bytes.len(), SERIALIZED_SIZE);
        let decoded = DeletionTime::decode_from(&mut &bytes[..]).unwrap();
        assert_eq!(DeletionTime::LIVE, decoded);
        assert!(decoded.is_live());
    }

    #[test]
    fn skip_advances_exactly_twelve_bytes() {
        let a = DeletionTime::new(1, 2);
        let b = DeletionTime::new(3, 4);

        let mut buf = vec![];
        a.encode_into(&mut buf).unwrap();
        b.encode_into(&mut buf).unwrap();

        let mut cursor = std::io::Cursor::new(&buf[..]);
        DeletionTime::skip(&mut cursor).unwrap();
        let decoded = DeletionTime::decode_from(&mut cursor).unwrap();
        assert_eq!(b, decoded);
    }
}
