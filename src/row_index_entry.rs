// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! `RowIndexEntry`: the two-variant on-disk value describing a partition,
//! plus its lazy, offset-memoizing reader.

use crate::clustering::{ClusteringComparator, ClusteringPrefix, ClusteringType};
use crate::coding::{Decode, DecodeError, Encode, EncodeError};
use crate::deletion_time::DeletionTime;
use crate::error::{Error, Result};
use crate::index_info::{self, IndexInfo};
use crate::slice::Slice;
use crate::version::{FormatTag, MessagingVersion, LATEST};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::cmp::Ordering;
use std::io::{Cursor, Read, Write};

/// Byte offset, within an Indexed payload, of the first `IndexInfo` record:
/// 12 bytes of `DeletionTime` plus a 4-byte `columnsCount`.
const HEADER_LEN: usize = 12 + 4;

/// Points to (and optionally indexes) one partition.
#[derive(Clone, Debug, PartialEq)]
pub enum RowIndexEntry {
    /// Just the partition's data-file offset.
    Bare {
        /// Must be `>= 0`.
        position: i64,
    },

    /// Position plus a buffered, lazily-decoded block list.
    Indexed {
        /// Must be `>= 0`.
        position: i64,
        payload: Slice,
    },
}

impl RowIndexEntry {
    #[must_use]
    pub fn bare(position: i64) -> Self {
        Self::Bare { position }
    }

    /// Builds the Indexed variant's payload from a completed block list.
    ///
    /// Requires `infos.len() >= 2`; a single-block partition must go
    /// through `bare` instead.
    pub fn indexed(
        position: i64,
        partition_deletion: DeletionTime,
        infos: &[IndexInfo],
        types: &[ClusteringType],
    ) -> Result<Self> {
        assert!(
            infos.len() >= 2,
            "an Indexed RowIndexEntry must carry at least 2 blocks"
        );

        let mut payload = Vec::new();
        partition_deletion
            .encode_into(&mut payload)
            .map_err(io_of)?;

        // NOTE: truncation is fine, a partition realistically never holds
        // anywhere near u32::MAX blocks.
        #[allow(clippy::cast_possible_truncation)]
        payload.write_i32::<BigEndian>(infos.len() as i32)?;

        for info in infos {
            index_info::encode(info, types, LATEST.messaging_version, &mut payload)
                .map_err(Error::Decode)?;
        }

        Ok(Self::Indexed {
            position,
            payload: Slice::from(payload),
        })
    }

    #[must_use]
    pub fn position(&self) -> i64 {
        match self {
            Self::Bare { position } | Self::Indexed { position, .. } => *position,
        }
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }

    /// Decodes the partition-level deletion time. Decodes the first 12
    /// payload bytes fresh on every call — cheap enough not to need caching
    /// of its own.
    pub fn deletion_time(&self) -> Result<DeletionTime> {
        match self {
            Self::Bare { .. } => Ok(DeletionTime::LIVE),
            Self::Indexed { payload, .. } => {
                let mut cursor = Cursor::new(payload.as_ref());
                Ok(DeletionTime::decode_from(&mut cursor)?)
            }
        }
    }

    /// `0` for Bare.
    #[must_use]
    pub fn columns_count(&self) -> i32 {
        match self {
            Self::Bare { .. } => 0,
            Self::Indexed { payload, .. } => {
                i32::from_be_bytes(payload.as_ref()[12..16].try_into().expect("checked size"))
            }
        }
    }

    /// Builds a fresh lazy-decode cursor over this entry's blocks.
    ///
    /// The memoized offset table and single-slot cache are owned by the
    /// reader, not the entry: constructing one is per-read owned, so
    /// entries stay trivially `Clone + Send + Sync`.
    pub fn reader<'a>(&'a self, types: &'a [ClusteringType]) -> Option<IndexReader<'a>> {
        match self {
            Self::Bare { .. } => None,
            Self::Indexed { payload, .. } => {
                let columns_count = self.columns_count();
                assert!(columns_count >= 2, "Indexed entry must have columnsCount >= 2");
                Some(IndexReader {
                    bytes: payload.as_ref(),
                    columns_count: columns_count as usize,
                    types,
                    version: LATEST.messaging_version,
                    offsets: vec![0; columns_count as usize],
                    current: None,
                })
            }
        }
    }

    /// Deserializes a `RowIndexEntry` written under `on_disk` by `other`.
    ///
    /// When `on_disk` is native-compatible, the payload bytes are wrapped
    /// directly with no decode; otherwise every `IndexInfo` is transcoded
    /// record-by-record into the latest format.
    pub fn deserialize<R: Read>(
        reader: &mut R,
        on_disk: FormatTag,
        types: &[ClusteringType],
    ) -> Result<Self> {
        let position = reader.read_i64::<BigEndian>()?;
        let payload_size = reader.read_i32::<BigEndian>()?;

        if payload_size == 0 {
            return Ok(Self::Bare { position });
        }

        if !on_disk.store_rows {
            return Err(Error::VersionMismatch(on_disk.messaging_version));
        }

        if payload_size < 0 || (payload_size as usize) < HEADER_LEN {
            return Err(Error::Decode(DecodeError::Truncated));
        }

        if on_disk.is_native_compatible() {
            let mut buf = vec![0u8; payload_size as usize];
            reader.read_exact(&mut buf)?;

            let columns_count = i32::from_be_bytes(
                buf.get(12..16)
                    .ok_or(DecodeError::Truncated)?
                    .try_into()
                    .map_err(|_| DecodeError::Truncated)?,
            );
            if columns_count < 2 {
                return Err(Error::Decode(DecodeError::Malformed(
                    "Indexed RowIndexEntry must have columnsCount >= 2",
                )));
            }

            return Ok(Self::Indexed {
                position,
                payload: Slice::from(buf),
            });
        }

        log::debug!(
            "Transcoding RowIndexEntry payload from MessagingVersion {} to {}",
            on_disk.messaging_version,
            LATEST.messaging_version,
        );

        let mut source = vec![0u8; payload_size as usize];
        reader.read_exact(&mut source)?;
        let mut source = Cursor::new(source);

        let deletion = DeletionTime::decode_from(&mut source)?;
        let entries = source.read_i32::<BigEndian>()?;

        if entries < 2 {
            return Err(Error::Decode(DecodeError::Malformed(
                "Indexed RowIndexEntry must have columnsCount >= 2",
            )));
        }

        let mut infos = Vec::with_capacity(entries.max(0) as usize);
        for _ in 0..entries {
            infos.push(index_info::decode(
                types,
                on_disk.messaging_version,
                &mut source,
            )?);
        }

        Self::indexed(position, deletion, &infos, types)
    }
}

fn io_of(e: EncodeError) -> Error {
    Error::Encode(e)
}

impl Encode for RowIndexEntry {
    fn encode_into<W: Write>(&self, writer: &mut W) -> std::result::Result<(), EncodeError> {
        writer.write_i64::<BigEndian>(self.position())?;

        match self {
            Self::Bare { .. } => {
                writer.write_i32::<BigEndian>(0)?;
            }
            Self::Indexed { payload, .. } => {
                // NOTE: truncation is fine, a single partition's index
                // payload never approaches 2 GiB.
                #[allow(clippy::cast_possible_truncation)]
                writer.write_i32::<BigEndian>(payload.len() as i32)?;
                writer.write_all(payload)?;
            }
        }

        Ok(())
    }

    fn serialized_size(&self) -> usize {
        match self {
            Self::Bare { .. } => 12,
            Self::Indexed { payload, .. } => 12 + payload.len(),
        }
    }
}

/// Lazy, offset-memoizing reader over an Indexed entry's block list.
///
/// `offsets[i]` is either `0` ("not yet known") or the absolute byte offset
/// of record `i` within the payload; `0` can never be a real record offset
/// since the 16-byte header always precedes the first record.
pub struct IndexReader<'a> {
    bytes: &'a [u8],
    columns_count: usize,
    types: &'a [ClusteringType],
    version: MessagingVersion,
    offsets: Vec<i32>,
    current: Option<(usize, IndexInfo)>,
}

impl<'a> IndexReader<'a> {
    #[must_use]
    pub fn columns_count(&self) -> usize {
        self.columns_count
    }

    /// Returns the `i`-th block descriptor, decoding and memoizing offsets
    /// as needed.
    ///
    /// # Panics
    ///
    /// Panics if `i >= columns_count()`.
    pub fn index_info(&mut self, i: usize) -> Result<IndexInfo> {
        assert!(i < self.columns_count, "block index out of range");

        if let Some((cur, info)) = &self.current {
            if *cur == i {
                return Ok(info.clone());
            }
        }

        if self.offsets[i] > 0 {
            let mut cursor = Cursor::new(self.bytes);
            cursor.set_position(self.offsets[i] as u64);
            let info = index_info::decode(self.types, self.version, &mut cursor)?;
            self.current = Some((i, info.clone()));
            return Ok(info);
        }

        let start = (0..i).rev().find(|&j| self.offsets[j] > 0);

        let mut cursor = Cursor::new(self.bytes);
        let mut k = match start {
            Some(j) => {
                cursor.set_position(self.offsets[j] as u64);
                j
            }
            None => {
                cursor.set_position(HEADER_LEN as u64);
                0
            }
        };

        while k < i {
            #[allow(clippy::cast_possible_truncation)]
            {
                self.offsets[k] = cursor.position() as i32;
            }
            index_info::skip(self.types, self.version, &mut cursor)?;
            k += 1;
        }

        #[allow(clippy::cast_possible_truncation)]
        {
            self.offsets[i] = cursor.position() as i32;
        }
        let info = index_info::decode(self.types, self.version, &mut cursor)?;

        if i + 1 < self.columns_count {
            #[allow(clippy::cast_possible_truncation)]
            {
                self.offsets[i + 1] = cursor.position() as i32;
            }
        }

        self.current = Some((i, info.clone()));
        Ok(info)
    }

    /// Binary search over `[0, columns_count)` for the block containing (or
    /// bounding) `name`.
    ///
    /// Forward search (`reversed = false`) returns the first block whose
    /// `lastName >= name` within `[last_index, columns_count)`; if `name` is
    /// past every block in the window, it clamps to the last block.
    /// Reverse search returns the last block whose `firstName <= name`
    /// within `[0, last_index + 1)`; if `name` precedes every block in the
    /// window, it returns `-1` ("outside the indexed range").
    pub fn index_of(
        &mut self,
        name: &ClusteringPrefix,
        comparator: &ClusteringComparator,
        reversed: bool,
        last_index: usize,
    ) -> Result<i64> {
        if reversed {
            self.index_of_reverse(name, comparator, last_index)
        } else {
            self.index_of_forward(name, comparator, last_index)
        }
    }

    fn index_of_forward(
        &mut self,
        name: &ClusteringPrefix,
        comparator: &ClusteringComparator,
        last_index: usize,
    ) -> Result<i64> {
        let lo = last_index;
        let hi = self.columns_count;

        if lo >= hi {
            return Ok(-1);
        }

        let mut left = lo;
        let mut right = hi;

        while left < right {
            let mid = left + (right - left) / 2;
            let info = self.index_info(mid)?;
            if comparator.compare(&info.last_name, name) == Ordering::Less {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        if left == hi {
            // name is past every block in the window: clamp to the last one.
            Ok((hi - 1) as i64)
        } else {
            Ok(left as i64)
        }
    }

    fn index_of_reverse(
        &mut self,
        name: &ClusteringPrefix,
        comparator: &ClusteringComparator,
        last_index: usize,
    ) -> Result<i64> {
        let lo = 0;
        let hi = (last_index + 1).min(self.columns_count);

        if lo >= hi {
            return Ok(-1);
        }

        let mut left = lo;
        let mut right = hi;

        while left < right {
            let mid = left + (right - left) / 2;
            let info = self.index_info(mid)?;
            if comparator.compare(&info.first_name, name) != Ordering::Greater {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        if left == lo {
            // name precedes every block in the window.
            Ok(-1)
        } else {
            Ok((left - 1) as i64)
        }
    }
}
