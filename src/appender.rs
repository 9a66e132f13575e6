// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The Partition Appender and Primary Index Writer: partition framing,
//! strict key ordering, and the abort/rollback protocol.

use crate::atom::{Atom, AtomStream, AtomWriter, FileMark};
use crate::builder::RowIndexBuilder;
use crate::clustering::ClusteringType;
use crate::deletion_time::DeletionTime;
use crate::error::{Error, Result};
use crate::row_index_entry::RowIndexEntry;
use byteorder::{BigEndian, WriteBytesExt};

/// Notified of a potential segment boundary at a data/index-file position.
/// Segmented-file boundary bookkeeping is out of scope for this core; this
/// trait is the seam a real implementation plugs into.
pub trait BoundaryRecorder {
    fn record_boundary(&mut self, position: i64);
}

/// Receives `(key, offset)` samples for the on-disk summary component.
pub trait SummarySink {
    fn record(&mut self, key: &[u8], offset: i64);
}

/// Receives partition keys for the Bloom filter. Write-only: the filter
/// cannot be rolled back on abort, so extra keys from an aborted partition
/// are accepted as harmless false positives.
pub trait FilterSink {
    fn add_key(&mut self, key: &[u8]);

    /// Serializes the filter to its own component file.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The sequential writer backing the primary index file.
///
/// Mirrors `AtomWriter`'s pointer/mark/truncate shape but writes flat
/// record bytes rather than semantic atom calls, since primary index
/// records have no structure this core needs to preserve past
/// `keyLen || keyBytes || entry-wire-form`.
pub trait IndexFileWriter {
    fn pointer(&self) -> i64;
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
    fn mark(&self) -> FileMark;
    fn reset_and_truncate(&mut self, mark: FileMark) -> Result<()>;
}

/// Serializes `(key, RowIndexEntry)` tuples into the primary index file and
/// fans each record out to the summary sampler and Bloom filter.
pub struct PrimaryIndexWriter<I, B, S, F> {
    writer: I,
    boundary: B,
    summary: S,
    filter: F,
}

impl<I, B, S, F> PrimaryIndexWriter<I, B, S, F>
where
    I: IndexFileWriter,
    B: BoundaryRecorder,
    S: SummarySink,
    F: FilterSink,
{
    pub fn new(writer: I, boundary: B, summary: S, filter: F) -> Self {
        Self {
            writer,
            boundary,
            summary,
            filter,
        }
    }

    /// `keyLen:u16 || keyBytes || RowIndexEntry-wire-form`.
    ///
    /// `key.len()` must already have been checked against `u16::MAX` by the
    /// caller (`PartitionAppender`).
    pub fn append(&mut self, key: &[u8], entry: &RowIndexEntry) -> Result<()> {
        let position = self.writer.pointer();

        let mut record = Vec::with_capacity(2 + key.len() + entry.serialized_size());
        #[allow(clippy::cast_possible_truncation)]
        record.write_u16::<BigEndian>(key.len() as u16)?;
        record.extend_from_slice(key);
        entry.encode_into(&mut record).map_err(Error::Encode)?;

        self.writer.write_all(&record)?;
        self.summary.record(key, position);
        self.boundary.record_boundary(position);
        self.filter.add_key(key);

        Ok(())
    }

    #[must_use]
    pub fn mark(&self) -> FileMark {
        self.writer.mark()
    }

    pub fn reset_and_truncate(&mut self, mark: FileMark) -> Result<()> {
        self.writer.reset_and_truncate(mark)
    }

    /// Serializes the filter, then truncates the index file to its last
    /// valid position.
    pub fn close(mut self) -> Result<()> {
        self.filter.close()?;
        let mark = self.writer.mark();
        self.writer.reset_and_truncate(mark)
    }
}

/// Drives the builder per partition, enforces strict key ordering, and
/// snapshots both files for rollback on failure.
pub struct PartitionAppender {
    types: Vec<ClusteringType>,
    column_index_size_bytes: u32,
    last_key: Option<Vec<u8>>,
}

impl PartitionAppender {
    #[must_use]
    pub fn new(types: Vec<ClusteringType>, column_index_size_bytes: u32) -> Self {
        Self {
            types,
            column_index_size_bytes,
            last_key: None,
        }
    }

    /// Appends one partition.
    ///
    /// `Error::KeyTooLarge` and `Error::OrderViolation` are both returned
    /// before anything is written for this partition, so no rollback is
    /// needed for either: the caller treats `KeyTooLarge` as "skip this
    /// partition, continue the SSTable" and `OrderViolation` as fatal to
    /// the whole SSTable. Any error from the builder or the index writer
    /// rolls both files back to their pre-append marks.
    #[allow(clippy::too_many_arguments)]
    pub fn append<W, I, B, S, F, A>(
        &mut self,
        data_writer: &mut W,
        index_writer: &mut PrimaryIndexWriter<I, B, S, F>,
        data_boundary: &mut impl BoundaryRecorder,
        key: &[u8],
        partition_deletion: DeletionTime,
        static_row: Option<&Atom>,
        atoms: &mut A,
    ) -> Result<()>
    where
        W: AtomWriter,
        I: IndexFileWriter,
        B: BoundaryRecorder,
        S: SummarySink,
        F: FilterSink,
        A: AtomStream,
    {
        if key.len() > usize::from(u16::MAX) {
            log::warn!("skipping partition with oversized key ({} bytes)", key.len());
            return Err(Error::KeyTooLarge);
        }

        if let Some(last) = &self.last_key {
            if key <= last.as_slice() {
                return Err(Error::OrderViolation);
            }
        }

        let data_mark = data_writer.mark();
        let index_mark = index_writer.mark();

        let result = self.try_append(
            data_writer,
            index_writer,
            data_boundary,
            key,
            partition_deletion,
            static_row,
            atoms,
        );

        match result {
            Ok(()) => {
                self.last_key = Some(key.to_vec());
                Ok(())
            }
            Err(e) => {
                data_writer.reset_and_truncate(data_mark)?;
                index_writer.reset_and_truncate(index_mark)?;
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn try_append<W, I, B, S, F, A>(
        &self,
        data_writer: &mut W,
        index_writer: &mut PrimaryIndexWriter<I, B, S, F>,
        data_boundary: &mut impl BoundaryRecorder,
        key: &[u8],
        partition_deletion: DeletionTime,
        static_row: Option<&Atom>,
        atoms: &mut A,
    ) -> Result<()>
    where
        W: AtomWriter,
        I: IndexFileWriter,
        B: BoundaryRecorder,
        S: SummarySink,
        F: FilterSink,
        A: AtomStream,
    {
        let builder = RowIndexBuilder::new(self.column_index_size_bytes);
        let entry = builder.build(
            data_writer,
            key,
            partition_deletion,
            static_row,
            atoms,
            &self.types,
        )?;

        data_boundary.record_boundary(entry.position());
        index_writer.append(key, &entry)?;

        Ok(())
    }
}
