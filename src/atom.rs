// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The seam between this core and the upstream atom-serialization layer:
//! this core does not decide *which* atoms to emit. `Atom` is the smallest
//! shape the builder needs to see; actual byte encoding of rows is the
//! opaque `AtomWriter`'s job.

use crate::clustering::ClusteringPrefix;
use crate::deletion_time::DeletionTime;

/// A range-tombstone marker's open/close state and deletion time.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeTombstoneMarker {
    /// True if this marker opens a new tombstone range; false if it closes
    /// one that was previously open.
    pub is_open: bool,

    pub deletion_time: DeletionTime,
}

/// One `Unfiltered` item in the atom stream: either a row or a
/// range-tombstone marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub clustering: ClusteringPrefix,

    /// `None` for a row; `Some` for a range-tombstone marker.
    pub marker: Option<RangeTombstoneMarker>,
}

impl Atom {
    #[must_use]
    pub fn row(clustering: ClusteringPrefix) -> Self {
        Self {
            clustering,
            marker: None,
        }
    }

    #[must_use]
    pub fn range_tombstone_marker(
        clustering: ClusteringPrefix,
        is_open: bool,
        deletion_time: DeletionTime,
    ) -> Self {
        Self {
            clustering,
            marker: Some(RangeTombstoneMarker {
                is_open,
                deletion_time,
            }),
        }
    }

    #[must_use]
    pub fn is_range_tombstone_marker(&self) -> bool {
        self.marker.is_some()
    }
}

/// A cursor yielding atoms in clustering order for one partition.
///
/// Blanket-implemented for any `Iterator<Item = Atom>`, so callers can feed
/// the builder a plain `Vec<Atom>::into_iter()` or a real merge-iterator
/// from the compaction layer.
pub trait AtomStream {
    fn next_atom(&mut self) -> Option<Atom>;
}

impl<I: Iterator<Item = Atom>> AtomStream for I {
    fn next_atom(&mut self) -> Option<Atom> {
        self.next()
    }
}

/// A snapshot of a sequential writer's position, used to roll back on
/// partition-level failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FileMark(pub u64);

/// The opaque sequential atom-appender the builder and appender drive.
///
/// Atom serialization itself, the data file's bytes, compression and
/// checksumming are all out of scope for this core; this trait is the
/// typed seam a real writer implements.
pub trait AtomWriter {
    /// Current byte offset in the data file.
    fn pointer(&self) -> i64;

    /// Writes the length-prefixed partition key.
    fn write_partition_key(&mut self, key: &[u8]) -> crate::Result<()>;

    /// Writes the fixed 12-byte partition-level deletion time.
    fn write_partition_deletion(&mut self, deletion: DeletionTime) -> crate::Result<()>;

    /// Writes the static row, if the schema declares one.
    fn write_static_row(&mut self, row: &Atom) -> crate::Result<()>;

    /// Writes one atom (row or range-tombstone marker).
    fn write_atom(&mut self, atom: &Atom) -> crate::Result<()>;

    /// Writes the fixed end-of-partition sentinel.
    fn write_end_of_partition(&mut self) -> crate::Result<()>;

    /// Snapshots the current write position for later rollback.
    fn mark(&self) -> FileMark;

    /// Truncates the underlying file back to a previously taken `mark`.
    fn reset_and_truncate(&mut self, mark: FileMark) -> crate::Result<()>;
}
