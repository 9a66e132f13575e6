// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The Row Index Builder: consumes a sorted atom stream, partitions it into
//! bounded-size blocks, and produces a `RowIndexEntry`.

use crate::atom::{Atom, AtomStream, AtomWriter};
use crate::clustering::{ClusteringPrefix, ClusteringType};
use crate::deletion_time::DeletionTime;
use crate::error::Result;
use crate::index_info::IndexInfo;
use crate::row_index_entry::RowIndexEntry;

/// Accumulated state for the block currently being written. `None` means
/// "unset".
struct BlockState {
    first: ClusteringPrefix,
    last: ClusteringPrefix,
    start_offset: i64,
    open_marker: Option<DeletionTime>,
}

/// Partitions one partition's atom stream into index blocks and returns the
/// resulting `RowIndexEntry`.
///
/// Single-use: `build` consumes its stream and the caller's `writer`
/// position; construct a fresh instance per partition.
pub struct RowIndexBuilder {
    column_index_size_bytes: u32,
}

impl RowIndexBuilder {
    #[must_use]
    pub fn new(column_index_size_bytes: u32) -> Self {
        Self {
            column_index_size_bytes,
        }
    }

    /// Runs the block-sealing algorithm.
    ///
    /// `initial_position` is recorded from `writer.pointer()` before any
    /// bytes are written, so the returned entry always points at the
    /// partition's frame header, not its atoms region.
    pub fn build<W: AtomWriter, S: AtomStream>(
        &self,
        writer: &mut W,
        partition_key: &[u8],
        partition_deletion: DeletionTime,
        static_row: Option<&Atom>,
        atoms: &mut S,
        types: &[ClusteringType],
    ) -> Result<RowIndexEntry> {
        let initial_position = writer.pointer();

        writer.write_partition_key(partition_key)?;
        writer.write_partition_deletion(partition_deletion)?;

        if let Some(row) = static_row {
            writer.write_static_row(row)?;
        }

        let mut block: Option<BlockState> = None;
        let mut sealed: Vec<IndexInfo> = Vec::new();
        let mut wrote_any = false;

        while let Some(atom) = atoms.next_atom() {
            wrote_any = true;

            if block.is_none() {
                block = Some(BlockState {
                    first: atom.clustering.clone(),
                    last: atom.clustering.clone(),
                    start_offset: writer.pointer() - initial_position,
                    open_marker: None,
                });
            }

            writer.write_atom(&atom)?;

            let state = block.as_mut().expect("set above if it was None");
            state.last = atom.clustering.clone();

            if let Some(marker) = &atom.marker {
                state.open_marker = if marker.is_open {
                    Some(marker.deletion_time)
                } else {
                    None
                };
            }

            let advanced = writer.pointer() - initial_position;
            if advanced - state.start_offset >= i64::from(self.column_index_size_bytes) {
                let state = block.take().expect("checked above");
                sealed.push(seal(state, advanced));
            }
        }

        writer.write_end_of_partition()?;

        if !wrote_any {
            return Ok(RowIndexEntry::bare(initial_position));
        }

        if let Some(state) = block.take() {
            let advanced = writer.pointer() - initial_position;
            sealed.push(seal(state, advanced));
        }

        match sealed.len() {
            0 => unreachable!("wrote_any is true, so at least one block was sealed"),
            1 => Ok(RowIndexEntry::bare(initial_position)),
            _ => RowIndexEntry::indexed(initial_position, partition_deletion, &sealed, types),
        }
    }
}

fn seal(state: BlockState, advanced: i64) -> IndexInfo {
    IndexInfo {
        first_name: state.first,
        last_name: state.last,
        offset: state.start_offset,
        width: advanced - state.start_offset,
        open_marker: state.open_marker,
    }
}
