// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The row index engine of a log-structured sorted string table (SSTable)
//! format used by a wide-column database.
//!
//! When a partition is flushed or compacted, its sorted stream of atoms
//! (rows and range-tombstone markers) is written into a data file alongside
//! a compact, seekable secondary index: a [`RowIndexEntry`] describing
//! either just the partition's offset (`Bare`), or that offset plus a
//! buffered list of [`IndexInfo`] blocks a reader can binary-search without
//! decoding the whole partition (`Indexed`).
//!
//! ##### Scope
//!
//! This crate owns the entry format, the [`RowIndexBuilder`] that produces
//! one from a sorted atom stream, the lazy block reader, and the
//! [`PartitionAppender`] / [`PrimaryIndexWriter`] that frame partitions and
//! enforce key ordering. Atom byte encoding, compression, checksumming,
//! Bloom filter construction and on-disk summary sampling are all opaque
//! collaborators reached through the [`atom`] and [`appender`] traits.
//!
//! # Example
//!
//! ```
//! use row_index_engine::atom::Atom;
//! use row_index_engine::builder::RowIndexBuilder;
//! use row_index_engine::clustering::{ClusteringPrefix, ClusteringType};
//! use row_index_engine::deletion_time::DeletionTime;
//! use row_index_engine::slice::Slice;
//!
//! # fn main() -> row_index_engine::Result<()> {
//! let types = vec![ClusteringType::Variable];
//! let rows: Vec<Atom> = (0..4)
//!     .map(|i| Atom::row(ClusteringPrefix::new(vec![Slice::from(format!("row-{i}"))])))
//!     .collect();
//! let mut atoms = rows.into_iter();
//!
//! # struct VecWriter(Vec<u8>);
//! # impl row_index_engine::atom::AtomWriter for VecWriter {
//! #     fn pointer(&self) -> i64 { self.0.len() as i64 }
//! #     fn write_partition_key(&mut self, key: &[u8]) -> row_index_engine::Result<()> {
//! #         self.0.extend_from_slice(key); Ok(())
//! #     }
//! #     fn write_partition_deletion(&mut self, _: DeletionTime) -> row_index_engine::Result<()> { Ok(()) }
//! #     fn write_static_row(&mut self, row: &Atom) -> row_index_engine::Result<()> { self.write_atom(row) }
//! #     fn write_atom(&mut self, _: &Atom) -> row_index_engine::Result<()> { self.0.push(0); Ok(()) }
//! #     fn write_end_of_partition(&mut self) -> row_index_engine::Result<()> { Ok(()) }
//! #     fn mark(&self) -> row_index_engine::atom::FileMark { row_index_engine::atom::FileMark(self.0.len() as u64) }
//! #     fn reset_and_truncate(&mut self, m: row_index_engine::atom::FileMark) -> row_index_engine::Result<()> {
//! #         self.0.truncate(m.0 as usize); Ok(())
//! #     }
//! # }
//! let mut writer = VecWriter(Vec::new());
//! let builder = RowIndexBuilder::new(8);
//! let entry = builder.build(&mut writer, b"k", DeletionTime::LIVE, None, &mut atoms, &types)?;
//! assert_eq!(0, entry.position());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![warn(clippy::multiple_crate_versions)]
// Not forbid(unsafe_code): the slice module needs one unsafe block for
// zero-copy buffer construction. clippy::indexing_slicing stays at its
// default allow; the lazy block reader and clustering codec index
// fixed-width, already-length-checked slices by position throughout.

pub mod appender;
pub mod atom;
pub mod builder;
pub mod clustering;
pub mod coding;
pub mod config;
pub mod deletion_time;
mod error;
pub mod index_info;
pub mod row_index_entry;
pub mod slice;
pub mod version;

pub use coding::{Decode, DecodeError, Encode, EncodeError};
pub use config::Config;
pub use error::{Error, Result};
pub use row_index_entry::RowIndexEntry;
pub use version::{FormatTag, MessagingVersion};
