// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Configuration recognized by the row index engine.
//!
//! `DiskAccessMode` / `IndexAccessMode` are opaque hints forwarded to the
//! segmented-file builder (out of scope here); we still type them so the
//! `Config` is a faithful stand-in for what the writer pipeline expects.

/// Hint for how the data/index files should be accessed once mapped or
/// opened. Forwarded verbatim to the segmented-file builder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessMode {
    /// Let the OS page cache manage everything.
    Standard,

    /// Hint that the file should be memory-mapped.
    Mmap,
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::Standard
    }
}

/// Configuration for the row index builder and primary index writer.
#[derive(Clone, Debug)]
pub struct Config {
    /// Minimum accumulated block size that triggers sealing a block.
    /// Defaults to 64 KiB.
    pub column_index_size_bytes: u32,

    /// Opaque hint forwarded to the segmented-file builder for the data
    /// file.
    pub disk_access_mode: AccessMode,

    /// Opaque hint forwarded to the segmented-file builder for the primary
    /// index file.
    pub index_access_mode: AccessMode,

    /// Bloom filter false-positive chance. A `FILTER` component is produced
    /// only when this is `< 1.0`.
    pub bloom_filter_fp_chance: f64,

    /// Whether to ask the OS to populate its I/O cache as blocks are
    /// flushed. Passed through to the sequential writer.
    pub populate_io_cache_on_flush: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            column_index_size_bytes: 64 * 1_024,
            disk_access_mode: AccessMode::Standard,
            index_access_mode: AccessMode::Standard,
            bloom_filter_fp_chance: 0.01,
            populate_io_cache_on_flush: false,
        }
    }
}

impl Config {
    /// Initializes a new config with the defaults above.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block-sealing size threshold.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0 — a zero threshold would seal after every atom,
    /// which is never useful and degenerates the size-discipline invariant
    /// into "every block but the last is empty".
    #[must_use]
    pub fn column_index_size_bytes(mut self, n: u32) -> Self {
        assert!(n > 0, "column_index_size_bytes must be greater than 0");
        self.column_index_size_bytes = n;
        self
    }

    /// Sets the disk access mode hint.
    #[must_use]
    pub fn disk_access_mode(mut self, mode: AccessMode) -> Self {
        self.disk_access_mode = mode;
        self
    }

    /// Sets the index access mode hint.
    #[must_use]
    pub fn index_access_mode(mut self, mode: AccessMode) -> Self {
        self.index_access_mode = mode;
        self
    }

    /// Sets the Bloom filter false-positive chance.
    ///
    /// A value `>= 1.0` disables filter production.
    ///
    /// # Panics
    ///
    /// Panics if `chance` is negative.
    #[must_use]
    pub fn bloom_filter_fp_chance(mut self, chance: f64) -> Self {
        assert!(chance >= 0.0, "bloom_filter_fp_chance cannot be negative");
        self.bloom_filter_fp_chance = chance;
        self
    }

    /// Whether a `FILTER` component should be produced under this config.
    #[must_use]
    pub fn produces_filter(&self) -> bool {
        self.bloom_filter_fp_chance < 1.0
    }

    /// Sets whether to populate the OS I/O cache on flush.
    #[must_use]
    pub fn populate_io_cache_on_flush(mut self, yes: bool) -> Self {
        self.populate_io_cache_on_flush = yes;
        self
    }
}
