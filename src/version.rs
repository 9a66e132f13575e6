// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The wire-format version tag carried alongside a serialized
//! `RowIndexEntry`, and the "native-compatible" check that decides whether
//! `RowIndexEntry::deserialize` can pass an on-disk payload through
//! unparsed, or must transcode it record-by-record.

/// Tag for the wire encoding of clustering prefixes and index records.
///
/// Unrelated to the crate's own `CARGO_PKG_VERSION`; this tracks the
/// on-disk format only, the same way the clustering codec is parameterized
/// by it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum MessagingVersion {
    /// Earliest supported on-disk encoding
    V1,

    /// Second on-disk encoding revision
    V2,

    /// Current on-disk encoding
    V3,
}

impl std::fmt::Display for MessagingVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

impl From<MessagingVersion> for u8 {
    fn from(value: MessagingVersion) -> Self {
        match value {
            MessagingVersion::V1 => 1,
            MessagingVersion::V2 => 2,
            MessagingVersion::V3 => 3,
        }
    }
}

impl TryFrom<u8> for MessagingVersion {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            _ => Err(()),
        }
    }
}

/// The version/flag pair that determines binary compatibility of a
/// serialized `RowIndexEntry` payload.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FormatTag {
    /// Wire encoding revision.
    pub messaging_version: MessagingVersion,

    /// Whether the on-disk format carries a column/row index at all.
    ///
    /// A native tag always has this set; a tag with this unset describes a
    /// legacy format this crate cannot read.
    pub store_rows: bool,
}

/// The engine's own format: the newest `MessagingVersion`, rows always
/// indexed.
pub const LATEST: FormatTag = FormatTag {
    messaging_version: MessagingVersion::V3,
    store_rows: true,
};

impl FormatTag {
    /// True when a payload written under `self` can be read by the engine
    /// without transcoding.
    #[must_use]
    pub fn is_native_compatible(&self) -> bool {
        *self == LATEST
    }
}
