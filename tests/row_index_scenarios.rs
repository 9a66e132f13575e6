// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! End-to-end scenarios exercising the appender/builder/entry/reader
//! pipeline together.

use row_index_engine::appender::{
    BoundaryRecorder, FilterSink, IndexFileWriter, PartitionAppender, PrimaryIndexWriter,
    SummarySink,
};
use row_index_engine::atom::{Atom, AtomWriter, FileMark};
use row_index_engine::clustering::{ClusteringPrefix, ClusteringType};
use row_index_engine::deletion_time::DeletionTime;
use row_index_engine::slice::Slice;
use row_index_engine::Error;

struct VecDataWriter {
    buf: Vec<u8>,
    types: Vec<ClusteringType>,
}

impl VecDataWriter {
    fn new(types: Vec<ClusteringType>) -> Self {
        Self {
            buf: Vec::new(),
            types,
        }
    }
}

impl AtomWriter for VecDataWriter {
    fn pointer(&self) -> i64 {
        self.buf.len() as i64
    }

    fn write_partition_key(&mut self, key: &[u8]) -> row_index_engine::Result<()> {
        #[allow(clippy::cast_possible_truncation)]
        self.buf.extend_from_slice(&(key.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(key);
        Ok(())
    }

    fn write_partition_deletion(&mut self, deletion: DeletionTime) -> row_index_engine::Result<()> {
        use row_index_engine::Encode;
        deletion.encode_into(&mut self.buf)?;
        Ok(())
    }

    fn write_static_row(&mut self, row: &Atom) -> row_index_engine::Result<()> {
        self.write_atom(row)
    }

    fn write_atom(&mut self, atom: &Atom) -> row_index_engine::Result<()> {
        use row_index_engine::version::MessagingVersion;
        row_index_engine::clustering::encode(
            &atom.clustering,
            &self.types,
            MessagingVersion::V3,
            &mut self.buf,
        )
        .map_err(Error::Decode)?;
        self.buf.push(u8::from(atom.is_range_tombstone_marker()));
        Ok(())
    }

    fn write_end_of_partition(&mut self) -> row_index_engine::Result<()> {
        self.buf.push(0xFF);
        Ok(())
    }

    fn mark(&self) -> FileMark {
        FileMark(self.buf.len() as u64)
    }

    fn reset_and_truncate(&mut self, mark: FileMark) -> row_index_engine::Result<()> {
        self.buf.truncate(mark.0 as usize);
        Ok(())
    }
}

struct VecIndexFile {
    buf: Vec<u8>,
}

impl IndexFileWriter for VecIndexFile {
    fn pointer(&self) -> i64 {
        self.buf.len() as i64
    }

    fn write_all(&mut self, bytes: &[u8]) -> row_index_engine::Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn mark(&self) -> FileMark {
        FileMark(self.buf.len() as u64)
    }

    fn reset_and_truncate(&mut self, mark: FileMark) -> row_index_engine::Result<()> {
        self.buf.truncate(mark.0 as usize);
        Ok(())
    }
}

#[derive(Default)]
struct NoopSink;

impl BoundaryRecorder for NoopSink {
    fn record_boundary(&mut self, _position: i64) {}
}

impl SummarySink for NoopSink {
    fn record(&mut self, _key: &[u8], _offset: i64) {}
}

impl FilterSink for NoopSink {
    fn add_key(&mut self, _key: &[u8]) {}
}

fn types() -> Vec<ClusteringType> {
    vec![ClusteringType::Variable]
}

fn name(s: &str) -> ClusteringPrefix {
    ClusteringPrefix::new(vec![Slice::from(s)])
}

fn row(s: &str) -> Atom {
    Atom::row(name(s))
}

fn new_index() -> PrimaryIndexWriter<VecIndexFile, NoopSink, NoopSink, NoopSink> {
    PrimaryIndexWriter::new(
        VecIndexFile { buf: Vec::new() },
        NoopSink,
        NoopSink,
        NoopSink,
    )
}

#[test]
fn scenario_1_empty_partition() {
    let mut data = VecDataWriter::new(types());
    let mut index = new_index();
    let mut boundary = NoopSink;
    let mut appender = PartitionAppender::new(types(), 65536);

    let mut atoms = std::iter::empty::<Atom>();
    appender
        .append(
            &mut data,
            &mut index,
            &mut boundary,
            b"k",
            DeletionTime::new(0, 0),
            None,
            &mut atoms,
        )
        .unwrap();

    // key len prefix (2B) + "k" (1B) + deletion (12B) + end-of-partition (1B)
    assert_eq!(2 + 1 + 12 + 1, data.buf.len());
    assert_eq!(0xFF, *data.buf.last().unwrap());
}

#[test]
fn scenario_2_single_small_row_is_bare() {
    let mut data = VecDataWriter::new(types());
    let mut index = new_index();
    let mut boundary = NoopSink;
    let mut appender = PartitionAppender::new(types(), 65536);

    let mut atoms = vec![row("only")].into_iter();
    appender
        .append(
            &mut data,
            &mut index,
            &mut boundary,
            b"k",
            DeletionTime::new(0, 0),
            None,
            &mut atoms,
        )
        .unwrap();

    // A Bare entry's wire form is exactly 12 bytes: position:i64 + payloadSize:i32(0).
    assert_eq!(12, index.mark().0 as usize);
}

#[test]
fn scenario_3_two_blocks_cover_the_whole_atoms_region() {
    use row_index_engine::RowIndexEntry;

    let mut data = VecDataWriter::new(types());
    let column_index_size_bytes = 64;
    let builder = row_index_engine::builder::RowIndexBuilder::new(column_index_size_bytes);

    let atoms: Vec<Atom> = (0..10).map(|i| row(&format!("key-{i:04}"))).collect();
    let mut atoms = atoms.into_iter();

    let entry: RowIndexEntry = builder
        .build(&mut data, b"k", DeletionTime::new(0, 0), None, &mut atoms, &types())
        .unwrap();

    assert!(entry.is_indexed());
    assert!(entry.columns_count() >= 2);

    let mut reader = entry.reader(&types()).unwrap();
    let n = reader.columns_count();

    let first = reader.index_info(0).unwrap();
    assert_eq!(0, first.offset);

    let mut total_width = 0i64;
    for i in 0..n {
        let info = reader.index_info(i).unwrap();
        if i + 1 < n {
            assert!(info.width >= i64::from(column_index_size_bytes));
        }
        total_width += info.width;
    }

    let last = reader.index_info(n - 1).unwrap();
    assert_eq!(last.offset + last.width, total_width);
}

#[test]
fn scenario_4_open_marker_across_three_blocks() {
    use row_index_engine::RowIndexEntry;

    let mut data = VecDataWriter::new(types());
    let builder = row_index_engine::builder::RowIndexBuilder::new(8);
    let dt = DeletionTime::new(7, 700);

    let atoms = vec![
        Atom::range_tombstone_marker(name("a"), true, dt),
        row("b"),
        row("c"),
        row("d"),
        row("e"),
        Atom::range_tombstone_marker(name("f"), false, dt),
        row("g"),
    ];
    let mut atoms = atoms.into_iter();

    let entry: RowIndexEntry = builder
        .build(&mut data, b"k", DeletionTime::new(0, 0), None, &mut atoms, &types())
        .unwrap();

    assert!(entry.is_indexed());
    let mut reader = entry.reader(&types()).unwrap();
    let n = reader.columns_count();
    assert!(n >= 3, "need at least 3 blocks to exercise the straddling case, got {n}");

    assert!(reader.index_info(0).unwrap().open_marker.is_some());
    assert!(reader.index_info(n - 1).unwrap().open_marker.is_none());
}

#[test]
fn scenario_5_out_of_order_append_is_rejected() {
    let mut data = VecDataWriter::new(types());
    let mut index = new_index();
    let mut boundary = NoopSink;
    let mut appender = PartitionAppender::new(types(), 65536);

    let mut atoms_b = vec![row("x")].into_iter();
    appender
        .append(
            &mut data,
            &mut index,
            &mut boundary,
            b"b",
            DeletionTime::new(0, 0),
            None,
            &mut atoms_b,
        )
        .unwrap();

    let data_pointer = data.pointer();
    let index_pointer = index.mark().0;

    let mut atoms_a = vec![row("y")].into_iter();
    let err = appender
        .append(
            &mut data,
            &mut index,
            &mut boundary,
            b"a",
            DeletionTime::new(0, 0),
            None,
            &mut atoms_a,
        )
        .unwrap_err();

    assert!(matches!(err, Error::OrderViolation));
    assert_eq!(data_pointer, data.pointer());
    assert_eq!(index_pointer, index.mark().0);
}

#[test]
fn scenario_6_reverse_seek_into_last_block() {
    use row_index_engine::clustering::ClusteringComparator;
    use row_index_engine::index_info::IndexInfo;
    use row_index_engine::RowIndexEntry;

    let infos = vec![
        IndexInfo {
            first_name: name("0"),
            last_name: name("5"),
            offset: 0,
            width: 10,
            open_marker: None,
        },
        IndexInfo {
            first_name: name("10"),
            last_name: name("15"),
            offset: 10,
            width: 10,
            open_marker: None,
        },
        IndexInfo {
            first_name: name("20"),
            last_name: name("25"),
            offset: 20,
            width: 10,
            open_marker: None,
        },
    ];
    let entry = RowIndexEntry::indexed(0, DeletionTime::LIVE, &infos, &types()).unwrap();
    let mut reader = entry.reader(&types()).unwrap();

    let idx = reader
        .index_of(&name("22"), &ClusteringComparator, true, 2)
        .unwrap();
    assert_eq!(2, idx);
}
