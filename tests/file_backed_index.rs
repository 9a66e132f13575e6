// Copyright (c) 2024-present, the row-index-engine authors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Exercises the abort/rollback protocol against a real file, not just an
//! in-memory buffer.

use row_index_engine::appender::IndexFileWriter;
use row_index_engine::atom::FileMark;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

struct FileIndexWriter {
    file: File,
    position: i64,
}

impl FileIndexWriter {
    fn new(file: File) -> Self {
        Self { file, position: 0 }
    }
}

impl IndexFileWriter for FileIndexWriter {
    fn pointer(&self) -> i64 {
        self.position
    }

    fn write_all(&mut self, bytes: &[u8]) -> row_index_engine::Result<()> {
        self.file.write_all(bytes)?;
        self.position += bytes.len() as i64;
        Ok(())
    }

    fn mark(&self) -> FileMark {
        FileMark(self.position as u64)
    }

    fn reset_and_truncate(&mut self, mark: FileMark) -> row_index_engine::Result<()> {
        self.file.set_len(mark.0)?;
        self.file.seek(SeekFrom::Start(mark.0))?;
        self.position = mark.0 as i64;
        Ok(())
    }
}

#[test]
fn rollback_truncates_a_real_file_back_to_its_mark() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("primary_index");
    let file = File::create(&path).unwrap();
    let mut writer = FileIndexWriter::new(file);

    writer.write_all(b"first-record").unwrap();
    let mark = writer.mark();

    writer.write_all(b"second-record-that-will-be-rolled-back").unwrap();
    assert!(writer.pointer() > mark.0 as i64);

    writer.reset_and_truncate(mark).unwrap();
    assert_eq!(mark.0 as i64, writer.pointer());

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(b"first-record".as_slice(), on_disk.as_slice());
}
