//! JSONL (JSON Lines) table files.
//!
//! Each table is one file, each line one entity. Unparseable lines are
//! skipped with a warning so a single corrupt row cannot brick a load.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::StorageError;

/// Persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFile {
    Teams,
    Leagues,
    Population,
    Periods,
    SnapshotsMain,
    SnapshotsArchive,
}

impl TableFile {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            TableFile::Teams => "teams.jsonl",
            TableFile::Leagues => "leagues.jsonl",
            TableFile::Population => "population.jsonl",
            TableFile::Periods => "periods.jsonl",
            TableFile::SnapshotsMain => "main.jsonl",
            TableFile::SnapshotsArchive => "archive.jsonl",
        }
    }
}

/// A typed JSONL file.
pub struct JsonlFile<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonlFile<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl<T: Serialize> JsonlFile<T> {
    /// Write entities, replacing the entire file.
    pub fn write_all<'a, I>(&self, entities: I) -> Result<usize, StorageError>
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        debug!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

impl<T: DeserializeOwned> JsonlFile<T> {
    /// Read all entities from the file. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        line_num, self.path, e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestEntity {
        id: u64,
        name: String,
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.jsonl");

        let entities = vec![
            TestEntity {
                id: 1,
                name: "First".to_string(),
            },
            TestEntity {
                id: 2,
                name: "Second".to_string(),
            },
        ];

        let file: JsonlFile<TestEntity> = JsonlFile::new(path.clone());
        assert_eq!(file.write_all(&entities).unwrap(), 2);

        let read = file.read_all().unwrap();
        assert_eq!(read, entities);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file: JsonlFile<TestEntity> = JsonlFile::new(temp_dir.path().join("nope.jsonl"));
        assert!(!file.exists());
        assert!(file.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_all_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("overwrite.jsonl");
        let file: JsonlFile<TestEntity> = JsonlFile::new(path);

        file.write_all(&[TestEntity {
            id: 1,
            name: "Old".to_string(),
        }])
        .unwrap();
        file.write_all(&[
            TestEntity {
                id: 2,
                name: "New".to_string(),
            },
            TestEntity {
                id: 3,
                name: "Newer".to_string(),
            },
        ])
        .unwrap();

        let read = file.read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].name, "New");
    }

    #[test]
    fn test_read_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        std::fs::write(
            &path,
            r#"{"id":1,"name":"Good"}
not-valid-json

{"id":2,"name":"Also Good"}
"#,
        )
        .unwrap();

        let file: JsonlFile<TestEntity> = JsonlFile::new(path);
        let read = file.read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].name, "Also Good");
    }

    #[test]
    fn test_table_filenames() {
        assert_eq!(TableFile::Teams.filename(), "teams.jsonl");
        assert_eq!(TableFile::SnapshotsMain.filename(), "main.jsonl");
        assert_eq!(TableFile::SnapshotsArchive.filename(), "archive.jsonl");
    }
}
