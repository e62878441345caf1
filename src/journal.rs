//! Append-only intent/commit journal.
//!
//! Every record is kept in memory. A journal can additionally be mirrored to a sink, in which
//! case each record is written as one JSON object per line and flushed:
//!
//! ```text
//! {"type":"intent","action":"write","path":"/docs/a"}
//! {"type":"commit","action":"write","path":"/docs/a"}
//! ```
//!
//! Records carry no payload, so the journal is a trace of what was attempted and what
//! completed. It cannot redo or undo anything.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Appended before an operation touches any state.
    Intent,
    /// Appended once the operation has completed.
    Commit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    #[serde(rename = "type")]
    pub type_: RecordType,
    pub action: String,
    pub path: String,
}

impl JournalRecord {
    pub fn intent(action: &str, path: &str) -> Self {
        Self {
            type_: RecordType::Intent,
            action: action.to_owned(),
            path: path.to_owned(),
        }
    }

    pub fn commit(action: &str, path: &str) -> Self {
        Self {
            type_: RecordType::Commit,
            action: action.to_owned(),
            path: path.to_owned(),
        }
    }
}

enum Sink {
    File(File),
    Writer(Box<dyn Write + Send>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::File(file) => file,
            Sink::Writer(writer) => writer.as_mut(),
        }
    }
}

#[derive(Default)]
pub struct Journal {
    records: Vec<JournalRecord>,
    sink: Option<Sink>,
}

impl Journal {
    /// Constructs a journal that lives only in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a journal that mirrors every record to `writer`.
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            records: vec![],
            sink: Some(Sink::Writer(Box::new(writer))),
        }
    }

    /// Reads a journal file into a memory-only journal. The file is never written.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            records: parse_journal(&fs::read(path)?),
            sink: None,
        })
    }

    /// Opens (or creates) a journal file for appending.
    ///
    /// Records already in the file are loaded, so [`Self::read_all`] reflects the whole file.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let records = match fs::read(path) {
            Ok(data) => parse_journal(&data),
            Err(err) if err.kind() == io::ErrorKind::NotFound => vec![],
            Err(err) => return Err(err),
        };

        let file = File::options().create(true).append(true).open(path)?;
        debug!(
            "opened journal {} with {} existing records",
            path.display(),
            records.len()
        );

        Ok(Self {
            records,
            sink: Some(Sink::File(file)),
        })
    }

    /// Appends one record, writing it through to the sink if there is one.
    ///
    /// The record is kept in memory even if the sink fails.
    pub fn append(&mut self, record: JournalRecord) -> io::Result<()> {
        debug!("journal: {:?} {} {}", record.type_, record.action, record.path);

        let result = match &mut self.sink {
            Some(sink) => write_record(sink.writer(), &record),
            None => Ok(()),
        };

        self.records.push(record);
        result
    }

    pub fn read_all(&self) -> &[JournalRecord] {
        &self.records
    }

    /// Drops every record. A journal file is truncated; other sinks are left as they are.
    pub fn clear(&mut self) -> io::Result<()> {
        self.records.clear();

        if let Some(Sink::File(file)) = &self.sink {
            file.set_len(0)?;
        }

        Ok(())
    }

    /// Intents that were never committed.
    ///
    /// Operations run one at a time, so a commit closes the most recent open intent with the
    /// same action and path. An older intent for that key stays open.
    pub fn uncommitted(&self) -> Vec<&JournalRecord> {
        let mut open: Vec<Option<&JournalRecord>> = vec![];
        let mut pending: HashMap<(&str, &str), Vec<usize>> = HashMap::new();

        for record in &self.records {
            let key = (record.action.as_str(), record.path.as_str());
            match record.type_ {
                RecordType::Intent => {
                    pending.entry(key).or_default().push(open.len());
                    open.push(Some(record));
                }
                RecordType::Commit => {
                    if let Some(i) = pending.get_mut(&key).and_then(Vec::pop) {
                        open[i] = None;
                    }
                }
            }
        }

        open.into_iter().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("records", &self.records)
            .field("mirrored", &self.sink.is_some())
            .finish()
    }
}

fn write_record(writer: &mut dyn Write, record: &JournalRecord) -> io::Result<()> {
    let line = serde_json::to_string(record)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Parses JSON-lines journal data.
///
/// Blank lines and lines that fail to parse (e.g. a torn final write) are skipped.
pub fn parse_journal(data: &[u8]) -> Vec<JournalRecord> {
    String::from_utf8_lossy(data)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}
