//! In-memory line source, batch writer and progress reporter for engine tests
//!
//! Everything records into one shared [`EventLog`], so tests can assert on
//! the global order in which tasks opened files, read chunks and committed
//! batches.

#![allow(dead_code)]

use async_trait::async_trait;
use pgseed::{Batch, BatchError, BatchWriter, LineReader, LineSource, ProgressReporter, ProgressUnit, SeedConfig};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, Subscriber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(String),
    Read { label: String, lines: usize },
    SubmitStart { label: String, statements: usize },
    SubmitEnd(String),
    SubmitFailed(String),
    Register { label: String, total: u64 },
    Advance { label: String, lines: u64 },
    Complete(String),
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, wanted: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == wanted)
    }

    pub fn reads(&self, label: &str) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Read { label: l, lines } if l == label => Some(lines),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self, label: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::SubmitEnd(l) if l == label))
            .count()
    }

    pub fn opened(&self, label: &str) -> bool {
        self.position(&Event::Open(label.to_string())).is_some()
    }
}

fn label_of(location: &Path) -> String {
    location
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Files held in memory, keyed by location
#[derive(Clone, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<Vec<u8>>>,
    fail_count: HashSet<PathBuf>,
    fail_read: HashSet<PathBuf>,
    log: EventLog,
}

impl MemorySource {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn with_lines(mut self, location: &str, count: usize) -> Self {
        let lines = (0..count).map(|i| format!("{}", i).into_bytes()).collect();
        self.files.insert(PathBuf::from(location), lines);
        self
    }

    pub fn failing_count(mut self, location: &str) -> Self {
        self.fail_count.insert(PathBuf::from(location));
        self
    }

    pub fn failing_read(mut self, location: &str) -> Self {
        self.fail_read.insert(PathBuf::from(location));
        self
    }
}

#[async_trait]
impl LineSource for MemorySource {
    async fn open(&self, location: &Path) -> io::Result<Box<dyn LineReader>> {
        let lines = self
            .files
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;

        let label = label_of(location);
        self.log.push(Event::Open(label.clone()));

        Ok(Box::new(MemoryReader {
            label,
            lines,
            position: 0,
            fail_count: self.fail_count.contains(location),
            fail_read: self.fail_read.contains(location),
            log: self.log.clone(),
        }))
    }
}

struct MemoryReader {
    label: String,
    lines: Vec<Vec<u8>>,
    position: usize,
    fail_count: bool,
    fail_read: bool,
    log: EventLog,
}

#[async_trait]
impl LineReader for MemoryReader {
    async fn total_lines(&mut self) -> io::Result<u64> {
        if self.fail_count {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "count failed"));
        }
        Ok(self.lines.len() as u64)
    }

    async fn read_lines(&mut self, max: usize) -> io::Result<Vec<Vec<u8>>> {
        if self.fail_read {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated stream"));
        }

        let end = (self.position + max).min(self.lines.len());
        let chunk = self.lines[self.position..end].to_vec();
        self.position = end;

        self.log.push(Event::Read {
            label: self.label.clone(),
            lines: chunk.len(),
        });
        tokio::task::yield_now().await;
        Ok(chunk)
    }
}

/// Writer that records submissions. The first statement's SQL text is the
/// task label (see [`task`]).
#[derive(Clone, Default)]
pub struct RecordingWriter {
    log: EventLog,
    delays: HashMap<String, Duration>,
    fail_execute_at: HashMap<String, usize>,
    fail_close_at: HashMap<String, usize>,
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl RecordingWriter {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, label: &str, delay: Duration) -> Self {
        self.delays.insert(label.to_string(), delay);
        self
    }

    /// Fail the `chunk`-th (1-based) submission of `label` while executing
    pub fn failing_execute_at(mut self, label: &str, chunk: usize) -> Self {
        self.fail_execute_at.insert(label.to_string(), chunk);
        self
    }

    /// Fail the `chunk`-th (1-based) submission of `label` while closing
    pub fn failing_close_at(mut self, label: &str, chunk: usize) -> Self {
        self.fail_close_at.insert(label.to_string(), chunk);
        self
    }
}

#[async_trait]
impl BatchWriter for RecordingWriter {
    async fn submit(&self, batch: Batch, cancel: &CancellationToken) -> Result<(), BatchError> {
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }

        let label = batch
            .statements()
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default();

        let nth = {
            let mut counts = self.counts.lock().unwrap();
            let n = counts.entry(label.clone()).or_insert(0);
            *n += 1;
            *n
        };

        self.log.push(Event::SubmitStart {
            label: label.clone(),
            statements: batch.len(),
        });

        match self.delays.get(&label) {
            Some(delay) => tokio::time::sleep(*delay).await,
            None => tokio::task::yield_now().await,
        }

        if self.fail_execute_at.get(&label) == Some(&nth) {
            self.log.push(Event::SubmitFailed(label));
            return Err(BatchError::Execute(sqlx::Error::Protocol("duplicate key value".into())));
        }

        if self.fail_close_at.get(&label) == Some(&nth) {
            self.log.push(Event::SubmitFailed(label));
            return Err(BatchError::Close(sqlx::Error::PoolClosed));
        }

        self.log.push(Event::SubmitEnd(label));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingProgress {
    log: EventLog,
}

impl RecordingProgress {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl ProgressReporter for RecordingProgress {
    fn register_unit(&self, label: &str, total: u64) -> Box<dyn ProgressUnit> {
        self.log.push(Event::Register {
            label: label.to_string(),
            total,
        });
        Box::new(RecordingUnit {
            label: label.to_string(),
            log: self.log.clone(),
        })
    }
}

struct RecordingUnit {
    label: String,
    log: EventLog,
}

#[async_trait]
impl ProgressUnit for RecordingUnit {
    fn advance(&self, completed: u64, _elapsed: Duration) {
        self.log.push(Event::Advance {
            label: self.label.clone(),
            lines: completed,
        });
    }

    async fn complete_and_wait(&self) {
        self.log.push(Event::Complete(self.label.clone()));
    }
}

/// A task over `<label>.gz` whose handler queues one statement per line with
/// the label as its SQL text
pub fn task(label: &'static str, chunk_size: usize) -> SeedConfig {
    SeedConfig::new(format!("{}.gz", label), move |batch, _line| {
        batch.queue(sqlx::query(label));
        Ok(())
    })
    .with_chunk_size(chunk_size)
}

/// Collects formatted log output so tests can assert on what was logged
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// A plain-text subscriber writing everything at `level` or above here
    pub fn subscriber(&self, level: Level) -> impl Subscriber + Send + Sync {
        let logs = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || logs.clone())
            .with_ansi(false)
            .with_max_level(level)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
