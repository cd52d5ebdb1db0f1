//! Event Logger
//!
//! Append-only JSONL event logging.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use conquest_events::Event;

/// Records drained events, one JSON object per line
#[derive(Debug)]
pub struct EventLogger {
    sink: Option<(PathBuf, BufWriter<File>)>,
    event_count: u64,
}

impl EventLogger {
    /// Start a fresh log at `path`, replacing any existing file
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::open(path.as_ref(), OpenOptions::new().write(true).create(true).truncate(true))
    }

    /// Continue an existing log at `path`
    pub fn append(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::open(path.as_ref(), OpenOptions::new().append(true).create(true))
    }

    fn open(path: &Path, options: &OpenOptions) -> std::io::Result<Self> {
        let file = options.open(path)?;
        Ok(Self {
            sink: Some((path.to_path_buf(), BufWriter::new(file))),
            event_count: 0,
        })
    }

    /// A logger that only counts
    pub fn null() -> Self {
        Self {
            sink: None,
            event_count: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|(path, _)| path.as_path())
    }

    /// Events seen since creation
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        if let Some((_, writer)) = self.sink.as_mut() {
            writeln!(writer, "{}", event.to_jsonl()?)?;
        }
        self.event_count += 1;
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[Event]) -> std::io::Result<()> {
        events.iter().try_for_each(|event| self.log(event))
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        match self.sink.as_mut() {
            Some((_, writer)) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = ?self.path(), "failed to flush event log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_events::fixtures;
    use std::fs;
    use std::io::BufRead;

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let events = fixtures::sample_events();
        {
            let mut logger = EventLogger::new(&path).unwrap();
            logger.log_batch(&events).unwrap();
            assert_eq!(logger.event_count(), events.len() as u64);
        }

        let file = fs::File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), events.len());

        let parsed: Vec<Event> = lines.iter().map(|l| Event::from_jsonl(l).unwrap()).collect();
        assert_eq!(parsed, events);
    }

    #[test]
    fn test_append_continues_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let events = fixtures::sample_events();

        EventLogger::new(&path).unwrap().log_batch(&events[..3]).unwrap();
        {
            let mut logger = EventLogger::append(&path).unwrap();
            assert_eq!(logger.path(), Some(path.as_path()));
            logger.log_batch(&events[3..]).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), events.len());
    }

    #[test]
    fn test_null_logger_counts_only() {
        let mut logger = EventLogger::null();
        logger.log(&fixtures::victory_event()).unwrap();
        assert_eq!(logger.event_count(), 1);
        assert!(logger.flush().is_ok());
    }
}
