//! Commit-message accumulator shared by a batch's workers.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Entries {
    files: BTreeSet<PathBuf>,
    lines: Vec<String>,
}

/// Touched files and log lines of one update, safe to append to from
/// several workers.
#[derive(Debug)]
pub struct Journal {
    subject: String,
    started: DateTime<Utc>,
    entries: Mutex<Entries>,
}

impl Journal {
    /// Journal for `Update <what> to <version>`.
    ///
    /// Without a version the subject names the date the update ran.
    pub fn new(what: &str, version: Option<&str>) -> Self {
        let started = Utc::now();
        let version = version.map_or_else(|| started.format("%Y-%m-%d").to_string(), str::to_string);
        Self {
            subject: format!("Update {what} to {version}"),
            started,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a line to the message body.
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("> {line}");
        self.entries().lines.push(line);
    }

    /// Record a file written by the update.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.entries().files.insert(path.as_ref().to_path_buf());
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.entries().files.iter().cloned().collect()
    }

    /// Nothing touched and nothing logged.
    pub fn is_empty(&self) -> bool {
        let entries = self.entries();
        entries.files.is_empty() && entries.lines.is_empty()
    }

    /// Subject, blank line, then the logged lines.
    pub fn message(&self) -> String {
        let entries = self.entries();
        let mut message = format!("{}\n\n", self.subject);
        for line in &entries.lines {
            message.push_str(line);
            message.push('\n');
        }
        message
    }

    /// Write the message, unless there is nothing to commit.
    ///
    /// Returns whether a file was written.
    pub fn write_to(&self, path: &Path) -> std::io::Result<bool> {
        if self.is_empty() {
            tracing::info!("Nothing to commit for {}", self.subject);
            return Ok(false);
        }
        std::fs::write(path, self.message())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_message_layout() {
        let journal = Journal::new("Scripts", Some("231"));
        journal.log("lost script bank 12");
        journal.add_file("scripts/bank.rs2asm");
        assert_eq!(journal.message(), "Update Scripts to 231\n\nlost script bank 12\n");
        assert_eq!(journal.files(), vec![PathBuf::from("scripts/bank.rs2asm")]);
    }

    #[test]
    fn test_subject_defaults_to_date() {
        let journal = Journal::new("Widget IDs", None);
        let expected = format!("Update Widget IDs to {}", journal.started().format("%Y-%m-%d"));
        assert_eq!(journal.subject(), expected);
    }

    #[test]
    fn test_concurrent_appends() {
        let journal = Arc::new(Journal::new("Scripts", Some("1")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let journal = Arc::clone(&journal);
                std::thread::spawn(move || {
                    for j in 0..25 {
                        journal.log(format!("{i}:{j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(journal.message().lines().count(), 2 + 8 * 25);
    }

    #[test]
    fn test_empty_journal_writes_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("COMMIT_MSG");
        let journal = Journal::new("Scripts", Some("1"));
        assert!(!journal.write_to(&path).unwrap());
        assert!(!path.exists());
    }
}
