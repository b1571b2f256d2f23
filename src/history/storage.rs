//! Persistent storage for request history.
//!
//! Each service owns a history directory of sequentially numbered entry
//! files plus a `HEAD` marker holding the newest sequence number:
//!
//! ```text
//! history/
//!   00001      GET\nservers\n
//!   00002      POST\nservers\n{ ...body... }\n
//!   HEAD       00002
//! ```
//!
//! Entry files are self-describing, so the log can be rebuilt from the
//! directory listing alone if `HEAD` is lost (see [`History::repair`]).
//!
//! Writes keep entry-before-pointer ordering: an entry is created with
//! `create_new`, synced, and only then is `HEAD` replaced through a
//! write-to-temp-and-rename. A concurrent writer that already claimed a
//! sequence number is never overwritten; the later writer moves on to the
//! next free number.

use super::models::{HistoryEntry, HistoryError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

/// Name of the marker file holding the newest sequence number.
pub const HEAD_FILE: &str = "HEAD";

/// Width of zero-padded entry file names.
pub const SEQUENCE_WIDTH: usize = 5;

/// Entry file names: decimal sequence numbers.
static ENTRY_FILE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("Failed to compile entry file regex"));

/// Result of [`History::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The entry was written at this sequence number.
    Stored(u64),

    /// The entry repeats the most recent one and was not written.
    Duplicate,
}

/// Append-only history log of one service.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    /// Opens the history log at `path`, creating the directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(Self { path })
    }

    /// Directory holding the log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the newest sequence number, or 0 if the log is empty or the
    /// `HEAD` marker is missing or unreadable.
    pub fn last(&self) -> u64 {
        fs::read_to_string(self.path.join(HEAD_FILE))
            .ok()
            .and_then(|content| content.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }

    /// Appends a request to the log.
    ///
    /// A request identical (method, resource and body) to the current newest
    /// entry is not stored again.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method as sent
    /// * `resource` - Relative resource path or absolute URI
    /// * `body` - Serialized body, if any; an empty body is stored as none
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidEntry` if the method or resource contains
    /// a line break; nothing is allocated in that case.
    /// Returns `HistoryError::StorageError` if the entry or `HEAD` cannot be
    /// written. A partially written entry file is removed.
    pub fn store(
        &self,
        method: &str,
        resource: &str,
        body: Option<&str>,
    ) -> Result<StoreOutcome, HistoryError> {
        let entry = HistoryEntry::new(method, resource, body.map(str::to_string));
        if !entry.is_storable() {
            return Err(HistoryError::InvalidEntry(format!(
                "line break in {} {:?}",
                method, resource
            )));
        }
        let last = self.last();

        if last > 0 {
            if let Ok(previous) = self.read_sequence(last, true) {
                if previous.same_request(&entry) {
                    log::debug!("history: {} {} repeats entry {}", method, resource, last);
                    return Ok(StoreOutcome::Duplicate);
                }
            }
        }

        let mut sequence = last + 1;
        let (mut file, entry_path) = loop {
            let entry_path = self.entry_path(sequence);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&entry_path)
            {
                Ok(file) => break (file, entry_path),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    log::warn!(
                        "history: entry {:05} already exists beyond HEAD, skipping",
                        sequence
                    );
                    sequence += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if let Err(e) = write_entry(&mut file, &entry) {
            drop(file);
            let _ = fs::remove_file(&entry_path);
            return Err(e.into());
        }
        drop(file);

        self.write_head(sequence)?;
        log::debug!("history: stored {} {} as {:05}", method, resource, sequence);
        Ok(StoreOutcome::Stored(sequence))
    }

    /// Iterates entries from most recent (index 1) to oldest.
    ///
    /// The walk ends silently at the first missing or unreadable entry.
    ///
    /// # Arguments
    ///
    /// * `include_body` - Whether to load entry bodies
    pub fn items(&self, include_body: bool) -> HistoryItems<'_> {
        HistoryItems {
            history: self,
            last: self.last(),
            next_index: 1,
            include_body,
            done: false,
        }
    }

    /// Returns the entry at recency index `index` (1 = most recent).
    ///
    /// # Errors
    ///
    /// `HistoryError::NotFound` if the index is 0, beyond the newest entry
    /// count, or maps to a missing or unreadable file.
    pub fn get(&self, index: usize) -> Result<HistoryEntry, HistoryError> {
        let last = self.last();
        if index == 0 || index as u64 > last {
            return Err(HistoryError::NotFound { index });
        }

        let sequence = last - index as u64 + 1;
        let mut entry = self.read_sequence(sequence, true).map_err(|e| {
            log::debug!("history: entry {:05} unreadable: {}", sequence, e);
            HistoryError::NotFound { index }
        })?;
        entry.index = Some(index);
        Ok(entry)
    }

    /// Rebuilds `HEAD` from the highest-numbered entry file.
    ///
    /// # Returns
    ///
    /// The sequence number `HEAD` now records (0 for an empty log).
    pub fn repair(&self) -> Result<u64, HistoryError> {
        let mut highest = 0;
        for dir_entry in fs::read_dir(&self.path)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !ENTRY_FILE_REGEX.is_match(name) {
                continue;
            }
            if let Ok(sequence) = name.parse::<u64>() {
                highest = highest.max(sequence);
            }
        }

        if highest != self.last() {
            if highest == 0 {
                let head = self.path.join(HEAD_FILE);
                if head.exists() {
                    fs::remove_file(head)?;
                }
            } else {
                self.write_head(highest)?;
            }
            log::warn!("history: HEAD rebuilt as {:05}", highest);
        }

        Ok(highest)
    }

    fn entry_path(&self, sequence: u64) -> PathBuf {
        self.path.join(format!("{:0width$}", sequence, width = SEQUENCE_WIDTH))
    }

    fn read_sequence(
        &self,
        sequence: u64,
        include_body: bool,
    ) -> Result<HistoryEntry, HistoryError> {
        let contents = fs::read_to_string(self.entry_path(sequence))?;
        HistoryEntry::from_file_contents(&contents, include_body)
            .ok_or(HistoryError::Corrupt { sequence })
    }

    fn write_head(&self, sequence: u64) -> Result<(), HistoryError> {
        let temp_path = self
            .path
            .join(format!("{}.{}.{}.tmp", HEAD_FILE, std::process::id(), sequence));
        let mut temp_file = File::create(&temp_path)?;
        write!(temp_file, "{:0width$}", sequence, width = SEQUENCE_WIDTH)?;
        temp_file.flush()?;
        temp_file.sync_all()?;
        drop(temp_file);

        fs::rename(&temp_path, self.path.join(HEAD_FILE))?;
        Ok(())
    }
}

fn write_entry(file: &mut File, entry: &HistoryEntry) -> io::Result<()> {
    file.write_all(entry.to_file_contents().as_bytes())?;
    file.flush()?;
    file.sync_all()
}

/// Lazy newest-first walk over a history log.
///
/// Created by [`History::items`].
#[derive(Debug)]
pub struct HistoryItems<'a> {
    history: &'a History,
    last: u64,
    next_index: usize,
    include_body: bool,
    done: bool,
}

impl Iterator for HistoryItems<'_> {
    type Item = HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next_index as u64 > self.last {
            self.done = true;
            return None;
        }

        let index = self.next_index;
        let sequence = self.last - index as u64 + 1;
        match self.history.read_sequence(sequence, self.include_body) {
            Ok(mut entry) => {
                entry.index = Some(index);
                self.next_index += 1;
                Some(entry)
            }
            Err(e) => {
                log::debug!("history: walk stopped at {:05}: {}", sequence, e);
                self.done = true;
                None
            }
        }
    }
}

impl FusedIterator for HistoryItems<'_> {}
