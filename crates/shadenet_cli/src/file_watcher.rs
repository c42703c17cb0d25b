// SPDX-License-Identifier: MIT OR Apache-2.0
//! File system watcher for input documents.
//!
//! Provides debounced change events for individual files so `--watch` can
//! re-sync a material whenever its network is saved.

use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A watched file was created or modified
    Changed(PathBuf),
    /// A watched file was deleted
    Removed(PathBuf),
    /// An error occurred
    Error(String),
}

/// Map a notify event kind onto a file event for `path`
fn file_event(kind: &EventKind, path: PathBuf) -> Option<FileEvent> {
    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(FileEvent::Changed(path)),
        EventKind::Remove(_) => Some(FileEvent::Removed(path)),
        EventKind::Any | EventKind::Access(_) | EventKind::Other => None,
    }
}

/// Watches a set of files for changes
pub struct FileWatcher {
    /// The underlying debounced watcher
    watcher: Debouncer<RecommendedWatcher, RecommendedCache>,
    /// Receiver for file events
    event_rx: Receiver<FileEvent>,
    /// Watched files, canonicalized
    watched_files: Arc<RwLock<HashSet<PathBuf>>>,
    /// Watched parent directories
    watched_dirs: HashSet<PathBuf>,
}

impl FileWatcher {
    /// Create a watcher that reports changes after `debounce` of quiet
    pub fn new(debounce: Duration) -> Result<Self, notify::Error> {
        let (event_tx, event_rx) = mpsc::channel();
        let watched_files: Arc<RwLock<HashSet<PathBuf>>> = Arc::default();
        let files = Arc::clone(&watched_files);

        let watcher = new_debouncer(debounce, None, move |result: DebounceEventResult| match result {
            Ok(events) => {
                let files = files.read();
                for event in events {
                    let paths = event.paths.iter().filter(|p| files.contains(p.as_path()));
                    for path in paths {
                        if let Some(file_event) = file_event(&event.kind, path.clone()) {
                            let _ = event_tx.send(file_event);
                        }
                    }
                }
            }
            Err(errors) => {
                for error in errors {
                    let _ = event_tx.send(FileEvent::Error(error.to_string()));
                }
            }
        })?;

        Ok(Self {
            watcher,
            event_rx,
            watched_files,
            watched_dirs: HashSet::new(),
        })
    }

    /// Watch a file for changes.
    ///
    /// The file's directory is watched so that editors replacing the file on
    /// save are still noticed.
    pub fn watch_file(&mut self, path: impl AsRef<Path>) -> Result<(), notify::Error> {
        let path = path.as_ref().canonicalize()?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        if !self.watched_dirs.contains(&dir) {
            self.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            self.watched_dirs.insert(dir);
        }
        tracing::info!("Watching file for changes: {:?}", path);
        self.watched_files.write().insert(path);
        Ok(())
    }

    /// Get all watched files
    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.watched_files.read().iter().cloned().collect()
    }

    /// Poll for pending file events (non-blocking)
    pub fn poll_events(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("File watcher channel disconnected");
                    break;
                }
            }
        }
        events
    }

    /// Block until an event arrives or `timeout` elapses, then drain the rest
    pub fn wait_events(&self, timeout: Duration) -> Vec<FileEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut events = vec![first];
                events.extend(self.poll_events());
                events
            }
            Err(RecvTimeoutError::Timeout) => Vec::new(),
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("File watcher channel disconnected");
                Vec::new()
            }
        }
    }
}
