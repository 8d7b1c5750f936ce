use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Change notifications delivered to the TUI tick loop.
#[derive(Debug)]
pub enum FileEvent {
    Changed(Vec<PathBuf>),
}

/// Watches a close workspace for edits made outside the running process,
/// so the board picks up a `cb status` or a hand-edited snapshot without
/// a restart.
pub struct CloseWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

/// Snapshot and config files count as workspace content. Bookkeeping the
/// process writes on its own (lock file, UI state, audit log) is dot
/// prefixed and ignored, as is anything outside the workspace.
fn is_tracked(close_dir: &Path, path: &Path) -> bool {
    if !path.starts_with(close_dir) {
        return false;
    }
    if let Some(name) = path.file_name().and_then(|n| n.to_str())
        && name.starts_with('.')
    {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("csv" | "toml" | "json")
    )
}

impl CloseWatcher {
    /// Start watching `close_dir` recursively. Call `poll` once per tick
    /// to drain whatever arrived since the previous one.
    pub fn start(close_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root = close_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                let changed: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| is_tracked(&root, p))
                    .collect();
                if !changed.is_empty() {
                    let _ = tx.send(FileEvent::Changed(changed));
                }
            },
            Config::default(),
        )?;
        watcher.watch(close_dir, RecursiveMode::Recursive)?;

        Ok(CloseWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending change events without blocking.
    pub fn poll(&self) -> Vec<FileEvent> {
        self.rx.try_iter().collect()
    }
}
