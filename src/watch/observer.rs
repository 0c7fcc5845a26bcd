//! Native file-system observer backed by `notify`

use crate::watch::WatchRule;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Capacity of the change channel between the backend thread and the loop
const CHANGE_BUFFER: usize = 64;

/// Start watching `root` recursively
///
/// Only batches with at least one path matching `rule` are forwarded. The
/// returned watcher must be kept alive for as long as events are wanted.
pub fn spawn(
    root: &Path,
    rule: WatchRule,
) -> notify::Result<(RecommendedWatcher, mpsc::Receiver<Vec<PathBuf>>)> {
    let (tx, rx) = mpsc::channel(CHANGE_BUFFER);
    let watched_root = root.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                warn!("File watcher error: {}", e);
                return;
            }
        };

        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }

        let matched: Vec<PathBuf> = event
            .paths
            .into_iter()
            .filter(|path| rule.matches_path(&watched_root, path))
            .collect();
        if matched.is_empty() {
            return;
        }

        match tx.try_send(matched) {
            Ok(()) => {}
            // Earlier matching batches are still queued, so a run is already due
            Err(TrySendError::Full(_)) => debug!("Change buffer full; change covered by queued batch"),
            Err(TrySendError::Closed(_)) => debug!("Watch loop gone; dropping change"),
        }
    })?;

    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok((watcher, rx))
}
