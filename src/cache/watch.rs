//! File watching for dependency-tracked caches.
//!
//! ```text
//! notify callback → channel → forwarding thread → ApplicationCache::invalidate_path
//! ```
//!
//! The notify callback only sends; eviction hooks (which may re-render
//! and register new directories) run on the forwarding thread.

use std::path::{Path, PathBuf};
use std::sync::Weak;

use crossbeam::channel::{Receiver, unbounded};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use super::ApplicationCache;

/// Watcher handle plus the directories attached to it.
pub(super) struct DirWatcher {
    watcher: RecommendedWatcher,
    attached: FxHashSet<PathBuf>,
}

impl DirWatcher {
    /// Start watching, forwarding events to `cache` until it is dropped.
    pub(super) fn spawn(cache: Weak<ApplicationCache>) -> notify::Result<Self> {
        let (tx, rx) = unbounded();
        let watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        std::thread::Builder::new()
            .name("packtag-watch".to_string())
            .spawn(move || forward(rx, cache))
            .map_err(notify::Error::io)?;

        Ok(Self {
            watcher,
            attached: FxHashSet::default(),
        })
    }

    /// Watch the directory containing `file`, once per directory.
    pub(super) fn attach_parent(&mut self, file: &Path) {
        let Some(dir) = file.parent() else {
            return;
        };
        if self.attached.contains(dir) || !dir.exists() {
            return;
        }
        match self.watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                crate::debug!("watch"; "watching {}", dir.display());
                self.attached.insert(dir.to_path_buf());
            }
            Err(e) => crate::debug!("watch"; "cannot watch {}: {}", dir.display(), e),
        }
    }

    pub(super) fn attached(&self) -> usize {
        self.attached.len()
    }
}

fn forward(rx: Receiver<notify::Result<Event>>, cache: Weak<ApplicationCache>) {
    while let Ok(result) = rx.recv() {
        let Some(cache) = cache.upgrade() else {
            break;
        };
        match result {
            Ok(event) if is_content_event(&event.kind) => {
                for path in &event.paths {
                    cache.invalidate_path(path);
                }
            }
            Ok(_) => {}
            Err(e) => crate::log!("watch"; "notify error: {}", e),
        }
    }
}

/// Access and metadata-only events never change file content.
fn is_content_event(kind: &EventKind) -> bool {
    !matches!(
        kind,
        EventKind::Access(_) | EventKind::Modify(ModifyKind::Metadata(_))
    )
}
