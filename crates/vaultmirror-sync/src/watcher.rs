//! File watching and event coalescing
//!
//! Provides a [`FileWatcher`] that wraps the `notify` crate to monitor the
//! vault directory, converting raw OS events into [`ChangeEvent`] values.
//!
//! [`coalesce_events`] then thins a drained batch of vault events so that an
//! editor's burst of writes to one file becomes a single upload.
//!
//! ## Architecture
//!
//! ```text
//! inotify / FSEvents / kqueue
//!       │
//!       ▼
//!  FileWatcher  ──→  mpsc::channel  ──→  EventDispatcher  ──→  SyncEngine
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use vaultmirror_core::domain::VaultEvent;

// ============================================================================
// ChangeEvent
// ============================================================================

/// A filesystem change detected by the watcher, with absolute paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created(PathBuf),
    /// Content written
    Modified(PathBuf),
    Deleted(PathBuf),
    /// Both halves of a rename, as reported by the backend
    Renamed { old: PathBuf, new: PathBuf },
}

impl ChangeEvent {
    /// Path the event is about; the destination for renames
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(p) | ChangeEvent::Modified(p) | ChangeEvent::Deleted(p) => p,
            ChangeEvent::Renamed { new, .. } => new,
        }
    }
}

// ============================================================================
// FileWatcher
// ============================================================================

/// Recursive OS watcher over the vault; stops when dropped
///
/// Events are mapped on the backend's thread and pushed into a bounded
/// channel read by the [`EventDispatcher`](crate::EventDispatcher).
pub struct FileWatcher {
    watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Builds the watcher and the receiving end of its event channel
    pub fn new() -> Result<(Self, mpsc::Receiver<ChangeEvent>)> {
        let (event_tx, event_rx) = mpsc::channel::<ChangeEvent>(1024);

        let watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if let Some(change) = map_notify_event(&event) {
                        if let Err(e) = event_tx.blocking_send(change) {
                            warn!(error = %e, "Dispatcher gone, change event dropped");
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, "Vault watcher reported an error");
                }
            },
            notify::Config::default(),
        )
        .context("Could not start the OS file watcher")?;

        Ok((Self { watcher }, event_rx))
    }

    /// Watches `path` and everything below it
    ///
    /// Fails when the directory is missing, unreadable, or the inotify watch
    /// limit is reached.
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        info!(vault = %path.display(), "Watching vault");

        self.watcher
            .watch(path, RecursiveMode::Recursive)
            .with_context(|| format!("Cannot watch {}", path.display()))
    }

    pub fn unwatch(&mut self, path: &Path) -> Result<()> {
        info!(vault = %path.display(), "Vault no longer watched");

        self.watcher
            .unwatch(path)
            .with_context(|| format!("Cannot stop watching {}", path.display()))
    }
}

// ============================================================================
// Event mapping - notify::Event → ChangeEvent
// ============================================================================

/// Whether the platform watcher reports `Name(Both)` after the two halves
const RENAMES_PAIRED: bool = cfg!(target_os = "linux");

/// Converts a `notify::Event` into a `ChangeEvent`
///
/// - `Create(*)` -> `Created`
/// - `Modify(Data(*))` and `Modify(Any)` -> `Modified`
/// - `Modify(Name(Both))` with 2 paths -> `Renamed`
/// - `Remove(*)` -> `Deleted`
///
/// Half renames (`Name(From)`, `Name(To)`, `Name(Any)`) are dropped. Only the
/// inotify backend follows them with a paired `Name(Both)`; on macOS and
/// Windows renames are therefore not mirrored and each one logs a warning.
/// Metadata and access events carry no content change and are dropped too.
fn map_notify_event(event: &notify::Event) -> Option<ChangeEvent> {
    let paths = &event.paths;

    match &event.kind {
        EventKind::Create(_) => {
            let path = paths.first()?;
            debug!(path = %path.display(), "create");
            Some(ChangeEvent::Created(path.clone()))
        }

        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            let path = paths.first()?;
            debug!(path = %path.display(), "modify");
            Some(ChangeEvent::Modified(path.clone()))
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match paths.as_slice() {
            [old, new, ..] => {
                debug!(
                    old = %old.display(),
                    new = %new.display(),
                    "rename"
                );
                Some(ChangeEvent::Renamed {
                    old: old.clone(),
                    new: new.clone(),
                })
            }
            _ => {
                debug!(paths = paths.len(), "Rename without both paths, ignoring");
                None
            }
        },

        EventKind::Modify(ModifyKind::Name(_)) => {
            if RENAMES_PAIRED {
                debug!(kind = ?event.kind, "Half rename, waiting for paired event");
            } else {
                warn!(
                    kind = ?event.kind,
                    paths = ?paths,
                    "Rename not mirrored, backend does not pair rename events"
                );
            }
            None
        }

        EventKind::Remove(_) => {
            let path = paths.first()?;
            debug!(path = %path.display(), "remove");
            Some(ChangeEvent::Deleted(path.clone()))
        }

        _ => {
            debug!(kind = ?event.kind, "Event kind not mirrored");
            None
        }
    }
}

// ============================================================================
// Coalescing
// ============================================================================

/// Drops redundant modifications from a batch of events
///
/// A `Modified(p)` directly following a `Created(p)` or `Modified(p)` adds
/// nothing: the earlier handler already uploads the current content. All
/// other events keep their order.
pub fn coalesce_events(events: Vec<VaultEvent>) -> Vec<VaultEvent> {
    let mut out: Vec<VaultEvent> = Vec::with_capacity(events.len());

    for event in events {
        if let VaultEvent::Modified(entry) = &event {
            let redundant = matches!(
                out.last(),
                Some(VaultEvent::Created(prev) | VaultEvent::Modified(prev)) if prev.path() == entry.path()
            );
            if redundant {
                debug!(path = %entry, "Coalesced modify event");
                continue;
            }
        }
        out.push(event);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultmirror_core::domain::{VaultEntry, VaultPath};

    fn entry(s: &str) -> VaultEntry {
        VaultEntry::file(VaultPath::new(s).unwrap())
    }

    #[test]
    fn test_change_event_path() {
        assert_eq!(
            ChangeEvent::Created(PathBuf::from("/a.md")).path(),
            Path::new("/a.md")
        );
        let renamed = ChangeEvent::Renamed {
            old: PathBuf::from("/old.md"),
            new: PathBuf::from("/new.md"),
        };
        assert_eq!(renamed.path(), Path::new("/new.md"));
    }

    // ------------------------------------------------------------------
    // Event mapping tests
    // ------------------------------------------------------------------

    fn raw(kind: EventKind, paths: &[&str]) -> notify::Event {
        notify::Event {
            kind,
            paths: paths.iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    #[test]
    fn test_map_create_modify_remove() {
        use notify::event::{CreateKind, DataChange, RemoveKind};

        let cases = [
            (
                EventKind::Create(CreateKind::Folder),
                ChangeEvent::Created(PathBuf::from("/v/a")),
            ),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                ChangeEvent::Modified(PathBuf::from("/v/a")),
            ),
            (
                EventKind::Modify(ModifyKind::Any),
                ChangeEvent::Modified(PathBuf::from("/v/a")),
            ),
            (
                EventKind::Remove(RemoveKind::Any),
                ChangeEvent::Deleted(PathBuf::from("/v/a")),
            ),
        ];
        for (kind, expected) in cases {
            assert_eq!(map_notify_event(&raw(kind, &["/v/a"])), Some(expected));
        }
    }

    #[test]
    fn test_map_paired_rename() {
        let event = raw(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/v/draft.md", "/v/done/final.md"],
        );
        assert_eq!(
            map_notify_event(&event),
            Some(ChangeEvent::Renamed {
                old: PathBuf::from("/v/draft.md"),
                new: PathBuf::from("/v/done/final.md"),
            })
        );
    }

    #[test]
    fn test_map_ignores_unpaired_and_non_content_events() {
        use notify::event::{AccessKind, CreateKind, MetadataKind};

        let ignored = [
            raw(EventKind::Modify(ModifyKind::Name(RenameMode::Both)), &["/v/a"]),
            raw(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/v/a"]),
            raw(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/v/a"]),
            raw(
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                &["/v/a"],
            ),
            raw(EventKind::Access(AccessKind::Any), &["/v/a"]),
            raw(EventKind::Create(CreateKind::File), &[]),
        ];
        for event in ignored {
            assert_eq!(map_notify_event(&event), None, "{:?}", event.kind);
        }
    }

    #[test]
    fn test_map_drops_half_renames_on_every_platform() {
        for mode in [RenameMode::From, RenameMode::To, RenameMode::Any] {
            let event = raw(EventKind::Modify(ModifyKind::Name(mode)), &["/v/a.md"]);
            assert_eq!(map_notify_event(&event), None, "{mode:?}");
        }
    }

    // ------------------------------------------------------------------
    // Coalescing tests
    // ------------------------------------------------------------------

    #[test]
    fn test_coalesce_modify_after_create() {
        let events = vec![
            VaultEvent::Created(entry("a.md")),
            VaultEvent::Modified(entry("a.md")),
            VaultEvent::Modified(entry("a.md")),
        ];
        assert_eq!(
            coalesce_events(events),
            vec![VaultEvent::Created(entry("a.md"))]
        );
    }

    #[test]
    fn test_coalesce_keeps_interleaved_paths() {
        let events = vec![
            VaultEvent::Modified(entry("a.md")),
            VaultEvent::Modified(entry("b.md")),
            VaultEvent::Modified(entry("a.md")),
        ];
        assert_eq!(coalesce_events(events.clone()), events);
    }

    #[test]
    fn test_coalesce_keeps_modify_after_delete() {
        let events = vec![
            VaultEvent::Deleted(entry("a.md")),
            VaultEvent::Modified(entry("a.md")),
        ];
        assert_eq!(coalesce_events(events.clone()), events);
    }

    #[test]
    fn test_coalesce_preserves_renames() {
        let events = vec![
            VaultEvent::Renamed {
                entry: entry("b.md"),
                old_path: VaultPath::new("a.md").unwrap(),
            },
            VaultEvent::Modified(entry("b.md")),
        ];
        assert_eq!(coalesce_events(events.clone()), events);
    }

    #[test]
    fn test_coalesce_empty() {
        assert!(coalesce_events(Vec::new()).is_empty());
    }
}
