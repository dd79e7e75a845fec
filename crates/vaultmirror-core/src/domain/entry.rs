//! Vault entries and filesystem events
//!
//! A [`VaultEntry`] is the live handle of a folder or file inside the vault.
//! Its parent back-reference is derived from the path, so entries stay cheap
//! to clone and can outlive the filesystem object they describe (a deleted
//! file still has a name and a parent).

use std::fmt;

use super::newtypes::VaultPath;

/// Whether an entry is a folder or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Folder,
    File,
}

/// A folder or file inside the vault
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultEntry {
    path: VaultPath,
    kind: EntryKind,
}

impl VaultEntry {
    pub fn new(path: VaultPath, kind: EntryKind) -> Self {
        Self { path, kind }
    }

    pub fn file(path: VaultPath) -> Self {
        Self::new(path, EntryKind::File)
    }

    pub fn folder(path: VaultPath) -> Self {
        Self::new(path, EntryKind::Folder)
    }

    /// The vault root folder
    pub fn root() -> Self {
        Self::folder(VaultPath::root())
    }

    pub fn path(&self) -> &VaultPath {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// The folder containing this entry, `None` for the root
    pub fn parent(&self) -> Option<VaultEntry> {
        self.path.parent().map(VaultEntry::folder)
    }
}

impl fmt::Display for VaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

/// Target of a node lookup
///
/// `ByHandle` walks the live entry's ancestors. `ByPath` is used when the
/// entry at a path no longer exists under that name, e.g. the old path of a
/// rename.
#[derive(Debug, Clone, Copy)]
pub enum EntryRef<'a> {
    ByHandle(&'a VaultEntry),
    ByPath(&'a VaultPath),
}

impl EntryRef<'_> {
    pub fn path(&self) -> &VaultPath {
        match self {
            EntryRef::ByHandle(entry) => entry.path(),
            EntryRef::ByPath(path) => path,
        }
    }
}

/// A filesystem mutation reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    Created(VaultEntry),
    Deleted(VaultEntry),
    Modified(VaultEntry),
    /// `entry` is the entry at its new location
    Renamed {
        entry: VaultEntry,
        old_path: VaultPath,
    },
}

impl VaultEvent {
    /// The entry the event applies to (the new location for renames)
    pub fn entry(&self) -> &VaultEntry {
        match self {
            VaultEvent::Created(e) | VaultEvent::Deleted(e) | VaultEvent::Modified(e) => e,
            VaultEvent::Renamed { entry, .. } => entry,
        }
    }

    /// Short name of the event kind, for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            VaultEvent::Created(_) => "create",
            VaultEvent::Deleted(_) => "delete",
            VaultEvent::Modified(_) => "modify",
            VaultEvent::Renamed { .. } => "rename",
        }
    }
}
