//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for node identifiers, object keys and vault paths.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// NodeId
// ============================================================================

/// Identifier of a row in the node table
///
/// Ids are generated by the relational store and never reused for another
/// entry while the row lives. A renamed node keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Name of this node's content-shadow child, `"<id>.md"`
    #[must_use]
    pub fn shadow_name(&self) -> String {
        format!("{}.md", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// BlobKey
// ============================================================================

/// Key of an object in the blob store
///
/// Images are stored verbatim under their file name; tracked documents are
/// stored under the name of their content-shadow node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobKey(String);

impl BlobKey {
    /// Key holding the processed content of the document owning `id`
    #[must_use]
    pub fn for_node(id: NodeId) -> Self {
        Self(id.shadow_name())
    }

    /// Key of an image asset, which is its bare file name
    #[must_use]
    pub fn for_image(file_name: &str) -> Self {
        Self(file_name.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlobKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// VaultPath
// ============================================================================

/// A normalized, vault-relative path using `/` as separator
///
/// The vault root is the empty path and is written as `/`. Construction strips
/// a leading `/` or `./`, and rejects empty, `.` and `..` segments so that a
/// path always names exactly one position in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultPath(String);

impl VaultPath {
    /// Create a new VaultPath from its textual form
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` for paths with empty, `.` or `..` segments
    pub fn new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref().trim_end_matches('/');
        let raw = raw
            .strip_prefix("./")
            .or_else(|| raw.strip_prefix('/'))
            .unwrap_or(raw);

        if raw.is_empty() || raw == "." {
            return Ok(Self::root());
        }

        for segment in raw.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(DomainError::InvalidPath(format!(
                    "Invalid path segment {segment:?} in {raw}"
                )));
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// The vault root
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment of the path; empty for the root
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Parent folder of this path
    ///
    /// Top-level entries have the root as parent; the root has none.
    #[must_use]
    pub fn parent(&self) -> Option<VaultPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Segments from the root to the leaf
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Append a single child name
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if `name` is not a single valid segment
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(DomainError::InvalidPath(format!(
                "Invalid path component: {name}"
            )));
        }
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Relative textual form, empty for the root
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VaultPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl FromStr for VaultPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VaultPath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VaultPath> for String {
    fn from(path: VaultPath) -> Self {
        path.0
    }
}
