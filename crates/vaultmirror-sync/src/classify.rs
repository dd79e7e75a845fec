//! Entry classification
//!
//! Every vault entry falls into exactly one [`EntryClass`]. Drawing exports
//! are recognised by their file name; images by living below the configured
//! image folder.

use vaultmirror_core::domain::{VaultEntry, VaultPath};

/// File name suffix of drawing exports
pub const DRAWING_EXPORT_SUFFIX: &str = ".excalidraw.md";

/// Content type of processed markdown uploads
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// How the mirror treats an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Uploaded verbatim under its file name
    Image,
    /// Derived artifact, never mirrored
    DrawingExport,
    /// Mirrored into the node table with processed content
    Document,
}

pub fn is_drawing_export(name: &str) -> bool {
    name.ends_with(DRAWING_EXPORT_SUFFIX)
}

/// Whether `path` lies below a folder named `image_folder`
///
/// Only ancestor segments count; the image folder itself is a plain folder.
pub fn in_image_folder(path: &VaultPath, image_folder: &str) -> bool {
    path.parent()
        .is_some_and(|parent| parent.segments().any(|segment| segment == image_folder))
}

/// Classifies an entry; image, then drawing export, then document
pub fn classify(entry: &VaultEntry, image_folder: &str) -> EntryClass {
    let drawing = is_drawing_export(entry.name());
    if in_image_folder(entry.path(), image_folder) && !drawing {
        EntryClass::Image
    } else if drawing {
        EntryClass::DrawingExport
    } else {
        EntryClass::Document
    }
}

/// Content type for an uploaded file, guessed from its extension
///
/// Unknown extensions fall back to `application/octet-stream`.
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
