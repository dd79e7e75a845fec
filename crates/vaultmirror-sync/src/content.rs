//! Content processing for document uploads
//!
//! Two rewrites run in order before a document is uploaded:
//!
//! 1. `![](<name>excalidraw.svg)` links are made absolute against the bucket URL
//! 2. `%%...%%` comments are removed
//!
//! Links are rewritten first since comment markers may wrap link syntax.
//! Neither pattern crosses a line break, and a link target never contains `)`.

use regex::{Captures, Regex};

/// Rewrites document text for publication
#[derive(Debug, Clone)]
pub struct ContentProcessor {
    base_url: String,
    drawing_link: Regex,
    comment: Regex,
}

impl ContentProcessor {
    /// Creates a processor that points drawing links at `base_url`
    ///
    /// `base_url` must end with `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            drawing_link: Regex::new(r"!\[\]\(([^)]+?excalidraw\.svg)\)")
                .expect("drawing link pattern is valid"),
            comment: Regex::new(r"%%.+?%%").expect("comment pattern is valid"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn process(&self, text: &str) -> String {
        let linked = self
            .drawing_link
            .replace_all(text, |caps: &Captures<'_>| {
                format!("![]({}{})", self.base_url, &caps[1])
            });
        self.comment.replace_all(&linked, "").into_owned()
    }
}
