//! Decomposition of repository paths into composite-document part paths.

use serde::{Deserialize, Serialize};

/// Which directory names are treated as composite documents.
///
/// A composite document is stored as a directory whose name carries one of
/// the configured extensions (`design.sketch/`). Every file below it is a
/// part of that document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeLayout {
    /// Extensions without the leading dot (e.g. `"sketch"`).
    pub extensions: Vec<String>,
}

impl Default for CompositeLayout {
    fn default() -> Self {
        Self {
            extensions: vec!["sketch".to_string()],
        }
    }
}

impl CompositeLayout {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Does `name` (a single path component) name a composite document?
    pub fn is_document_name(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            name.strip_suffix(ext.as_str())
                .and_then(|stem| stem.strip_suffix('.'))
                .is_some_and(|stem| !stem.is_empty())
        })
    }

    /// Part path for a repository-relative path.
    ///
    /// The first segment is the document directory including everything in
    /// front of it, so two documents with the same name in different folders
    /// get distinct group ids. Paths outside any document yield an empty
    /// part path.
    ///
    /// ```
    /// use changelist::v1::CompositeLayout;
    ///
    /// let layout = CompositeLayout::default();
    /// assert_eq!(
    ///     layout.part_path("art/logo.sketch/pages/cover.json"),
    ///     vec!["art/logo.sketch", "pages", "cover.json"],
    /// );
    /// assert!(layout.part_path("src/main.rs").is_empty());
    /// ```
    pub fn part_path(&self, path: &str) -> Vec<String> {
        let is_dir = path.ends_with('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // Only directory components can be documents; a trailing slash
        // makes the last component a directory too.
        let dir_count = if is_dir {
            segments.len()
        } else {
            segments.len().saturating_sub(1)
        };

        let Some(doc) = segments[..dir_count]
            .iter()
            .position(|segment| self.is_document_name(segment))
        else {
            return Vec::new();
        };

        let mut part_path = Vec::with_capacity(segments.len() - doc);
        part_path.push(segments[..=doc].join("/"));
        part_path.extend(segments[doc + 1..].iter().map(|s| s.to_string()));
        part_path
    }

    /// True when `path` is a document directory itself, as reported for a
    /// document that was just added and is still untracked as a whole.
    pub fn is_fresh_document(&self, path: &str) -> bool {
        path.strip_suffix('/')
            .and_then(|dir| dir.rsplit('/').next())
            .is_some_and(|name| self.is_document_name(name))
    }
}
