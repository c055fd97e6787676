//! Service interfaces injected into the compiler by its environment:
//! file loading, syntax highlighting, and bibliography storage.
//!
//! The logger service lives in [`crate::diagnostics`].

use crate::highlight::HighlightSpan;
use std::collections::HashMap;

/// An error returned by the syntax highlighter service.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SyntaxHighlightError {
    /// The requested language is not supported.
    #[error("the language is not supported")]
    UnsupportedLanguage,
    /// The code could not be tokenized as the requested language.
    #[error("the code is not valid for the language")]
    BadCode,
    /// An internal error in the highlighter.
    #[error("internal syntax highlighting error")]
    Other,
}

/// The syntax highlighter service.
pub trait SyntaxHighlighter {
    /// Returns the set of supported languages, usable as hints in
    /// [`Self::highlight`], in no particular order.
    fn supported_languages(&self) -> Vec<&str>;

    /// Tokenizes `code` under the given language hint, appending the
    /// highlighted spans to `out` in source order.
    ///
    /// On failure, nothing is appended.
    fn highlight(
        &self,
        out: &mut Vec<HighlightSpan>,
        code: &str,
        language: &str,
    ) -> Result<(), SyntaxHighlightError>;
}

/// A syntax highlighter that supports no languages.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSupportHighlighter;

impl SyntaxHighlighter for NoSupportHighlighter {
    fn supported_languages(&self) -> Vec<&str> {
        vec![]
    }

    fn highlight(
        &self,
        _: &mut Vec<HighlightSpan>,
        _: &str,
        _: &str,
    ) -> Result<(), SyntaxHighlightError> {
        Err(SyntaxHighlightError::UnsupportedLanguage)
    }
}

/// An error returned by the file loader service.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FileLoadError {
    /// Generic I/O error.
    #[error("I/O error")]
    Error,
    /// The file was not found.
    #[error("file not found")]
    NotFound,
    /// A disk error occurred while reading the file.
    #[error("read error")]
    ReadError,
    /// There are no permissions to read the file.
    #[error("permission denied")]
    Permissions,
    /// The file contains corrupted UTF-8 data.
    #[error("corrupted UTF-8 data")]
    Corrupted,
}

/// A successfully loaded file.
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// An identifier for the file, unique within one loader.
    pub id: u32,
    /// The file's source text.
    pub source: String,
    /// The display name of the file. Not necessarily the path it was
    /// requested under.
    pub name: String,
}

/// The file loader service.
pub trait FileLoader {
    /// Loads a file into memory.
    fn load(&mut self, path: &str) -> Result<FileEntry, FileLoadError>;
}

/// A file loader that fails every request, for embeddings without a
/// file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysFailingFileLoader;

impl FileLoader for AlwaysFailingFileLoader {
    fn load(&mut self, _: &str) -> Result<FileEntry, FileLoadError> {
        Err(FileLoadError::Error)
    }
}

/// Information about one referenced document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DocumentInfo {
    /// ID by which the document is referenced elsewhere. For example,
    /// `Knuth01`.
    pub id: String,
    /// Title of the publication.
    pub title: String,
    /// The date of publication.
    pub date: String,
    /// The publisher.
    pub publisher: String,
    /// The primary (short) link to the document.
    pub link: String,
    /// The long link to the document.
    pub long_link: String,
    /// A link to issue tracking for the document.
    pub issue_link: String,
    /// The author(s).
    pub author: String,
}

/// The bibliography service.
pub trait Bibliography {
    /// Finds a document by its ID.
    fn find(&self, id: &str) -> Option<&DocumentInfo>;

    /// Returns true if a document with the given ID is registered.
    fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Registers a document. Returns false if the ID was already taken.
    fn insert(&mut self, info: DocumentInfo) -> bool;

    /// Removes all registered documents.
    fn clear(&mut self);
}

/// An in-memory bibliography.
#[derive(Debug, Default)]
pub struct SimpleBibliography {
    /// Registered documents by ID.
    entries: HashMap<String, DocumentInfo>,
}

impl SimpleBibliography {
    /// Creates an empty bibliography.
    pub fn new() -> Self {
        <_>::default()
    }
}

impl Bibliography for SimpleBibliography {
    fn find(&self, id: &str) -> Option<&DocumentInfo> {
        self.entries.get(id)
    }

    fn insert(&mut self, info: DocumentInfo) -> bool {
        match self.entries.entry(info.id.clone()) {
            std::collections::hash_map::Entry::Occupied(..) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(info);
                true
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bibliography_rejects_duplicates() {
        let mut bibliography = SimpleBibliography::new();
        let info = DocumentInfo { id: "N4950".into(), ..<_>::default() };
        assert!(bibliography.insert(info.clone()));
        assert!(!bibliography.insert(info));
        assert!(bibliography.contains("N4950"));
        assert!(bibliography.find("N4951").is_none());
    }

    #[test]
    fn no_support_highlighter() {
        let mut spans = vec![];
        assert_eq!(
            NoSupportHighlighter.highlight(&mut spans, "int x;", "cpp"),
            Err(SyntaxHighlightError::UnsupportedLanguage),
        );
        assert!(spans.is_empty());
    }
}
