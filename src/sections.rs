//! Named output sections and the section-reference resolution pass.
//!
//! Directives do not write into one flat output buffer; they write into named
//! *sections*. A directive may also emit a *section reference*: a marker that
//! names another section whose content is spliced in after the document has
//! been fully evaluated. The marker is the UTF-8 encoding of a single
//! Supplementary Private Use Area-A code point carrying the length of the
//! section name, followed by the name itself, which makes detection O(1) per
//! code unit and leaves all other text untouched.

use crate::chars::{SUPPLEMENTARY_PUA_A_MAX, SUPPLEMENTARY_PUA_A_MIN};
use crate::codemap::Span;
use crate::diagnostics::{Diagnostic, Logger, Severity, diagnostic};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Well-known section names.
pub mod section_name {
    /// The bibliography, populated by `\bib` and spliced by `\make_bib`.
    pub const BIBLIOGRAPHY: &str = "std.bib";
    /// The table of contents, populated by headings.
    pub const TABLE_OF_CONTENTS: &str = "std.toc";
    /// Prefix for per-ID preview sections written by headings.
    pub const ID_PREVIEW: &str = "std.id-preview";
    /// The `<html>` skeleton of a full document.
    pub const DOCUMENT_HTML: &str = "std.html";
    /// The `<head>` contents of a full document.
    pub const DOCUMENT_HEAD: &str = "std.head";
    /// The `<body>` contents of a full document.
    pub const DOCUMENT_BODY: &str = "std.body";
}

/// The name of the root section, which always exists.
pub const ROOT_SECTION: &str = "";

/// The named output buffers of one compilation.
///
/// The map is ordered and never has entries removed, so an entry's index is a
/// stable identity for the lifetime of the run; the resolution pass uses
/// indices for its visited set.
#[derive(Debug)]
pub struct Sections {
    /// All sections, keyed by name.
    map: IndexMap<String, String>,
}

impl Default for Sections {
    fn default() -> Self {
        Self::new()
    }
}

impl Sections {
    /// Creates a section table containing only the empty root section.
    pub fn new() -> Self {
        let mut map = IndexMap::new();
        map.insert(String::from(ROOT_SECTION), String::new());
        Self { map }
    }

    /// Creates the section named `name` if it does not exist yet and returns
    /// its index.
    pub fn make(&mut self, name: &str) -> usize {
        if let Some(index) = self.map.get_index_of(name) {
            return index;
        }
        self.map.insert_full(name.to_string(), String::new()).0
    }

    /// Appends text to the section named `name`, creating it if needed.
    pub fn append(&mut self, name: &str, text: &str) {
        let index = self.make(name);
        self.map[index].push_str(text);
    }

    /// Returns the index of the section named `name`, if it exists.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.map.get_index_of(name)
    }

    /// Returns the text of the section named `name`, if it exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// Returns the text of the section at the given index.
    pub fn text_at(&self, index: usize) -> &str {
        &self.map[index]
    }

    /// Resolves all section references in the section named `name` and
    /// returns the resulting text, or `None` if no such section exists.
    ///
    /// Errors (missing or circular references) are reported through the
    /// logger; the offending reference resolves to nothing and resolution
    /// continues, so the result is always coherent.
    pub fn resolve(&self, name: &str, logger: &dyn Logger) -> Option<String> {
        let index = self.index_of(name)?;
        let mut visited = HashSet::from([index]);
        let mut out = String::with_capacity(self.text_at(index).len());
        resolve_into(&mut out, self.text_at(index), self, &mut visited, logger);
        Some(out)
    }
}

/// Appends a section reference marker for `name` to `out`.
///
/// Returns false, appending nothing, if the name is too long to encode.
pub fn reference_section(out: &mut String, name: &str) -> bool {
    const MAX_LENGTH: usize = (SUPPLEMENTARY_PUA_A_MAX - SUPPLEMENTARY_PUA_A_MIN) as usize;
    if name.len() > MAX_LENGTH {
        return false;
    }
    let marker = char::from_u32(SUPPLEMENTARY_PUA_A_MIN + name.len() as u32)
        .expect("PUA-A code points are scalar values");
    out.push(marker);
    out.push_str(name);
    true
}

/// The first code unit of any PUA-A marker, masked by
/// [`PUA_A_FIRST_UNIT_MASK`]. Only four-byte UTF-8 sequences can match.
const PUA_A_FIRST_UNIT_MASKED: u8 = 0b1111_0000;
/// A five-bit mask for the marker fast path. No ASCII or two/three-byte
/// sequence passes it.
const PUA_A_FIRST_UNIT_MASK: u8 = 0b1111_1000;

/// Splices `text` into `out`, recursively replacing section references.
///
/// Returns false if any reference failed to resolve.
fn resolve_into(
    out: &mut String,
    text: &str,
    sections: &Sections,
    visited: &mut HashSet<usize>,
    logger: &dyn Logger,
) -> bool {
    let report = |id, message: String| {
        if logger.can_log(Severity::Error) {
            logger.log(Diagnostic {
                severity: Severity::Error,
                id,
                location: Span::default(),
                message,
            });
        }
    };

    let bytes = text.as_bytes();
    let mut success = true;
    let mut plain_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        // Almost none of the text in a generated document is a section
        // reference, so test the leading code unit first; anything that is
        // not a four-byte sequence fails this.
        if bytes[i] & PUA_A_FIRST_UNIT_MASK != PUA_A_FIRST_UNIT_MASKED {
            i += 1;
            continue;
        }
        // The mask passes for any four-byte sequence, so decode and check the
        // actual code point. `i` is on a character boundary here because
        // continuation bytes never pass the mask.
        let code_point = text[i..].chars().next().unwrap() as u32;
        if !(SUPPLEMENTARY_PUA_A_MIN..=SUPPLEMENTARY_PUA_A_MAX).contains(&code_point) {
            i += 4;
            continue;
        }

        out.push_str(&text[plain_start..i]);
        let length = (code_point - SUPPLEMENTARY_PUA_A_MIN) as usize;
        let name_start = i + 4;
        let Some(name) = text.get(name_start..name_start + length) else {
            debug_assert!(false, "truncated section reference");
            i = text.len();
            plain_start = i;
            break;
        };
        i = name_start + length;
        plain_start = i;

        let Some(index) = sections.index_of(name) else {
            report(
                diagnostic::SECTION_REF_NOT_FOUND,
                format!("Invalid reference to section \"{name}\"."),
            );
            success = false;
            continue;
        };
        if !visited.insert(index) {
            report(
                diagnostic::SECTION_REF_CIRCULAR,
                format!("Circular dependency in reference to section \"{name}\"."),
            );
            success = false;
            continue;
        }
        success &= resolve_into(out, sections.text_at(index), sections, visited, logger);
        // Scoped removal, so sibling references to the same section are fine.
        visited.remove(&index);
    }
    out.push_str(&text[plain_start..]);
    success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingLogger, IgnorantLogger};

    #[test]
    fn marker_shape() {
        let mut out = String::new();
        assert!(reference_section(&mut out, "std.toc"));
        let marker = out.chars().next().unwrap() as u32;
        assert_eq!(marker, SUPPLEMENTARY_PUA_A_MIN + 7);
        assert_eq!(&out[4..], "std.toc");
    }

    #[test]
    fn resolves_simple_reference() {
        let mut sections = Sections::new();
        sections.append("std.toc", "contents");
        let mut root = String::from("a");
        reference_section(&mut root, "std.toc");
        root.push('b');
        sections.append(ROOT_SECTION, &root);

        let resolved = sections.resolve(ROOT_SECTION, &IgnorantLogger).unwrap();
        assert_eq!(resolved, "acontentsb");
    }

    #[test]
    fn resolves_nested_references() {
        let mut sections = Sections::new();
        let mut outer = String::from("[");
        reference_section(&mut outer, "inner");
        outer.push(']');
        sections.append("outer", &outer);
        sections.append("inner", "x");
        let mut root = String::new();
        reference_section(&mut root, "outer");
        sections.append(ROOT_SECTION, &root);

        let resolved = sections.resolve(ROOT_SECTION, &IgnorantLogger).unwrap();
        assert_eq!(resolved, "[x]");
    }

    #[test]
    fn missing_section_reports_and_skips() {
        let mut sections = Sections::new();
        let mut root = String::from("a");
        reference_section(&mut root, "nope");
        root.push('b');
        sections.append(ROOT_SECTION, &root);

        let logger = CollectingLogger::new();
        let resolved = sections.resolve(ROOT_SECTION, &logger).unwrap();
        assert_eq!(resolved, "ab");
        assert!(logger.was_logged(diagnostic::SECTION_REF_NOT_FOUND));
    }

    #[test]
    fn cycle_is_broken() {
        let mut sections = Sections::new();
        let mut a = String::from("a");
        reference_section(&mut a, "B");
        sections.append("A", &a);
        let mut b = String::from("b");
        reference_section(&mut b, "A");
        sections.append("B", &b);
        let mut root = String::new();
        reference_section(&mut root, "A");
        sections.append(ROOT_SECTION, &root);

        let logger = CollectingLogger::new();
        let resolved = sections.resolve(ROOT_SECTION, &logger).unwrap();
        assert_eq!(resolved, "ab");
        assert!(logger.was_logged(diagnostic::SECTION_REF_CIRCULAR));
    }

    #[test]
    fn sibling_references_are_not_cycles() {
        let mut sections = Sections::new();
        sections.append("x", "x");
        let mut root = String::new();
        reference_section(&mut root, "x");
        reference_section(&mut root, "x");
        sections.append(ROOT_SECTION, &root);

        let logger = CollectingLogger::new();
        let resolved = sections.resolve(ROOT_SECTION, &logger).unwrap();
        assert_eq!(resolved, "xx");
        assert!(logger.take().is_empty());
    }

    #[test]
    fn output_never_contains_markers() {
        let mut sections = Sections::new();
        sections.append("s", "text");
        let mut root = String::from("plain ");
        reference_section(&mut root, "s");
        reference_section(&mut root, "missing");
        sections.append(ROOT_SECTION, &root);

        let resolved = sections.resolve(ROOT_SECTION, &IgnorantLogger).unwrap();
        assert!(
            resolved
                .chars()
                .all(|c| !(SUPPLEMENTARY_PUA_A_MIN..=SUPPLEMENTARY_PUA_A_MAX).contains(&(c as u32)))
        );
    }
}
