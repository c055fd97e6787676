//! A data structure for tracking source positions in language implementations,
//! heavily adapted from [codemap](https://crates.io/crates/codemap).

/// A range of text within a source string.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Span {
    /// The position of the first byte of the span.
    pub start: usize,

    /// The position after the last byte of the span.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    /// The length of the span, in bytes.
    #[inline]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    /// Creates a span that encloses both `self` and `other`.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[inline]
    /// Converts the span into a range that can be used for string indexing.
    // This is not just using `From<core::ops::Range<usize>` because type
    // resolution fails in common use with `.into()` which eliminates any
    // benefit of using a standard conversion trait
    pub fn into_range(self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    /// Returns the text of this span within `source`.
    #[inline]
    pub fn of(self, source: &str) -> &str {
        &source[self.into_range()]
    }
}

/// A line and column position within a source file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineCol {
    /// The 1-indexed line number.
    pub line: usize,
    /// The 1-indexed column number, in characters.
    pub column: usize,
    /// The byte offset within the file.
    pub offset: usize,
}

/// A record of a source file’s lines.
#[derive(Clone)]
pub struct FileMap<'a> {
    /// The source file.
    source: &'a str,

    /// Byte positions of line beginnings.
    lines: Vec<u32>,
}

impl core::fmt::Debug for FileMap<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut limit = 100.min(self.source.len());
        while !self.source.is_char_boundary(limit) {
            limit += 1;
        }

        f.debug_struct("FileMap")
            .field(
                "source",
                &format!(
                    "{}{}",
                    &self.source[..limit],
                    if self.source.len() > limit { "…" } else { "" }
                ),
            )
            .finish()
    }
}

impl core::ops::Deref for FileMap<'_> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.source
    }
}

impl<'a> FileMap<'a> {
    /// Creates a new file map over the given source.
    pub fn new(source: &'a str) -> Self {
        let lines = core::iter::once(0)
            .chain(
                source
                    .match_indices('\n')
                    .map(|(p, _)| u32::try_from(p + 1).unwrap()),
            )
            .collect();

        Self { source, lines }
    }

    /// Gets the line and column of a byte position.
    ///
    /// # Panics
    ///
    /// * If `pos` is not within this file's span
    /// * If `pos` points to a byte in the middle of a UTF-8 character
    pub fn find_line_col(&self, pos: usize) -> LineCol {
        let line = self.find_line(pos);
        let line_span = self.line_span(line);
        let column = self.source[line_span.start..pos].chars().count();
        LineCol {
            line: line + 1,
            column: column + 1,
            offset: pos,
        }
    }

    /// Gets the line number of a byte position.
    ///
    /// The lines are 0-indexed (first line is numbered 0)
    ///
    /// # Panics
    ///
    ///  * If `pos` is not within this file's span
    fn find_line(&self, pos: usize) -> usize {
        assert!(pos <= self.source.len());
        let pos = u32::try_from(pos).unwrap();
        match self.lines.binary_search(&pos) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }

    /// Gets the span representing a line by line number.
    ///
    /// The line number is 0-indexed (first line is numbered 0). The returned
    /// span includes the line terminator.
    ///
    /// # Panics
    ///
    ///  * If the line number is out of range
    fn line_span(&self, line: usize) -> Span {
        self.lines
            .get(line)
            .map(|start| Span {
                start: usize::try_from(*start).unwrap(),
                end: self
                    .lines
                    .get(line + 1)
                    .map_or(self.source.len(), |end| usize::try_from(*end).unwrap()),
            })
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col() {
        let map = FileMap::new("ab\ncd\n\nefg");
        assert_eq!(map.find_line_col(0).line, 1);
        assert_eq!(map.find_line_col(0).column, 1);
        assert_eq!(map.find_line_col(4).line, 2);
        assert_eq!(map.find_line_col(4).column, 2);
        assert_eq!(map.find_line_col(7).line, 4);
    }

    #[test]
    fn merge() {
        let merged = Span::new(3, 5).merge(Span::new(9, 12));
        assert_eq!(merged, Span::new(3, 12));
        assert_eq!(merged.len(), 9);
    }
}
