//! Syntax highlighting support: the fixed highlight-type table shared with
//! the output format, and a [`syntect`]-backed implementation of the
//! highlighter service.

use crate::services::{SyntaxHighlightError, SyntaxHighlighter};
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};
use syntect::util::LinesWithEndings;

/// The type of a highlighted token.
///
/// Each type has a *long* name, accepted by `\cowel_highlight_as`, and a
/// *short* name, emitted as the `data-h` attribute of `<h->` elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HighlightType {
    /// Attribute name in markup.
    Attribute,
    /// Comment.
    Comment,
    /// Delimiters of comments (like `//`).
    CommentDelimiter,
    /// Deletion (in `diff`).
    Deletion,
    /// Identifier.
    Identifier,
    /// Insertion (in `diff`).
    Insertion,
    /// Keyword.
    Keyword,
    /// `true`, `false`, and other such keywords.
    KeywordBoolean,
    /// Keyword for non-boolean constants, like `this` or `nullptr`.
    KeywordConstant,
    /// Keywords for control flow, like `if`.
    KeywordControl,
    /// Keyword for types, like `int`.
    KeywordType,
    /// Meta-instructions, like C++ preprocessor directives.
    Meta,
    /// Numeric literals.
    Number,
    /// String literal.
    String,
    /// Escape sequence in strings, like `\n`.
    StringEscape,
    /// Special characters, like operators.
    Symbol,
    /// Important special characters, like braces.
    SymbolImportant,
    /// Unimportant special characters, like punctuation.
    SymbolOther,
    /// Tag name in markup.
    Tag,
}

/// The long-form highlight names, as accepted by `\cowel_highlight_as`.
static LONG_NAMES: phf::Map<&'static str, HighlightType> = phf::phf_map! {
    "attribute" => HighlightType::Attribute,
    "comment" => HighlightType::Comment,
    "comment_delimiter" => HighlightType::CommentDelimiter,
    "deletion" => HighlightType::Deletion,
    "identifier" => HighlightType::Identifier,
    "insertion" => HighlightType::Insertion,
    "keyword" => HighlightType::Keyword,
    "keyword_boolean" => HighlightType::KeywordBoolean,
    "keyword_constant" => HighlightType::KeywordConstant,
    "keyword_control" => HighlightType::KeywordControl,
    "keyword_type" => HighlightType::KeywordType,
    "meta" => HighlightType::Meta,
    "number" => HighlightType::Number,
    "string" => HighlightType::String,
    "string_escape" => HighlightType::StringEscape,
    "symbol" => HighlightType::Symbol,
    "symbol_important" => HighlightType::SymbolImportant,
    "symbol_other" => HighlightType::SymbolOther,
    "tag" => HighlightType::Tag,
};

impl HighlightType {
    /// Looks a highlight type up by its long name.
    pub fn by_long_name(name: &str) -> Option<Self> {
        LONG_NAMES.get(name).copied()
    }

    /// Returns the value of the `data-h` attribute that spans highlighted
    /// with this type have.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Attribute => "attr",
            Self::Comment => "cmt",
            Self::CommentDelimiter => "cmt_delim",
            Self::Deletion => "del",
            Self::Identifier => "id",
            Self::Insertion => "ins",
            Self::Keyword => "kw",
            Self::KeywordBoolean => "kw_bool",
            Self::KeywordConstant => "kw_const",
            Self::KeywordControl => "kw_ctrl",
            Self::KeywordType => "kw_type",
            Self::Meta => "meta",
            Self::Number => "num",
            Self::String => "str",
            Self::StringEscape => "str_esc",
            Self::Symbol => "sym",
            Self::SymbolImportant => "sym_imp",
            Self::SymbolOther => "sym_etc",
            Self::Tag => "tag",
        }
    }
}

/// One highlighted token, as a byte range of the tokenized code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HighlightSpan {
    /// The byte offset of the first highlighted character.
    pub begin: usize,
    /// The length of the token, in bytes.
    pub length: usize,
    /// The type of the token.
    pub r#type: HighlightType,
}

impl HighlightSpan {
    /// The position past the last highlighted character.
    #[inline]
    pub fn end(&self) -> usize {
        self.begin + self.length
    }
}

/// A [`SyntaxHighlighter`] backed by syntect's default syntax definitions.
pub struct SyntectHighlighter {
    /// The loaded syntax definitions.
    syntax_set: SyntaxSet,
}

impl SyntectHighlighter {
    /// Creates a highlighter from the bundled syntax definitions.
    pub fn new() -> Self {
        Self { syntax_set: SyntaxSet::load_defaults_newlines() }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter for SyntectHighlighter {
    fn supported_languages(&self) -> Vec<&str> {
        self.syntax_set.syntaxes().iter().map(|syntax| syntax.name.as_str()).collect()
    }

    fn highlight(
        &self,
        out: &mut Vec<HighlightSpan>,
        code: &str,
        language: &str,
    ) -> Result<(), SyntaxHighlightError> {
        let Some(syntax) = self.syntax_set.find_syntax_by_token(language) else {
            return Err(SyntaxHighlightError::UnsupportedLanguage);
        };

        let mut spans = vec![];
        let mut parse_state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut line_start = 0;
        for line in LinesWithEndings::from(code) {
            let ops = parse_state
                .parse_line(line, &self.syntax_set)
                .map_err(|_| SyntaxHighlightError::BadCode)?;
            let mut last = 0;
            for (offset, op) in ops {
                push_span(&mut spans, &stack, line_start + last, offset - last);
                stack.apply(&op).map_err(|_| SyntaxHighlightError::Other)?;
                last = offset;
            }
            push_span(&mut spans, &stack, line_start + last, line.len() - last);
            line_start += line.len();
        }

        out.append(&mut spans);
        Ok(())
    }
}

/// Appends a span for the current scope stack, merging it into the previous
/// span when both are adjacent and have the same type.
fn push_span(out: &mut Vec<HighlightSpan>, stack: &ScopeStack, begin: usize, length: usize) {
    if length == 0 {
        return;
    }
    let Some(r#type) = classify(stack) else {
        return;
    };
    if let Some(last) = out.last_mut()
        && last.r#type == r#type
        && last.end() == begin
    {
        last.length += length;
        return;
    }
    out.push(HighlightSpan { begin, length, r#type });
}

/// Maps a syntect scope stack onto a highlight type.
///
/// The innermost scope wins. Scopes that have no reasonable mapping (most of
/// the `meta.*` and `source.*` structure scopes) yield no highlight at all.
fn classify(stack: &ScopeStack) -> Option<HighlightType> {
    for scope in stack.as_slice().iter().rev() {
        let name = scope.build_string();
        let mapped = if name.starts_with("comment.punctuation")
            || name.starts_with("punctuation.definition.comment")
        {
            Some(HighlightType::CommentDelimiter)
        } else if name.starts_with("comment") {
            Some(HighlightType::Comment)
        } else if name.starts_with("constant.character.escape") {
            Some(HighlightType::StringEscape)
        } else if name.starts_with("string") {
            Some(HighlightType::String)
        } else if name.starts_with("constant.numeric") {
            Some(HighlightType::Number)
        } else if name.starts_with("constant.language.bool")
            || name.starts_with("constant.language.boolean")
        {
            Some(HighlightType::KeywordBoolean)
        } else if name.starts_with("constant.language") {
            Some(HighlightType::KeywordConstant)
        } else if name.starts_with("storage.type") || name.starts_with("support.type") {
            Some(HighlightType::KeywordType)
        } else if name.starts_with("storage") {
            Some(HighlightType::Keyword)
        } else if name.starts_with("keyword.control") {
            Some(HighlightType::KeywordControl)
        } else if name.starts_with("keyword.operator") {
            Some(HighlightType::Symbol)
        } else if name.starts_with("keyword") {
            Some(HighlightType::Keyword)
        } else if name.starts_with("entity.name.tag") {
            Some(HighlightType::Tag)
        } else if name.starts_with("entity.other.attribute-name") {
            Some(HighlightType::Attribute)
        } else if name.starts_with("entity.name") || name.starts_with("support.function") {
            Some(HighlightType::Identifier)
        } else if name.starts_with("markup.deleted") {
            Some(HighlightType::Deletion)
        } else if name.starts_with("markup.inserted") {
            Some(HighlightType::Insertion)
        } else if name.starts_with("meta.preprocessor") {
            Some(HighlightType::Meta)
        } else if name.starts_with("punctuation") {
            Some(HighlightType::SymbolOther)
        } else {
            None
        };
        if mapped.is_some() {
            return mapped;
        }
    }
    None
}

/// A toy highlighter for tests: in the language `"x"`, every run of `x`
/// characters is a keyword and nothing else is highlighted.
#[cfg(test)]
pub(crate) struct XHighlighter;

#[cfg(test)]
impl SyntaxHighlighter for XHighlighter {
    fn supported_languages(&self) -> Vec<&str> {
        vec!["x"]
    }

    fn highlight(
        &self,
        out: &mut Vec<HighlightSpan>,
        code: &str,
        language: &str,
    ) -> Result<(), SyntaxHighlightError> {
        if language != "x" {
            return Err(SyntaxHighlightError::UnsupportedLanguage);
        }
        let bytes = code.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'x' {
                let begin = i;
                while i < bytes.len() && bytes[i] == b'x' {
                    i += 1;
                }
                out.push(HighlightSpan {
                    begin,
                    length: i - begin,
                    r#type: HighlightType::Keyword,
                });
            } else {
                i += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_names() {
        assert_eq!(HighlightType::by_long_name("keyword"), Some(HighlightType::Keyword));
        assert_eq!(HighlightType::Keyword.short_name(), "kw");
        assert_eq!(HighlightType::by_long_name("keyword_type"), Some(HighlightType::KeywordType));
        assert_eq!(HighlightType::KeywordType.short_name(), "kw_type");
        assert_eq!(HighlightType::by_long_name("number"), Some(HighlightType::Number));
        assert_eq!(HighlightType::Number.short_name(), "num");
        assert_eq!(HighlightType::by_long_name("kw"), None);
    }

    #[test]
    fn syntect_rejects_unknown_language() {
        let highlighter = SyntectHighlighter::new();
        let mut spans = vec![];
        assert_eq!(
            highlighter.highlight(&mut spans, "x", "not-a-language-anyone-has"),
            Err(SyntaxHighlightError::UnsupportedLanguage),
        );
    }

    #[test]
    fn syntect_finds_rust_keywords() {
        let highlighter = SyntectHighlighter::new();
        let mut spans = vec![];
        highlighter.highlight(&mut spans, "fn main() {}\n", "rs").unwrap();
        assert!(!spans.is_empty());
        // "fn" should come out as some keyword-ish span at offset 0.
        assert_eq!(spans[0].begin, 0);
    }
}
