//! The COWEL syntax tree.
//!
//! The tree is immutable after parsing and outlives the evaluation context.
//! Text-bearing nodes store [`Span`]s into the source buffer instead of owned
//! strings; only [`Generated`] content, which is synthesised by directive
//! behaviors rather than parsed, owns its characters.

use crate::codemap::Span;
use crate::policy::OutputLanguage;

/// A single piece of document content.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Content {
    /// A run of literal text.
    Text(Text),
    /// A two-character escape sequence such as `\{`.
    Escape(Escape),
    /// A line comment from `\:` to the end of the line.
    Comment(Comment),
    /// A directive invocation.
    Directive(Directive),
    /// Synthetic content injected by a behavior; never produced by parsing.
    Generated(Generated),
}

impl Content {
    /// The span of this content in the source.
    ///
    /// Generated content has an empty span at the position it was injected.
    pub fn span(&self) -> Span {
        match self {
            Content::Text(text) => text.span,
            Content::Escape(escape) => escape.span,
            Content::Comment(comment) => comment.span,
            Content::Directive(directive) => directive.span,
            Content::Generated(generated) => generated.span,
        }
    }
}

/// A run of literal source text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Text {
    /// The source span of the text.
    pub span: Span,
}

/// An escape sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Escape {
    /// The source span of the escape, including the leading backslash.
    pub span: Span,
}

impl Escape {
    /// Returns the expansion of this escape.
    ///
    /// For most escapes this is the escaped character itself; for LF and CRLF
    /// escapes (line continuations) it is the empty string.
    pub fn expansion<'a>(&self, source: &'a str) -> &'a str {
        let escaped = &source[self.span.start + 1..self.span.end];
        match escaped {
            "\n" | "\r" | "\r\n" => "",
            _ => escaped,
        }
    }
}

/// A line comment. Comments never produce output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Comment {
    /// The source span, including the `\:` prefix and the terminating
    /// newline, if any.
    pub span: Span,
}

/// A directive invocation: `\name(arguments){content}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Directive {
    /// The span of the whole invocation, including the leading backslash.
    pub span: Span,
    /// The span of the name, excluding the leading backslash.
    pub name_span: Span,
    /// The parenthesised arguments, in source order.
    pub arguments: Vec<Argument>,
    /// The brace-delimited content block, empty if none was written.
    pub content: Vec<Content>,
}

impl Directive {
    /// Returns the name of the directive.
    #[inline]
    pub fn name<'a>(&self, source: &'a str) -> &'a str {
        self.name_span.of(source)
    }
}

/// Synthetic text injected by a behavior, tagged with its output language.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Generated {
    /// The injection position, as an empty span.
    pub span: Span,
    /// The synthesised characters.
    pub text: String,
    /// The language the characters are in.
    pub language: OutputLanguage,
}

/// The kind of an [`Argument`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgumentKind {
    /// `name = value`. The span covers the name.
    Named(Span),
    /// A bare value.
    Positional,
    /// `...value`.
    Ellipsis,
}

/// One argument of a directive invocation, or one member of a group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Argument {
    /// The source span of the whole argument.
    pub span: Span,
    /// Whether the argument is named, positional, or an ellipsis argument.
    pub kind: ArgumentKind,
    /// The argument value.
    pub value: Value,
}

impl Argument {
    /// Returns the argument name, if this is a named argument.
    pub fn name<'a>(&self, source: &'a str) -> Option<&'a str> {
        match self.kind {
            ArgumentKind::Named(span) => Some(span.of(source)),
            _ => None,
        }
    }
}

/// An argument value.
///
/// A value is exactly one primary: a brace-delimited content sequence, a
/// parenthesised group, or a primitive literal. String-like literals keep
/// spans into the source; numeric literals are parsed eagerly because the
/// grammar for them is closed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A `{…}` content sequence, or a single directive used as a value.
    Content(Vec<Content>),
    /// A `(…)` group of members.
    Group(Vec<Argument>),
    /// An integer literal.
    Int(i64),
    /// A decimal floating-point literal.
    Float(f64),
    /// A boolean literal.
    Bool(bool),
    /// The `null` literal.
    Null,
    /// The `unit` literal.
    Unit,
    /// The `infinity` literal.
    Infinity,
    /// A quoted string; the span excludes the quotes.
    String(Span),
    /// An unquoted string.
    Unquoted(Span),
}

impl Eq for Value {}

impl Value {
    /// Returns the content sequence of this value, if it is one.
    pub fn as_content(&self) -> Option<&[Content]> {
        match self {
            Value::Content(content) => Some(content),
            _ => None,
        }
    }

    /// Returns the group members of this value, if it is a group.
    pub fn as_group(&self) -> Option<&[Argument]> {
        match self {
            Value::Group(members) => Some(members),
            _ => None,
        }
    }

    /// Stringifies a literal value the way it splices into text output.
    ///
    /// Content sequences and groups have no literal spelling and return
    /// `None`; they must be evaluated instead.
    pub fn literal_text<'a>(&self, source: &'a str) -> Option<std::borrow::Cow<'a, str>> {
        use std::borrow::Cow;
        Some(match self {
            Value::Content(..) | Value::Group(..) => return None,
            Value::Int(value) => Cow::Owned(value.to_string()),
            Value::Float(value) => Cow::Owned(format_float(*value)),
            Value::Bool(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            Value::Null => Cow::Borrowed("null"),
            Value::Unit => Cow::Borrowed(""),
            Value::Infinity => Cow::Borrowed("infinity"),
            Value::String(span) | Value::Unquoted(span) => Cow::Borrowed(span.of(source)),
        })
    }
}

/// Formats a float the way it splices into text output.
fn format_float(value: f64) -> String {
    if value.is_infinite() {
        if value < 0.0 { "-infinity".into() } else { "infinity".into() }
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_expansion() {
        let source = "\\{\\\n\\\r\n";
        let brace = Escape { span: Span::new(0, 2) };
        let lf = Escape { span: Span::new(2, 4) };
        let crlf = Escape { span: Span::new(4, 7) };
        assert_eq!(brace.expansion(source), "{");
        assert_eq!(lf.expansion(source), "");
        assert_eq!(crlf.expansion(source), "");
    }

    #[test]
    fn literal_text() {
        let source = "";
        assert_eq!(Value::Int(-3).literal_text(source).unwrap(), "-3");
        assert_eq!(Value::Bool(true).literal_text(source).unwrap(), "true");
        assert_eq!(Value::Unit.literal_text(source).unwrap(), "");
        assert_eq!(Value::Float(f64::INFINITY).literal_text(source).unwrap(), "infinity");
        assert_eq!(Value::Float(f64::NEG_INFINITY).literal_text(source).unwrap(), "-infinity");
        assert!(Value::Content(vec![]).literal_text(source).is_none());
    }
}
