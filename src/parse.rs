//! The COWEL parser.
//!
//! Parsing is infallible: in the grammar, any syntax violation can fall back
//! onto literal text, so the parsed result may be undesirable, but always
//! valid. The only reported parse diagnostics are for constructs that parse
//! but are suspicious, such as an unclosed content block.

use crate::ast::{Argument, ArgumentKind, Comment, Content, Directive, Escape, Text, Value};
use crate::chars::{
    is_argument_name_char, is_directive_name_char, is_escapeable, is_unquoted_string_char,
};
use crate::codemap::Span;
use crate::diagnostics::diagnostic;
use memchr::{memchr, memchr2, memchr3};

/// The parser output.
#[derive(Debug, Default)]
pub struct Output {
    /// The parsed document content.
    pub root: Vec<Content>,
    /// Diagnostics produced while parsing.
    pub errors: Vec<ParseDiagnostic>,
}

/// A diagnostic produced while parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseDiagnostic {
    /// The stable diagnostic ID.
    pub id: &'static str,
    /// The source location of the problem.
    pub location: Span,
    /// The human-readable message.
    pub message: &'static str,
}

/// Parses a COWEL document.
pub fn parse(source: &str) -> Output {
    let mut parser = Parser { source, pos: 0, errors: vec![] };
    let root = parser.content_sequence(Terminator::Document);
    debug_assert_eq!(parser.pos, source.len());
    Output { root, errors: parser.errors }
}

/// What ends the content sequence currently being parsed.
#[derive(Clone, Copy, Eq, PartialEq)]
enum Terminator {
    /// Content runs to the end of input.
    Document,
    /// Content runs to an unbalanced `}`.
    Block,
}

struct Parser<'a> {
    /// The source text.
    source: &'a str,
    /// The current byte position.
    pos: usize,
    /// Diagnostics produced so far.
    errors: Vec<ParseDiagnostic>,
}

impl<'a> Parser<'a> {
    /// The unparsed rest of the input.
    #[inline]
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// The next character, if any.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes `c` if it is next.
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes any run of ASCII whitespace.
    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parses a content sequence up to the given terminator.
    ///
    /// Inside a block, *balanced* brace pairs are plain text; only an
    /// unbalanced `}` closes the block.
    fn content_sequence(&mut self, terminator: Terminator) -> Vec<Content> {
        let mut out: Vec<Content> = vec![];
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => break,
                Some('{') if terminator == Terminator::Block => {
                    depth += 1;
                    self.pos += 1;
                    push_merged(&mut out, Content::Text(Text { span: Span::new(self.pos - 1, self.pos) }));
                }
                Some('}') if terminator == Terminator::Block => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.pos += 1;
                    push_merged(&mut out, Content::Text(Text { span: Span::new(self.pos - 1, self.pos) }));
                }
                Some('\\') => {
                    let node = self.backslash();
                    push_merged(&mut out, node);
                }
                _ => {
                    let run = self.text_run(terminator);
                    push_merged(&mut out, Content::Text(Text { span: run }));
                }
            }
        }
        out
    }

    /// Parses a run of plain text up to the next backslash or
    /// terminator-relevant character.
    fn text_run(&mut self, terminator: Terminator) -> Span {
        let bytes = self.rest().as_bytes();
        let stop = match terminator {
            Terminator::Document => memchr(b'\\', bytes),
            Terminator::Block => memchr3(b'\\', b'{', b'}', bytes),
        }
        .unwrap_or(bytes.len());
        let span = Span::new(self.pos, self.pos + stop);
        self.pos += stop;
        span
    }

    /// Parses whatever follows a backslash: an escape sequence, a comment, a
    /// directive, or (as the universal fallback) a literal backslash.
    fn backslash(&mut self) -> Content {
        let start = self.pos;
        match self.rest()[1..].chars().next() {
            Some(':') => self.comment(),
            Some('\r') if self.rest()[1..].as_bytes().get(1) == Some(&b'\n') => {
                self.pos += 3;
                Content::Escape(Escape { span: Span::new(start, self.pos) })
            }
            Some(c) if is_escapeable(c) => {
                self.pos += 1 + c.len_utf8();
                Content::Escape(Escape { span: Span::new(start, self.pos) })
            }
            Some(c) if is_directive_name_char(c) => self.directive(),
            // A backslash followed by anything else, or at the end of input,
            // is literal text.
            _ => {
                self.pos += 1;
                Content::Text(Text { span: Span::new(start, self.pos) })
            }
        }
    }

    /// Parses a comment from `\:` through the end of the line, including the
    /// line terminator, if any.
    fn comment(&mut self) -> Content {
        let start = self.pos;
        self.pos += 2;
        let bytes = self.rest().as_bytes();
        match memchr2(b'\n', b'\r', bytes) {
            Some(i) if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') => self.pos += i + 2,
            Some(i) => self.pos += i + 1,
            None => self.pos = self.source.len(),
        }
        Content::Comment(Comment { span: Span::new(start, self.pos) })
    }

    /// Parses a directive invocation, starting at the backslash.
    fn directive(&mut self) -> Content {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        while matches!(self.peek(), Some(c) if is_directive_name_char(c)) {
            self.pos += 1;
        }
        let name_span = Span::new(name_start, self.pos);

        let mut arguments = vec![];
        if self.peek() == Some('(') {
            let saved = self.pos;
            self.pos += 1;
            match self.argument_list() {
                Some(parsed) => arguments = parsed,
                // The argument list was malformed; the parenthesis is
                // literal text following the directive.
                None => self.pos = saved,
            }
        }

        let mut content = vec![];
        if self.peek() == Some('{') {
            let open = self.pos;
            self.pos += 1;
            content = self.content_sequence(Terminator::Block);
            if !self.eat('}') {
                self.errors.push(ParseDiagnostic {
                    id: diagnostic::PARSE_BLOCK_UNCLOSED,
                    location: Span::new(open, open + 1),
                    message: "unclosed content block",
                });
            }
        }

        Content::Directive(Directive {
            span: Span::new(start, self.pos),
            name_span,
            arguments,
            content,
        })
    }

    /// Parses a comma-separated argument list after its opening parenthesis,
    /// through the closing parenthesis.
    ///
    /// Returns `None` without restoring the position if the list is
    /// malformed; the caller backtracks.
    fn argument_list(&mut self) -> Option<Vec<Argument>> {
        let mut arguments = vec![];
        self.skip_whitespace();
        if self.eat(')') {
            return Some(arguments);
        }
        loop {
            arguments.push(self.argument()?);
            self.skip_whitespace();
            if self.eat(',') {
                self.skip_whitespace();
            } else if self.eat(')') {
                return Some(arguments);
            } else {
                return None;
            }
        }
    }

    /// Parses one argument: `name = value`, `value`, or `...value`.
    fn argument(&mut self) -> Option<Argument> {
        let start = self.pos;
        if self.rest().starts_with("...") {
            self.pos += 3;
            let value = self.value()?;
            return Some(Argument {
                span: Span::new(start, self.pos),
                kind: ArgumentKind::Ellipsis,
                value,
            });
        }

        let name_start = self.pos;
        while matches!(self.peek(), Some(c) if is_argument_name_char(c)) {
            self.pos += 1;
        }
        let name_end = self.pos;
        if name_end > name_start {
            self.skip_whitespace();
            if self.eat('=') {
                self.skip_whitespace();
                let value = self.value()?;
                return Some(Argument {
                    span: Span::new(start, self.pos),
                    kind: ArgumentKind::Named(Span::new(name_start, name_end)),
                    value,
                });
            }
        }
        self.pos = start;
        let value = self.value()?;
        Some(Argument { span: Span::new(start, self.pos), kind: ArgumentKind::Positional, value })
    }

    /// Parses one value primary.
    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            '{' => {
                self.pos += 1;
                let content = self.content_sequence(Terminator::Block);
                self.eat('}').then_some(Value::Content(content))
            }
            '(' => {
                self.pos += 1;
                self.argument_list().map(Value::Group)
            }
            '"' => {
                self.pos += 1;
                let close = memchr(b'"', self.rest().as_bytes())?;
                let span = Span::new(self.pos, self.pos + close);
                self.pos += close + 1;
                Some(Value::String(span))
            }
            '\\' => match self.rest()[1..].chars().next() {
                Some(c) if is_directive_name_char(c) => Some(Value::Content(vec![self.directive()])),
                _ => None,
            },
            c if is_unquoted_string_char(c) => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if is_unquoted_string_char(c)) {
                    self.pos += 1;
                }
                Some(self.classify_token(Span::new(start, self.pos)))
            }
            _ => None,
        }
    }

    /// Classifies a bare value token as a literal or an unquoted string.
    fn classify_token(&mut self, span: Span) -> Value {
        let text = span.of(self.source);
        match text {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            "null" => return Value::Null,
            "unit" => return Value::Unit,
            "infinity" => return Value::Infinity,
            _ => {}
        }

        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = text.parse::<i64>() {
                return Value::Int(value);
            }
            self.errors.push(ParseDiagnostic {
                id: diagnostic::LITERAL_OUT_OF_RANGE,
                location: span,
                message: "integer literal out of range",
            });
            return Value::Unquoted(span);
        }
        if digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            && let Ok(value) = text.parse::<f64>()
        {
            if value.is_infinite() {
                self.errors.push(ParseDiagnostic {
                    id: diagnostic::LITERAL_OUT_OF_RANGE,
                    location: span,
                    message: "float literal out of range",
                });
            }
            return Value::Float(value);
        }
        Value::Unquoted(span)
    }
}

/// Appends a node to a content sequence, merging adjacent text runs.
fn push_merged(out: &mut Vec<Content>, node: Content) {
    if let Content::Text(text) = &node
        && let Some(Content::Text(last)) = out.last_mut()
        && last.span.end == text.span.start
    {
        last.span.end = text.span.end;
        return;
    }
    out.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Content {
        let output = parse(source);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        assert_eq!(output.root.len(), 1, "{:?}", output.root);
        output.root.into_iter().next().unwrap()
    }

    fn directive(source: &str) -> Directive {
        match parse_one(source) {
            Content::Directive(directive) => directive,
            other => panic!("expected directive, got {other:?}"),
        }
    }

    #[test]
    fn plain_text() {
        let source = "hello, world";
        match parse_one(source) {
            Content::Text(text) => assert_eq!(text.span.of(source), source),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn escapes() {
        let source = "\\{\\}\\\\";
        let output = parse(source);
        assert_eq!(output.root.len(), 3);
        assert!(matches!(output.root[0], Content::Escape(..)));
    }

    #[test]
    fn line_continuation() {
        let source = "a\\\nb";
        let output = parse(source);
        assert_eq!(output.root.len(), 3);
        let Content::Escape(escape) = &output.root[1] else {
            panic!("{:?}", output.root);
        };
        assert_eq!(escape.expansion(source), "");
    }

    #[test]
    fn lone_backslash_is_text() {
        let source = "a\\ b";
        let output = parse(source);
        assert_eq!(output.root.len(), 1);
        match &output.root[0] {
            Content::Text(text) => assert_eq!(text.span.of(source), source),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn comment_includes_newline() {
        let source = "a\\:comment\nb";
        let output = parse(source);
        assert_eq!(output.root.len(), 3);
        let Content::Comment(comment) = &output.root[1] else {
            panic!("{:?}", output.root);
        };
        assert_eq!(comment.span.of(source), "\\:comment\n");
    }

    #[test]
    fn bare_directive() {
        let source = "\\cowel_put";
        let d = directive(source);
        assert_eq!(d.name(source), "cowel_put");
        assert!(d.arguments.is_empty());
        assert!(d.content.is_empty());
        assert_eq!(d.span.of(source), source);
    }

    #[test]
    fn directive_with_block() {
        let source = "\\h1{Heading}";
        let d = directive(source);
        assert_eq!(d.name(source), "h1");
        assert_eq!(d.content.len(), 1);
    }

    #[test]
    fn nested_directives() {
        let source = "\\b{\\i{x}}";
        let d = directive(source);
        let Content::Directive(inner) = &d.content[0] else {
            panic!("{:?}", d.content);
        };
        assert_eq!(inner.name(source), "i");
    }

    #[test]
    fn named_and_positional_arguments() {
        let source = "\\m(greeting = Hello, \"!\")";
        let d = directive(source);
        assert_eq!(d.arguments.len(), 2);
        assert_eq!(d.arguments[0].name(source), Some("greeting"));
        assert!(matches!(d.arguments[0].value, Value::Unquoted(span) if span.of(source) == "Hello"));
        assert_eq!(d.arguments[1].name(source), None);
        assert!(matches!(d.arguments[1].value, Value::String(span) if span.of(source) == "!"));
    }

    #[test]
    fn literal_values() {
        let source = "\\x(1, -2.5, true, null, unit, infinity, ...rest)";
        let d = directive(source);
        let values: Vec<_> = d.arguments.iter().map(|a| &a.value).collect();
        assert_eq!(values[0], &Value::Int(1));
        assert_eq!(values[1], &Value::Float(-2.5));
        assert_eq!(values[2], &Value::Bool(true));
        assert_eq!(values[3], &Value::Null);
        assert_eq!(values[4], &Value::Unit);
        assert_eq!(values[5], &Value::Infinity);
        assert_eq!(d.arguments[6].kind, ArgumentKind::Ellipsis);
    }

    #[test]
    fn group_values() {
        let source = "\\cowel_html_element(span, (id=abc, x))";
        let d = directive(source);
        assert_eq!(d.arguments.len(), 2);
        let Value::Group(members) = &d.arguments[1].value else {
            panic!("{:?}", d.arguments[1].value);
        };
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name(source), Some("id"));
        assert_eq!(members[1].kind, ArgumentKind::Positional);
    }

    #[test]
    fn float_overflow_warns() {
        let source = "\\x(1e10000)";
        let output = parse(source);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].id, diagnostic::LITERAL_OUT_OF_RANGE);
    }

    #[test]
    fn malformed_arguments_are_text() {
        // An unterminated argument list degrades to literal text after the
        // directive.
        let source = "\\b(oops";
        let output = parse(source);
        assert!(output.errors.is_empty());
        assert_eq!(output.root.len(), 2);
        let Content::Directive(d) = &output.root[0] else {
            panic!("{:?}", output.root);
        };
        assert!(d.arguments.is_empty());
        match &output.root[1] {
            Content::Text(text) => assert_eq!(text.span.of(source), "(oops"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn unclosed_block_reports() {
        let source = "\\b{oops";
        let output = parse(source);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].id, diagnostic::PARSE_BLOCK_UNCLOSED);
        assert_eq!(output.root.len(), 1);
    }

    #[test]
    fn directive_as_value() {
        let source = "\\cowel_macro(\\pos){x}";
        let d = directive(source);
        let Value::Content(content) = &d.arguments[0].value else {
            panic!("{:?}", d.arguments[0].value);
        };
        assert!(matches!(content[0], Content::Directive(..)));
    }

    #[test]
    fn selector_block() {
        let source = "\\cowel_put{0}";
        let d = directive(source);
        assert!(d.arguments.is_empty());
        assert_eq!(d.content.len(), 1);
    }

    #[test]
    fn adjacent_text_merges() {
        let source = "a\\ b\\!c";
        let output = parse(source);
        assert_eq!(output.root.len(), 1);
    }

    #[test]
    fn balanced_braces_in_blocks_are_text() {
        let source = "\\style{b { color: red; }}";
        let d = directive(source);
        assert_eq!(d.span.of(source), source);
        let Content::Text(text) = &d.content[0] else {
            panic!("{:?}", d.content);
        };
        assert_eq!(text.span.of(source), "b { color: red; }");
    }
}
