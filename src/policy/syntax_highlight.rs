//! The syntax-highlighting content policy.
//!
//! The policy buffers incoming content in two parallel buffers: HTML writes
//! pass through into the HTML buffer unchanged, while text writes are
//! collected into the highlight buffer as candidates for tokenization. A
//! span table records the origin and range of each chunk so that the
//! original interleaving can be reproduced at finalization.

use super::{ContentPolicy, OutputLanguage, TextSink};
use crate::ast::Content;
use crate::context::{Context, FrameIndex};
use crate::highlight::HighlightSpan;
use crate::processing::apply_behavior;
use crate::services::{SyntaxHighlightError, SyntaxHighlighter};
use crate::status::ProcessingStatus;

/// The origin of an [`OutputSpan`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SpanKind {
    /// The span is a range of the HTML buffer, emitted verbatim.
    Html,
    /// The span is a range of the highlight buffer, emitted with
    /// highlighting applied.
    Highlight,
}

/// One chunk of buffered output.
#[derive(Clone, Copy, Debug)]
struct OutputSpan {
    /// Which buffer the span indexes into.
    kind: SpanKind,
    /// The byte offset of the chunk within its buffer.
    begin: usize,
    /// The length of the chunk, in bytes.
    length: usize,
}

impl OutputSpan {
    /// The position past the last byte of the chunk.
    #[inline]
    fn end(&self) -> usize {
        self.begin + self.length
    }
}

/// A content policy that syntax-highlights the plaintext flowing through it.
///
/// Unlike most policies, this one has no parent: it buffers everything and is
/// flushed once with [`Self::dump_html_to`].
pub struct SyntaxHighlightPolicy {
    /// The chunks received so far, in order.
    spans: Vec<OutputSpan>,
    /// Buffered HTML.
    html: String,
    /// Buffered plaintext to be tokenized. May contain phantom text that is
    /// covered by no span.
    highlight: String,
    /// Phantom text appended to the code before tokenization.
    suffix: String,
}

impl SyntaxHighlightPolicy {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::with_affixes("", "")
    }

    /// Creates a policy whose tokenizer input is surrounded by the given
    /// phantom prefix and suffix. The affixes contribute tokenizer context
    /// but are not part of the output.
    pub fn with_affixes(prefix: &str, suffix: &str) -> Self {
        Self {
            spans: vec![],
            html: String::new(),
            highlight: String::from(prefix),
            suffix: String::from(suffix),
        }
    }

    /// Appends text to the highlight buffer without recording a span, so it
    /// participates in tokenization but produces no output.
    pub fn write_phantom(&mut self, text: &str) {
        self.highlight.push_str(text);
    }

    /// Records a chunk, merging it with the previous chunk when both have
    /// the same kind and are contiguous. Phantom writes break contiguity on
    /// purpose.
    fn push_span(&mut self, kind: SpanKind, begin: usize, length: usize) {
        if length == 0 {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.kind == kind
            && last.end() == begin
        {
            last.length += length;
            return;
        }
        self.spans.push(OutputSpan { kind, begin, length });
    }

    /// Writes the buffered content to `out` as pure HTML: highlighted chunks
    /// are interleaved with the buffered HTML in their original order, and
    /// each token is wrapped in `<h- data-h=…>`.
    ///
    /// If the highlighter fails, the plaintext is dumped unhighlighted (but
    /// still escaped and correctly interleaved) and the error is returned so
    /// that the caller can report it.
    pub fn dump_html_to(
        &self,
        out: &mut dyn TextSink,
        highlighter: &dyn SyntaxHighlighter,
        language: &str,
    ) -> Result<(), SyntaxHighlightError> {
        let mut code = self.highlight.clone();
        code.push_str(&self.suffix);

        let mut tokens = vec![];
        if let Err(error) = highlighter.highlight(&mut tokens, &code, language) {
            self.dump_plain(out);
            return Err(error);
        }

        let mut cursor = TokenCursor { tokens: &tokens, index: 0 };
        for span in &self.spans {
            match span.kind {
                SpanKind::Html => {
                    out.write(&self.html[span.begin..span.end()], OutputLanguage::Html);
                }
                SpanKind::Highlight => {
                    cursor.dump_range(out, &self.highlight, span.begin, span.end());
                }
            }
        }
        Ok(())
    }

    /// Writes the buffered content to `out` without highlighting.
    fn dump_plain(&self, out: &mut dyn TextSink) {
        for span in &self.spans {
            match span.kind {
                SpanKind::Html => {
                    out.write(&self.html[span.begin..span.end()], OutputLanguage::Html);
                }
                SpanKind::Highlight => {
                    write_escaped(out, &self.highlight[span.begin..span.end()]);
                }
            }
        }
    }
}

impl Default for SyntaxHighlightPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// A cursor over the token list, shared across highlight spans so that a
/// token crossing a span boundary is split rather than repeated.
struct TokenCursor<'t> {
    /// All tokens, in source order.
    tokens: &'t [HighlightSpan],
    /// The index of the first token that has not been fully emitted.
    index: usize,
}

impl TokenCursor<'_> {
    /// Emits the highlight-buffer range `[begin, end)` of `code`, wrapping
    /// each intersection with a token in an `<h->` element.
    fn dump_range(&mut self, out: &mut dyn TextSink, code: &str, begin: usize, end: usize) {
        let mut pos = begin;
        while pos < end {
            while self.index < self.tokens.len() && self.tokens[self.index].end() <= pos {
                self.index += 1;
            }
            let Some(token) = self.tokens.get(self.index).filter(|t| t.begin < end) else {
                write_escaped(out, &code[pos..end]);
                return;
            };
            if token.begin > pos {
                write_escaped(out, &code[pos..token.begin]);
                pos = token.begin;
            }
            let stop = token.end().min(end);
            out.write("<h- data-h=", OutputLanguage::Html);
            out.write(token.r#type.short_name(), OutputLanguage::Html);
            out.write(">", OutputLanguage::Html);
            write_escaped(out, &code[pos..stop]);
            out.write("</h->", OutputLanguage::Html);
            pos = stop;
            if token.end() <= pos {
                self.index += 1;
            }
        }
    }
}

/// Writes plaintext to an HTML sink with HTML escaping applied.
fn write_escaped(out: &mut dyn TextSink, text: &str) {
    out.write(&html_escape::encode_text(text), OutputLanguage::Html);
}

impl TextSink for SyntaxHighlightPolicy {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Html
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        match language {
            OutputLanguage::None => {
                debug_assert!(false, "none-language input");
                false
            }
            OutputLanguage::Text => {
                let begin = self.highlight.len();
                self.highlight.push_str(text);
                self.push_span(SpanKind::Highlight, begin, text.len());
                true
            }
            OutputLanguage::Html => {
                let begin = self.html.len();
                self.html.push_str(text);
                self.push_span(SpanKind::Html, begin, text.len());
                true
            }
        }
    }

    fn highlight_phantom_target(&mut self) -> Option<&mut SyntaxHighlightPolicy> {
        Some(self)
    }
}

impl<'a> ContentPolicy<'a> for SyntaxHighlightPolicy {
    fn consume(
        &mut self,
        content: &'a Content,
        frame: FrameIndex,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        match content {
            Content::Text(text) => {
                self.write(text.span.of(context.source()), OutputLanguage::Text);
                ProcessingStatus::Ok
            }
            Content::Escape(escape) => {
                let text = escape.expansion(context.source());
                if !text.is_empty() {
                    self.write(text, OutputLanguage::Text);
                }
                ProcessingStatus::Ok
            }
            Content::Comment(..) => ProcessingStatus::Ok,
            Content::Directive(directive) => apply_behavior(self, directive, frame, context),
            Content::Generated(generated) => {
                self.write(&generated.text, generated.language);
                ProcessingStatus::Ok
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::XHighlighter;
    use crate::policy::BufferSink;

    fn dump(policy: &SyntaxHighlightPolicy, language: &str) -> (String, bool) {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let ok = policy.dump_html_to(&mut sink, &XHighlighter, language).is_ok();
        (buffer, ok)
    }

    #[test]
    fn tokens_are_wrapped() {
        let mut policy = SyntaxHighlightPolicy::new();
        policy.write("xxx123", OutputLanguage::Text);
        let (out, ok) = dump(&policy, "x");
        assert!(ok);
        assert_eq!(out, "<h- data-h=kw>xxx</h->123");
    }

    #[test]
    fn html_interleaves_and_tokens_split() {
        // A token that spans an HTML interruption is split into two wraps.
        let mut policy = SyntaxHighlightPolicy::new();
        policy.write(" ", OutputLanguage::Text);
        policy.write("<b>", OutputLanguage::Html);
        policy.write("x", OutputLanguage::Text);
        policy.write("</b>", OutputLanguage::Html);
        policy.write("xx ", OutputLanguage::Text);
        let (out, ok) = dump(&policy, "x");
        assert!(ok);
        assert_eq!(out, " <b><h- data-h=kw>x</h-></b><h- data-h=kw>xx</h-> ");
    }

    #[test]
    fn phantom_text_participates_without_output() {
        let mut policy = SyntaxHighlightPolicy::new();
        policy.write_phantom("xx");
        policy.write("x", OutputLanguage::Text);
        let (out, ok) = dump(&policy, "x");
        assert!(ok);
        // The run "xxx" forms one keyword token; only the last "x" is ours.
        assert_eq!(out, "<h- data-h=kw>x</h->");
    }

    #[test]
    fn unsupported_language_dumps_plain() {
        let mut policy = SyntaxHighlightPolicy::new();
        policy.write("a<b", OutputLanguage::Text);
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let result = policy.dump_html_to(&mut sink, &XHighlighter, "nope");
        assert!(result.is_err());
        assert_eq!(buffer, "a&lt;b");
    }

    #[test]
    fn escaping_inside_tokens() {
        let mut policy = SyntaxHighlightPolicy::new();
        policy.write("x<x", OutputLanguage::Text);
        let (out, _) = dump(&policy, "x");
        assert_eq!(out, "<h- data-h=kw>x</h->&lt;<h- data-h=kw>x</h->");
    }

    #[test]
    fn affixes_feed_the_tokenizer() {
        let mut policy = SyntaxHighlightPolicy::with_affixes("x", "x");
        policy.write("x", OutputLanguage::Text);
        let (out, ok) = dump(&policy, "x");
        assert!(ok);
        assert_eq!(out, "<h- data-h=kw>x</h->");
    }
}
