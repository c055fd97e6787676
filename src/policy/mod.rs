//! Content policies: sinks that receive text and AST nodes and decide how
//! each is consumed.
//!
//! A content policy has a *native output language* and two responsibilities:
//! it is a [`TextSink`] accepting character data tagged with the language it
//! is in, and it is a node consumer deciding what each kind of AST node
//! contributes. Policies compose by holding a mutable reference to a parent
//! sink, so a child policy can never outlive its parent.

use crate::ast::Content;
use crate::context::{Context, FrameIndex};
use crate::status::ProcessingStatus;

mod html;
mod paragraph_split;
mod plaintext;
mod syntax_highlight;

pub use html::{HtmlLiteralPolicy, HtmlPolicy};
pub use paragraph_split::{ParagraphControl, ParagraphSplitPolicy, ParagraphsState};
pub use plaintext::{
    ActionsPolicy, IgnorantPolicy, PhantomPolicy, TextOnlyPolicy, ToSourcePolicy,
    UnprocessedPolicy,
};
pub use syntax_highlight::SyntaxHighlightPolicy;

/// The language of a piece of output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputLanguage {
    /// No output; only side effects happen.
    #[default]
    None,
    /// Plaintext output, used in HTML attribute values, IDs, and other
    /// places where markup cannot appear.
    Text,
    /// HTML output.
    Html,
}

/// A sink for character data.
pub trait TextSink {
    /// The native language of the sink. Writes in this language are always
    /// accepted.
    fn language(&self) -> OutputLanguage;

    /// Attempts to write `text` in the given language.
    ///
    /// Returns true iff the language was accepted; a sink may convert,
    /// forward, or refuse writes in other languages.
    fn write(&mut self, text: &str, language: OutputLanguage) -> bool;

    /// Returns the syntax-highlight policy fed by phantom writes, if this
    /// sink is one.
    fn highlight_phantom_target(&mut self) -> Option<&mut SyntaxHighlightPolicy> {
        None
    }
}

/// A sink that additionally consumes AST nodes.
pub trait ContentPolicy<'a>: TextSink {
    /// Consumes one node.
    fn consume(
        &mut self,
        content: &'a Content,
        frame: FrameIndex,
        context: &mut Context<'a>,
    ) -> ProcessingStatus;

    /// Returns the paragraph controls of this policy, if it splits content
    /// into paragraphs.
    fn paragraph_control(&mut self) -> Option<&mut dyn ParagraphControl> {
        None
    }
}

/// A sink appending to a string buffer.
///
/// Only writes in the buffer's declared language are accepted; conversion is
/// the job of the policies stacked on top.
#[derive(Debug)]
pub struct BufferSink<'b> {
    /// The output buffer.
    buffer: &'b mut String,
    /// The language of the buffer's content.
    language: OutputLanguage,
}

impl<'b> BufferSink<'b> {
    /// Creates a sink appending to `buffer` in the given language.
    pub fn new(buffer: &'b mut String, language: OutputLanguage) -> Self {
        Self { buffer, language }
    }
}

impl TextSink for BufferSink<'_> {
    fn language(&self) -> OutputLanguage {
        self.language
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        if language == self.language {
            self.buffer.push_str(text);
            true
        } else {
            false
        }
    }
}

/// Writes `text` to `out` with the HTML-significant characters `&`, `<`, and
/// `>` escaped into entities.
pub(crate) fn write_as_html(out: &mut dyn TextSink, text: &str) -> bool {
    debug_assert_eq!(out.language(), OutputLanguage::Html);
    out.write(&html_escape::encode_text(text), OutputLanguage::Html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_accepts_only_its_language() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        assert!(sink.write("<b>", OutputLanguage::Html));
        assert!(!sink.write("text", OutputLanguage::Text));
        assert_eq!(buffer, "<b>");
    }

    #[test]
    fn html_escaping() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        assert!(write_as_html(&mut sink, "a < b && c > d"));
        assert_eq!(buffer, "a &lt; b &amp;&amp; c &gt; d");
    }
}
