//! The HTML content policy and its raw variant.

use super::{ContentPolicy, OutputLanguage, TextSink, write_as_html};
use crate::ast::Content;
use crate::context::{Context, FrameIndex};
use crate::processing::apply_behavior;
use crate::status::ProcessingStatus;

/// The standard policy for HTML output.
///
/// Text writes have `&`, `<`, and `>` escaped into entities and are forwarded
/// as HTML; HTML writes pass through; comments are dropped; escapes are
/// expanded and written as text; directives dispatch normally.
pub struct HtmlPolicy<'p> {
    /// The parent sink receiving the produced HTML.
    parent: &'p mut dyn TextSink,
}

impl<'p> HtmlPolicy<'p> {
    /// Creates an HTML policy over the given parent sink.
    pub fn new(parent: &'p mut dyn TextSink) -> Self {
        Self { parent }
    }
}

impl TextSink for HtmlPolicy<'_> {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Html
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        match language {
            OutputLanguage::None => {
                debug_assert!(false, "none-language input");
                false
            }
            OutputLanguage::Text => write_as_html(self.parent, text),
            OutputLanguage::Html => self.parent.write(text, OutputLanguage::Html),
        }
    }
}

impl<'a> ContentPolicy<'a> for HtmlPolicy<'_> {
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

/// A policy that accepts only text and forwards it to the parent as HTML,
/// without any escaping. Used for `\cowel_text_as_html` raw blocks.
pub struct HtmlLiteralPolicy<'p> {
    /// The parent sink receiving the text as HTML.
    parent: &'p mut dyn TextSink,
}

impl<'p> HtmlLiteralPolicy<'p> {
    /// Creates an HTML-literal policy over the given parent sink.
    pub fn new(parent: &'p mut dyn TextSink) -> Self {
        Self { parent }
    }
}

impl TextSink for HtmlLiteralPolicy<'_> {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Text
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        debug_assert_ne!(language, OutputLanguage::None);
        language == OutputLanguage::Text && self.parent.write(text, OutputLanguage::Html)
    }
}

impl<'a> ContentPolicy<'a> for HtmlLiteralPolicy<'_> {
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
    use crate::policy::BufferSink;

    #[test]
    fn text_is_escaped() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let mut policy = HtmlPolicy::new(&mut sink);
        assert!(policy.write("1 < 2", OutputLanguage::Text));
        assert!(policy.write("<br/>", OutputLanguage::Html));
        assert_eq!(buffer, "1 &lt; 2<br/>");
    }

    #[test]
    fn literal_text_is_not_escaped() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let mut policy = HtmlLiteralPolicy::new(&mut sink);
        assert!(policy.write("<b>bold</b>", OutputLanguage::Text));
        assert!(!policy.write("<i>", OutputLanguage::Html));
        assert_eq!(buffer, "<b>bold</b>");
    }
}
