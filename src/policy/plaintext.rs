//! Plaintext-oriented content policies: text-only extraction, source
//! reproduction, uninvoked directive dumping, phantom highlighting input,
//! side-effect-only execution, and the policy that ignores everything.

use super::{ContentPolicy, OutputLanguage, TextSink};
use crate::ast::Content;
use crate::context::{Context, FrameIndex};
use crate::directives::Category;
use crate::processing::{apply_behavior, consume_all, directive_category};
use crate::status::ProcessingStatus;

/// A policy producing plaintext only.
///
/// Text and escapes are written through; HTML writes are dropped; directives
/// are dispatched normally so that their plaintext output is spliced in.
/// Used wherever text output is required, such as attribute values and IDs.
pub struct TextOnlyPolicy<'p> {
    /// The parent sink receiving the text.
    parent: &'p mut dyn TextSink,
}

impl<'p> TextOnlyPolicy<'p> {
    /// Creates a text-only policy over the given parent sink.
    pub fn new(parent: &'p mut dyn TextSink) -> Self {
        Self { parent }
    }
}

impl TextSink for TextOnlyPolicy<'_> {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Text
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        debug_assert_ne!(language, OutputLanguage::None);
        language == OutputLanguage::Text && self.parent.write(text, OutputLanguage::Text)
    }
}

impl<'a> ContentPolicy<'a> for TextOnlyPolicy<'_> {
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
            Content::Directive(directive) => {
                // A pure-HTML directive contributes the plaintext of its
                // content; its markup would be dropped anyway, and invoking
                // it here would run its side effects a second time in places
                // like ID synthesis.
                if directive_category(directive, context) == Some(Category::PureHtml) {
                    return consume_all(self, &directive.content, frame, context);
                }
                apply_behavior(self, directive, frame, context)
            }
            Content::Generated(generated) => {
                self.write(&generated.text, generated.language);
                ProcessingStatus::Ok
            }
        }
    }
}

/// A policy that writes the original source of every node verbatim,
/// including directives. Behind `\cowel_source_as_text`.
pub struct ToSourcePolicy<'p> {
    /// The parent sink receiving the source text.
    parent: &'p mut dyn TextSink,
}

impl<'p> ToSourcePolicy<'p> {
    /// Creates a source-reproducing policy over the given parent sink.
    pub fn new(parent: &'p mut dyn TextSink) -> Self {
        Self { parent }
    }
}

impl TextSink for ToSourcePolicy<'_> {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Text
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        debug_assert_ne!(language, OutputLanguage::None);
        language == OutputLanguage::Text && self.parent.write(text, OutputLanguage::Text)
    }
}

impl<'a> ContentPolicy<'a> for ToSourcePolicy<'_> {
    fn consume(
        &mut self,
        content: &'a Content,
        _frame: FrameIndex,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        match content {
            Content::Generated(..) => {
                debug_assert!(false, "generated content has no source");
            }
            _ => {
                self.write(content.span().of(context.source()), OutputLanguage::Text);
            }
        }
        ProcessingStatus::Ok
    }
}

/// A policy that writes text and escape source verbatim and writes directive
/// source verbatim *without invoking the directive*. Behind
/// `\cowel_no_invoke`.
pub struct UnprocessedPolicy<'p> {
    /// The parent sink receiving the source text.
    parent: &'p mut dyn TextSink,
}

impl<'p> UnprocessedPolicy<'p> {
    /// Creates an unprocessed policy over the given parent sink.
    pub fn new(parent: &'p mut dyn TextSink) -> Self {
        Self { parent }
    }
}

impl TextSink for UnprocessedPolicy<'_> {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Text
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        debug_assert_ne!(language, OutputLanguage::None);
        language == OutputLanguage::Text && self.parent.write(text, OutputLanguage::Text)
    }
}

impl<'a> ContentPolicy<'a> for UnprocessedPolicy<'_> {
    fn consume(
        &mut self,
        content: &'a Content,
        _frame: FrameIndex,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        match content {
            Content::Text(text) => {
                self.write(text.span.of(context.source()), OutputLanguage::Text);
            }
            Content::Escape(escape) => {
                self.write(escape.span.of(context.source()), OutputLanguage::Text);
            }
            Content::Comment(..) => {}
            Content::Directive(directive) => {
                self.write(directive.span.of(context.source()), OutputLanguage::Text);
            }
            Content::Generated(..) => {
                debug_assert!(false, "generated content within an unprocessed policy");
            }
        }
        ProcessingStatus::Ok
    }
}

/// A policy that forwards text to an enclosing syntax-highlight policy as
/// *invisible* input: the text contributes to the tokenizer's context but
/// produces no output. A no-op over any other parent.
pub struct PhantomPolicy<'p> {
    /// The parent sink, hopefully a syntax-highlight policy.
    parent: &'p mut dyn TextSink,
}

impl<'p> PhantomPolicy<'p> {
    /// Creates a phantom policy over the given parent sink.
    pub fn new(parent: &'p mut dyn TextSink) -> Self {
        Self { parent }
    }
}

impl TextSink for PhantomPolicy<'_> {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Text
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        debug_assert_ne!(language, OutputLanguage::None);
        if language != OutputLanguage::Text {
            return false;
        }
        match self.parent.highlight_phantom_target() {
            Some(highlight) => {
                highlight.write_phantom(text);
                true
            }
            None => false,
        }
    }
}

impl<'a> ContentPolicy<'a> for PhantomPolicy<'_> {
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

/// A policy that drops everything and succeeds.
#[derive(Debug, Default)]
pub struct IgnorantPolicy;

impl TextSink for IgnorantPolicy {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::None
    }

    fn write(&mut self, _text: &str, _language: OutputLanguage) -> bool {
        true
    }
}

impl<'a> ContentPolicy<'a> for IgnorantPolicy {
    fn consume(&mut self, _: &'a Content, _: FrameIndex, _: &mut Context<'a>) -> ProcessingStatus {
        ProcessingStatus::Ok
    }
}

/// A policy that forwards directive invocations to the parent but drops all
/// primary content. Used for side-effect-only execution.
pub struct ActionsPolicy<'p, 'a> {
    /// The parent policy that directives are dispatched against.
    parent: &'p mut dyn ContentPolicy<'a>,
}

impl<'p, 'a> ActionsPolicy<'p, 'a> {
    /// Creates an actions policy over the given parent policy.
    pub fn new(parent: &'p mut dyn ContentPolicy<'a>) -> Self {
        Self { parent }
    }
}

impl TextSink for ActionsPolicy<'_, '_> {
    fn language(&self) -> OutputLanguage {
        self.parent.language()
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        self.parent.write(text, language)
    }
}

impl<'a> ContentPolicy<'a> for ActionsPolicy<'_, 'a> {
    fn consume(
        &mut self,
        content: &'a Content,
        frame: FrameIndex,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        match content {
            Content::Directive(..) => self.parent.consume(content, frame, context),
            _ => ProcessingStatus::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BufferSink, SyntaxHighlightPolicy};

    #[test]
    fn text_only_drops_html() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Text);
        let mut policy = TextOnlyPolicy::new(&mut sink);
        assert!(policy.write("plain", OutputLanguage::Text));
        assert!(!policy.write("<b>", OutputLanguage::Html));
        assert_eq!(buffer, "plain");
    }

    #[test]
    fn ignorant_accepts_and_drops_everything() {
        let mut policy = IgnorantPolicy;
        assert_eq!(policy.language(), OutputLanguage::None);
        assert!(policy.write("anything", OutputLanguage::Html));
        assert!(policy.write("anything", OutputLanguage::Text));
    }

    #[test]
    fn phantom_needs_a_highlighting_parent() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Text);
        let mut policy = PhantomPolicy::new(&mut sink);
        assert!(!policy.write("x", OutputLanguage::Text));
        assert!(buffer.is_empty());

        let mut highlight = SyntaxHighlightPolicy::new();
        let mut policy = PhantomPolicy::new(&mut highlight);
        assert!(policy.write("x", OutputLanguage::Text));
        assert!(!policy.write("x", OutputLanguage::Html));
    }
}
