//! The paragraph-splitting content policy.
//!
//! Wraps a parent HTML sink and groups inline flow content into `<p>…</p>`
//! blocks. A blank line in the incoming text closes the current paragraph;
//! flow content opens a new one. Directives interact according to their
//! display: block directives close the current paragraph, inline directives
//! open one, and meta/macro directives are transparent so that macro
//! expansion participates in paragraph detection as if spliced inline.

use super::{ContentPolicy, OutputLanguage, TextSink};
use crate::ast::Content;
use crate::context::{Context, FrameIndex};
use crate::directives::Display;
use crate::processing::{apply_behavior, directive_display};
use crate::status::ProcessingStatus;

/// Whether the policy is currently inside a paragraph.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParagraphsState {
    /// Between paragraphs; writing flow content opens a new `<p>`.
    #[default]
    Outside,
    /// Inside a `<p>`; writing flow content continues it.
    Inside,
}

/// The explicit transitions a paragraph-splitting policy supports.
///
/// Behaviors reach these through [`ContentPolicy::paragraph_control`], which
/// returns `None` for policies that do not split paragraphs, making all
/// three operations no-ops there.
pub trait ParagraphControl {
    /// Opens a paragraph if one is not open.
    fn enter_paragraph(&mut self);
    /// Closes the current paragraph, if any. Idempotent.
    fn leave_paragraph(&mut self);
    /// Leaves the paragraph state to the surrounding content.
    fn inherit_paragraph(&mut self);
}

/// A content policy grouping inline flow content into `<p>` elements.
pub struct ParagraphSplitPolicy<'p, 'a> {
    /// The parent policy receiving paragraph tags and flow content.
    parent: &'p mut dyn ContentPolicy<'a>,
    /// The current state.
    state: ParagraphsState,
    /// Buffered whitespace whose paragraph significance is not yet known.
    /// The scanner is restartable across writes: this buffer plus the
    /// terminator count below are its whole state.
    pending: String,
    /// The number of line terminators in `pending`. CR, LF, and CRLF each
    /// count once.
    newlines: usize,
    /// Whether the last buffered character was a CR, so that a following LF
    /// does not count as a second terminator.
    last_was_cr: bool,
}

impl<'p, 'a> ParagraphSplitPolicy<'p, 'a> {
    /// Creates a policy over the given parent, starting between paragraphs.
    pub fn new(parent: &'p mut dyn ContentPolicy<'a>) -> Self {
        Self::with_initial_state(parent, ParagraphsState::Outside)
    }

    /// Creates a policy with an explicit initial state.
    ///
    /// Block containers whose intro already opened a `<p>` start inside.
    pub fn with_initial_state(
        parent: &'p mut dyn ContentPolicy<'a>,
        state: ParagraphsState,
    ) -> Self {
        Self { parent, state, pending: String::new(), newlines: 0, last_was_cr: false }
    }

    /// Settles the buffered whitespace: a blank run (two or more line
    /// terminators separated only by horizontal whitespace) is discarded and
    /// reported, anything shorter is flushed verbatim.
    fn settle_pending(&mut self) -> bool {
        let blank = self.newlines >= 2;
        if blank {
            self.pending.clear();
        } else if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.parent.write(&pending, OutputLanguage::Text);
        }
        self.newlines = 0;
        self.last_was_cr = false;
        blank
    }

    /// Prepares for flow content: applies any pending blank-line transition
    /// and makes sure a paragraph is open.
    fn before_flow(&mut self) {
        let blank = self.settle_pending();
        if blank && self.state == ParagraphsState::Inside {
            self.parent.write("</p>", OutputLanguage::Html);
            self.state = ParagraphsState::Outside;
        }
        if self.state == ParagraphsState::Outside {
            self.parent.write("<p>", OutputLanguage::Html);
            self.state = ParagraphsState::Inside;
        }
    }

    /// Ends any open paragraph, settling pending whitespace first.
    fn end_flow(&mut self) {
        self.settle_pending();
        if self.state == ParagraphsState::Inside {
            self.parent.write("</p>", OutputLanguage::Html);
            self.state = ParagraphsState::Outside;
        }
    }

    /// Buffers a whitespace run and counts its line terminators.
    fn buffer_whitespace(&mut self, whitespace: &str) {
        for c in whitespace.chars() {
            match c {
                '\n' => {
                    if !self.last_was_cr {
                        self.newlines += 1;
                    }
                    self.last_was_cr = false;
                }
                '\r' => {
                    self.newlines += 1;
                    self.last_was_cr = true;
                }
                _ => self.last_was_cr = false,
            }
        }
        self.pending.push_str(whitespace);
    }

    /// Feeds a text chunk through the blank-line scanner.
    fn write_text(&mut self, text: &str) {
        let is_ws = |c: char| matches!(c, ' ' | '\t' | '\n' | '\r');
        let mut rest = text;
        while !rest.is_empty() {
            match rest.find(|c: char| !is_ws(c)) {
                Some(0) => {
                    let end = rest.find(is_ws).unwrap_or(rest.len());
                    self.before_flow();
                    self.parent.write(&rest[..end], OutputLanguage::Text);
                    rest = &rest[end..];
                }
                Some(n) => {
                    self.buffer_whitespace(&rest[..n]);
                    rest = &rest[n..];
                }
                None => {
                    self.buffer_whitespace(rest);
                    break;
                }
            }
        }
    }
}

impl ParagraphControl for ParagraphSplitPolicy<'_, '_> {
    fn enter_paragraph(&mut self) {
        self.before_flow();
    }

    fn leave_paragraph(&mut self) {
        self.end_flow();
    }

    fn inherit_paragraph(&mut self) {}
}

impl TextSink for ParagraphSplitPolicy<'_, '_> {
    fn language(&self) -> OutputLanguage {
        self.parent.language()
    }

    fn write(&mut self, text: &str, language: OutputLanguage) -> bool {
        match language {
            OutputLanguage::None => {
                debug_assert!(false, "none-language input");
                false
            }
            OutputLanguage::Text => {
                self.write_text(text);
                true
            }
            OutputLanguage::Html => self.parent.write(text, OutputLanguage::Html),
        }
    }
}

impl<'a> ContentPolicy<'a> for ParagraphSplitPolicy<'_, 'a> {
    fn consume(
        &mut self,
        content: &'a Content,
        frame: FrameIndex,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        match content {
            Content::Text(text) => {
                self.write_text(text.span.of(context.source()));
                ProcessingStatus::Ok
            }
            Content::Escape(escape) => {
                let text = escape.expansion(context.source());
                if !text.is_empty() {
                    self.write_text(text);
                }
                ProcessingStatus::Ok
            }
            Content::Comment(..) => ProcessingStatus::Ok,
            Content::Directive(directive) => {
                match directive_display(directive, context) {
                    Display::Block => self.end_flow(),
                    Display::Inline => self.before_flow(),
                    // Meta and macro directives do not move the state; a
                    // macro body is detected as if spliced in place.
                    Display::None | Display::Macro => {}
                }
                apply_behavior(self, directive, frame, context)
            }
            Content::Generated(generated) => {
                self.write(&generated.text, generated.language);
                ProcessingStatus::Ok
            }
        }
    }

    fn paragraph_control(&mut self) -> Option<&mut dyn ParagraphControl> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BufferSink, HtmlPolicy};

    fn split(chunks: &[&str], initial: ParagraphsState) -> String {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let mut html = HtmlPolicy::new(&mut sink);
        let mut policy = ParagraphSplitPolicy::with_initial_state(&mut html, initial);
        for chunk in chunks {
            policy.write(chunk, OutputLanguage::Text);
        }
        policy.leave_paragraph();
        drop(policy);
        drop(html);
        buffer
    }

    #[test]
    fn blank_line_splits() {
        assert_eq!(split(&["a\n\nb"], ParagraphsState::Outside), "<p>a</p><p>b</p>");
    }

    #[test]
    fn single_newline_does_not_split() {
        assert_eq!(split(&["a\nb"], ParagraphsState::Outside), "<p>a\nb</p>");
    }

    #[test]
    fn horizontal_whitespace_between_terminators() {
        assert_eq!(split(&["a\n \t \nb"], ParagraphsState::Outside), "<p>a</p><p>b</p>");
    }

    #[test]
    fn crlf_and_cr_count_once_each() {
        assert_eq!(split(&["a\r\n\r\nb"], ParagraphsState::Outside), "<p>a</p><p>b</p>");
        assert_eq!(split(&["a\rb"], ParagraphsState::Outside), "<p>a\rb</p>");
    }

    #[test]
    fn scanner_survives_chunk_boundaries() {
        assert_eq!(split(&["a\n", "\nb"], ParagraphsState::Outside), "<p>a</p><p>b</p>");
        assert_eq!(split(&["a\r", "\n\r\nb"], ParagraphsState::Outside), "<p>a</p><p>b</p>");
    }

    #[test]
    fn blank_runs_are_never_emitted() {
        let out = split(&["a\n\n\n\nb"], ParagraphsState::Outside);
        assert_eq!(out, "<p>a</p><p>b</p>");
    }

    #[test]
    fn inside_initial_state() {
        assert_eq!(split(&["x"], ParagraphsState::Inside), "x</p>");
    }

    #[test]
    fn leave_is_idempotent() {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let mut html = HtmlPolicy::new(&mut sink);
        let mut policy = ParagraphSplitPolicy::new(&mut html);
        policy.write("a", OutputLanguage::Text);
        policy.leave_paragraph();
        policy.leave_paragraph();
        drop(policy);
        drop(html);
        assert_eq!(buffer, "<p>a</p>");
    }

    #[test]
    fn escaped_text_is_escaped_by_parent() {
        assert_eq!(split(&["a<b"], ParagraphsState::Outside), "<p>a&lt;b</p>");
    }
}
