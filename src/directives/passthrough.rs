//! Behaviors that map directives onto HTML elements: fixed-name passthrough
//! tags, classed wrappers, void elements, the generic `\cowel_html_element`
//! pair, raw-text elements, special blocks, and URL anchors.

use super::{Category, DirectiveBehavior, Display, Invocation, warn_ignored_positional};
use crate::chars::is_html_tag_name;
use crate::context::Context;
use crate::diagnostics::diagnostic;
use crate::html::HtmlWriter;
use crate::policy::{
    ContentPolicy, HtmlPolicy, ParagraphControl, ParagraphSplitPolicy, ParagraphsState,
};
use crate::processing::{
    consume_all, ensure_paragraph_matches_display, group_to_attributes,
    named_arguments_to_attributes, to_plaintext, try_enter_paragraph, try_generate_error,
    try_leave_paragraph,
};
use crate::status::ProcessingStatus;

/// Whether a passthrough behavior forces HTML output for its content or
/// inherits the surrounding policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PolicyUsage {
    /// Content is consumed by the surrounding policy, so e.g. formatting
    /// inside syntax highlighting keeps feeding the highlighter.
    Inherit,
    /// Content is consumed under a fresh HTML policy.
    Html,
}

/// A directive mapped onto an HTML element of a fixed name, with named
/// arguments becoming attributes. `\i(id=123){...}` generates
/// `<i id=123>...</i>`.
pub(crate) struct PassthroughBehavior {
    tag: &'static str,
    policy: PolicyUsage,
    display: Display,
}

impl PassthroughBehavior {
    pub(crate) const fn inline(tag: &'static str, policy: PolicyUsage) -> Self {
        Self { tag, policy, display: Display::Inline }
    }

    pub(crate) const fn block(tag: &'static str, policy: PolicyUsage) -> Self {
        Self { tag, policy, display: Display::Block }
    }
}

impl DirectiveBehavior for PassthroughBehavior {
    fn category(&self) -> Category {
        match self.policy {
            PolicyUsage::Inherit => Category::Formatting,
            PolicyUsage::Html => Category::PureHtml,
        }
    }

    fn display(&self) -> Display {
        self.display
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_ignored_positional(call, context);
        ensure_paragraph_matches_display(out, self.display);

        let mut html_policy;
        let policy: &mut dyn ContentPolicy<'a> = match self.policy {
            PolicyUsage::Html => {
                html_policy = HtmlPolicy::new(out);
                &mut html_policy
            }
            PolicyUsage::Inherit => out,
        };

        let attributes_status = {
            let mut writer = HtmlWriter::new(&mut *policy);
            let mut attributes = writer.open_tag_with_attributes(self.tag);
            let status = named_arguments_to_attributes(
                &mut attributes,
                call.arguments,
                call.content_frame,
                context,
            );
            attributes.end();
            status
        };
        if attributes_status.is_break() {
            HtmlWriter::new(&mut *policy).close_tag(self.tag);
            return attributes_status;
        }

        let content_status = consume_all(policy, call.content, call.content_frame, context);
        HtmlWriter::new(&mut *policy).close_tag(self.tag);
        attributes_status.concat(content_status)
    }
}

/// A directive mapped onto a fixed element carrying a fixed class, like
/// `\nobr` onto `<span class=word>`.
pub(crate) struct InTagBehavior {
    tag: &'static str,
    class: &'static str,
    policy: PolicyUsage,
    display: Display,
}

impl InTagBehavior {
    pub(crate) const fn new(
        tag: &'static str,
        class: &'static str,
        policy: PolicyUsage,
        display: Display,
    ) -> Self {
        Self { tag, class, policy, display }
    }
}

impl DirectiveBehavior for InTagBehavior {
    fn category(&self) -> Category {
        match self.policy {
            PolicyUsage::Inherit => Category::Formatting,
            PolicyUsage::Html => Category::PureHtml,
        }
    }

    fn display(&self) -> Display {
        self.display
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_ignored_positional(call, context);
        ensure_paragraph_matches_display(out, self.display);

        let mut html_policy;
        let policy: &mut dyn ContentPolicy<'a> = match self.policy {
            PolicyUsage::Html => {
                html_policy = HtmlPolicy::new(out);
                &mut html_policy
            }
            PolicyUsage::Inherit => out,
        };

        let attributes_status = {
            let mut writer = HtmlWriter::new(&mut *policy);
            let mut attributes = writer.open_tag_with_attributes(self.tag);
            attributes.write_class(self.class);
            let status = named_arguments_to_attributes(
                &mut attributes,
                call.arguments,
                call.content_frame,
                context,
            );
            attributes.end();
            status
        };
        if attributes_status.is_break() {
            HtmlWriter::new(&mut *policy).close_tag(self.tag);
            return attributes_status;
        }

        let content_status = consume_all(policy, call.content, call.content_frame, context);
        HtmlWriter::new(&mut *policy).close_tag(self.tag);
        attributes_status.concat(content_status)
    }
}

/// A void element, like `\br` and `\hr`.
pub(crate) struct SelfClosingBehavior {
    tag: &'static str,
    display: Display,
}

impl SelfClosingBehavior {
    pub(crate) const fn new(tag: &'static str, display: Display) -> Self {
        Self { tag, display }
    }
}

impl DirectiveBehavior for SelfClosingBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        self.display
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_ignored_positional(call, context);
        if !call.content.is_empty() {
            context.try_warning(
                diagnostic::IGNORED_CONTENT,
                call.content[0].span(),
                "Content in a void element is ignored.",
            );
        }
        ensure_paragraph_matches_display(out, self.display);

        let mut writer = HtmlWriter::new(&mut *out);
        let mut attributes = writer.open_tag_with_attributes(self.tag);
        let status = named_arguments_to_attributes(
            &mut attributes,
            call.arguments,
            call.content_frame,
            context,
        );
        attributes.end_empty();
        status
    }
}

/// Whether a [`HtmlElementBehavior`] produces a void element.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SelfClosing {
    No,
    Yes,
}

/// `\cowel_html_element(name, (attributes...)){content}` and its
/// self-closing sibling: fully generic HTML element construction.
pub(crate) struct HtmlElementBehavior {
    self_closing: SelfClosing,
}

impl HtmlElementBehavior {
    pub(crate) const fn new(self_closing: SelfClosing) -> Self {
        Self { self_closing }
    }
}

impl DirectiveBehavior for HtmlElementBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        Display::Inline
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        let Some((name_index, name_argument)) = call.first_positional() else {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                call.directive.span,
                "A tag name must be provided (in the form of a positional argument).",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        };

        let mut name = String::new();
        let name_status =
            crate::processing::argument_to_plaintext(&mut name, name_argument, call.content_frame, context);
        if name_status.is_break() {
            return name_status;
        }
        if name_status.is_error() || !is_html_tag_name(&name) {
            context.try_error(
                diagnostic::HTML_ELEMENT_NAME_INVALID,
                name_argument.span,
                format!("The given tag name \"{name}\" is not a valid HTML tag name."),
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        }

        // Attributes come as an optional group in the second positional
        // argument. Validate the group before any output, so a bad group
        // renders a clean sentinel.
        let attribute_group = call.arguments[name_index + 1..]
            .iter()
            .find(|argument| argument.kind == crate::ast::ArgumentKind::Positional);
        let members = match attribute_group {
            Some(argument) => match argument.value.as_group() {
                Some(members)
                    if members
                        .iter()
                        .all(|member| matches!(member.kind, crate::ast::ArgumentKind::Named(..))) =>
                {
                    Some(members)
                }
                _ => {
                    context.try_error(
                        diagnostic::TYPE_MISMATCH,
                        argument.span,
                        "Attributes must be provided as a group of named members.",
                    );
                    return try_generate_error(
                        out,
                        call.directive,
                        call.content_frame,
                        context,
                        ProcessingStatus::Error,
                    );
                }
            },
            None => None,
        };

        let mut writer = HtmlWriter::new(&mut *out);
        let mut attributes = writer.open_tag_with_attributes(&name);
        let mut status = name_status;
        if let Some(members) = members {
            let attributes_status =
                group_to_attributes(&mut attributes, members, call.content_frame, context);
            status = status.concat(attributes_status);
        }

        if self.self_closing == SelfClosing::Yes {
            attributes.end_empty();
            if !call.content.is_empty() {
                context.try_warning(
                    diagnostic::IGNORED_CONTENT,
                    call.directive.span,
                    "Content in a self-closing HTML element is ignored.",
                );
            }
            return status;
        }

        attributes.end();
        if status.is_continue() {
            let content_status = consume_all(out, call.content, call.content_frame, context);
            status = status.concat(content_status);
        }
        HtmlWriter::new(&mut *out).close_tag(&name);
        status
    }
}

/// `\script{…}` and `\style{…}`: raw-text elements. Character references
/// have no meaning inside these elements, so the content is taken literally;
/// a premature closing tag in the content is removed and reported.
pub(crate) struct RawTextBehavior {
    tag: &'static str,
}

impl RawTextBehavior {
    pub(crate) const fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl DirectiveBehavior for RawTextBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        Display::Block
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_ignored_positional(call, context);
        try_leave_paragraph(out);

        let mut text = String::new();
        let text_status = to_plaintext(&mut text, call.content, call.content_frame, context);
        if text_status.is_break() {
            return text_status;
        }

        let (filtered, closed) = remove_closing_tags(&text, self.tag);
        let mut status = text_status;
        if closed {
            context.try_error(
                diagnostic::RAW_TEXT_CLOSING,
                call.directive.span,
                format!("A closing </{}> tag cannot appear in raw text content.", self.tag),
            );
            status = status.concat(ProcessingStatus::Error);
        }

        let mut writer = HtmlWriter::new(&mut *out);
        writer.open_tag(self.tag);
        writer.write_inner_html(&filtered);
        writer.close_tag(self.tag);
        status
    }
}

/// Removes every `</tag…>` occurrence from raw text content. Returns the
/// filtered text and whether anything was removed.
fn remove_closing_tags(text: &str, tag: &str) -> (String, bool) {
    let needle = format!("</{tag}");
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut removed = false;
    let mut position = 0;
    while let Some(found) = lower[position..].find(&needle) {
        let start = position + found;
        out.push_str(&text[position..start]);
        removed = true;
        let after = start + needle.len();
        position = match text[after..].find('>') {
            Some(end) => after + end + 1,
            None => text.len(),
        };
    }
    out.push_str(&text[position..]);
    (out, removed)
}

/// A special block like `\Bnote`: a custom block element whose content is
/// paragraph-split and whose first paragraph may open with an `<intro->`
/// marker.
pub(crate) struct SpecialBlockBehavior {
    tag: &'static str,
    intro: bool,
}

impl SpecialBlockBehavior {
    pub(crate) const fn new(tag: &'static str, intro: bool) -> Self {
        Self { tag, intro }
    }
}

impl DirectiveBehavior for SpecialBlockBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        Display::Block
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_ignored_positional(call, context);
        try_leave_paragraph(out);

        let initial_state =
            if self.intro { ParagraphsState::Inside } else { ParagraphsState::Outside };
        let mut html_policy = HtmlPolicy::new(out);
        let mut policy = ParagraphSplitPolicy::with_initial_state(&mut html_policy, initial_state);

        let attributes_status = {
            let mut writer = HtmlWriter::new(&mut policy);
            let mut attributes = writer.open_tag_with_attributes(self.tag);
            let status = named_arguments_to_attributes(
                &mut attributes,
                call.arguments,
                call.content_frame,
                context,
            );
            attributes.end();
            status
        };
        if attributes_status.is_break() {
            HtmlWriter::new(&mut policy).close_tag(self.tag);
            return attributes_status;
        }

        if self.intro {
            let mut writer = HtmlWriter::new(&mut policy);
            writer.open_tag("p");
            writer.open_and_close_tag("intro-");
            // This space ensures that even if the user writes \Bnote{abc},
            // there is a space between </intro-> and abc.
            writer.write_inner_html(" ");
        }

        let content_status = consume_all(&mut policy, call.content, call.content_frame, context);
        policy.leave_paragraph();
        HtmlWriter::new(&mut policy).close_tag(self.tag);
        attributes_status.concat(content_status)
    }
}

/// `\url`, `\mail`, and `\tel`: anchors whose display text is the target.
pub(crate) struct UrlBehavior {
    prefix: &'static str,
}

impl UrlBehavior {
    pub(crate) const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }
}

impl DirectiveBehavior for UrlBehavior {
    fn category(&self) -> Category {
        Category::PureHtml
    }

    fn display(&self) -> Display {
        Display::Inline
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        try_enter_paragraph(out);

        let mut url = String::from(self.prefix);
        let text_status = to_plaintext(&mut url, call.content, call.content_frame, context);
        if text_status != ProcessingStatus::Ok {
            return text_status;
        }

        let attributes_status = {
            let mut writer = HtmlWriter::new(&mut *out);
            let mut attributes = writer.open_tag_with_attributes("a");
            let status = named_arguments_to_attributes(
                &mut attributes,
                call.arguments,
                call.content_frame,
                context,
            );
            attributes.write_href(&url);
            attributes.write_class("sans");
            attributes.end();
            status
        };
        warn_ignored_positional(call, context);

        let mut writer = HtmlWriter::new(&mut *out);
        writer.write_inner_text(&url[self.prefix.len()..]);
        writer.close_tag("a");
        attributes_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_tag_removal() {
        assert_eq!(remove_closing_tags("</script>", "script"), (String::new(), true));
        assert_eq!(remove_closing_tags("a</SCRIPT >b", "script"), ("ab".into(), true));
        assert_eq!(
            remove_closing_tags("let x = 3 < 5;", "script"),
            ("let x = 3 < 5;".into(), false),
        );
        assert_eq!(remove_closing_tags("x</style", "style"), ("x".into(), true));
    }
}
