//! Directives that evaluate their content under a chosen content policy,
//! plus the explicit paragraph-control directives.

use super::{Category, DirectiveBehavior, Display, Invocation, warn_all_args_ignored};
use crate::args::{ArgumentMatcher, MatchMode};
use crate::context::Context;
use crate::diagnostics::diagnostic;
use crate::policy::{
    ActionsPolicy, ContentPolicy, HtmlLiteralPolicy, HtmlPolicy, ParagraphControl,
    ParagraphSplitPolicy, PhantomPolicy, SyntaxHighlightPolicy, TextOnlyPolicy, ToSourcePolicy,
    UnprocessedPolicy,
};
use crate::processing::{
    consume_all, get_string_argument, try_generate_error, try_inherit_paragraph,
    try_enter_paragraph, try_leave_paragraph,
};
use crate::status::ProcessingStatus;

/// The content policies reachable through a directive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum KnownPolicy {
    /// `\cowel_to_html`: force HTML output.
    ToHtml,
    /// `\cowel_text_only`: plaintext only; HTML is dropped.
    TextOnly,
    /// `\cowel_text_as_html`: text is emitted as HTML verbatim.
    TextAsHtml,
    /// `\cowel_source_as_text`: the original source of the content.
    SourceAsText,
    /// `\cowel_no_invoke`: source of directives without invoking them.
    NoInvoke,
    /// `\cowel_actions`: directives run, primary content is dropped.
    Actions,
    /// `\cowel_paragraphs`: paragraph splitting.
    Paragraphs,
    /// `\cowel_highlight`: syntax highlighting.
    Highlight,
    /// `\cowel_highlight_phantom`: invisible highlighting input.
    Phantom,
}

/// A directive that consumes its content under one of the known policies.
pub(crate) struct PolicyBehavior {
    policy: KnownPolicy,
}

impl PolicyBehavior {
    pub(crate) const fn new(policy: KnownPolicy) -> Self {
        Self { policy }
    }
}

static HIGHLIGHT_PARAMETERS: &[&str] = &["lang"];

impl DirectiveBehavior for PolicyBehavior {
    fn category(&self) -> Category {
        Category::Macro
    }

    fn display(&self) -> Display {
        Display::Macro
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        match self.policy {
            KnownPolicy::ToHtml => {
                warn_all_args_ignored(call, context);
                let mut policy = HtmlPolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::TextOnly => {
                warn_all_args_ignored(call, context);
                let mut policy = TextOnlyPolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::TextAsHtml => {
                warn_all_args_ignored(call, context);
                let mut policy = HtmlLiteralPolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::SourceAsText => {
                warn_all_args_ignored(call, context);
                let mut policy = ToSourcePolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::NoInvoke => {
                warn_all_args_ignored(call, context);
                let mut policy = UnprocessedPolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::Actions => {
                warn_all_args_ignored(call, context);
                let mut policy = ActionsPolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::Paragraphs => {
                warn_all_args_ignored(call, context);
                let mut policy = ParagraphSplitPolicy::new(&mut *out);
                let status = consume_all(&mut policy, call.content, call.content_frame, context);
                policy.leave_paragraph();
                status
            }
            KnownPolicy::Phantom => {
                warn_all_args_ignored(call, context);
                let mut policy = PhantomPolicy::new(&mut *out);
                consume_all(&mut policy, call.content, call.content_frame, context)
            }
            KnownPolicy::Highlight => consume_syntax_highlighted(out, call, context),
        }
    }
}

/// Implements `\cowel_highlight(lang){…}`.
fn consume_syntax_highlighted<'a>(
    out: &mut dyn ContentPolicy<'a>,
    call: &Invocation<'a, '_>,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    let mut matcher = ArgumentMatcher::new(HIGHLIGHT_PARAMETERS);
    matcher.match_arguments(call.arguments, context.source(), MatchMode::All);

    let language = match get_string_argument("lang", call, &matcher, context) {
        Ok(Some(language)) => language,
        Ok(None) => {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                call.directive.span,
                "A highlight language is required.",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        }
        Err(status) => return status,
    };

    let mut policy = SyntaxHighlightPolicy::new();
    let consume_status = consume_all(&mut policy, call.content, call.content_frame, context);
    if let Err(error) = policy.dump_html_to(&mut *out, context.highlighter(), &language) {
        super::code::diagnose_highlight_error(error, &language, call, context);
    }
    consume_status
}

/// `\cowel_paragraph_enter`: forces a paragraph open.
pub(crate) struct ParagraphEnterBehavior;

impl DirectiveBehavior for ParagraphEnterBehavior {
    fn category(&self) -> Category {
        Category::Meta
    }

    fn display(&self) -> Display {
        Display::None
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_all_args_ignored(call, context);
        try_enter_paragraph(out);
        ProcessingStatus::Ok
    }
}

/// `\cowel_paragraph_leave`: forces the current paragraph closed.
pub(crate) struct ParagraphLeaveBehavior;

impl DirectiveBehavior for ParagraphLeaveBehavior {
    fn category(&self) -> Category {
        Category::Meta
    }

    fn display(&self) -> Display {
        Display::None
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_all_args_ignored(call, context);
        try_leave_paragraph(out);
        ProcessingStatus::Ok
    }
}

/// `\cowel_paragraph_inherit`: adopts the surrounding paragraph state.
pub(crate) struct ParagraphInheritBehavior;

impl DirectiveBehavior for ParagraphInheritBehavior {
    fn category(&self) -> Category {
        Category::Meta
    }

    fn display(&self) -> Display {
        Display::None
    }

    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        warn_all_args_ignored(call, context);
        try_inherit_paragraph(out);
        ProcessingStatus::Ok
    }
}
