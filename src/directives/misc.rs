//! Small self-contained behaviors: comments, the error sentinel, filler
//! text, plaintext wrapping, trimming, string transforms, and the lazy
//! logical operators.

use super::{Category, DirectiveBehavior, Display, Invocation, warn_all_args_ignored};
use crate::context::Context;
use crate::html::HtmlWriter;
use crate::policy::{ContentPolicy, OutputLanguage, TextOnlyPolicy};
use crate::processing::{
    argument_to_plaintext, consume_all, consume_all_trimmed, ensure_paragraph_matches_display,
    process_lazy, to_plaintext,
};
use crate::status::ProcessingStatus;

/// `\comment{…}`: consumes nothing, produces nothing.
pub(crate) struct CommentBehavior;

impl DirectiveBehavior for CommentBehavior {
    fn category(&self) -> Category {
        Category::Meta
    }

    fn display(&self) -> Display {
        Display::None
    }

    fn apply<'a>(
        &self,
        _out: &mut dyn ContentPolicy<'a>,
        _call: &Invocation<'a, '_>,
        _context: &mut Context<'a>,
    ) -> ProcessingStatus {
        ProcessingStatus::Ok
    }
}

/// The `\error` behavior: wraps the source of the invocation in an
/// `<error->` element. This is also the sentinel rendered for any directive
/// whose evaluation failed.
pub(crate) struct ErrorBehavior;

impl DirectiveBehavior for ErrorBehavior {
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
        let mut writer = HtmlWriter::new(out);
        writer.open_tag("error-");
        writer.write_inner_text(call.directive.span.of(context.source()));
        writer.close_tag("error-");
        ProcessingStatus::Ok
    }
}

const LOREM_IPSUM: &str =
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt \
     ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation \
     ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
     reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur \
     sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id \
     est laborum.";

/// `\lorem_ipsum`: the canonical filler text.
pub(crate) struct LoremIpsumBehavior;

impl DirectiveBehavior for LoremIpsumBehavior {
    fn category(&self) -> Category {
        Category::PureText
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
        warn_all_args_ignored(call, context);
        out.write(LOREM_IPSUM, OutputLanguage::Text);
        ProcessingStatus::Ok
    }
}

/// `\text{…}`: consumes its content under a text-only policy, so any HTML
/// the content would produce is dropped.
pub(crate) struct PlaintextWrapperBehavior;

impl DirectiveBehavior for PlaintextWrapperBehavior {
    fn category(&self) -> Category {
        Category::PureText
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
        warn_all_args_ignored(call, context);
        ensure_paragraph_matches_display(out, self.display());
        let mut policy = TextOnlyPolicy::new(out);
        consume_all(&mut policy, call.content, call.content_frame, context)
    }
}

/// `\trim{…}`: consumes its content with blank text at the edges dropped.
pub(crate) struct TrimBehavior;

impl DirectiveBehavior for TrimBehavior {
    fn category(&self) -> Category {
        Category::Formatting
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
        warn_all_args_ignored(call, context);
        ensure_paragraph_matches_display(out, self.display());
        consume_all_trimmed(out, call.content, call.content_frame, context)
    }
}

/// The transformation applied by a [`StrTransformBehavior`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TextTransformation {
    Lowercase,
    Uppercase,
}

/// `\cowel_str_to_lower{…}` and `\cowel_str_to_upper{…}`.
pub(crate) struct StrTransformBehavior {
    transformation: TextTransformation,
}

impl StrTransformBehavior {
    pub(crate) const fn new(transformation: TextTransformation) -> Self {
        Self { transformation }
    }
}

impl DirectiveBehavior for StrTransformBehavior {
    fn category(&self) -> Category {
        Category::PureText
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
        warn_all_args_ignored(call, context);
        let mut text = String::new();
        let status = to_plaintext(&mut text, call.content, call.content_frame, context);
        if status.is_break() {
            return status;
        }
        let transformed = match self.transformation {
            TextTransformation::Lowercase => text.to_lowercase(),
            TextTransformation::Uppercase => text.to_uppercase(),
        };
        out.write(&transformed, OutputLanguage::Text);
        status
    }
}

/// Which logical operator a [`LogicalExpressionBehavior`] implements.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LogicKind {
    And,
    Or,
}

/// `\cowel_and(…)` and `\cowel_or(…)`: lazy logical folds over the
/// arguments. Evaluation stops at the first decisive operand; the early exit
/// travels as a `break` status through the iteration helper.
pub(crate) struct LogicalExpressionBehavior {
    kind: LogicKind,
}

impl LogicalExpressionBehavior {
    pub(crate) const fn new(kind: LogicKind) -> Self {
        Self { kind }
    }
}

impl DirectiveBehavior for LogicalExpressionBehavior {
    fn category(&self) -> Category {
        Category::PureText
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
        let decisive = self.kind == LogicKind::Or;
        let mut value = !decisive;
        let status = process_lazy(call.arguments, |argument| {
            let mut text = String::new();
            let status = argument_to_plaintext(&mut text, argument, call.content_frame, context);
            if status != ProcessingStatus::Ok {
                return status;
            }
            value = text.trim() == "true";
            if value == decisive { ProcessingStatus::Break } else { ProcessingStatus::Ok }
        });
        // The break is ours; it only means the fold short-circuited.
        if status.is_error() {
            return status;
        }
        out.write(if value { "true" } else { "false" }, OutputLanguage::Text);
        ProcessingStatus::Ok
    }
}

/// `\cowel_not{…}`: logical negation of the content's plaintext.
pub(crate) struct LogicalNotBehavior;

impl DirectiveBehavior for LogicalNotBehavior {
    fn category(&self) -> Category {
        Category::PureText
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
        warn_all_args_ignored(call, context);
        let mut text = String::new();
        let status = to_plaintext(&mut text, call.content, call.content_frame, context);
        if status.is_break() {
            return status;
        }
        let value = text.trim() != "true";
        out.write(if value { "true" } else { "false" }, OutputLanguage::Text);
        status
    }
}
