//! Directive dispatch and content consumption helpers.
//!
//! Everything here follows one propagation policy: compute local work,
//! obtain the sub-status, and return `local.concat(sub)`. Document-level
//! loops are *greedy* (they continue past recoverable errors and stop on any
//! break status), so one run reports many errors.

use crate::ast::{Argument, Content, Directive, Value};
use crate::chars::is_blank;
use crate::context::{Context, FrameIndex};
use crate::diagnostics::diagnostic;
use crate::directives::{Display, Invocation};
use crate::policy::{BufferSink, ContentPolicy, OutputLanguage, TextOnlyPolicy};
use crate::status::ProcessingStatus;
use std::borrow::Cow;

/// Consumes items, continuing past recoverable errors and stopping on break
/// statuses, and returns the fold of all statuses.
pub fn process_greedy<T>(
    items: impl IntoIterator<Item = T>,
    mut consumer: impl FnMut(T) -> ProcessingStatus,
) -> ProcessingStatus {
    let mut error = false;
    for item in items {
        match consumer(item) {
            ProcessingStatus::Ok => {}
            ProcessingStatus::Error => error = true,
            ProcessingStatus::Break => {
                return if error { ProcessingStatus::ErrorBreak } else { ProcessingStatus::Break };
            }
            status @ (ProcessingStatus::ErrorBreak | ProcessingStatus::Fatal) => return status,
        }
    }
    if error { ProcessingStatus::Error } else { ProcessingStatus::Ok }
}

/// Consumes items, stopping at the first status that is not
/// [`ProcessingStatus::Ok`].
pub fn process_lazy<T>(
    items: impl IntoIterator<Item = T>,
    mut consumer: impl FnMut(T) -> ProcessingStatus,
) -> ProcessingStatus {
    for item in items {
        let status = consumer(item);
        if status != ProcessingStatus::Ok {
            return status;
        }
    }
    ProcessingStatus::Ok
}

/// Greedily consumes a content sequence into a policy.
pub fn consume_all<'a>(
    out: &mut dyn ContentPolicy<'a>,
    content: &'a [Content],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    process_greedy(content, |c| out.consume(c, frame, context))
}

/// Like [`consume_all`], with completely blank text at the edges dropped.
pub fn consume_all_trimmed<'a>(
    out: &mut dyn ContentPolicy<'a>,
    content: &'a [Content],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    consume_all(out, trim_blank_text(content, context.source()), frame, context)
}

/// Drops fully blank text nodes from both ends of a content sequence.
pub fn trim_blank_text<'a>(mut content: &'a [Content], source: &str) -> &'a [Content] {
    let blank_text =
        |c: &Content| matches!(c, Content::Text(t) if is_blank(t.span.of(source)));
    while content.first().is_some_and(blank_text) {
        content = &content[1..];
    }
    while content.last().is_some_and(blank_text) {
        content = &content[..content.len() - 1];
    }
    content
}

/// Dispatches a directive to its behavior.
///
/// This is the entry point used by every policy that processes directives.
pub fn apply_behavior<'a>(
    out: &mut dyn ContentPolicy<'a>,
    directive: &'a Directive,
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    let name = directive.name(context.source());
    invoke(out, directive, name, &directive.arguments, &directive.content, frame, context)
}

/// Dispatches an invocation of `name` with explicit arguments and content.
///
/// `\cowel_invoke` re-enters here with a rewritten name and argument list;
/// everything else arrives via [`apply_behavior`].
pub fn invoke<'a>(
    out: &mut dyn ContentPolicy<'a>,
    directive: &'a Directive,
    name: &str,
    arguments: &'a [Argument],
    content: &'a [Content],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    let canonical: Cow<'_, str> = match context.alias_target(name) {
        Some(target) => Cow::Owned(target.to_string()),
        None => Cow::Borrowed(name),
    };

    let Some(behavior) = context.find_directive(&canonical) else {
        if context.emits(crate::diagnostics::Severity::Error) {
            let mut message = format!("No directive with the name \"{canonical}\" exists.");
            if let Some(closest) = context.find_fuzzy(&canonical) {
                message.push_str(&format!(" Did you mean \"\\{}\"?", closest.name));
            }
            context.try_error(diagnostic::DIRECTIVE_LOOKUP_UNRESOLVED, directive.name_span, message);
        }
        return try_generate_error(out, directive, frame, context, ProcessingStatus::Error);
    };

    let call =
        Invocation { directive, name: &*canonical, arguments, content, content_frame: frame };
    behavior.apply(out, &call, context)
}

/// Returns the display of a directive without invoking it, for paragraph
/// splitting. Unresolvable directives count as inline, matching the error
/// sentinel they will produce.
pub fn directive_display<'a>(directive: &'a Directive, context: &Context<'a>) -> Display {
    let name = directive.name(context.source());
    let canonical = context.alias_target(name).unwrap_or(name);
    context.find_directive(canonical).map_or(Display::Inline, |behavior| behavior.display())
}

/// Returns the category of a directive without invoking it.
pub fn directive_category<'a>(
    directive: &'a Directive,
    context: &Context<'a>,
) -> Option<crate::directives::Category> {
    let name = directive.name(context.source());
    let canonical = context.alias_target(name).unwrap_or(name);
    context.find_directive(canonical).map(|behavior| behavior.category())
}

/// Renders the error sentinel for a failed directive via the context's error
/// behavior, returning `on_success` if that generation succeeded.
pub fn try_generate_error<'a>(
    out: &mut dyn ContentPolicy<'a>,
    directive: &'a Directive,
    frame: FrameIndex,
    context: &mut Context<'a>,
    on_success: ProcessingStatus,
) -> ProcessingStatus {
    let call = Invocation {
        directive,
        name: "error",
        arguments: &directive.arguments,
        content: &directive.content,
        content_frame: frame,
    };
    let error_behavior = context.error_behavior();
    let status = error_behavior.apply(out, &call, context);
    if status.is_break() { status } else { on_success }
}

/// Converts a content sequence to plaintext, appending to `out`.
pub fn to_plaintext<'a>(
    out: &mut String,
    content: &'a [Content],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    let mut sink = BufferSink::new(out, OutputLanguage::Text);
    let mut policy = TextOnlyPolicy::new(&mut sink);
    consume_all(&mut policy, content, frame, context)
}

/// Converts a content sequence to plaintext, returning a view into the
/// original source when the content is a single text node. This zero-copy
/// fast path covers the common cases such as ID names.
pub fn to_plaintext_optimistic<'a>(
    content: &'a [Content],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> (ProcessingStatus, Cow<'a, str>) {
    if let [Content::Text(text)] = content {
        return (ProcessingStatus::Ok, Cow::Borrowed(text.span.of(context.source())));
    }
    let mut buffer = String::new();
    let status = to_plaintext(&mut buffer, content, frame, context);
    (status, Cow::Owned(buffer))
}

/// Converts one argument's value to plaintext, appending to `out`.
///
/// Literals splice their spelling; content sequences are evaluated; a group
/// has no plaintext form and produces a type error.
pub fn argument_to_plaintext<'a>(
    out: &mut String,
    argument: &'a Argument,
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    match &argument.value {
        Value::Content(content) => to_plaintext(out, content, frame, context),
        Value::Group(..) => {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                argument.span,
                "A group cannot be used where text is expected.",
            );
            ProcessingStatus::Error
        }
        literal => {
            out.push_str(&literal.literal_text(context.source()).expect("literal value"));
            ProcessingStatus::Ok
        }
    }
}

/// Splices one argument's value into a policy, the way `\cowel_put` does.
///
/// `frame` must be the frame the argument was written under.
pub fn consume_argument_value<'a>(
    out: &mut dyn ContentPolicy<'a>,
    argument: &'a Argument,
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    match &argument.value {
        Value::Content(content) => consume_all(out, content, frame, context),
        Value::Group(..) => {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                argument.span,
                "A group cannot be spliced into content.",
            );
            ProcessingStatus::Error
        }
        literal => {
            let text = literal.literal_text(context.source()).expect("literal value");
            if !text.is_empty() {
                out.write(&text, OutputLanguage::Text);
            }
            ProcessingStatus::Ok
        }
    }
}

/// Evaluates the argument matched to `parameter` to plaintext.
///
/// Returns `Ok(None)` when the parameter has no argument, and the evaluation
/// status as `Err` when evaluation did not succeed cleanly.
pub fn get_string_argument<'a>(
    parameter: &str,
    call: &Invocation<'a, '_>,
    matcher: &crate::args::ArgumentMatcher<'_>,
    context: &mut Context<'a>,
) -> Result<Option<String>, ProcessingStatus> {
    let Some(index) = matcher.get(parameter) else {
        return Ok(None);
    };
    let mut text = String::new();
    match argument_to_plaintext(&mut text, &call.arguments[index], call.content_frame, context) {
        ProcessingStatus::Ok => Ok(Some(text)),
        status => Err(status),
    }
}

/// Converts the named arguments of an invocation into HTML attributes.
///
/// Positional and ellipsis arguments are skipped; behaviors that care warn
/// about them separately.
pub fn named_arguments_to_attributes<'a>(
    out: &mut crate::html::AttributeWriter<'_, '_>,
    arguments: &'a [Argument],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    process_greedy(arguments, |argument| {
        let Some(name) = argument.name(context.source()) else {
            return ProcessingStatus::Ok;
        };
        let mut value = String::new();
        let status = argument_to_plaintext(&mut value, argument, frame, context);
        if status.is_ok() {
            out.write_attribute(name, &value);
        }
        status
    })
}

/// Converts the named members of a group into HTML attributes.
pub fn group_to_attributes<'a>(
    out: &mut crate::html::AttributeWriter<'_, '_>,
    members: &'a [Argument],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    named_arguments_to_attributes(out, members, frame, context)
}

/// Evaluates a content sequence into a fresh buffer under an HTML policy and
/// appends the result to the section named `section`.
///
/// This is how directives write outside the current output: the buffer is
/// evaluated first, then appended, so no two sections are borrowed at once.
pub fn evaluate_to_section<'a>(
    section: &str,
    content: &'a [Content],
    frame: FrameIndex,
    context: &mut Context<'a>,
) -> ProcessingStatus {
    let mut buffer = String::new();
    let status = {
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let mut policy = crate::policy::HtmlPolicy::new(&mut sink);
        consume_all(&mut policy, content, frame, context)
    };
    context.sections_mut().append(section, &buffer);
    status
}

/// Opens a paragraph if `out` splits paragraphs.
pub fn try_enter_paragraph(out: &mut dyn ContentPolicy<'_>) {
    if let Some(control) = out.paragraph_control() {
        control.enter_paragraph();
    }
}

/// Closes the current paragraph if `out` splits paragraphs.
pub fn try_leave_paragraph(out: &mut dyn ContentPolicy<'_>) {
    if let Some(control) = out.paragraph_control() {
        control.leave_paragraph();
    }
}

/// Inherits the surrounding paragraph state if `out` splits paragraphs.
pub fn try_inherit_paragraph(out: &mut dyn ContentPolicy<'_>) {
    if let Some(control) = out.paragraph_control() {
        control.inherit_paragraph();
    }
}

/// Enters or leaves the current paragraph so that it matches the display of
/// a directive about to produce output.
pub fn ensure_paragraph_matches_display(out: &mut dyn ContentPolicy<'_>, display: Display) {
    match display {
        Display::Inline => try_enter_paragraph(out),
        Display::Block => try_leave_paragraph(out),
        Display::None | Display::Macro => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ProcessingStatus::*;

    #[test]
    fn greedy_continues_past_errors() {
        let statuses = [Ok, Error, Ok];
        let result = process_greedy(statuses, |s| s);
        assert_eq!(result, Error);
    }

    #[test]
    fn greedy_stops_on_break() {
        let mut seen = 0;
        let result = process_greedy([Ok, Break, Ok], |s| {
            seen += 1;
            s
        });
        assert_eq!(result, Break);
        assert_eq!(seen, 2);
    }

    #[test]
    fn greedy_break_after_error_is_error_break() {
        assert_eq!(process_greedy([Error, Break], |s| s), ErrorBreak);
        assert_eq!(process_greedy([Error, Fatal], |s| s), Fatal);
    }

    #[test]
    fn lazy_stops_on_anything() {
        let mut seen = 0;
        let result = process_lazy([Ok, Error, Ok], |s| {
            seen += 1;
            s
        });
        assert_eq!(result, Error);
        assert_eq!(seen, 2);
    }
}
