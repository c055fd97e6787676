//! User macros: definition, invocation, `\cowel_put` substitution,
//! `\cowel_alias`, and `\cowel_invoke`.

use super::{Category, DirectiveBehavior, Display, Invocation, macro_call_behavior};
use crate::args::{ArgumentMatcher, MatchMode};
use crate::ast::{ArgumentKind, Content, Value};
use crate::chars::is_directive_name;
use crate::context::{Context, Frame, FuzzyMatch, NameResolver};
use crate::diagnostics::diagnostic;
use crate::policy::ContentPolicy;
use crate::processing::{
    argument_to_plaintext, consume_all, consume_argument_value, invoke, to_plaintext_optimistic,
    try_generate_error,
};
use crate::status::ProcessingStatus;
use crate::typo::closest_match;

/// `\cowel_macro(pattern){body}`: defines a macro.
///
/// The pattern is the first positional argument, either a bare name or a
/// single directive whose name is used; the pattern's own arguments and
/// content have no meaning beyond documentation. The body is captured by
/// reference into the AST, which outlives all invocations.
pub(crate) struct MacroDefineBehavior;

impl DirectiveBehavior for MacroDefineBehavior {
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
        let Some((_, pattern)) = call.first_positional() else {
            context.try_error(
                diagnostic::DEF_NO_PATTERN,
                call.directive.span,
                "A directive pattern must be provided when defining a macro.",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        };

        let name = match &pattern.value {
            Value::Content(content) => match content.as_slice() {
                [Content::Directive(directive)] => Some(directive.name(context.source())),
                _ => None,
            },
            Value::Unquoted(span) | Value::String(span) => Some(span.of(context.source())),
            _ => None,
        };
        let Some(name) = name.filter(|name| is_directive_name(name)) else {
            context.try_error(
                diagnostic::DEF_PATTERN_NO_DIRECTIVE,
                pattern.span,
                "The pattern in a macro definition has to be a directive name \
                 or a single directive, nothing else.",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        };

        // The latest definition wins; redefinition is only worth a soft
        // warning.
        if !context.emplace_macro(name.to_string(), call.directive) {
            context.try_soft_warning(
                diagnostic::DEF_REDEFINITION,
                call.directive.span,
                format!("Redefinition of macro \"{name}\"."),
            );
        }
        ProcessingStatus::Ok
    }
}

/// The shared behavior behind every macro invocation.
///
/// Pushes a frame holding the caller's arguments and content, then evaluates
/// the captured body under the currently active policy.
pub(crate) struct MacroCallBehavior;

pub(crate) static MACRO_CALL: MacroCallBehavior = MacroCallBehavior;

impl DirectiveBehavior for MacroCallBehavior {
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
        let Some(definition) = context.find_macro(call.name) else {
            // The resolver only hands out this behavior for known macros.
            debug_assert!(false, "macro call without definition");
            return ProcessingStatus::Error;
        };

        let frame = context.push_frame(Frame {
            arguments: call.arguments,
            content: call.content,
            content_frame: call.content_frame,
        });
        let status = consume_all(out, &definition.content, frame, context);
        context.pop_frame();
        status
    }
}

/// The resolver that puts user macros above the built-in directive set.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroNameResolver;

/// The macro resolver singleton.
pub static MACRO_RESOLVER: MacroNameResolver = MacroNameResolver;

impl NameResolver for MacroNameResolver {
    fn resolve<'r>(
        &'r self,
        name: &str,
        context: &Context<'_>,
    ) -> Option<&'r dyn DirectiveBehavior> {
        context.find_macro(name).is_some().then(macro_call_behavior)
    }

    fn fuzzy(&self, name: &str, context: &Context<'_>) -> Option<FuzzyMatch> {
        let (closest, distance) = closest_match(context.macro_names(), name)?;
        (distance * 2 <= name.chars().count())
            .then(|| FuzzyMatch { name: closest.to_string(), distance })
    }
}

/// `\cowel_put` parameters.
static PUT_PARAMETERS: &[&str] = &["else"];

/// `\cowel_put{selector}`: splices macro-invocation content.
///
/// With no content, the whole content block of the frame is spliced. A
/// numeric selector picks the corresponding positional argument, anything
/// else the named argument of that name; when the selected argument does not
/// exist, the `else` argument is spliced instead, if present. All spliced
/// content evaluates under the frame it was written in.
pub(crate) struct PutBehavior;

impl DirectiveBehavior for PutBehavior {
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
        if call.content_frame.is_root() {
            context.try_error(
                diagnostic::PUT_OUTSIDE,
                call.directive.span,
                "\\cowel_put can only be used within a macro.",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        }
        let frame = context.frame(call.content_frame);

        if call.content.is_empty() {
            return consume_all(out, frame.content, frame.content_frame, context);
        }

        let (selector_status, selector) =
            to_plaintext_optimistic(call.content, call.content_frame, context);
        if selector_status.is_break() {
            return selector_status;
        }
        let selector = selector.trim();

        let selected = match selector.parse::<usize>() {
            Ok(index) => frame
                .arguments
                .iter()
                .filter(|argument| argument.kind == ArgumentKind::Positional)
                .nth(index),
            Err(..) => frame
                .arguments
                .iter()
                .find(|argument| argument.name(context.source()) == Some(selector)),
        };
        if let Some(argument) = selected {
            let status = consume_argument_value(out, argument, frame.content_frame, context);
            return selector_status.concat(status);
        }

        // Fall back to the `else` argument, which belongs to the put itself
        // and therefore evaluates under the current frame.
        let mut matcher = ArgumentMatcher::new(PUT_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::OnlyNamed);
        if let Some(index) = matcher.get("else") {
            let status = consume_argument_value(
                out,
                &call.arguments[index],
                call.content_frame,
                context,
            );
            return selector_status.concat(status);
        }
        selector_status
    }
}

/// `\cowel_alias(name...){target}`: binds additional names to an existing
/// directive. All failures are fatal, since a broken alias invalidates every
/// later use of the name.
pub(crate) struct AliasBehavior;

impl DirectiveBehavior for AliasBehavior {
    fn category(&self) -> Category {
        Category::Meta
    }

    fn display(&self) -> Display {
        Display::None
    }

    fn apply<'a>(
        &self,
        _out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus {
        let names: Vec<&crate::ast::Argument> = call
            .arguments
            .iter()
            .filter(|argument| argument.kind == ArgumentKind::Positional)
            .collect();
        if names.is_empty() {
            context.try_fatal(
                diagnostic::ALIAS_NAME_INVALID,
                call.directive.span,
                "An alias needs at least one name argument.",
            );
            return ProcessingStatus::Fatal;
        }

        let mut name_strings = Vec::with_capacity(names.len());
        for argument in names {
            let mut name = String::new();
            let status = argument_to_plaintext(&mut name, argument, call.content_frame, context);
            if !status.is_ok() || !is_directive_name(&name) {
                context.try_fatal(
                    diagnostic::ALIAS_NAME_INVALID,
                    argument.span,
                    format!("\"{name}\" is not a valid directive name."),
                );
                return ProcessingStatus::Fatal;
            }
            name_strings.push(name);
        }

        let (target_status, target) =
            to_plaintext_optimistic(call.content, call.content_frame, context);
        let target = target.trim().to_string();
        // Collapse chains at definition time, so every alias points directly
        // at a resolvable canonical name.
        let canonical = context.alias_target(&target).unwrap_or(&target).to_string();
        if target_status.is_error() || context.find_directive(&canonical).is_none() {
            context.try_fatal(
                diagnostic::ALIAS_NAME_INVALID,
                call.directive.span,
                format!("\"{target}\" does not name an existing directive."),
            );
            return ProcessingStatus::Fatal;
        }

        for name in name_strings {
            if !context.emplace_alias(name.clone(), canonical.clone()) {
                context.try_fatal(
                    diagnostic::ALIAS_DUPLICATE,
                    call.directive.span,
                    format!("The alias \"{name}\" is already defined."),
                );
                return ProcessingStatus::Fatal;
            }
        }
        ProcessingStatus::Ok
    }
}

/// `\cowel_invoke(name, rest...)`: re-dispatches the invocation to the named
/// directive with the remaining arguments and the content block.
pub(crate) struct InvokeBehavior;

impl DirectiveBehavior for InvokeBehavior {
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
        let Some((index, first)) = call.first_positional() else {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                call.directive.span,
                "\\cowel_invoke requires the name of the directive to invoke \
                 as its first positional argument.",
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
        let name_status = argument_to_plaintext(&mut name, first, call.content_frame, context);
        if name_status.is_break() {
            return name_status;
        }
        if name_status.is_error() || !is_directive_name(&name) {
            context.try_error(
                diagnostic::INVOKE_NAME_INVALID,
                first.span,
                format!("\"{name}\" is not a valid directive name."),
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        }

        let status = invoke(
            out,
            call.directive,
            &name,
            &call.arguments[index + 1..],
            call.content,
            call.content_frame,
            context,
        );
        name_status.concat(status)
    }
}
