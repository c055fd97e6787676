//! Document variables: `\Vget(var)` and `\Vset(var){value}`.

use super::{Category, DirectiveBehavior, Display, Invocation};
use crate::args::{ArgumentMatcher, MatchMode};
use crate::context::Context;
use crate::diagnostics::diagnostic;
use crate::policy::{ContentPolicy, OutputLanguage};
use crate::processing::{get_string_argument, to_plaintext, try_generate_error};
use crate::status::ProcessingStatus;

static PARAMETERS: &[&str] = &["var"];

/// Matches the `var` parameter shared by the variable directives.
fn variable_name<'a>(
    out: &mut dyn ContentPolicy<'a>,
    call: &Invocation<'a, '_>,
    context: &mut Context<'a>,
) -> Result<String, ProcessingStatus> {
    let mut matcher = ArgumentMatcher::new(PARAMETERS);
    matcher.match_arguments(call.arguments, context.source(), MatchMode::All);
    match get_string_argument("var", call, &matcher, context) {
        Ok(Some(name)) if !name.is_empty() => Ok(name),
        Ok(..) => {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                call.directive.span,
                "A variable name is required.",
            );
            Err(try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            ))
        }
        Err(status) => Err(status),
    }
}

/// `\Vget(var)`: splices the value of a variable as plaintext.
/// An unset variable produces nothing.
pub(crate) struct GetVariableBehavior;

impl DirectiveBehavior for GetVariableBehavior {
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
        let name = match variable_name(out, call, context) {
            Ok(name) => name,
            Err(status) => return status,
        };
        if let Some(value) = context.get_variable(&name) {
            let value = value.to_string();
            out.write(&value, OutputLanguage::Text);
        }
        ProcessingStatus::Ok
    }
}

/// `\Vset(var){value}`: sets a variable to the plaintext of the content.
pub(crate) struct ModifyVariableBehavior;

impl DirectiveBehavior for ModifyVariableBehavior {
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
        let name = match variable_name(out, call, context) {
            Ok(name) => name,
            Err(status) => return status,
        };
        let mut value = String::new();
        let status = to_plaintext(&mut value, call.content, call.content_frame, context);
        if status.is_break() {
            return status;
        }
        context.set_variable(name, value);
        status
    }
}
