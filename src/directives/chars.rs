//! Character-producing directives: `\cowel_char_by_entity` and
//! `\cowel_char_by_num`.

use super::{Category, DirectiveBehavior, Display, Invocation};
use crate::chars::is_scalar_value;
use crate::context::Context;
use crate::diagnostics::diagnostic;
use crate::policy::{ContentPolicy, OutputLanguage};
use crate::processing::{to_plaintext_optimistic, try_generate_error};
use crate::status::ProcessingStatus;
use html_escape::NAMED_ENTITIES;

/// The outcome of interpreting directive content as a character reference.
type CharResult = Result<String, (&'static str, String)>;

/// Parses the digits of a numeric character reference, with an optional
/// `x`/`X` prefix selecting hexadecimal.
fn parse_code_point(digits: &str, default_hex: bool) -> CharResult {
    let (digits, radix) = match digits.strip_prefix(['x', 'X']) {
        Some(hex_digits) => (hex_digits, 16),
        None if default_hex => (digits, 16),
        None => (digits, 10),
    };
    let Ok(value) = u32::from_str_radix(digits, radix) else {
        return Err((
            diagnostic::CHAR_DIGITS,
            format!("\"{digits}\" is not a sequence of digits."),
        ));
    };
    if !is_scalar_value(value) {
        return Err((
            diagnostic::CHAR_NONSCALAR,
            format!("U+{value:04X} is not a Unicode scalar value."),
        ));
    }
    Ok(char::from_u32(value).unwrap().to_string())
}

/// Interprets `input` like the content of an HTML character reference,
/// without the surrounding `&` and `;`: either `#digits` or an entity name.
fn char_by_entity(input: &str) -> CharResult {
    if let Some(digits) = input.strip_prefix('#') {
        return parse_code_point(digits, false);
    }
    match NAMED_ENTITIES.binary_search_by(|(name, _)| name.cmp(&input.as_bytes())) {
        Ok(index) => Ok(NAMED_ENTITIES[index].1.to_string()),
        Err(..) => Err((
            diagnostic::CHAR_DIGITS,
            format!("\"{input}\" is not a known character reference."),
        )),
    }
}

/// Shared evaluation: obtain the plaintext input, map it to characters, and
/// either write the expansion or render the error sentinel.
fn apply_char_directive<'a>(
    out: &mut dyn ContentPolicy<'a>,
    call: &Invocation<'a, '_>,
    context: &mut Context<'a>,
    interpret: impl FnOnce(&str) -> CharResult,
) -> ProcessingStatus {
    let (input_status, input) = to_plaintext_optimistic(call.content, call.content_frame, context);
    if input_status.is_break() {
        return input_status;
    }
    let input = input.trim();

    let result = if input.is_empty() {
        Err((diagnostic::CHAR_BLANK, String::from("The input must not be blank.")))
    } else {
        interpret(input)
    };
    match result {
        Ok(expansion) => {
            out.write(&expansion, OutputLanguage::Text);
            input_status
        }
        Err((id, message)) => {
            context.try_error(id, call.directive.span, message);
            try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            )
        }
    }
}

/// `\cowel_char_by_entity{#x41}` or `\cowel_char_by_entity{amp}`.
pub(crate) struct CharByEntityBehavior;

impl DirectiveBehavior for CharByEntityBehavior {
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
        apply_char_directive(out, call, context, char_by_entity)
    }
}

/// `\cowel_char_by_num{00B6}`: a code point from hexadecimal digits.
pub(crate) struct CharByNumBehavior;

impl DirectiveBehavior for CharByNumBehavior {
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
        apply_char_directive(out, call, context, |input| parse_code_point(input, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_references() {
        assert_eq!(char_by_entity("#x41").unwrap(), "A");
        assert_eq!(char_by_entity("#65").unwrap(), "A");
        assert_eq!(char_by_entity("#x00B6").unwrap(), "¶");
        assert_eq!(char_by_entity("#xD800").unwrap_err().0, diagnostic::CHAR_NONSCALAR);
        assert_eq!(char_by_entity("#zzz").unwrap_err().0, diagnostic::CHAR_DIGITS);
    }

    #[test]
    fn named_references() {
        assert_eq!(char_by_entity("amp").unwrap(), "&");
        assert_eq!(char_by_entity("lt").unwrap(), "<");
        assert!(char_by_entity("definitely-not-an-entity").is_err());
    }

    #[test]
    fn char_by_num_is_hex() {
        assert_eq!(parse_code_point("00B6", true).unwrap(), "¶");
        assert_eq!(parse_code_point("D800", true).unwrap_err().0, diagnostic::CHAR_NONSCALAR);
        assert_eq!(parse_code_point("zzz", true).unwrap_err().0, diagnostic::CHAR_DIGITS);
    }
}
