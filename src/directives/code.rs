//! Syntax-highlighted code directives: `\code`, `\codeblock`, and
//! `\cowel_highlight_as`.

use super::{Category, DirectiveBehavior, Display, Invocation};
use crate::args::{ArgumentMatcher, MatchMode};
use crate::context::Context;
use crate::diagnostics::{Severity, diagnostic};
use crate::highlight::HighlightType;
use crate::html::HtmlWriter;
use crate::policy::{BufferSink, ContentPolicy, HtmlPolicy, OutputLanguage, SyntaxHighlightPolicy};
use crate::processing::{
    consume_all, ensure_paragraph_matches_display, get_string_argument, try_generate_error,
};
use crate::services::SyntaxHighlightError;
use crate::status::ProcessingStatus;

/// Reports a syntax-highlighting failure. Highlighting failures degrade to
/// plain output, so these are warnings rather than errors.
pub(crate) fn diagnose_highlight_error(
    error: SyntaxHighlightError,
    language: &str,
    call: &Invocation<'_, '_>,
    context: &Context<'_>,
) {
    if !context.emits(Severity::Warning) {
        return;
    }
    match error {
        SyntaxHighlightError::UnsupportedLanguage if language.is_empty() => {
            context.try_warning(
                diagnostic::HIGHLIGHT_LANGUAGE,
                call.directive.span,
                "Syntax highlighting was not possible because no language was given. \
                 Please use \\tt{...} or \\pre{...} if you want a code (block) \
                 without any syntax highlighting.",
            );
        }
        SyntaxHighlightError::UnsupportedLanguage => {
            context.try_warning(
                diagnostic::HIGHLIGHT_LANGUAGE,
                call.directive.span,
                format!(
                    "Unable to apply syntax highlighting because the specified language \
                     \"{language}\" is not supported."
                ),
            );
        }
        SyntaxHighlightError::BadCode => {
            context.try_warning(
                diagnostic::HIGHLIGHT_MALFORMED,
                call.directive.span,
                format!(
                    "Unable to apply syntax highlighting because the code is not valid \
                     for the specified language \"{language}\"."
                ),
            );
        }
        SyntaxHighlightError::Other => {
            context.try_warning(
                diagnostic::HIGHLIGHT_ERROR,
                call.directive.span,
                "Unable to apply syntax highlighting because of an internal error.",
            );
        }
    }
}

/// Whether the rendered content is trimmed of surrounding newlines, the way
/// `<pre>` content should be.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PreTrimming {
    No,
    Yes,
}

static CODE_PARAMETERS: &[&str] = &["lang", "borders", "nested", "prefix", "suffix"];

/// `\code(lang){…}` and `\codeblock(lang){…}`.
pub(crate) struct CodeBehavior {
    tag: &'static str,
    display: Display,
    pre_trim: PreTrimming,
}

impl CodeBehavior {
    pub(crate) const fn new(tag: &'static str, display: Display, pre_trim: PreTrimming) -> Self {
        Self { tag, display, pre_trim }
    }
}

impl DirectiveBehavior for CodeBehavior {
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
        let mut matcher = ArgumentMatcher::new(CODE_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::All);
        for index in matcher.unmatched() {
            context.try_warning(
                diagnostic::IGNORED_ARGS,
                call.arguments[index].span,
                "This argument was ignored.",
            );
        }

        let language = match get_string_argument("lang", call, &matcher, context) {
            Ok(Some(language)) => language,
            Ok(None) => {
                context.try_error(
                    diagnostic::TYPE_MISMATCH,
                    call.directive.span,
                    "A lang argument is required for syntax highlighting.",
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
        let prefix = match get_string_argument("prefix", call, &matcher, context) {
            Ok(prefix) => prefix.unwrap_or_default(),
            Err(status) => return status,
        };
        let suffix = match get_string_argument("suffix", call, &matcher, context) {
            Ok(suffix) => suffix.unwrap_or_default(),
            Err(status) => return status,
        };
        let borders = match get_string_argument("borders", call, &matcher, context) {
            Ok(borders) => borders.as_deref() != Some("false"),
            Err(status) => return status,
        };
        let nested = match get_string_argument("nested", call, &matcher, context) {
            Ok(nested) => nested.as_deref() == Some("true"),
            Err(status) => return status,
        };

        ensure_paragraph_matches_display(out, self.display);

        let mut highlight_policy = SyntaxHighlightPolicy::with_affixes(&prefix, &suffix);
        let consume_status =
            consume_all(&mut highlight_policy, call.content, call.content_frame, context);

        let has_tags = !nested;
        if has_tags {
            let mut writer = HtmlWriter::new(&mut *out);
            let mut attributes = writer.open_tag_with_attributes(self.tag);
            if !borders && self.display == Display::Block {
                attributes.write_class("borderless");
            }
            attributes.end();
        }

        let dump_result = match self.pre_trim {
            PreTrimming::Yes => {
                // Leading and trailing newlines immediately inside `<pre>`
                // elements are stripped by HTML anyway; removing them keeps
                // the output portable.
                let mut buffer = String::new();
                let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
                let result =
                    highlight_policy.dump_html_to(&mut sink, context.highlighter(), &language);
                let trimmed = buffer.trim_matches('\n');
                out.write(trimmed, OutputLanguage::Html);
                result
            }
            PreTrimming::No => {
                highlight_policy.dump_html_to(&mut *out, context.highlighter(), &language)
            }
        };
        if let Err(error) = dump_result {
            diagnose_highlight_error(error, &language, call, context);
        }

        if has_tags {
            HtmlWriter::new(&mut *out).close_tag(self.tag);
        }
        consume_status
    }
}

static HIGHLIGHT_AS_PARAMETERS: &[&str] = &["name"];

/// `\cowel_highlight_as(name){…}`: forces a highlight onto its content.
///
/// The name is a long-form highlight name such as `keyword`; the emitted
/// `data-h` attribute uses the corresponding short name.
pub(crate) struct HighlightAsBehavior;

impl DirectiveBehavior for HighlightAsBehavior {
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
        let mut matcher = ArgumentMatcher::new(HIGHLIGHT_AS_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::All);

        let name = match get_string_argument("name", call, &matcher, context) {
            Ok(Some(name)) => name,
            Ok(None) => {
                context.try_error(
                    diagnostic::TYPE_MISMATCH,
                    call.directive.span,
                    "A name parameter is required to specify the kind of highlight to apply.",
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
        let Some(r#type) = HighlightType::by_long_name(&name) else {
            context.try_error(
                diagnostic::HIGHLIGHT_NAME_INVALID,
                call.directive.span,
                format!("The given highlight name \"{name}\" is not a valid long-form name."),
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        };

        ensure_paragraph_matches_display(out, self.display());

        let mut policy = HtmlPolicy::new(&mut *out);
        {
            let mut writer = HtmlWriter::new(&mut policy);
            let mut attributes = writer.open_tag_with_attributes("h-");
            attributes.write_attribute("data-h", r#type.short_name());
            attributes.end();
        }
        let status = consume_all(&mut policy, call.content, call.content_frame, context);
        if status.is_break() {
            return status;
        }
        HtmlWriter::new(&mut policy).close_tag("h-");
        status
    }
}
