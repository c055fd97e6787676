//! Directives that interact with named output sections: `\there`, `\here`,
//! `\make_bib`, `\make_contents`, `\ref`, and `\bib`.

use super::{Category, DirectiveBehavior, Display, Invocation, warn_ignored_positional};
use crate::args::{ArgumentMatcher, MatchMode};
use crate::context::Context;
use crate::diagnostics::diagnostic;
use crate::html::HtmlWriter;
use crate::policy::{BufferSink, ContentPolicy, OutputLanguage};
use crate::processing::{
    consume_all, ensure_paragraph_matches_display, evaluate_to_section, get_string_argument,
    try_enter_paragraph, try_generate_error, try_leave_paragraph,
};
use crate::sections::{reference_section, section_name};
use crate::status::ProcessingStatus;

static SECTION_PARAMETERS: &[&str] = &["section"];

/// Writes a section reference marker into `out` as HTML.
fn write_reference(out: &mut dyn ContentPolicy<'_>, section: &str) {
    let mut marker = String::new();
    if reference_section(&mut marker, section) {
        out.write(&marker, OutputLanguage::Html);
    } else {
        debug_assert!(false, "section name too long to reference");
    }
}

/// `\there(section){…}`: evaluates content into the named section instead
/// of the current output.
pub(crate) struct ThereBehavior;

impl DirectiveBehavior for ThereBehavior {
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
        let mut matcher = ArgumentMatcher::new(SECTION_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::All);

        let section = match get_string_argument("section", call, &matcher, context) {
            Ok(Some(section)) => section,
            Ok(None) => {
                context.try_error(
                    diagnostic::TYPE_MISMATCH,
                    call.directive.span,
                    "A section name is required.",
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
        evaluate_to_section(&section, call.content, call.content_frame, context)
    }
}

/// `\here(section)` and `\hereblock(section)`: splice the named section's
/// content at this point, resolved after evaluation.
pub(crate) struct HereBehavior {
    display: Display,
}

impl HereBehavior {
    pub(crate) const fn new(display: Display) -> Self {
        Self { display }
    }
}

impl DirectiveBehavior for HereBehavior {
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
        let mut matcher = ArgumentMatcher::new(SECTION_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::All);

        let section = match get_string_argument("section", call, &matcher, context) {
            Ok(Some(section)) => section,
            Ok(None) => {
                context.try_error(
                    diagnostic::TYPE_MISMATCH,
                    call.directive.span,
                    "A section name is required.",
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
        ensure_paragraph_matches_display(out, self.display);
        // Make sure the section exists, so that a later `\there` still
        // reaches a reference that was spliced first.
        context.sections_mut().make(&section);
        write_reference(out, &section);
        ProcessingStatus::Ok
    }
}

/// `\make_bib` and `\make_contents`: wrap a well-known section in a classed
/// `<div>` at this point in the document.
pub(crate) struct MakeSectionBehavior {
    class: &'static str,
    section: &'static str,
}

impl MakeSectionBehavior {
    pub(crate) const fn new(class: &'static str, section: &'static str) -> Self {
        Self { class, section }
    }
}

impl DirectiveBehavior for MakeSectionBehavior {
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
        context.sections_mut().make(self.section);
        {
            let mut writer = HtmlWriter::new(&mut *out);
            let mut attributes = writer.open_tag_with_attributes("div");
            attributes.write_class(self.class);
            attributes.end();
        }
        write_reference(out, self.section);
        HtmlWriter::new(&mut *out).close_tag("div");
        ProcessingStatus::Ok
    }
}

static REF_PARAMETERS: &[&str] = &["to"];

/// `\ref(to=…)`: a cross-reference.
///
/// Anchor targets link to an element in this document, with the referred
/// element's preview as the default display text; URL targets become plain
/// links; anything else is treated as a bibliography ID whose entry supplies
/// the opening anchor.
pub(crate) struct RefBehavior;

impl DirectiveBehavior for RefBehavior {
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
        let mut matcher = ArgumentMatcher::new(REF_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::All);
        for index in matcher.unmatched() {
            context.try_warning(
                diagnostic::IGNORED_ARGS,
                call.arguments[index].span,
                "This argument was ignored.",
            );
        }

        let target = match get_string_argument("to", call, &matcher, context) {
            Ok(Some(target)) => target,
            Ok(None) => {
                context.try_error(
                    diagnostic::REF_TO_MISSING,
                    call.directive.span,
                    "A \"to\" argument is required for a reference.",
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
        if target.is_empty() {
            context.try_error(
                diagnostic::REF_TO_EMPTY,
                call.directive.span,
                "A \"to\" argument cannot have an empty value.",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        }

        try_enter_paragraph(out);

        if let Some(anchor) = target.strip_prefix('#') {
            {
                let mut writer = HtmlWriter::new(&mut *out);
                let mut attributes = writer.open_tag_with_attributes("a");
                attributes.write_href(&target);
                attributes.end();
            }
            let status = if call.content.is_empty() {
                write_reference(out, &format!("{}.{anchor}", section_name::ID_PREVIEW));
                ProcessingStatus::Ok
            } else {
                consume_all(out, call.content, call.content_frame, context)
            };
            HtmlWriter::new(&mut *out).close_tag("a");
            return status;
        }

        if is_url(&target) {
            {
                let mut writer = HtmlWriter::new(&mut *out);
                let mut attributes = writer.open_tag_with_attributes("a");
                attributes.write_href(&target);
                attributes.write_class("sans");
                attributes.end();
            }
            let status = if call.content.is_empty() {
                HtmlWriter::new(&mut *out).write_inner_text(display_url(&target));
                ProcessingStatus::Ok
            } else {
                consume_all(out, call.content, call.content_frame, context)
            };
            HtmlWriter::new(&mut *out).close_tag("a");
            return status;
        }

        // A bibliography reference. The referenced section contributes the
        // opening `<a>` tag, so a missing entry is caught during reference
        // resolution.
        write_reference(out, &format!("{}.{target}", section_name::BIBLIOGRAPHY));
        let status = if call.content.is_empty() {
            let mut writer = HtmlWriter::new(&mut *out);
            writer.write_inner_html("[");
            writer.write_inner_text(&target);
            writer.write_inner_html("]");
            ProcessingStatus::Ok
        } else {
            consume_all(out, call.content, call.content_frame, context)
        };
        HtmlWriter::new(&mut *out).write_inner_html("</a>");
        status
    }
}

/// Returns true if a reference target looks like a URL.
fn is_url(target: &str) -> bool {
    target.starts_with("http:")
        || target.starts_with("https:")
        || target.starts_with("//")
        || target.starts_with("tel:")
        || target.starts_with("mailto:")
}

/// The display text of a URL reference: the scheme prefix and any leading
/// slashes are dropped.
fn display_url(target: &str) -> &str {
    let rest = match target.find(':') {
        Some(colon) => &target[colon + 1..],
        None => target,
    };
    rest.strip_prefix("//").unwrap_or(rest)
}

static BIB_PARAMETERS: &[&str] =
    &["id", "title", "date", "publisher", "link", "long_link", "issue_link", "author"];

/// `\bib(id=…, …)`: registers a bibliography entry.
///
/// Besides filling the bibliography service, this writes the entry into the
/// `std.bib` section and provides the per-ID anchor section that `\ref`
/// splices.
pub(crate) struct BibliographyAddBehavior;

impl DirectiveBehavior for BibliographyAddBehavior {
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
        let mut matcher = ArgumentMatcher::new(BIB_PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::OnlyNamed);

        let mut info = crate::services::DocumentInfo::default();
        let fields = [
            ("id", &mut info.id),
            ("title", &mut info.title),
            ("date", &mut info.date),
            ("publisher", &mut info.publisher),
            ("link", &mut info.link),
            ("long_link", &mut info.long_link),
            ("issue_link", &mut info.issue_link),
            ("author", &mut info.author),
        ];
        for (name, slot) in fields {
            match get_string_argument(name, call, &matcher, context) {
                Ok(value) => *slot = value.unwrap_or_default(),
                Err(status) => return status,
            }
        }

        if info.id.is_empty() {
            context.try_error(
                diagnostic::TYPE_MISMATCH,
                call.directive.span,
                "A bibliography entry requires an id.",
            );
            return try_generate_error(
                out,
                call.directive,
                call.content_frame,
                context,
                ProcessingStatus::Error,
            );
        }

        let anchor = if info.link.is_empty() {
            format!("#bib-{}", info.id)
        } else {
            info.link.clone()
        };

        // The per-ID section holds the opening tag that `\ref` splices.
        let mut opening = String::new();
        {
            let mut sink = BufferSink::new(&mut opening, OutputLanguage::Html);
            let mut writer = HtmlWriter::new(&mut sink);
            let mut attributes = writer.open_tag_with_attributes("a");
            attributes.write_href(&anchor);
            attributes.end();
        }
        context
            .sections_mut()
            .append(&format!("{}.{}", section_name::BIBLIOGRAPHY, info.id), &opening);

        // The visible entry in the bibliography list.
        let mut entry = String::new();
        {
            let mut sink = BufferSink::new(&mut entry, OutputLanguage::Html);
            let mut writer = HtmlWriter::new(&mut sink);
            let mut attributes = writer.open_tag_with_attributes("div");
            attributes.write_id(&format!("bib-{}", info.id));
            attributes.write_class("bib-entry");
            attributes.end();
            writer.write_inner_html("[");
            writer.write_inner_text(&info.id);
            writer.write_inner_html("] ");
            for part in [&info.author, &info.title, &info.date, &info.publisher] {
                if !part.is_empty() {
                    writer.write_inner_text(part);
                    writer.write_inner_html(". ");
                }
            }
            if !info.link.is_empty() {
                let mut link = writer.open_tag_with_attributes("a");
                link.write_href(&info.link);
                link.end();
                writer.write_inner_text(&info.link);
                writer.close_tag("a");
            }
            writer.close_tag("div");
            writer.write_inner_html("\n");
        }
        context.sections_mut().append(section_name::BIBLIOGRAPHY, &entry);

        if !context.bibliography_mut().insert(info) {
            context.try_warning(
                diagnostic::IGNORED_ARGS,
                call.directive.span,
                "A bibliography entry with this id already exists.",
            );
        }
        ProcessingStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_classification() {
        assert!(is_url("https://cowel.org"));
        assert!(is_url("//example.com"));
        assert!(is_url("mailto:x@example.com"));
        assert!(!is_url("N4950"));
        assert!(!is_url("#section"));
    }

    #[test]
    fn url_display_text() {
        assert_eq!(display_url("https://cowel.org"), "cowel.org");
        assert_eq!(display_url("mailto:x@example.com"), "x@example.com");
        assert_eq!(display_url("//example.com"), "example.com");
    }
}
