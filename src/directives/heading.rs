//! Heading directives `\h1` through `\h6`.

use super::{Category, DirectiveBehavior, Display, Invocation};
use crate::args::{ArgumentMatcher, MatchMode};
use crate::ast::ArgumentKind;
use crate::context::{Context, Referred};
use crate::html::HtmlWriter;
use crate::policy::{BufferSink, ContentPolicy, HtmlPolicy, OutputLanguage};
use crate::processing::{argument_to_plaintext, consume_all, to_plaintext, try_leave_paragraph};
use crate::sections::section_name;
use crate::status::ProcessingStatus;

static PARAMETERS: &[&str] = &["id", "listed"];

/// A heading directive.
///
/// The heading's ID is either given via `id=` or synthesised from the
/// heading's plaintext; a `<a class=para>` anchor before the content links
/// the heading to itself. Unless `listed=false`, the heading also registers
/// a table-of-contents entry, and a preview of the content is stored for
/// `\ref` to splice in.
pub(crate) struct HeadingBehavior {
    level: u8,
}

impl HeadingBehavior {
    pub(crate) const fn new(level: u8) -> Self {
        assert!(level >= 1 && level <= 6);
        Self { level }
    }

    /// The HTML tag of this heading level.
    fn tag(&self) -> &'static str {
        match self.level {
            1 => "h1",
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        }
    }
}

/// Turns heading plaintext into an ID: trimmed, ASCII-lowercased, and with
/// whitespace replaced by dashes.
fn sanitize_id(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| {
            if crate::chars::is_html_whitespace(c) { '-' } else { c.to_ascii_lowercase() }
        })
        .collect()
}

impl DirectiveBehavior for HeadingBehavior {
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
        let mut matcher = ArgumentMatcher::new(PARAMETERS);
        matcher.match_arguments(call.arguments, context.source(), MatchMode::OnlyNamed);

        try_leave_paragraph(out);

        // Render the content once up front; the same rendering is used for
        // the heading itself, the table of contents, and the ID preview.
        let mut content_html = String::new();
        let content_status = {
            let mut sink = BufferSink::new(&mut content_html, OutputLanguage::Html);
            let mut policy = HtmlPolicy::new(&mut sink);
            consume_all(&mut policy, call.content, call.content_frame, context)
        };
        if content_status.is_break() {
            return content_status;
        }

        // 1. Obtain or synthesize the id.
        let mut id_status = ProcessingStatus::Ok;
        let id = match matcher.get("id") {
            Some(index) => {
                let mut id = String::new();
                id_status = argument_to_plaintext(
                    &mut id,
                    &call.arguments[index],
                    call.content_frame,
                    context,
                );
                if id_status.is_break() {
                    return id_status;
                }
                id
            }
            None => {
                let mut text = String::new();
                let status = to_plaintext(&mut text, call.content, call.content_frame, context);
                if status.is_break() {
                    return status;
                }
                sanitize_id(&text)
            }
        };
        let has_id = !id.is_empty() && id_status.is_ok();

        let listed = match matcher.get("listed") {
            Some(index) => {
                let mut listed = String::new();
                let status = argument_to_plaintext(
                    &mut listed,
                    &call.arguments[index],
                    call.content_frame,
                    context,
                );
                status.is_ok() && listed.trim() != "false"
            }
            None => true,
        };

        // 2. The heading element, with remaining named arguments as
        // attributes and a paragraph anchor.
        let id_index = matcher.get("id");
        let listed_index = matcher.get("listed");
        let attributes_status = {
            let mut writer = HtmlWriter::new(&mut *out);
            let mut attributes = writer.open_tag_with_attributes(self.tag());
            if has_id {
                attributes.write_id(&id);
            }
            let status = crate::processing::process_greedy(
                call.arguments.iter().enumerate(),
                |(index, argument)| {
                    if !matches!(argument.kind, ArgumentKind::Named(..))
                        || id_index == Some(index)
                        || listed_index == Some(index)
                    {
                        return ProcessingStatus::Ok;
                    }
                    let name = argument.name(context.source()).expect("named argument");
                    let mut value = String::new();
                    let status =
                        argument_to_plaintext(&mut value, argument, call.content_frame, context);
                    if status.is_ok() {
                        attributes.write_attribute(name, &value);
                    }
                    status
                },
            );
            attributes.end();
            status
        };

        if has_id {
            let mut writer = HtmlWriter::new(&mut *out);
            let mut anchor = writer.open_tag_with_attributes("a");
            anchor.write_class("para");
            anchor.write_href(&format!("#{id}"));
            anchor.end();
            writer.close_tag("a");
        }

        out.write(&content_html, OutputLanguage::Html);
        HtmlWriter::new(&mut *out).close_tag(self.tag());

        // 3. Registration, table of contents, and preview.
        if has_id {
            let preview_section = format!("{}.{id}", section_name::ID_PREVIEW);
            context.sections_mut().append(&preview_section, &content_html);
            context
                .emplace_id(id.clone(), Referred { preview_section: Some(preview_section) });
            if listed {
                let mut entry = String::new();
                {
                    let mut sink = BufferSink::new(&mut entry, OutputLanguage::Html);
                    let mut writer = HtmlWriter::new(&mut sink);
                    let mut anchor = writer.open_tag_with_attributes("a");
                    anchor.write_class("toc-entry");
                    anchor.write_href(&format!("#{id}"));
                    anchor.end();
                    writer.write_inner_html(&content_html);
                    writer.close_tag("a");
                    writer.write_inner_html("\n");
                }
                context.sections_mut().append(section_name::TABLE_OF_CONTENTS, &entry);
            }
        }

        content_status.concat(attributes_status).concat(id_status)
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_id;

    #[test]
    fn id_sanitization() {
        assert_eq!(sanitize_id("Heading"), "heading");
        assert_eq!(sanitize_id("  Some Title "), "some-title");
        assert_eq!(sanitize_id(" \t "), "");
        assert_eq!(sanitize_id("abcx"), "abcx");
    }
}
