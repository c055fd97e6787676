//! Low-level HTML generation over a [`TextSink`].
//!
//! Attribute values are written unquoted when HTML allows it, and href
//! values are percent-encoded just enough to survive quoting.

use crate::chars::is_unquoted_attribute_value;
use crate::policy::{OutputLanguage, TextSink};
use std::borrow::Cow;

/// A writer producing well-formed HTML into a text sink.
pub struct HtmlWriter<'w> {
    /// The sink receiving the HTML.
    out: &'w mut dyn TextSink,
}

impl<'w> HtmlWriter<'w> {
    /// Creates a writer over the given sink.
    pub fn new(out: &'w mut dyn TextSink) -> Self {
        Self { out }
    }

    /// Writes raw HTML.
    pub fn write_inner_html(&mut self, html: &str) {
        self.out.write(html, OutputLanguage::Html);
    }

    /// Writes text, escaping HTML-significant characters.
    pub fn write_inner_text(&mut self, text: &str) {
        self.out.write(&html_escape::encode_text(text), OutputLanguage::Html);
    }

    /// Writes an opening tag without attributes.
    pub fn open_tag(&mut self, name: &str) {
        self.write_inner_html("<");
        self.write_inner_html(name);
        self.write_inner_html(">");
    }

    /// Writes a closing tag.
    pub fn close_tag(&mut self, name: &str) {
        self.write_inner_html("</");
        self.write_inner_html(name);
        self.write_inner_html(">");
    }

    /// Writes an immediately closed empty element.
    pub fn open_and_close_tag(&mut self, name: &str) {
        self.open_tag(name);
        self.close_tag(name);
    }

    /// Begins an opening tag whose attributes are written through the
    /// returned writer.
    pub fn open_tag_with_attributes<'a>(&'a mut self, name: &str) -> AttributeWriter<'a, 'w> {
        self.write_inner_html("<");
        self.write_inner_html(name);
        AttributeWriter { writer: self, last_unquoted: false }
    }
}

/// Writes the attributes of one opening tag, then its terminator.
pub struct AttributeWriter<'a, 'w> {
    /// The surrounding writer.
    writer: &'a mut HtmlWriter<'w>,
    /// Whether the last written value was unquoted and non-empty, in which
    /// case a `/>` terminator needs a separating space.
    last_unquoted: bool,
}

impl AttributeWriter<'_, '_> {
    /// Writes one attribute. An empty value produces a bare attribute name.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.writer.write_inner_html(" ");
        self.writer.write_inner_html(name);
        self.last_unquoted = false;
        if value.is_empty() {
            return self;
        }
        self.writer.write_inner_html("=");
        if is_unquoted_attribute_value(value) {
            self.writer.write_inner_text(value);
            self.last_unquoted = true;
        } else {
            self.writer.write_inner_html("\"");
            self.writer
                .out
                .write(&html_escape::encode_double_quoted_attribute(value), OutputLanguage::Html);
            self.writer.write_inner_html("\"");
        }
        self
    }

    /// Writes an `id` attribute.
    pub fn write_id(&mut self, value: &str) -> &mut Self {
        self.write_attribute("id", value)
    }

    /// Writes a `class` attribute.
    pub fn write_class(&mut self, value: &str) -> &mut Self {
        self.write_attribute("class", value)
    }

    /// Writes an `href` attribute, percent-encoding characters that cannot
    /// appear in an attribute-safe URL. An encoded value is always quoted.
    pub fn write_href(&mut self, value: &str) -> &mut Self {
        let encoded = encode_href(value);
        match encoded {
            Cow::Borrowed(..) => self.write_attribute("href", value),
            Cow::Owned(encoded) => {
                self.writer.write_inner_html(" href=\"");
                self.writer.write_inner_html(&encoded);
                self.writer.write_inner_html("\"");
                self.last_unquoted = false;
                self
            }
        }
    }

    /// Finishes the opening tag.
    pub fn end(&mut self) {
        self.writer.write_inner_html(">");
    }

    /// Finishes the tag as a self-closing (void) element.
    pub fn end_empty(&mut self) {
        if self.last_unquoted {
            self.writer.write_inner_html(" />");
        } else {
            self.writer.write_inner_html("/>");
        }
    }
}

/// Percent-encodes the characters that would make a URL unusable inside an
/// HTML attribute.
fn encode_href(value: &str) -> Cow<'_, str> {
    if !value.contains([' ', '"', '<', '>', '`']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '"' => out.push_str("%22"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '`' => out.push_str("%60"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BufferSink;

    fn with_writer(f: impl FnOnce(&mut HtmlWriter<'_>)) -> String {
        let mut buffer = String::new();
        let mut sink = BufferSink::new(&mut buffer, OutputLanguage::Html);
        let mut writer = HtmlWriter::new(&mut sink);
        f(&mut writer);
        buffer
    }

    #[test]
    fn tags_and_text() {
        let out = with_writer(|w| {
            w.open_tag("b");
            w.write_inner_text("1 < 2");
            w.close_tag("b");
        });
        assert_eq!(out, "<b>1 &lt; 2</b>");
    }

    #[test]
    fn unquoted_attributes() {
        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("h1");
            attributes.write_id("heading");
            attributes.end();
        });
        assert_eq!(out, "<h1 id=heading>");
    }

    #[test]
    fn quoted_attributes() {
        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("h3");
            attributes.write_id("user id");
            attributes.end();
        });
        assert_eq!(out, "<h3 id=\"user id\">");
    }

    #[test]
    fn href_encoding() {
        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("a");
            attributes.write_class("para");
            attributes.write_href("#user id");
            attributes.end();
        });
        assert_eq!(out, "<a class=para href=\"#user%20id\">");
    }

    #[test]
    fn plain_href_stays_unquoted() {
        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("a");
            attributes.write_href("https://cowel.org");
            attributes.write_class("sans");
            attributes.end();
        });
        assert_eq!(out, "<a href=https://cowel.org class=sans>");
    }

    #[test]
    fn self_closing() {
        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("hr");
            attributes.end_empty();
        });
        assert_eq!(out, "<hr/>");

        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("hr");
            attributes.write_id("abc");
            attributes.end_empty();
        });
        assert_eq!(out, "<hr id=abc />");
    }

    #[test]
    fn empty_attribute_value() {
        let out = with_writer(|w| {
            let mut attributes = w.open_tag_with_attributes("p");
            attributes.write_attribute("hidden", "");
            attributes.end();
        });
        assert_eq!(out, "<p hidden>");
    }
}
