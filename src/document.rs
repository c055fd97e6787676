//! The top-level driver: parse a document, evaluate it under the root
//! content policy, and run the section-reference resolution pass.

use crate::context::{Context, FrameIndex};
use crate::diagnostics::{Diagnostic, Logger, Severity, diagnostic};
use crate::directives::{BUILTIN_DIRECTIVES, MACRO_RESOLVER, error_behavior};
use crate::parse::{self, ParseDiagnostic};
use crate::policy::{BufferSink, HtmlPolicy, OutputLanguage, ParagraphControl, ParagraphSplitPolicy};
use crate::processing::consume_all;
use crate::sections::{ROOT_SECTION, reference_section, section_name};
use crate::services::{Bibliography, SyntaxHighlighter};
use crate::status::ProcessingStatus;

/// Everything the driver needs besides the source text.
pub struct GenerationOptions<'a> {
    /// The logger receiving diagnostics.
    pub logger: &'a dyn Logger,
    /// The syntax highlighter service.
    pub highlighter: &'a dyn SyntaxHighlighter,
    /// The bibliography service.
    pub bibliography: &'a mut dyn Bibliography,
    /// Whether root-level content is split into paragraphs.
    pub paragraphs: bool,
}

/// Forwards parse diagnostics to the logger.
fn report_parse_diagnostics(errors: &[ParseDiagnostic], logger: &dyn Logger) {
    for error in errors {
        let severity = match error.id {
            diagnostic::LITERAL_OUT_OF_RANGE => Severity::Warning,
            _ => Severity::Error,
        };
        if logger.can_log(severity) {
            logger.log(Diagnostic {
                severity,
                id: error.id,
                location: error.location,
                message: error.message.to_string(),
            });
        }
    }
}

/// Compiles a COWEL fragment to HTML.
///
/// The content is evaluated into the root section, then the resolution pass
/// splices in any referenced sections. Compilation never fails: the returned
/// status describes how evaluation went, and the output is always coherent.
pub fn generate_fragment(
    source: &str,
    options: GenerationOptions<'_>,
) -> (String, ProcessingStatus) {
    let parsed = parse::parse(source);
    report_parse_diagnostics(&parsed.errors, options.logger);

    let mut context = Context::new(
        source,
        error_behavior(),
        options.logger,
        options.highlighter,
        options.bibliography,
    );
    context.add_resolver(&BUILTIN_DIRECTIVES);
    context.add_resolver(&MACRO_RESOLVER);

    let mut body = String::new();
    let status = {
        let mut sink = BufferSink::new(&mut body, OutputLanguage::Html);
        let mut html = HtmlPolicy::new(&mut sink);
        if options.paragraphs {
            let mut split = ParagraphSplitPolicy::new(&mut html);
            let status = consume_all(&mut split, &parsed.root, FrameIndex::ROOT, &mut context);
            split.leave_paragraph();
            status
        } else {
            consume_all(&mut html, &parsed.root, FrameIndex::ROOT, &mut context)
        }
    };

    context.sections_mut().append(ROOT_SECTION, &body);
    let output = context
        .sections()
        .resolve(ROOT_SECTION, options.logger)
        .expect("the root section always exists");
    (output, status)
}

/// Compiles a complete COWEL document to a full HTML page.
///
/// The page skeleton lives in the `std.html` section and splices the
/// `std.head` and `std.body` sections; document content evaluates into the
/// body.
pub fn generate_document(
    source: &str,
    options: GenerationOptions<'_>,
) -> (String, ProcessingStatus) {
    let parsed = parse::parse(source);
    report_parse_diagnostics(&parsed.errors, options.logger);

    let mut context = Context::new(
        source,
        error_behavior(),
        options.logger,
        options.highlighter,
        options.bibliography,
    );
    context.add_resolver(&BUILTIN_DIRECTIVES);
    context.add_resolver(&MACRO_RESOLVER);

    let mut skeleton = String::from("<html>\n<head>\n");
    reference_section(&mut skeleton, section_name::DOCUMENT_HEAD);
    skeleton.push_str("</head>\n<body>\n");
    reference_section(&mut skeleton, section_name::DOCUMENT_BODY);
    skeleton.push_str("</body>\n</html>\n");
    context.sections_mut().append(section_name::DOCUMENT_HTML, &skeleton);
    context.sections_mut().make(section_name::DOCUMENT_HEAD);
    context.sections_mut().make(section_name::DOCUMENT_BODY);

    let mut body = String::new();
    let status = {
        let mut sink = BufferSink::new(&mut body, OutputLanguage::Html);
        let mut html = HtmlPolicy::new(&mut sink);
        if options.paragraphs {
            let mut split = ParagraphSplitPolicy::new(&mut html);
            let status = consume_all(&mut split, &parsed.root, FrameIndex::ROOT, &mut context);
            split.leave_paragraph();
            status
        } else {
            consume_all(&mut html, &parsed.root, FrameIndex::ROOT, &mut context)
        }
    };

    context.sections_mut().append(section_name::DOCUMENT_BODY, &body);
    let output = context
        .sections()
        .resolve(section_name::DOCUMENT_HTML, options.logger)
        .expect("the document skeleton was just created");
    (output, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingLogger;
    use crate::highlight::XHighlighter;
    use crate::services::SimpleBibliography;

    struct Compiled {
        output: String,
        status: ProcessingStatus,
        diagnostics: Vec<Diagnostic>,
    }

    fn compile(source: &str) -> Compiled {
        compile_with(source, false)
    }

    fn compile_paragraphs(source: &str) -> Compiled {
        compile_with(source, true)
    }

    fn compile_with(source: &str, paragraphs: bool) -> Compiled {
        let logger = CollectingLogger::new();
        let mut bibliography = SimpleBibliography::new();
        let (output, status) = generate_fragment(
            source,
            GenerationOptions {
                logger: &logger,
                highlighter: &XHighlighter,
                bibliography: &mut bibliography,
                paragraphs,
            },
        );
        Compiled { output, status, diagnostics: logger.take() }
    }

    #[track_caller]
    fn assert_ok(source: &str, expected: &str) {
        let compiled = compile(source);
        assert_eq!(compiled.output, expected, "source: {source}");
        assert_eq!(compiled.status, ProcessingStatus::Ok, "source: {source}");
    }

    #[track_caller]
    fn assert_error(source: &str, expected: &str, id: &str) {
        let compiled = compile(source);
        assert_eq!(compiled.output, expected, "source: {source}");
        assert_eq!(compiled.status, ProcessingStatus::Error, "source: {source}");
        assert!(
            compiled.diagnostics.iter().any(|d| d.id == id),
            "missing diagnostic {id}: {:?}",
            compiled.diagnostics,
        );
    }

    #[test]
    fn plain_text_is_escaped_html() {
        assert_ok("Hello, world!\n", "Hello, world!\n");
        assert_ok("a < b && c > d", "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn escapes_expand() {
        assert_ok("\\{\\}", "{}");
        assert_ok("a\\\nb", "ab");
    }

    #[test]
    fn comments_produce_nothing() {
        assert_ok("\\comment{anything \\b{at all}}", "");
        assert_ok("a\\:line comment\nb", "ab");
    }

    #[test]
    fn char_by_entity() {
        assert_ok(
            "\\cowel_char_by_entity{#x41}\\cowel_char_by_entity{#x42}\\cowel_char_by_entity{#x43}\n",
            "ABC\n",
        );
        assert_ok("\\cowel_char_by_entity{#x00B6}\n", "\u{B6}\n");
        assert_ok("\\cowel_char_by_entity{amp}", "&amp;");
    }

    #[test]
    fn char_by_entity_errors() {
        assert_error(
            "\\cowel_char_by_entity{}\n",
            "<error->\\cowel_char_by_entity{}</error->\n",
            diagnostic::CHAR_BLANK,
        );
        assert_error(
            "\\cowel_char_by_entity{ }\n",
            "<error->\\cowel_char_by_entity{ }</error->\n",
            diagnostic::CHAR_BLANK,
        );
        assert_error(
            "\\cowel_char_by_entity{#zzz}\n",
            "<error->\\cowel_char_by_entity{#zzz}</error->\n",
            diagnostic::CHAR_DIGITS,
        );
        assert_error(
            "\\cowel_char_by_entity{#xD800}\n",
            "<error->\\cowel_char_by_entity{#xD800}</error->\n",
            diagnostic::CHAR_NONSCALAR,
        );
    }

    #[test]
    fn char_by_num() {
        assert_ok("\\cowel_char_by_num{00B6}\n", "\u{B6}\n");
        assert_error(
            "\\cowel_char_by_num{D800}\n",
            "<error->\\cowel_char_by_num{D800}</error->\n",
            diagnostic::CHAR_NONSCALAR,
        );
    }

    #[test]
    fn invoke() {
        assert_ok("\\cowel_invoke(cowel_char_by_num){00B6}\n", "\u{B6}\n");
        assert_error(
            "\\cowel_invoke\n",
            "<error->\\cowel_invoke</error->\n",
            diagnostic::TYPE_MISMATCH,
        );
        assert_error(
            "\\cowel_invoke(\"???\")\n",
            "<error->\\cowel_invoke(\"???\")</error->\n",
            diagnostic::INVOKE_NAME_INVALID,
        );
    }

    #[test]
    fn macro_with_content_put() {
        assert_ok("\\cowel_macro(content){\\cowel_put}\\content{Content}\n", "Content\n");
    }

    #[test]
    fn macro_with_positional_put() {
        assert_ok("\\cowel_macro(pos){\\cowel_put{0}}\\pos(Positional)\n", "Positional\n");
    }

    #[test]
    fn macro_with_named_put() {
        assert_ok("\\cowel_macro(named){\\cowel_put{n}}\\named(n = Named)\n", "Named\n");
    }

    #[test]
    fn put_with_else_fallback() {
        assert_ok(
            "\\cowel_macro(try){\\cowel_put(else=Failure){0}}\\try(Success) \\try\n",
            "Success Failure\n",
        );
    }

    #[test]
    fn put_mixed_arguments() {
        assert_ok(
            "\\cowel_macro(m){\\cowel_put{greeting}, \\cowel_put\\cowel_put{0}}\
             \\m(greeting = Hello, \"!\"){macros}\n",
            "Hello, macros!\n",
        );
    }

    #[test]
    fn nested_put() {
        assert_ok("\\cowel_macro(nested){\\cowel_put{\\cowel_put}}\\nested(X){0}\n", "X\n");
    }

    #[test]
    fn put_forwarding_through_macros() {
        // The forwarded argument still evaluates in the frame it was
        // written in.
        assert_ok(
            "\\cowel_macro(inner){\\cowel_put{0}}\
             \\cowel_macro(outer){\\inner(\\cowel_put{0})}\
             \\outer(X)\n",
            "X\n",
        );
    }

    #[test]
    fn macro_shadows_builtin() {
        assert_ok("\\cowel_macro(b){!}\\b{x}\\-b{x}\n", "!<b>x</b>\n");
    }

    #[test]
    fn macro_redefinition_latest_wins() {
        let compiled = compile("\\cowel_macro(m){1}\\cowel_macro(m){2}\\m");
        assert_eq!(compiled.output, "2");
        assert!(compiled.diagnostics.iter().any(|d| d.id == diagnostic::DEF_REDEFINITION));
    }

    #[test]
    fn put_outside_macro() {
        assert_error(
            "\\cowel_put\n",
            "<error->\\cowel_put</error->\n",
            diagnostic::PUT_OUTSIDE,
        );
    }

    #[test]
    fn unknown_directive() {
        assert_error("\\awoo\n", "<error->\\awoo</error->\n", diagnostic::DIRECTIVE_LOOKUP_UNRESOLVED);
    }

    #[test]
    fn unknown_directive_gets_suggestion() {
        let compiled = compile("\\coment{}");
        let lookup = compiled
            .diagnostics
            .iter()
            .find(|d| d.id == diagnostic::DIRECTIVE_LOOKUP_UNRESOLVED)
            .unwrap();
        assert!(lookup.message.contains("comment"), "{}", lookup.message);
    }

    #[test]
    fn alias_failures_are_fatal() {
        let compiled = compile(".\\cowel_alias{\\undefined}\n");
        assert_eq!(compiled.output, ".");
        assert_eq!(compiled.status, ProcessingStatus::Fatal);
        assert!(compiled.diagnostics.iter().any(|d| d.id == diagnostic::ALIAS_NAME_INVALID));

        let compiled = compile(".\\cowel_alias(\"?\"){cowel_alias}\n");
        assert_eq!(compiled.output, ".");
        assert_eq!(compiled.status, ProcessingStatus::Fatal);
        assert!(compiled.diagnostics.iter().any(|d| d.id == diagnostic::ALIAS_NAME_INVALID));

        let compiled = compile(".\\cowel_alias(a, a){cowel_alias}\n");
        assert_eq!(compiled.output, ".");
        assert_eq!(compiled.status, ProcessingStatus::Fatal);
        assert!(compiled.diagnostics.iter().any(|d| d.id == diagnostic::ALIAS_DUPLICATE));
    }

    #[test]
    fn alias_chain_behaves_like_builtin() {
        assert_ok(
            "\\cowel_alias(A){b}\\cowel_alias(B){A}\\B{x} \\b{x}\n",
            "<b>x</b> <b>x</b>\n",
        );
    }

    #[test]
    fn url() {
        assert_ok(
            "\\url{https://cowel.org}",
            "<a href=https://cowel.org class=sans>https://cowel.org</a>",
        );
    }

    #[test]
    fn headings() {
        assert_ok("\\h1{Heading}\n", "<h1 id=heading><a class=para href=#heading></a>Heading</h1>\n");
        assert_ok("\\h2(listed=false){ }\n", "<h2> </h2>\n");
        assert_ok(
            "\\h3(id=\"user id\",listed=false){Heading}\n",
            "<h3 id=\"user id\"><a class=para href=\"#user%20id\"></a>Heading</h3>\n",
        );
        assert_ok(
            "\\h4(id=user-id,listed=false){Heading}\n",
            "<h4 id=user-id><a class=para href=#user-id></a>Heading</h4>\n",
        );
    }

    #[test]
    fn heading_with_highlighted_code() {
        assert_ok(
            "\\h1{\\code(x){abcx}}\n",
            "<h1 id=abcx><a class=para href=#abcx></a><code>abc<h- data-h=kw>x</h-></code></h1>\n",
        );
    }

    #[test]
    fn raw_text_elements() {
        assert_ok("\\style{b { color: red; }}\n", "<style>b { color: red; }</style>\n");
        assert_ok(
            "\\script{let x = 3 < 5; let y = true && false;}\n",
            "<script>let x = 3 < 5; let y = true && false;</script>\n",
        );
        assert_error(
            "\\script{</script>}",
            "<script></script>",
            diagnostic::RAW_TEXT_CLOSING,
        );
        assert_error("\\style{</style>}", "<style></style>", diagnostic::RAW_TEXT_CLOSING);
    }

    #[test]
    fn code() {
        assert_error("\\code{}\n", "<error->\\code{}</error->\n", diagnostic::TYPE_MISMATCH);
        assert_ok("\\code(x){}\n", "<code></code>\n");
        assert_ok("\\code(x){ }\n", "<code> </code>\n");
        assert_ok("\\code(x){xxx}\n", "<code><h- data-h=kw>xxx</h-></code>\n");
        assert_ok("\\code(x){xxx123}\n", "<code><h- data-h=kw>xxx</h->123</code>\n");
        assert_ok("\\code(x){ 123 }\n", "<code> 123 </code>\n");
    }

    #[test]
    fn code_with_formatting() {
        assert_ok("\\code(x){ \\b{123} }\n", "<code> <b>123</b> </code>\n");
        assert_ok("\\code(x){ \\b{xxx} }\n", "<code> <b><h- data-h=kw>xxx</h-></b> </code>\n");
        assert_ok(
            "\\code(x){ \\b{x}xx }\n",
            "<code> <b><h- data-h=kw>x</h-></b><h- data-h=kw>xx</h-> </code>\n",
        );
    }

    #[test]
    fn code_inside_error_content() {
        assert_error(
            "\\code(x){\\awoo}\n",
            "<code><error->\\awoo</error-></code>\n",
            diagnostic::DIRECTIVE_LOOKUP_UNRESOLVED,
        );
    }

    #[test]
    fn highlight_as() {
        assert_ok("\\cowel_highlight_as(keyword){awoo}\n", "<h- data-h=kw>awoo</h->\n");
        assert_error(
            "\\cowel_highlight_as(zzz){x}\n",
            "<error->\\cowel_highlight_as(zzz){x}</error->\n",
            diagnostic::HIGHLIGHT_NAME_INVALID,
        );
    }

    #[test]
    fn html_element() {
        assert_ok("\\cowel_html_element(div)", "<div></div>");
        assert_ok(
            "\\cowel_html_element(span, (id=abc)){span content}",
            "<span id=abc>span content</span>",
        );
        assert_error(
            "\\cowel_html_element(span, (id=abc, x)){span content}",
            "<error->\\cowel_html_element(span, (id=abc, x)){span content}</error->",
            diagnostic::TYPE_MISMATCH,
        );
        assert_error(
            "\\cowel_html_element",
            "<error->\\cowel_html_element</error->",
            diagnostic::TYPE_MISMATCH,
        );
        assert_error(
            "\\cowel_html_element(\"<\")",
            "<error->\\cowel_html_element(\"&lt;\")</error->",
            diagnostic::HTML_ELEMENT_NAME_INVALID,
        );
    }

    #[test]
    fn self_closing_element() {
        assert_ok("\\cowel_html_self_closing_element(hr)", "<hr/>");
        assert_ok("\\cowel_html_self_closing_element(hr, (id=abc))", "<hr id=abc />");
        assert_error(
            "\\cowel_html_self_closing_element",
            "<error->\\cowel_html_self_closing_element</error->",
            diagnostic::TYPE_MISMATCH,
        );
    }

    #[test]
    fn formatting_passthrough() {
        assert_ok("\\b{bold} \\i{italic}\n", "<b>bold</b> <i>italic</i>\n");
        assert_ok("\\i(id=123){x}", "<i id=123>x</i>");
        assert_ok("\\tt{x}", "<tt->x</tt->");
    }

    #[test]
    fn errors_continue_past_siblings() {
        assert_error(
            "a\\awoo{}b\n",
            "a<error->\\awoo{}</error->b\n",
            diagnostic::DIRECTIVE_LOOKUP_UNRESOLVED,
        );
    }

    #[test]
    fn variables() {
        assert_ok("\\Vset(x){1}\\Vget(x)", "1");
        assert_ok("\\Vget(unset)", "");
    }

    #[test]
    fn sections_there_and_here() {
        assert_ok("\\there(notes){hello}\\here(notes)", "hello");
        assert_ok("\\here(notes)\\there(notes){late}", "late");
    }

    #[test]
    fn missing_section_resolves_to_nothing() {
        let compiled = compile("\\here(nowhere-to-be-found)");
        assert_eq!(compiled.output, "");
        // The section is created empty by \here, so this is not an error.
        assert_eq!(compiled.status, ProcessingStatus::Ok);
    }

    #[test]
    fn table_of_contents() {
        assert_ok(
            "\\make_contents\\h1{A}\n",
            "<div class=toc><a class=toc-entry href=#a>A</a>\n</div>\
             <h1 id=a><a class=para href=#a></a>A</h1>\n",
        );
    }

    #[test]
    fn bibliography_reference() {
        let compiled = compile(
            "\\bib(id=N4950, link=https://wg21.link/n4950)\\ref(to=N4950)",
        );
        assert_eq!(compiled.status, ProcessingStatus::Ok);
        assert_eq!(compiled.output, "<a href=https://wg21.link/n4950>[N4950]</a>");
    }

    #[test]
    fn ref_to_anchor_uses_preview() {
        assert_ok(
            "\\h1(listed=false){Intro}\\ref(to=#intro)",
            "<h1 id=intro><a class=para href=#intro></a>Intro</h1><a href=#intro>Intro</a>",
        );
    }

    #[test]
    fn text_policies() {
        assert_ok("\\cowel_text_only{\\b{x}}", "x");
        assert_ok("\\cowel_text_as_html{<b>x</b>}", "<b>x</b>");
        assert_ok("\\cowel_no_invoke{\\X{Y}}", "\\X{Y}");
    }

    #[test]
    fn source_round_trip() {
        let source = "\\cowel_source_as_text{\\X{Y} text}";
        let compiled = compile(source);
        assert_eq!(compiled.output, "\\X{Y} text");
        assert_eq!(compiled.status, ProcessingStatus::Ok);
    }

    #[test]
    fn logic_short_circuits() {
        assert_ok("\\cowel_and(true, true)", "true");
        assert_ok("\\cowel_or(false, true)", "true");
        assert_ok("\\cowel_not{true}", "false");
        // The decisive operand stops evaluation before the bad directive.
        assert_ok("\\cowel_and(true, false, \\awoo)", "false");
    }

    #[test]
    fn str_transforms() {
        assert_ok("\\cowel_str_to_upper{abc}", "ABC");
        assert_ok("\\cowel_str_to_lower{ABC}", "abc");
    }

    #[test]
    fn paragraph_splitting() {
        let compiled = compile_paragraphs("a\n\nb");
        assert_eq!(compiled.output, "<p>a</p><p>b</p>");

        let compiled = compile_paragraphs("a\nstill a\n\nb");
        assert_eq!(compiled.output, "<p>a\nstill a</p><p>b</p>");
    }

    #[test]
    fn paragraphs_and_display() {
        // A block directive interrupts the paragraph; inline ones join it.
        let compiled = compile_paragraphs("a\n\\div{d}\nb \\b{x}");
        assert_eq!(compiled.output, "<p>a\n</p><div>d</div>\n<p>b <b>x</b></p>");
    }

    #[test]
    fn paragraph_control_directives() {
        assert_ok("\\cowel_paragraphs{a\n\nb}", "<p>a</p><p>b</p>");
        let compiled = compile_paragraphs("a\\cowel_paragraph_leave{}b");
        assert_eq!(compiled.output, "<p>a</p><p>b</p>");
    }

    #[test]
    fn special_blocks() {
        assert_ok(
            "\\Bnote{note text}",
            "<note-block><p><intro-></intro-> note text</p></note-block>",
        );
        assert_ok("\\Bquote{quoted}", "<blockquote><p>quoted</p></blockquote>");
    }

    #[test]
    fn generated_document_has_no_markers() {
        let logger = CollectingLogger::new();
        let mut bibliography = SimpleBibliography::new();
        let (output, status) = generate_document(
            "\\h1{Title}\ntext",
            GenerationOptions {
                logger: &logger,
                highlighter: &XHighlighter,
                bibliography: &mut bibliography,
                paragraphs: false,
            },
        );
        assert_eq!(status, ProcessingStatus::Ok);
        assert!(output.starts_with("<html>\n<head>\n</head>\n<body>\n"));
        assert!(output.ends_with("</body>\n</html>\n"));
        assert!(output.contains("<h1 id=title>"));
        assert!(output.chars().all(|c| (c as u32) < 0xF0000));
    }

    #[test]
    fn fuzz_escapes_only() {
        // A document with no directives is the HTML escape of itself.
        let source = "plain & <angles> {braces} 100% text\n";
        let compiled = compile(source);
        assert_eq!(compiled.output, "plain &amp; &lt;angles&gt; {braces} 100% text\n");
        assert_eq!(compiled.status, ProcessingStatus::Ok);
    }
}
