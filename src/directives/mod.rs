//! Directive behaviors and the built-in directive set.
//!
//! A *behavior* implements the semantics of one or more directives. Built-in
//! behaviors are stateless singletons selected by name through the context's
//! resolver stack; user macros resolve to the shared macro-call behavior.

use crate::ast::{Argument, ArgumentKind, Content, Directive};
use crate::context::{Context, FrameIndex, FuzzyMatch, NameResolver};
use crate::diagnostics::diagnostic;
use crate::policy::ContentPolicy;
use crate::status::ProcessingStatus;
use crate::typo::closest_match;

mod chars;
mod code;
mod heading;
mod macros;
mod misc;
mod passthrough;
mod policies;
mod sections;
mod variables;

pub use macros::{MACRO_RESOLVER, MacroNameResolver};

/// A category which applies to a directive behavior generally, regardless of
/// the specific directive processed at the time.
///
/// Categories guide how policies treat a directive, e.g. whether its output
/// can meaningfully participate in syntax highlighting or in HTML attribute
/// values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    /// The directive generates no plaintext or HTML, like `\comment`.
    Meta,
    /// The directive produces purely plaintext, regardless of input.
    PureText,
    /// Purely HTML content, like `\cowel_text_as_html{…}`. Such content
    /// produces no plaintext, and using it in an attribute is erroneous.
    PureHtml,
    /// An HTML formatting wrapper for the content within, like `\b`. During
    /// syntax highlighting, the contents are highlighted and fed back in.
    Formatting,
    /// A directive which is replaced by other content and has no fixed
    /// behavior of its own.
    Macro,
}

/// Specifies how a directive should be displayed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Display {
    /// Nothing is displayed.
    None,
    /// A block, like `\h1` or `\codeblock`; never part of a paragraph.
    Block,
    /// Inline content, like `\b` or `\code`, displayed within paragraphs.
    Inline,
    /// The directive expands to other content and has no display of its own.
    Macro,
}

/// One directive invocation, as seen by a behavior.
///
/// For a plain invocation this mirrors the directive node; `\cowel_invoke`
/// and aliases re-dispatch with a different name or argument list.
#[derive(Clone, Copy)]
pub struct Invocation<'a, 'n> {
    /// The syntactic directive this invocation came from. Used for source
    /// spans and error sentinels.
    pub directive: &'a Directive,
    /// The resolved directive name.
    pub name: &'n str,
    /// The effective arguments.
    pub arguments: &'a [Argument],
    /// The effective content block.
    pub content: &'a [Content],
    /// The frame under which arguments and content evaluate.
    pub content_frame: FrameIndex,
}

impl<'a> Invocation<'a, '_> {
    /// Returns the index and node of the first positional argument.
    pub fn first_positional(&self) -> Option<(usize, &'a Argument)> {
        self.arguments
            .iter()
            .enumerate()
            .find(|(_, argument)| argument.kind == ArgumentKind::Positional)
    }
}

/// Implements behavior that one or multiple directives should have.
pub trait DirectiveBehavior: Sync {
    /// The category of the behavior.
    fn category(&self) -> Category;

    /// The display of the behavior.
    fn display(&self) -> Display;

    /// Evaluates one invocation into the given policy.
    fn apply<'a>(
        &self,
        out: &mut dyn ContentPolicy<'a>,
        call: &Invocation<'a, '_>,
        context: &mut Context<'a>,
    ) -> ProcessingStatus;
}

/// Warns about all arguments of a directive that takes none.
pub(crate) fn warn_all_args_ignored(call: &Invocation<'_, '_>, context: &Context<'_>) {
    if let Some(argument) = call.arguments.first() {
        context.try_warning(
            diagnostic::IGNORED_ARGS,
            argument.span,
            format!("\\{} takes no arguments; they were ignored.", call.name),
        );
    }
}

/// Warns about positional arguments of a directive that matches named
/// arguments only.
pub(crate) fn warn_ignored_positional(call: &Invocation<'_, '_>, context: &Context<'_>) {
    for argument in call.arguments {
        if argument.kind == ArgumentKind::Positional {
            context.try_warning(
                diagnostic::IGNORED_ARGS,
                argument.span,
                "This positional argument was ignored.",
            );
        }
    }
}

/// The built-in error-sentinel behavior, used wherever directive processing
/// encounters an error.
pub fn error_behavior() -> &'static dyn DirectiveBehavior {
    &ERROR
}

/// The shared behavior that all user macro invocations resolve to.
pub(crate) fn macro_call_behavior() -> &'static dyn DirectiveBehavior {
    &macros::MACRO_CALL
}

// ---------------------------------------------------------------------------
// The built-in directive set.

use chars::{CharByEntityBehavior, CharByNumBehavior};
use code::{CodeBehavior, HighlightAsBehavior, PreTrimming};
use heading::HeadingBehavior;
use macros::{AliasBehavior, InvokeBehavior, MacroDefineBehavior, PutBehavior};
use misc::{
    CommentBehavior, ErrorBehavior, LogicKind, LogicalExpressionBehavior, LogicalNotBehavior,
    LoremIpsumBehavior, PlaintextWrapperBehavior, StrTransformBehavior, TextTransformation,
    TrimBehavior,
};
use passthrough::{
    HtmlElementBehavior, InTagBehavior, PassthroughBehavior, PolicyUsage, RawTextBehavior,
    SelfClosing, SelfClosingBehavior, SpecialBlockBehavior, UrlBehavior,
};
use policies::{
    KnownPolicy, ParagraphEnterBehavior, ParagraphInheritBehavior, ParagraphLeaveBehavior,
    PolicyBehavior,
};
use sections::{
    BibliographyAddBehavior, HereBehavior, MakeSectionBehavior, RefBehavior, ThereBehavior,
};
use variables::{GetVariableBehavior, ModifyVariableBehavior};

static ABSTRACT_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("abstract-block", true);
static ACTIONS: PolicyBehavior = PolicyBehavior::new(KnownPolicy::Actions);
static ALIAS: AliasBehavior = AliasBehavior;
static AND: LogicalExpressionBehavior = LogicalExpressionBehavior::new(LogicKind::And);
static B: PassthroughBehavior = PassthroughBehavior::inline("b", PolicyUsage::Inherit);
static BIB: BibliographyAddBehavior = BibliographyAddBehavior;
static BLOCKQUOTE: SpecialBlockBehavior = SpecialBlockBehavior::new("blockquote", false);
static BR: SelfClosingBehavior = SelfClosingBehavior::new("br", Display::Inline);
static BUG_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("bug-block", true);
static CAPTION: PassthroughBehavior = PassthroughBehavior::block("caption", PolicyUsage::Html);
static CHAR_BY_ENTITY: CharByEntityBehavior = CharByEntityBehavior;
static CHAR_BY_NUM: CharByNumBehavior = CharByNumBehavior;
static CITE: PassthroughBehavior = PassthroughBehavior::inline("cite", PolicyUsage::Inherit);
static CODE: CodeBehavior = CodeBehavior::new("code", Display::Inline, PreTrimming::No);
static CODEBLOCK: CodeBehavior = CodeBehavior::new("code-block", Display::Block, PreTrimming::Yes);
static COL: PassthroughBehavior = PassthroughBehavior::block("col", PolicyUsage::Html);
static COLGROUP: PassthroughBehavior = PassthroughBehavior::block("colgroup", PolicyUsage::Html);
static COMMENT: CommentBehavior = CommentBehavior;
static DD: PassthroughBehavior = PassthroughBehavior::block("dd", PolicyUsage::Html);
static DEL: PassthroughBehavior = PassthroughBehavior::inline("del", PolicyUsage::Inherit);
static DEL_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("del-block", false);
static DETAILS: PassthroughBehavior = PassthroughBehavior::block("details", PolicyUsage::Html);
static DETAILS_BLOCK: PassthroughBehavior =
    PassthroughBehavior::block("details", PolicyUsage::Inherit);
static DFN: PassthroughBehavior = PassthroughBehavior::inline("dfn", PolicyUsage::Inherit);
static DIV: PassthroughBehavior = PassthroughBehavior::block("div", PolicyUsage::Html);
static DL: PassthroughBehavior = PassthroughBehavior::block("dl", PolicyUsage::Html);
static DT: PassthroughBehavior = PassthroughBehavior::block("dt", PolicyUsage::Html);
static EM: PassthroughBehavior = PassthroughBehavior::inline("em", PolicyUsage::Inherit);
static ERROR: ErrorBehavior = ErrorBehavior;
static EXAMPLE_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("example-block", true);
static H1: HeadingBehavior = HeadingBehavior::new(1);
static H2: HeadingBehavior = HeadingBehavior::new(2);
static H3: HeadingBehavior = HeadingBehavior::new(3);
static H4: HeadingBehavior = HeadingBehavior::new(4);
static H5: HeadingBehavior = HeadingBehavior::new(5);
static H6: HeadingBehavior = HeadingBehavior::new(6);
static HERE: HereBehavior = HereBehavior::new(Display::Inline);
static HEREBLOCK: HereBehavior = HereBehavior::new(Display::Block);
static HIGHLIGHT: PolicyBehavior = PolicyBehavior::new(KnownPolicy::Highlight);
static HIGHLIGHT_AS: HighlightAsBehavior = HighlightAsBehavior;
static HIGHLIGHT_PHANTOM: PolicyBehavior = PolicyBehavior::new(KnownPolicy::Phantom);
static HR: SelfClosingBehavior = SelfClosingBehavior::new("hr", Display::Block);
static HTML_ELEMENT: HtmlElementBehavior = HtmlElementBehavior::new(SelfClosing::No);
static HTML_SELF_CLOSING_ELEMENT: HtmlElementBehavior = HtmlElementBehavior::new(SelfClosing::Yes);
static I: PassthroughBehavior = PassthroughBehavior::inline("i", PolicyUsage::Inherit);
static IMPORTANT_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("important-block", true);
static INDENT_BLOCK: InTagBehavior =
    InTagBehavior::new("div", "indent", PolicyUsage::Html, Display::Block);
static INS: PassthroughBehavior = PassthroughBehavior::inline("ins", PolicyUsage::Inherit);
static INS_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("ins-block", false);
static INVOKE: InvokeBehavior = InvokeBehavior;
static KBD: PassthroughBehavior = PassthroughBehavior::inline("kbd", PolicyUsage::Inherit);
static LI: PassthroughBehavior = PassthroughBehavior::block("li", PolicyUsage::Html);
static LOREM_IPSUM: LoremIpsumBehavior = LoremIpsumBehavior;
static MACRO: MacroDefineBehavior = MacroDefineBehavior;
static MAIL: UrlBehavior = UrlBehavior::new("mailto:");
static MAKE_BIB: MakeSectionBehavior =
    MakeSectionBehavior::new("bib", crate::sections::section_name::BIBLIOGRAPHY);
static MAKE_CONTENTS: MakeSectionBehavior =
    MakeSectionBehavior::new("toc", crate::sections::section_name::TABLE_OF_CONTENTS);
static MARK: PassthroughBehavior = PassthroughBehavior::inline("mark", PolicyUsage::Inherit);
static NO_INVOKE: PolicyBehavior = PolicyBehavior::new(KnownPolicy::NoInvoke);
static NOBR: InTagBehavior =
    InTagBehavior::new("span", "word", PolicyUsage::Inherit, Display::Inline);
static NOSCRIPT: PassthroughBehavior = PassthroughBehavior::block("noscript", PolicyUsage::Html);
static NOT: LogicalNotBehavior = LogicalNotBehavior;
static NOTE_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("note-block", true);
static OBLIQUE: InTagBehavior =
    InTagBehavior::new("span", "oblique", PolicyUsage::Inherit, Display::Inline);
static OL: PassthroughBehavior = PassthroughBehavior::block("ol", PolicyUsage::Html);
static OR: LogicalExpressionBehavior = LogicalExpressionBehavior::new(LogicKind::Or);
static P: PassthroughBehavior = PassthroughBehavior::block("p", PolicyUsage::Html);
static PARAGRAPH_ENTER: ParagraphEnterBehavior = ParagraphEnterBehavior;
static PARAGRAPH_INHERIT: ParagraphInheritBehavior = ParagraphInheritBehavior;
static PARAGRAPH_LEAVE: ParagraphLeaveBehavior = ParagraphLeaveBehavior;
static PARAGRAPHS: PolicyBehavior = PolicyBehavior::new(KnownPolicy::Paragraphs);
static PRE: PassthroughBehavior = PassthroughBehavior::block("pre", PolicyUsage::Html);
static PUT: PutBehavior = PutBehavior;
static Q: PassthroughBehavior = PassthroughBehavior::inline("q", PolicyUsage::Inherit);
static QUOTE_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("blockquote", false);
static REF: RefBehavior = RefBehavior;
static S: PassthroughBehavior = PassthroughBehavior::inline("s", PolicyUsage::Inherit);
static SAMP: PassthroughBehavior = PassthroughBehavior::inline("samp", PolicyUsage::Inherit);
static SANS: PassthroughBehavior = PassthroughBehavior::inline("f-sans", PolicyUsage::Inherit);
static SCRIPT: RawTextBehavior = RawTextBehavior::new("script");
static SERIF: PassthroughBehavior = PassthroughBehavior::inline("f-serif", PolicyUsage::Inherit);
static SMALL: PassthroughBehavior = PassthroughBehavior::inline("small", PolicyUsage::Inherit);
static SOURCE_AS_TEXT: PolicyBehavior = PolicyBehavior::new(KnownPolicy::SourceAsText);
static SPAN: PassthroughBehavior = PassthroughBehavior::inline("span", PolicyUsage::Inherit);
static STR_TO_LOWER: StrTransformBehavior =
    StrTransformBehavior::new(TextTransformation::Lowercase);
static STR_TO_UPPER: StrTransformBehavior =
    StrTransformBehavior::new(TextTransformation::Uppercase);
static STRONG: PassthroughBehavior = PassthroughBehavior::inline("strong", PolicyUsage::Inherit);
static STYLE: RawTextBehavior = RawTextBehavior::new("style");
static SUB: PassthroughBehavior = PassthroughBehavior::inline("sub", PolicyUsage::Inherit);
static SUMMARY: PassthroughBehavior = PassthroughBehavior::block("summary", PolicyUsage::Html);
static SUP: PassthroughBehavior = PassthroughBehavior::inline("sup", PolicyUsage::Inherit);
static TABLE: PassthroughBehavior = PassthroughBehavior::block("table", PolicyUsage::Html);
static TBODY: PassthroughBehavior = PassthroughBehavior::block("tbody", PolicyUsage::Html);
static TD: PassthroughBehavior = PassthroughBehavior::block("td", PolicyUsage::Html);
static TEL: UrlBehavior = UrlBehavior::new("tel:");
static TEXT: PlaintextWrapperBehavior = PlaintextWrapperBehavior;
static TEXT_AS_HTML: PolicyBehavior = PolicyBehavior::new(KnownPolicy::TextAsHtml);
static TEXT_ONLY: PolicyBehavior = PolicyBehavior::new(KnownPolicy::TextOnly);
static TFOOT: PassthroughBehavior = PassthroughBehavior::block("tfoot", PolicyUsage::Html);
static TH: PassthroughBehavior = PassthroughBehavior::block("th", PolicyUsage::Html);
static THEAD: PassthroughBehavior = PassthroughBehavior::block("thead", PolicyUsage::Html);
static THERE: ThereBehavior = ThereBehavior;
static TIP_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("tip-block", true);
static TO_HTML: PolicyBehavior = PolicyBehavior::new(KnownPolicy::ToHtml);
static TODO_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("todo-block", true);
static TR: PassthroughBehavior = PassthroughBehavior::block("tr", PolicyUsage::Html);
static TRIM: TrimBehavior = TrimBehavior;
static TT: PassthroughBehavior = PassthroughBehavior::inline("tt-", PolicyUsage::Inherit);
static U: PassthroughBehavior = PassthroughBehavior::inline("u", PolicyUsage::Inherit);
static UL: PassthroughBehavior = PassthroughBehavior::block("ul", PolicyUsage::Html);
static URL: UrlBehavior = UrlBehavior::new("");
static VAR: PassthroughBehavior = PassthroughBehavior::inline("var", PolicyUsage::Inherit);
static VGET: GetVariableBehavior = GetVariableBehavior;
static VSET: ModifyVariableBehavior = ModifyVariableBehavior;
static WARNING_BLOCK: SpecialBlockBehavior = SpecialBlockBehavior::new("warning-block", true);
static WBR: SelfClosingBehavior = SelfClosingBehavior::new("wbr", Display::Inline);

/// The built-in behaviors, sorted by name for binary search.
static BEHAVIORS_BY_NAME: &[(&str, &'static dyn DirectiveBehavior)] = &[
    ("Babstract", &ABSTRACT_BLOCK),
    ("Bdel", &DEL_BLOCK),
    ("Bdetails", &DETAILS_BLOCK),
    ("Bex", &EXAMPLE_BLOCK),
    ("Bimp", &IMPORTANT_BLOCK),
    ("Bindent", &INDENT_BLOCK),
    ("Bins", &INS_BLOCK),
    ("Bnote", &NOTE_BLOCK),
    ("Bquote", &QUOTE_BLOCK),
    ("Btip", &TIP_BLOCK),
    ("Btodo", &TODO_BLOCK),
    ("Bug", &BUG_BLOCK),
    ("Bwarn", &WARNING_BLOCK),
    ("Vget", &VGET),
    ("Vset", &VSET),
    ("b", &B),
    ("bib", &BIB),
    ("blockquote", &BLOCKQUOTE),
    ("br", &BR),
    ("caption", &CAPTION),
    ("cite", &CITE),
    ("code", &CODE),
    ("codeblock", &CODEBLOCK),
    ("col", &COL),
    ("colgroup", &COLGROUP),
    ("comment", &COMMENT),
    ("cowel_actions", &ACTIONS),
    ("cowel_alias", &ALIAS),
    ("cowel_and", &AND),
    ("cowel_char_by_entity", &CHAR_BY_ENTITY),
    ("cowel_char_by_num", &CHAR_BY_NUM),
    ("cowel_highlight", &HIGHLIGHT),
    ("cowel_highlight_as", &HIGHLIGHT_AS),
    ("cowel_highlight_phantom", &HIGHLIGHT_PHANTOM),
    ("cowel_html_element", &HTML_ELEMENT),
    ("cowel_html_self_closing_element", &HTML_SELF_CLOSING_ELEMENT),
    ("cowel_invoke", &INVOKE),
    ("cowel_macro", &MACRO),
    ("cowel_no_invoke", &NO_INVOKE),
    ("cowel_not", &NOT),
    ("cowel_or", &OR),
    ("cowel_paragraph_enter", &PARAGRAPH_ENTER),
    ("cowel_paragraph_inherit", &PARAGRAPH_INHERIT),
    ("cowel_paragraph_leave", &PARAGRAPH_LEAVE),
    ("cowel_paragraphs", &PARAGRAPHS),
    ("cowel_put", &PUT),
    ("cowel_source_as_text", &SOURCE_AS_TEXT),
    ("cowel_str_to_lower", &STR_TO_LOWER),
    ("cowel_str_to_upper", &STR_TO_UPPER),
    ("cowel_text_as_html", &TEXT_AS_HTML),
    ("cowel_text_only", &TEXT_ONLY),
    ("cowel_to_html", &TO_HTML),
    ("dd", &DD),
    ("del", &DEL),
    ("details", &DETAILS),
    ("dfn", &DFN),
    ("div", &DIV),
    ("dl", &DL),
    ("dt", &DT),
    ("em", &EM),
    ("error", &ERROR),
    ("h1", &H1),
    ("h2", &H2),
    ("h3", &H3),
    ("h4", &H4),
    ("h5", &H5),
    ("h6", &H6),
    ("here", &HERE),
    ("hereblock", &HEREBLOCK),
    ("hr", &HR),
    ("i", &I),
    ("ins", &INS),
    ("kbd", &KBD),
    ("li", &LI),
    ("lorem_ipsum", &LOREM_IPSUM),
    ("mail", &MAIL),
    ("make_bib", &MAKE_BIB),
    ("make_contents", &MAKE_CONTENTS),
    ("mark", &MARK),
    ("nobr", &NOBR),
    ("noscript", &NOSCRIPT),
    ("o", &OBLIQUE),
    ("ol", &OL),
    ("p", &P),
    ("pre", &PRE),
    ("q", &Q),
    ("ref", &REF),
    ("s", &S),
    ("samp", &SAMP),
    ("sans", &SANS),
    ("script", &SCRIPT),
    ("serif", &SERIF),
    ("small", &SMALL),
    ("span", &SPAN),
    ("strong", &STRONG),
    ("style", &STYLE),
    ("sub", &SUB),
    ("summary", &SUMMARY),
    ("sup", &SUP),
    ("table", &TABLE),
    ("tbody", &TBODY),
    ("td", &TD),
    ("tel", &TEL),
    ("text", &TEXT),
    ("tfoot", &TFOOT),
    ("th", &TH),
    ("thead", &THEAD),
    ("there", &THERE),
    ("tr", &TR),
    ("trim", &TRIM),
    ("tt", &TT),
    ("u", &U),
    ("ul", &UL),
    ("url", &URL),
    ("var", &VAR),
    ("wbr", &WBR),
];

/// The resolver for the built-in directive set. Sits at the bottom of every
/// context's resolver stack.
///
/// Built-in names are also found with a `-` prefix (`\-b` and `\b` are the
/// same directive); macro definitions cannot use the prefix, so it lets a
/// document reach a shadowed built-in.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinDirectiveSet;

impl NameResolver for BuiltinDirectiveSet {
    fn resolve<'r>(
        &'r self,
        name: &str,
        _context: &Context<'_>,
    ) -> Option<&'r dyn DirectiveBehavior> {
        let name = name.strip_prefix('-').unwrap_or(name);
        if name.is_empty() {
            return None;
        }
        BEHAVIORS_BY_NAME
            .binary_search_by(|(known, _)| known.cmp(&name))
            .ok()
            .map(|index| BEHAVIORS_BY_NAME[index].1)
    }

    fn fuzzy(&self, name: &str, _context: &Context<'_>) -> Option<FuzzyMatch> {
        let (closest, distance) =
            closest_match(BEHAVIORS_BY_NAME.iter().map(|(known, _)| *known), name)?;
        // Only suggest names that are reasonably close.
        (distance * 2 <= name.chars().count())
            .then(|| FuzzyMatch { name: closest.to_string(), distance })
    }
}

/// The built-in resolver singleton.
pub static BUILTIN_DIRECTIVES: BuiltinDirectiveSet = BuiltinDirectiveSet;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(BEHAVIORS_BY_NAME.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn builtin_prefix() {
        use crate::diagnostics::IgnorantLogger;
        use crate::services::{NoSupportHighlighter, SimpleBibliography};

        let mut bibliography = SimpleBibliography::new();
        let context = Context::new(
            "",
            error_behavior(),
            &IgnorantLogger,
            &NoSupportHighlighter,
            &mut bibliography,
        );
        let set = BuiltinDirectiveSet;
        assert!(set.resolve("b", &context).is_some());
        assert!(set.resolve("-b", &context).is_some());
        assert!(set.resolve("awoo", &context).is_none());
        assert!(set.resolve("", &context).is_none());
        assert!(set.resolve("-", &context).is_none());
    }

    #[test]
    fn fuzzy_suggests_close_names() {
        use crate::diagnostics::IgnorantLogger;
        use crate::services::{NoSupportHighlighter, SimpleBibliography};

        let mut bibliography = SimpleBibliography::new();
        let context = Context::new(
            "",
            error_behavior(),
            &IgnorantLogger,
            &NoSupportHighlighter,
            &mut bibliography,
        );
        let set = BuiltinDirectiveSet;
        let closest = set.fuzzy("coment", &context).unwrap();
        assert_eq!(closest.name, "comment");
        assert!(set.fuzzy("zzzzzzzzzzzzzzzzzz", &context).is_none());
    }
}
