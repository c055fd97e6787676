//! Contextual state for one document compilation: sections, variables,
//! macros, macro frames, registered IDs, the name-resolver stack, and the
//! injected services.

use crate::ast::{Argument, Content, Directive};
use crate::codemap::Span;
use crate::diagnostics::{Diagnostic, Logger, Severity};
use crate::directives::DirectiveBehavior;
use crate::sections::Sections;
use crate::services::{Bibliography, SyntaxHighlighter};
use std::collections::HashMap;

/// A handle into the macro frame stack of a [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameIndex(u32);

impl FrameIndex {
    /// The document frame, which is not a macro frame.
    pub const ROOT: FrameIndex = FrameIndex(0);

    /// Returns true if this is the document frame.
    #[inline]
    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

/// One active macro invocation, accessed by `\cowel_put`.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// The arguments of the invocation.
    pub arguments: &'a [Argument],
    /// The content block of the invocation.
    pub content: &'a [Content],
    /// The frame under which the invocation's arguments and content were
    /// written, used when splicing them back in.
    pub content_frame: FrameIndex,
}

/// A registered HTML ID.
#[derive(Clone, Debug, Default)]
pub struct Referred {
    /// The name of the section holding a rendered preview of the referred
    /// element, if one was written.
    pub preview_section: Option<String>,
}

/// A fuzzy name-lookup match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FuzzyMatch {
    /// The closest known name.
    pub name: String,
    /// The edit distance from the looked-up name.
    pub distance: usize,
}

/// Maps a directive name to the behavior implementing it.
///
/// Resolvers are stacked in the [`Context`]; lookups run from the top of the
/// stack down, so resolvers added later shadow earlier ones. The built-in
/// directive set sits at the bottom and the user-macro resolver on top.
pub trait NameResolver {
    /// Returns the behavior for `name`, if this resolver knows one.
    fn resolve<'r>(&'r self, name: &str, context: &Context<'_>) -> Option<&'r dyn DirectiveBehavior>;

    /// Returns the closest known name by edit distance, for diagnostics.
    fn fuzzy(&self, _name: &str, _context: &Context<'_>) -> Option<FuzzyMatch> {
        None
    }
}

/// Stores contextual information during document processing.
///
/// The context is created by the driver, mutated throughout evaluation, and
/// consulted once more during reference resolution. All AST nodes outlive it.
pub struct Context<'a> {
    /// The source text the AST's spans point into.
    source: &'a str,
    /// The named output sections.
    sections: Sections,
    /// Document variables (persistent string-to-string storage).
    variables: HashMap<String, String>,
    /// User macros, pointing at their defining directives.
    macros: HashMap<String, &'a Directive>,
    /// Directive aliases, mapping each alias to its canonical target name.
    /// Chains are collapsed at definition time.
    aliases: HashMap<String, String>,
    /// Registered HTML IDs.
    ids: HashMap<String, Referred>,
    /// The macro frame stack. Index 0 is the document frame.
    frames: Vec<Frame<'a>>,
    /// The name resolver stack, searched from last to first.
    resolvers: Vec<&'a dyn NameResolver>,
    /// The behavior used to render error sentinels.
    error_behavior: &'static dyn DirectiveBehavior,
    /// The logger service.
    logger: &'a dyn Logger,
    /// The syntax highlighter service.
    highlighter: &'a dyn SyntaxHighlighter,
    /// The bibliography service.
    bibliography: &'a mut dyn Bibliography,
}

impl<'a> Context<'a> {
    /// Creates a new context over `source` with the given services.
    pub fn new(
        source: &'a str,
        error_behavior: &'static dyn DirectiveBehavior,
        logger: &'a dyn Logger,
        highlighter: &'a dyn SyntaxHighlighter,
        bibliography: &'a mut dyn Bibliography,
    ) -> Self {
        Self {
            source,
            sections: Sections::new(),
            variables: <_>::default(),
            macros: <_>::default(),
            aliases: <_>::default(),
            ids: <_>::default(),
            frames: vec![Frame { arguments: &[], content: &[], content_frame: FrameIndex::ROOT }],
            resolvers: vec![],
            error_behavior,
            logger,
            highlighter,
            bibliography,
        }
    }

    /// The source text. The returned reference is independent of the borrow
    /// of the context itself.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The named output sections.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// The named output sections, mutably.
    pub fn sections_mut(&mut self) -> &mut Sections {
        &mut self.sections
    }

    /// The syntax highlighter service.
    pub fn highlighter(&self) -> &'a dyn SyntaxHighlighter {
        self.highlighter
    }

    /// The logger service.
    pub fn logger(&self) -> &'a dyn Logger {
        self.logger
    }

    /// The bibliography service.
    pub fn bibliography(&self) -> &dyn Bibliography {
        &*self.bibliography
    }

    /// The bibliography service, mutably.
    pub fn bibliography_mut(&mut self) -> &mut dyn Bibliography {
        &mut *self.bibliography
    }

    /// The behavior used to render error sentinels.
    pub fn error_behavior(&self) -> &'static dyn DirectiveBehavior {
        self.error_behavior
    }

    // ------------------------------------------------------------------
    // Diagnostics

    /// Returns true if a diagnostic of the given severity would be emitted.
    #[inline]
    pub fn emits(&self, severity: Severity) -> bool {
        self.logger.can_log(severity)
    }

    /// Emits a diagnostic if it passes the logger threshold.
    pub fn try_emit(
        &self,
        severity: Severity,
        id: &'static str,
        location: Span,
        message: impl Into<String>,
    ) {
        if self.emits(severity) {
            self.logger.log(Diagnostic { severity, id, location, message: message.into() });
        }
    }

    /// Emits a soft warning if it passes the logger threshold.
    pub fn try_soft_warning(&self, id: &'static str, location: Span, message: impl Into<String>) {
        self.try_emit(Severity::SoftWarning, id, location, message);
    }

    /// Emits a warning if it passes the logger threshold.
    pub fn try_warning(&self, id: &'static str, location: Span, message: impl Into<String>) {
        self.try_emit(Severity::Warning, id, location, message);
    }

    /// Emits an error if it passes the logger threshold.
    pub fn try_error(&self, id: &'static str, location: Span, message: impl Into<String>) {
        self.try_emit(Severity::Error, id, location, message);
    }

    /// Emits a fatal error if it passes the logger threshold.
    pub fn try_fatal(&self, id: &'static str, location: Span, message: impl Into<String>) {
        self.try_emit(Severity::Fatal, id, location, message);
    }

    // ------------------------------------------------------------------
    // Name resolution

    /// Pushes a resolver onto the resolver stack. Later resolvers shadow
    /// earlier ones.
    pub fn add_resolver(&mut self, resolver: &'a dyn NameResolver) {
        self.resolvers.push(resolver);
    }

    /// Finds a directive behavior, walking the resolver stack top-down.
    ///
    /// `name` must already be canonical; see [`Self::alias_target`].
    pub fn find_directive(&self, name: &str) -> Option<&'a dyn DirectiveBehavior> {
        self.resolvers.iter().rev().find_map(|resolver| resolver.resolve(name, self))
    }

    /// Returns the closest known directive name across all resolvers.
    pub fn find_fuzzy(&self, name: &str) -> Option<FuzzyMatch> {
        self.resolvers
            .iter()
            .filter_map(|resolver| resolver.fuzzy(name, self))
            .min_by_key(|candidate| candidate.distance)
    }

    // ------------------------------------------------------------------
    // Macros and aliases

    /// Returns the defining directive of the macro named `name`.
    pub fn find_macro(&self, name: &str) -> Option<&'a Directive> {
        self.macros.get(name).copied()
    }

    /// Defines or redefines a macro. Returns false if a macro with this name
    /// already existed; the new definition wins either way.
    pub fn emplace_macro(&mut self, name: String, definition: &'a Directive) -> bool {
        self.macros.insert(name, definition).is_none()
    }

    /// An iterator over the names of all defined macros.
    pub fn macro_names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(String::as_str)
    }

    /// Returns the canonical target of the alias `name`, if one is defined.
    pub fn alias_target(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Binds `name` as an alias for the canonical name `target`.
    /// Returns false if the alias already existed.
    pub fn emplace_alias(&mut self, name: String, target: String) -> bool {
        match self.aliases.entry(name) {
            std::collections::hash_map::Entry::Occupied(..) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(target);
                true
            }
        }
    }

    // ------------------------------------------------------------------
    // Variables and IDs

    /// Returns the value of the variable `name`, if set.
    pub fn get_variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Sets the variable `name` to `value`.
    pub fn set_variable(&mut self, name: String, value: String) {
        self.variables.insert(name, value);
    }

    /// Returns the registration of the HTML ID `id`, if any.
    pub fn find_id(&self, id: &str) -> Option<&Referred> {
        self.ids.get(id)
    }

    /// Registers an HTML ID. A duplicate registration is a no-op and returns
    /// false.
    pub fn emplace_id(&mut self, id: String, referred: Referred) -> bool {
        match self.ids.entry(id) {
            std::collections::hash_map::Entry::Occupied(..) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(referred);
                true
            }
        }
    }

    // ------------------------------------------------------------------
    // Macro frames

    /// The frame at the given index.
    #[inline]
    pub fn frame(&self, index: FrameIndex) -> Frame<'a> {
        self.frames[index.0 as usize]
    }

    /// Pushes a macro frame, returning its index.
    pub fn push_frame(&mut self, frame: Frame<'a>) -> FrameIndex {
        let index = u32::try_from(self.frames.len()).expect("macro nesting beyond u32::MAX");
        self.frames.push(frame);
        FrameIndex(index)
    }

    /// Pops the topmost macro frame. The document frame is never popped.
    pub fn pop_frame(&mut self) {
        debug_assert!(self.frames.len() > 1);
        self.frames.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingLogger;
    use crate::directives::error_behavior;
    use crate::services::{NoSupportHighlighter, SimpleBibliography};

    #[test]
    fn frames() {
        let logger = CollectingLogger::new();
        let mut bibliography = SimpleBibliography::new();
        let mut context =
            Context::new("", error_behavior(), &logger, &NoSupportHighlighter, &mut bibliography);

        assert!(FrameIndex::ROOT.is_root());
        let index = context.push_frame(Frame {
            arguments: &[],
            content: &[],
            content_frame: FrameIndex::ROOT,
        });
        assert!(!index.is_root());
        assert_eq!(context.frame(index).content_frame, FrameIndex::ROOT);
        context.pop_frame();
    }

    #[test]
    fn ids_are_insert_once() {
        let logger = CollectingLogger::new();
        let mut bibliography = SimpleBibliography::new();
        let mut context =
            Context::new("", error_behavior(), &logger, &NoSupportHighlighter, &mut bibliography);

        assert!(context.emplace_id("heading".into(), <_>::default()));
        assert!(!context.emplace_id("heading".into(), <_>::default()));
    }

    #[test]
    fn variables() {
        let logger = CollectingLogger::new();
        let mut bibliography = SimpleBibliography::new();
        let mut context =
            Context::new("", error_behavior(), &logger, &NoSupportHighlighter, &mut bibliography);

        assert_eq!(context.get_variable("x"), None);
        context.set_variable("x".into(), "1".into());
        assert_eq!(context.get_variable("x"), Some("1"));
    }
}
