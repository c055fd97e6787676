//! Diagnostics: severities, stable IDs, and the logger service.

use crate::codemap::Span;
use std::cell::RefCell;

/// The severity of a diagnostic.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    /// Tracing output for compiler developers.
    Trace,
    /// Debugging output.
    Debug,
    /// Informational output.
    Info,
    /// A warning that is suppressed by default.
    SoftWarning,
    /// A warning.
    Warning,
    /// An error.
    Error,
    /// An error that aborts evaluation.
    Fatal,
    /// Not a diagnostic severity; used as a threshold to suppress all output.
    None,
}

impl Severity {
    /// Returns the tag with which this severity is displayed.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::SoftWarning => "SOFTWARN",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::None => "???",
        }
    }
}

/// A single diagnostic message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The stable diagnostic ID.
    pub id: &'static str,
    /// The source location the diagnostic refers to.
    pub location: Span,
    /// The human-readable message.
    pub message: String,
}

/// The logger service. Diagnostics below the minimum severity are never
/// constructed; callers check [`Logger::can_log`] first.
pub trait Logger {
    /// The minimum severity at which diagnostics are emitted.
    fn min_severity(&self) -> Severity;

    /// Receives one diagnostic.
    fn log(&self, diagnostic: Diagnostic);

    /// Returns true if a diagnostic of the given severity would be emitted.
    fn can_log(&self, severity: Severity) -> bool {
        severity >= self.min_severity()
    }
}

/// A logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnorantLogger;

impl Logger for IgnorantLogger {
    fn min_severity(&self) -> Severity {
        Severity::None
    }

    fn log(&self, _: Diagnostic) {}
}

/// A logger that stores diagnostics in memory, for tests and batch reporting.
#[derive(Debug, Default)]
pub struct CollectingLogger {
    /// The collected diagnostics, in emission order.
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingLogger {
    /// Creates an empty collecting logger.
    pub fn new() -> Self {
        <_>::default()
    }

    /// Returns the collected diagnostics, in emission order.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Returns true if a diagnostic with the given ID was collected.
    pub fn was_logged(&self, id: &str) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.id == id)
    }
}

impl Logger for CollectingLogger {
    fn min_severity(&self) -> Severity {
        Severity::Trace
    }

    fn log(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

/// A logger that forwards to the [`log`] crate.
#[derive(Clone, Copy, Debug)]
pub struct LogLogger {
    /// The minimum severity to forward.
    pub min_severity: Severity,
}

impl Logger for LogLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn log(&self, diagnostic: Diagnostic) {
        let level = match diagnostic.severity {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::SoftWarning | Severity::Warning => log::Level::Warn,
            _ => log::Level::Error,
        };
        log::log!(level, "[{}] {}", diagnostic.id, diagnostic.message);
    }
}

/// Stable diagnostic IDs.
///
/// These are part of the compiler's external interface; tooling matches on
/// them, so they must never be renamed.
#[allow(missing_docs)]
pub mod diagnostic {
    pub const ALIAS_DUPLICATE: &str = "alias_duplicate";
    pub const ALIAS_NAME_INVALID: &str = "alias_name_invalid";
    pub const ARITHMETIC_DIV_BY_ZERO: &str = "arithmetic_div_by_zero";
    pub const CHAR_BLANK: &str = "char_blank";
    pub const CHAR_DIGITS: &str = "char_digits";
    pub const CHAR_NONSCALAR: &str = "char_nonscalar";
    pub const DEF_NO_PATTERN: &str = "def_no_pattern";
    pub const DEF_PATTERN_NO_DIRECTIVE: &str = "def_pattern_no_directive";
    pub const DEF_REDEFINITION: &str = "def_redefinition";
    pub const DEPRECATED: &str = "deprecated";
    pub const DIRECTIVE_LOOKUP_UNRESOLVED: &str = "directive_lookup_unresolved";
    pub const HIGHLIGHT_ERROR: &str = "highlight_error";
    pub const HIGHLIGHT_LANGUAGE: &str = "highlight_language";
    pub const HIGHLIGHT_MALFORMED: &str = "highlight_malformed";
    pub const HIGHLIGHT_NAME_INVALID: &str = "highlight_name_invalid";
    pub const HTML_ELEMENT_NAME_INVALID: &str = "html_element_name_invalid";
    pub const HTML_ELEMENT_NAME_MISSING: &str = "html_element_name_missing";
    pub const IGNORED_ARGS: &str = "ignored_args";
    pub const IGNORED_CONTENT: &str = "ignored_content";
    pub const INVOKE_NAME_INVALID: &str = "invoke_name_invalid";
    pub const LITERAL_OUT_OF_RANGE: &str = "literal_out_of_range";
    pub const PARSE_BLOCK_UNCLOSED: &str = "parse_block_unclosed";
    pub const PUT_OUTSIDE: &str = "put_outside";
    pub const RAW_TEXT_CLOSING: &str = "raw_text_closing";
    pub const REF_TO_EMPTY: &str = "ref_to_empty";
    pub const REF_TO_MISSING: &str = "ref_to_missing";
    pub const SECTION_REF_CIRCULAR: &str = "section_ref_circular";
    pub const SECTION_REF_NOT_FOUND: &str = "section_ref_not_found";
    pub const TYPE_MISMATCH: &str = "type_mismatch";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::SoftWarning < Severity::Warning);
    }

    #[test]
    fn collecting() {
        let logger = CollectingLogger::new();
        assert!(logger.can_log(Severity::Debug));
        logger.log(Diagnostic {
            severity: Severity::Error,
            id: diagnostic::PUT_OUTSIDE,
            location: <_>::default(),
            message: "test".into(),
        });
        assert!(logger.was_logged(diagnostic::PUT_OUTSIDE));
        assert_eq!(logger.take().len(), 1);
    }

    #[test]
    fn ignorant() {
        let logger = IgnorantLogger;
        assert!(!logger.can_log(Severity::Fatal));
    }
}
