//! The five-valued processing status returned by every evaluation step, and
//! the fixed algebra by which statuses compose.

/// The result of processing a piece of content.
///
/// The five values are totally ordered. Statuses below [`Self::Error`] are
/// successful; statuses at or above it carry an error. Independently of being
/// an error, a status is either a *continue* status (keep iterating sibling
/// content) or a *break* status (stop immediately).
///
/// The discriminant values are stable and part of the embedding ABI.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum ProcessingStatus {
    /// Complete success.
    Ok = 0,
    /// Stop processing the surrounding scope, without an error.
    /// Used by short-circuiting operations.
    Break = 1,
    /// An error was encountered, but siblings should still be processed.
    Error = 2,
    /// An error was encountered, and the surrounding scope should stop.
    ErrorBreak = 3,
    /// Abort the entire evaluation phase.
    /// Reference resolution still runs so that partial output is coherent.
    Fatal = 4,
}

impl ProcessingStatus {
    /// Returns the lowercase name of the status.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Break => "break",
            Self::Error => "error",
            Self::ErrorBreak => "error_break",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true iff this is a non-error status.
    #[inline]
    pub fn is_ok(self) -> bool {
        self < Self::Error
    }

    /// Returns true iff this is an error status.
    #[inline]
    pub fn is_error(self) -> bool {
        self >= Self::Error
    }

    /// Returns true iff control flow should continue past this status,
    /// regardless of whether it is an error.
    #[inline]
    pub fn is_continue(self) -> bool {
        matches!(self, Self::Ok | Self::Error)
    }

    /// Returns true iff control flow should break on this status,
    /// regardless of whether it is an error.
    #[inline]
    pub fn is_break(self) -> bool {
        matches!(self, Self::Break | Self::ErrorBreak | Self::Fatal)
    }

    /// Composes two statuses obtained from sequential work.
    ///
    /// Break statuses on the left are absorbing, [`Self::Ok`] is the identity,
    /// and an error on either side is preserved in the result. The operation
    /// is associative.
    #[must_use]
    pub fn concat(self, second: Self) -> Self {
        if self.is_break() {
            self
        } else if self == Self::Ok {
            second
        } else {
            match second {
                Self::Ok => Self::Error,
                Self::Break => Self::ErrorBreak,
                _ => second,
            }
        }
    }

    /// Folds any number of statuses with [`Self::concat`].
    #[must_use]
    pub fn concat_all(statuses: impl IntoIterator<Item = Self>) -> Self {
        statuses
            .into_iter()
            .fold(Self::Ok, ProcessingStatus::concat)
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessingStatus::{self, *};

    const ALL: [ProcessingStatus; 5] = [Ok, Break, Error, ErrorBreak, Fatal];

    #[test]
    fn predicates() {
        assert!(Ok.is_ok() && Break.is_ok());
        assert!(Error.is_error() && ErrorBreak.is_error() && Fatal.is_error());
        assert!(Ok.is_continue() && Error.is_continue());
        assert!(Break.is_break() && ErrorBreak.is_break() && Fatal.is_break());
        for status in ALL {
            assert_ne!(status.is_ok(), status.is_error());
            assert_ne!(status.is_continue(), status.is_break());
        }
    }

    #[test]
    fn identity() {
        for status in ALL {
            assert_eq!(Ok.concat(status), status);
            assert_eq!(status.concat(Ok), status);
        }
    }

    #[test]
    fn break_absorbs() {
        for status in ALL {
            assert_eq!(Break.concat(status), Break);
            assert_eq!(ErrorBreak.concat(status), ErrorBreak);
            assert_eq!(Fatal.concat(status), Fatal);
        }
    }

    #[test]
    fn error_propagates() {
        assert_eq!(Error.concat(Ok), Error);
        assert_eq!(Error.concat(Break), ErrorBreak);
        assert_eq!(Error.concat(Error), Error);
        assert_eq!(Error.concat(Fatal), Fatal);
    }

    #[test]
    fn associative() {
        for a in ALL {
            for b in ALL {
                for c in ALL {
                    assert_eq!(a.concat(b).concat(c), a.concat(b.concat(c)), "{a:?} {b:?} {c:?}");
                }
            }
        }
    }

    #[test]
    fn abi_values() {
        assert_eq!(ALL.map(|s| s as u8), [0, 1, 2, 3, 4]);
    }
}
