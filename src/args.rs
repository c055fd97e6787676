//! Matching of invocation arguments against declared parameter lists.

use crate::ast::{Argument, ArgumentKind};

/// The per-argument result of matching.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ArgumentStatus {
    /// The argument was matched successfully.
    Ok,
    /// No corresponding parameter could be found for the argument.
    #[default]
    Unmatched,
    /// The argument is named, and more than one argument for the same
    /// parameter was provided.
    DuplicateNamed,
}

/// Whether positional arguments participate in matching.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MatchMode {
    /// Named and positional arguments both match parameters.
    #[default]
    All,
    /// Only named arguments match; positional arguments are left unmatched.
    /// Used by directives whose positional arguments mean something else.
    OnlyNamed,
}

/// Matches a list of named parameters against a directive's arguments.
///
/// Matching proceeds in phases: named arguments bind to the parameter of the
/// same name (later duplicates are flagged), remaining positional arguments
/// fill the remaining unbound parameters in declaration order, and ellipsis
/// arguments are collected separately for behaviors that opt in. Unmatched
/// arguments stay visible so behaviors can warn about them.
#[derive(Debug)]
pub struct ArgumentMatcher<'p> {
    /// The declared parameter names, in declaration order.
    parameters: &'p [&'p str],
    /// For each parameter, the index of the matched argument.
    indices: Vec<Option<usize>>,
    /// For each argument, the status after matching.
    statuses: Vec<ArgumentStatus>,
    /// The indices of all ellipsis arguments.
    ellipsis: Vec<usize>,
}

impl<'p> ArgumentMatcher<'p> {
    /// Creates a matcher for the given parameter list.
    pub fn new(parameters: &'p [&'p str]) -> Self {
        Self {
            parameters,
            indices: vec![None; parameters.len()],
            statuses: vec![],
            ellipsis: vec![],
        }
    }

    /// Matches `arguments` against the parameter list.
    pub fn match_arguments(&mut self, arguments: &[Argument], source: &str, mode: MatchMode) {
        self.indices.fill(None);
        self.statuses.clear();
        self.statuses.resize(arguments.len(), ArgumentStatus::Unmatched);
        self.ellipsis.clear();

        // Named arguments.
        for (index, argument) in arguments.iter().enumerate() {
            match argument.kind {
                ArgumentKind::Ellipsis => {
                    self.ellipsis.push(index);
                    self.statuses[index] = ArgumentStatus::Ok;
                }
                ArgumentKind::Named(name_span) => {
                    let name = name_span.of(source);
                    if let Some(position) = self.parameters.iter().position(|p| *p == name) {
                        if self.indices[position].is_none() {
                            self.indices[position] = Some(index);
                            self.statuses[index] = ArgumentStatus::Ok;
                        } else {
                            self.statuses[index] = ArgumentStatus::DuplicateNamed;
                        }
                    }
                }
                ArgumentKind::Positional => {}
            }
        }

        // Positional arguments fill the remaining parameters left to right.
        if mode == MatchMode::All {
            let mut next_parameter = 0;
            for (index, argument) in arguments.iter().enumerate() {
                if argument.kind != ArgumentKind::Positional {
                    continue;
                }
                while next_parameter < self.parameters.len()
                    && self.indices[next_parameter].is_some()
                {
                    next_parameter += 1;
                }
                if next_parameter == self.parameters.len() {
                    break;
                }
                self.indices[next_parameter] = Some(index);
                self.statuses[index] = ArgumentStatus::Ok;
                next_parameter += 1;
            }
        }
    }

    /// Returns the matched argument index for the given parameter name.
    ///
    /// # Panics
    ///
    /// If `parameter` is not one of the declared parameters.
    pub fn get(&self, parameter: &str) -> Option<usize> {
        let position = self
            .parameters
            .iter()
            .position(|p| *p == parameter)
            .expect("parameter name not declared");
        self.indices[position]
    }

    /// The per-parameter argument indices, in declaration order.
    pub fn parameter_indices(&self) -> &[Option<usize>] {
        &self.indices
    }

    /// The per-argument statuses. Only valid after matching.
    pub fn statuses(&self) -> &[ArgumentStatus] {
        &self.statuses
    }

    /// The indices of all ellipsis arguments.
    pub fn ellipsis_indices(&self) -> &[usize] {
        &self.ellipsis
    }

    /// An iterator over the indices of all unmatched arguments.
    pub fn unmatched(&self) -> impl Iterator<Item = usize> + '_ {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == ArgumentStatus::Unmatched)
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Content;
    use crate::parse::parse;

    fn arguments(source: &str) -> Vec<Argument> {
        let output = parse(source);
        let Content::Directive(directive) = output.root.into_iter().next().unwrap() else {
            panic!("expected a directive");
        };
        directive.arguments
    }

    #[test]
    fn named_then_positional() {
        let source = "\\x(b = 1, 2, 3)";
        let args = arguments(source);
        let mut matcher = ArgumentMatcher::new(&["a", "b", "c"]);
        matcher.match_arguments(&args, source, MatchMode::All);
        assert_eq!(matcher.get("b"), Some(0));
        assert_eq!(matcher.get("a"), Some(1));
        assert_eq!(matcher.get("c"), Some(2));
        assert!(matcher.statuses().iter().all(|s| *s == ArgumentStatus::Ok));
    }

    #[test]
    fn duplicate_named() {
        let source = "\\x(a = 1, a = 2)";
        let args = arguments(source);
        let mut matcher = ArgumentMatcher::new(&["a"]);
        matcher.match_arguments(&args, source, MatchMode::All);
        assert_eq!(matcher.get("a"), Some(0));
        assert_eq!(matcher.statuses()[1], ArgumentStatus::DuplicateNamed);
    }

    #[test]
    fn surplus_positional_is_unmatched() {
        let source = "\\x(1, 2)";
        let args = arguments(source);
        let mut matcher = ArgumentMatcher::new(&["a"]);
        matcher.match_arguments(&args, source, MatchMode::All);
        assert_eq!(matcher.get("a"), Some(0));
        assert_eq!(matcher.statuses()[1], ArgumentStatus::Unmatched);
        assert_eq!(matcher.unmatched().collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn unknown_named_is_unmatched() {
        let source = "\\x(zzz = 1)";
        let args = arguments(source);
        let mut matcher = ArgumentMatcher::new(&["a"]);
        matcher.match_arguments(&args, source, MatchMode::All);
        assert_eq!(matcher.get("a"), None);
        assert_eq!(matcher.statuses()[0], ArgumentStatus::Unmatched);
    }

    #[test]
    fn only_named_mode() {
        let source = "\\x(1, id = 2)";
        let args = arguments(source);
        let mut matcher = ArgumentMatcher::new(&["id"]);
        matcher.match_arguments(&args, source, MatchMode::OnlyNamed);
        assert_eq!(matcher.get("id"), Some(1));
        assert_eq!(matcher.statuses()[0], ArgumentStatus::Unmatched);
    }

    #[test]
    fn ellipsis_collected() {
        let source = "\\x(...1, 2)";
        let args = arguments(source);
        let mut matcher = ArgumentMatcher::new(&["a"]);
        matcher.match_arguments(&args, source, MatchMode::All);
        assert_eq!(matcher.ellipsis_indices(), [0]);
        assert_eq!(matcher.get("a"), Some(1));
    }
}
