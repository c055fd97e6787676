//! Typo detection for directive name lookup failures.

/// Computes the Levenshtein edit distance between two strings, in characters.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    if a.is_empty() {
        return b.chars().count();
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a.chars().enumerate() {
        let mut previous_diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let substitution = previous_diagonal + usize::from(a_char != *b_char);
            previous_diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(previous_diagonal + 1);
        }
    }
    *row.last().unwrap()
}

/// Finds the candidate closest to `name` by edit distance.
///
/// Ties go to the earlier candidate.
pub fn closest_match<'c>(
    candidates: impl IntoIterator<Item = &'c str>,
    name: &str,
) -> Option<(&'c str, usize)> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, levenshtein_distance(candidate, name)))
        .min_by_key(|(_, distance)| *distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("comment", "coment"), 1);
    }

    #[test]
    fn closest() {
        let candidates = ["comment", "code", "codeblock"];
        assert_eq!(closest_match(candidates, "coment"), Some(("comment", 1)));
        assert_eq!(closest_match(candidates, "codeblok"), Some(("codeblock", 1)));
        assert_eq!(closest_match([], "x"), None);
    }
}
