//! Entity matching.
//!
//! Decides whether two descriptors denote the same real-world entity using
//! cascading strategies in fixed precedence:
//!
//! 1. exact id
//! 2. cross-reference (shared originating source id token)
//! 3. exact name, case-insensitive, surrounding whitespace ignored
//! 4. fuzzy name (see [`fuzzy::fuzzy_equal`])
//!
//! A strategy is tried against *every* candidate before the next strategy is
//! consulted, so a lower-precedence match can never shadow a higher one
//! elsewhere in the list.

pub mod fuzzy;

/// Delimiter joining source ids in a composite `originating_data_source_id`.
pub const SOURCE_ID_DELIMITER: char = '¬';

/// Identity facets of a descriptor consulted by the matcher.
pub trait Matchable {
    /// Durable or client id
    fn match_id(&self) -> Option<&str>;

    /// Possibly composite provenance reference
    fn cross_reference(&self) -> Option<&str> {
        None
    }

    /// Designated name/title field
    fn match_name(&self) -> Option<&str> {
        None
    }
}

/// Plain strings (e.g. tag-name lists) match on their content.
impl Matchable for String {
    fn match_id(&self) -> Option<&str> {
        None
    }

    fn match_name(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchStrategy {
    ExactId,
    CrossReference,
    ExactName,
    FuzzyName,
}

/// Position of the matched entity and the strategy that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub index: usize,
    pub strategy: MatchStrategy,
}

/// Cascading entity matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMatcher {
    fuzzy: bool,
}

impl Default for EntityMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMatcher {
    /// Matcher with all four strategies enabled
    pub fn new() -> Self {
        Self { fuzzy: true }
    }

    /// Matcher with or without the fuzzy-name strategy
    pub fn with_fuzzy(fuzzy: bool) -> Self {
        Self { fuzzy }
    }

    fn strategies(&self) -> &'static [MatchStrategy] {
        if self.fuzzy {
            &[
                MatchStrategy::ExactId,
                MatchStrategy::CrossReference,
                MatchStrategy::ExactName,
                MatchStrategy::FuzzyName,
            ]
        } else {
            &[
                MatchStrategy::ExactId,
                MatchStrategy::CrossReference,
                MatchStrategy::ExactName,
            ]
        }
    }

    /// Find the entity in `existing` that `candidate` denotes.
    ///
    /// Returns `None` when no strategy matches; the caller treats the
    /// candidate as a new insertion.
    pub fn find_match<T: Matchable>(&self, candidate: &T, existing: &[T]) -> Option<MatchOutcome> {
        self.strategies().iter().find_map(|&strategy| {
            existing
                .iter()
                .position(|other| strategy_matches(strategy, candidate, other))
                .map(|index| MatchOutcome { index, strategy })
        })
    }

    /// Index-only convenience over [`find_match`](Self::find_match)
    pub fn find_index<T: Matchable>(&self, candidate: &T, existing: &[T]) -> Option<usize> {
        self.find_match(candidate, existing).map(|m| m.index)
    }
}

fn strategy_matches<T: Matchable>(strategy: MatchStrategy, left: &T, right: &T) -> bool {
    match strategy {
        MatchStrategy::ExactId => match (left.match_id(), right.match_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        MatchStrategy::CrossReference => match (left.cross_reference(), right.cross_reference()) {
            (Some(a), Some(b)) => source_ids_intersect(a, b),
            _ => false,
        },
        MatchStrategy::ExactName => match (left.match_name(), right.match_name()) {
            (Some(a), Some(b)) => names_equal(a, b),
            _ => false,
        },
        MatchStrategy::FuzzyName => match (left.match_name(), right.match_name()) {
            (Some(a), Some(b)) => fuzzy::fuzzy_equal(a, b),
            _ => false,
        },
    }
}

/// Split a composite source id into its non-empty tokens
pub fn source_id_tokens(composite: &str) -> impl Iterator<Item = &str> {
    composite
        .split(SOURCE_ID_DELIMITER)
        .filter(|token| !token.is_empty())
}

/// True when two composite source ids share at least one token
pub fn source_ids_intersect(left: &str, right: &str) -> bool {
    source_id_tokens(left).any(|l| source_id_tokens(right).any(|r| l == r))
}

/// Case-insensitive equality ignoring surrounding whitespace
pub fn names_equal(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Group;

    fn group(id: Option<&str>, source: Option<&str>, title: &str) -> Group {
        Group {
            id: id.map(str::to_string),
            originating_data_source_id: source.map(str::to_string),
            title: Some(title.to_string()),
            ..Group::default()
        }
    }

    #[test]
    fn test_exact_id_wins_over_fuzzy_name_elsewhere() {
        let existing = vec![
            // fuzzy-name twin of the candidate, but a different entity
            group(Some("g-wrong"), None, "Symposium Aa"),
            group(Some("g-right"), None, "Totally Unrelated Title"),
        ];
        let candidate = group(Some("g-right"), None, "Symposium A");

        let outcome = EntityMatcher::new().find_match(&candidate, &existing).unwrap();
        assert_eq!(outcome.index, 1);
        assert_eq!(outcome.strategy, MatchStrategy::ExactId);
    }

    #[test]
    fn test_cross_reference_matches_any_token() {
        let existing = vec![group(None, Some("src-a-1¬src-b-7"), "Opening")];
        let candidate = group(None, Some("src-b-7"), "Different Title Entirely");

        let outcome = EntityMatcher::new().find_match(&candidate, &existing).unwrap();
        assert_eq!(outcome.strategy, MatchStrategy::CrossReference);
    }

    #[test]
    fn test_exact_name_is_case_and_whitespace_insensitive() {
        let existing = vec![group(None, Some("src-a-1"), "Keynote")];
        let candidate = group(None, Some("src-b-7"), "keynote ");

        let outcome = EntityMatcher::new().find_match(&candidate, &existing).unwrap();
        assert_eq!(outcome.strategy, MatchStrategy::ExactName);
    }

    #[test]
    fn test_fuzzy_can_be_disabled() {
        let existing = vec![group(None, None, "Symposium Aa")];
        let candidate = group(None, None, "Symposium A");

        assert_eq!(
            EntityMatcher::new().find_match(&candidate, &existing).map(|m| m.strategy),
            Some(MatchStrategy::FuzzyName)
        );
        assert!(EntityMatcher::with_fuzzy(false)
            .find_match(&candidate, &existing)
            .is_none());
    }

    #[test]
    fn test_unmatched_candidate_returns_none() {
        let existing = vec![group(Some("g1"), None, "Tea")];
        let candidate = group(None, None, "Sea");
        assert!(EntityMatcher::new().find_index(&candidate, &existing).is_none());
    }

    #[test]
    fn test_empty_tokens_do_not_intersect() {
        assert!(!source_ids_intersect("¬", "¬"));
        assert!(source_ids_intersect("a¬b", "c¬b"));
    }
}
