//! Edit-distance based near-equality for names and titles.

/// Strings of this many characters or fewer are never fuzzy-matched.
pub const MIN_FUZZY_LENGTH: usize = 8;

/// Maximum relative length difference (`|l1 - l2| / min(l1, l2)`) still considered.
pub const MAX_LENGTH_RATIO: f64 = 0.2;

/// Edit distance relative to the longer string must be strictly below this.
pub const MAX_DISTANCE_RATIO: f64 = 0.2;

/// Levenshtein distance over Unicode scalar values.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Fuzzy name equality.
///
/// Compares case-insensitively. Too-short strings and strings whose lengths
/// differ too much are rejected before the distance is computed.
pub fn fuzzy_equal(left: &str, right: &str) -> bool {
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();
    let l1 = left.chars().count();
    let l2 = right.chars().count();

    if l1 <= MIN_FUZZY_LENGTH || l2 <= MIN_FUZZY_LENGTH {
        return false;
    }

    let shorter = l1.min(l2) as f64;
    let longer = l1.max(l2) as f64;
    if (l1.abs_diff(l2) as f64) / shorter > MAX_LENGTH_RATIO {
        return false;
    }

    (edit_distance(&left, &right) as f64) / longer < MAX_DISTANCE_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edit_distance_basics() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("Symposium A", "Symposium Aa"), 1);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_short_strings_never_match() {
        assert!(!fuzzy_equal("Tea", "Sea"));
        // Exactly eight characters is still too short
        assert!(!fuzzy_equal("Workshop", "Workshop"));
    }

    #[test]
    fn test_near_titles_match() {
        assert!(fuzzy_equal("Symposium A", "Symposium Aa"));
        assert!(fuzzy_equal("Opening Keynote", "opening keynote!"));
    }

    #[test]
    fn test_different_titles_do_not_match() {
        assert!(!fuzzy_equal("Symposium A", "Completely Different"));
    }

    #[test]
    fn test_length_ratio_gate() {
        // distance would be small relative to the longer string, but lengths differ by > 20%
        assert!(!fuzzy_equal("Poster Session", "Poster Session 12345"));
    }

    proptest! {
        #[test]
        fn prop_fuzzy_equal_is_symmetric(a in "[a-zA-Z ]{0,20}", b in "[a-zA-Z ]{0,20}") {
            prop_assert_eq!(fuzzy_equal(&a, &b), fuzzy_equal(&b, &a));
        }

        #[test]
        fn prop_edit_distance_bounded_by_longer_length(a in "\\PC{0,16}", b in "\\PC{0,16}") {
            let d = edit_distance(&a, &b);
            prop_assert!(d <= a.chars().count().max(b.chars().count()));
        }
    }
}
