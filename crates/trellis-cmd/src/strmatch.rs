//! Prefix-match scoring and edit distance.
//!
//! Pure functions used by resolution: `prefix_score` ranks how well a typed
//! word selects a command name, `edit_distance` backs the "did you mean"
//! suggestions.

/// Score returned when the substring equals the name exactly. Always
/// outranks any partial prefix.
pub const MATCH_EXACT: i32 = i32::MAX;

/// Score returned when the strings differ before either ends.
pub const NO_MATCH: i32 = -1;

/// Suggest a child as a likely intended match when its edit distance to the
/// unmatched word is below this.
pub const FUZZINESS: u32 = 3;

/// Score `sub` as a selector for `name`.
///
/// Exact match returns [`MATCH_EXACT`]; a non-empty proper prefix returns
/// its length, so longer prefixes outrank shorter ones; anything else
/// (including an empty `sub` against a non-empty `name`) returns
/// [`NO_MATCH`].
pub fn prefix_score(name: &str, sub: &str) -> i32 {
    if name == sub {
        return MATCH_EXACT;
    }
    if !sub.is_empty() && name.starts_with(sub) {
        return sub.chars().count() as i32;
    }
    NO_MATCH
}

/// Levenshtein distance between `a` and `b`.
///
/// Single-column dynamic program. Used only as a threshold test against
/// [`FUZZINESS`], not as an exact contract.
pub fn edit_distance(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut column: Vec<u32> = (0..=a.len() as u32).collect();
    for (x, bc) in b.iter().enumerate() {
        column[0] = x as u32 + 1;
        let mut lastdiag = x as u32;
        for (y, ac) in a.iter().enumerate() {
            let olddiag = column[y + 1];
            let cost = u32::from(ac != bc);
            column[y + 1] = (column[y + 1] + 1)
                .min(column[y] + 1)
                .min(lastdiag + cost);
            lastdiag = olddiag;
        }
    }
    column[a.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_match_is_max() {
        assert_eq!(prefix_score("start", "start"), MATCH_EXACT);
        assert_eq!(prefix_score("", ""), MATCH_EXACT);
    }

    #[test]
    fn proper_prefix_scores_its_length() {
        assert_eq!(prefix_score("status", "s"), 1);
        assert_eq!(prefix_score("status", "sta"), 3);
        assert_eq!(prefix_score("status", "statu"), 5);
    }

    #[test]
    fn empty_sub_against_nonempty_name_is_no_match() {
        assert_eq!(prefix_score("status", ""), NO_MATCH);
    }

    #[test]
    fn diverging_or_overlong_sub_is_no_match() {
        assert_eq!(prefix_score("status", "sto"), NO_MATCH);
        assert_eq!(prefix_score("stop", "stopped"), NO_MATCH);
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("start", "stat"), 1);
    }

    proptest! {
        #[test]
        fn prefix_score_monotone_over_growing_prefix(name in "[a-z]{1,12}") {
            let mut prev = 0;
            for end in 1..name.len() {
                let score = prefix_score(&name, &name[..end]);
                prop_assert!(score >= prev);
                prev = score;
            }
            prop_assert_eq!(prefix_score(&name, &name), MATCH_EXACT);
        }

        #[test]
        fn edit_distance_identity(a in "[a-z]{0,12}") {
            prop_assert_eq!(edit_distance(&a, &a), 0);
        }

        #[test]
        fn edit_distance_symmetric(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
            prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
        }

        #[test]
        fn edit_distance_triangle(
            a in "[a-z]{0,8}",
            b in "[a-z]{0,8}",
            c in "[a-z]{0,8}",
        ) {
            prop_assert!(edit_distance(&a, &c) <= edit_distance(&a, &b) + edit_distance(&b, &c));
        }

        #[test]
        fn edit_distance_zero_iff_equal(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
            prop_assert_eq!(edit_distance(&a, &b) == 0, a == b);
        }
    }
}
