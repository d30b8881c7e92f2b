//! Matching requested versions against available tags.

use std::cmp::Ordering;

use super::constraint::{VersionCandidate, VersionConstraint};

/// Matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// Skip suffixed tags in range and normalised matches.
    pub prefer_no_suffix: bool,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            prefer_no_suffix: true,
        }
    }
}

/// Which accepted tags the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every accepted tag, in source order.
    All,
    /// Only the greatest accepted tag.
    Latest,
}

/// Whether `candidate` satisfies `constraint`. The first rule that applies wins.
///
/// 1. A suffixed `Eq` constraint matches only the identical tag.
/// 2. Unsuffixed constraint and candidate with identical digits match,
///    whatever the operator.
/// 3. Otherwise the normalised numeric parts are compared with the operator,
///    skipping suffixed candidates when the policy prefers no suffix.
pub fn accepts(
    constraint: &VersionConstraint,
    candidate: &VersionCandidate,
    policy: ResolverPolicy,
) -> bool {
    if constraint.suffix.is_some() {
        return constraint.is_exact() && constraint.concat() == candidate.concat();
    }

    let Some(wanted) = &constraint.numeric else {
        return false;
    };
    let Some(offered) = &candidate.numeric else {
        return false;
    };

    if candidate.suffix.is_none() && offered.text() == wanted.text() {
        return true;
    }

    if policy.prefer_no_suffix && candidate.suffix.is_some() {
        return false;
    }

    constraint.operator.holds(offered.compare(wanted))
}

/// Filter `tags` down to those accepted by `constraint`, keeping their order.
pub fn resolve(
    constraint: &VersionConstraint,
    tags: &[String],
    policy: ResolverPolicy,
) -> Vec<String> {
    let accepted: Vec<String> = tags
        .iter()
        .filter(|tag| accepts(constraint, &VersionCandidate::parse(tag), policy))
        .cloned()
        .collect();

    tracing::debug!(
        "constraint {} accepted {} of {} tags",
        constraint,
        accepted.len(),
        tags.len()
    );
    accepted
}

/// Apply a selection to already accepted tags.
pub fn select(accepted: Vec<String>, selection: Selection) -> Vec<String> {
    match selection {
        Selection::All => accepted,
        Selection::Latest => accepted
            .into_iter()
            .map(|tag| VersionCandidate::parse(&tag))
            .max_by(compare_candidates)
            .map(|c| vec![c.tag])
            .unwrap_or_default(),
    }
}

/// Order candidates by normalised numeric part, then suffix-less above suffixed.
///
/// Opaque tags sort below every numeric tag.
pub fn compare_candidates(a: &VersionCandidate, b: &VersionCandidate) -> Ordering {
    let numeric = match (&a.numeric, &b.numeric) {
        (Some(x), Some(y)) => x.compare(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    numeric.then_with(|| b.suffix.is_some().cmp(&a.suffix.is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(requested: &str, available: &[&str]) -> Vec<String> {
        resolve(
            &VersionConstraint::parse(requested),
            &tags(available),
            ResolverPolicy::default(),
        )
    }

    #[test]
    fn exact_request_skips_patch_and_suffix() {
        assert_eq!(run("==3.6", &["3.6", "3.6.1", "3.6-wheezy"]), vec!["3.6"]);
    }

    #[test]
    fn range_request_skips_older_and_suffixed() {
        assert_eq!(
            run(">=1.0.1", &["0.9", "1.0.1", "1.2.0", "1.2.0-alpine"]),
            vec!["1.0.1", "1.2.0"]
        );
    }

    #[test]
    fn identical_digits_match_under_strict_greater() {
        assert_eq!(run(">1.0", &["1.0", "1.0.0", "1.1"]), vec!["1.0", "1.1"]);
    }

    #[test]
    fn suffixed_request_is_literal() {
        assert_eq!(
            run("==1.2.3-wheezy", &["1.2.3", "1.2.3-wheezy", "1.2.3-alpine"]),
            vec!["1.2.3-wheezy"]
        );
    }

    #[test]
    fn suffixed_range_matches_nothing() {
        assert!(run(">=1.2-alpine", &["1.2-alpine", "1.3-alpine"]).is_empty());
    }

    #[test]
    fn normalised_equality() {
        assert_eq!(run("==1.2", &["1.2.0", "1.20"]), vec!["1.2.0"]);
    }

    #[test]
    fn versionless_matches_latest_tag() {
        assert_eq!(run("versionless", &["1.0", "latest", "alpine"]), vec!["latest"]);
    }

    #[test]
    fn opaque_tags_only_match_literally() {
        assert!(run(">=0", &["alpine", "latest"]).is_empty());
        assert_eq!(run("alpine", &["alpine", "latest"]), vec!["alpine"]);
    }

    #[test]
    fn suffix_allowed_when_policy_disabled() {
        let out = resolve(
            &VersionConstraint::parse(">=1.0"),
            &tags(&["1.2.0-alpine", "0.9"]),
            ResolverPolicy {
                prefer_no_suffix: false,
            },
        );
        assert_eq!(out, vec!["1.2.0-alpine"]);
    }

    #[test]
    fn empty_tag_list_resolves_to_nothing() {
        assert!(run(">=1.0", &[]).is_empty());
    }

    #[test]
    fn latest_prefers_greatest_then_unsuffixed() {
        let accepted = tags(&["1.0.1", "1.2.0-alpine", "1.2.0", "1.10"]);
        assert_eq!(select(accepted, Selection::Latest), vec!["1.10"]);

        let tie = tags(&["2.0-slim", "2.0"]);
        assert_eq!(select(tie, Selection::Latest), vec!["2.0"]);
    }

    #[test]
    fn select_all_keeps_order() {
        let accepted = tags(&["1.2", "1.0"]);
        assert_eq!(select(accepted.clone(), Selection::All), accepted);
        assert!(select(Vec::new(), Selection::Latest).is_empty());
    }
}
