//! Per-run lookup of a user's organizational affiliations.
//!
//! The resolver wraps the user→organization mapping loaded once per report
//! generation (see `acct-io` for the database-backed loader). It owns the
//! mapping for the lifetime of one run, so nothing leaks across independent
//! report generations.

use std::collections::{HashMap, HashSet};

use acct_core::models::Affiliation;
use tracing::debug;

/// Resolves a user id to that user's set of (faculty, department)
/// affiliations.
///
/// Policy:
/// * user present with one or more affiliations → exactly those (missing
///   fields are already degraded to the sentinel field-wise by
///   [`Affiliation::new`] at load time);
/// * user present with an empty set, or entirely absent → a single
///   synthetic {unknown, unknown} affiliation.
///
/// Resolution is deterministic within a run: the mapping is immutable once
/// the resolver is built.
pub struct AffiliationResolver {
    mapping: HashMap<String, Vec<Affiliation>>,
    unknown: Vec<Affiliation>,
}

impl AffiliationResolver {
    /// Build a resolver over a loaded mapping.
    ///
    /// Duplicate (faculty, department) pairs for the same user are collapsed
    /// so the equal split is over distinct affiliations.
    pub fn new(mapping: HashMap<String, Vec<Affiliation>>) -> Self {
        let mapping = mapping
            .into_iter()
            .map(|(user, affiliations)| (user, dedup_preserving_order(affiliations)))
            .collect();

        Self {
            mapping,
            unknown: vec![Affiliation::unknown()],
        }
    }

    /// The affiliation set for `user_id`. Never empty.
    pub fn resolve(&self, user_id: &str) -> &[Affiliation] {
        match self.mapping.get(user_id) {
            Some(affiliations) if !affiliations.is_empty() => affiliations,
            _ => {
                debug!("No affiliation found for user '{}'; using the unknown sentinel", user_id);
                &self.unknown
            }
        }
    }

    /// Number of users in the mapping (test and logging helper).
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

fn dedup_preserving_order(affiliations: Vec<Affiliation>) -> Vec<Affiliation> {
    let mut seen = HashSet::new();
    affiliations
        .into_iter()
        .filter(|a| seen.insert(a.clone()))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::models::UNKNOWN;

    fn resolver(pairs: &[(&str, Vec<Affiliation>)]) -> AffiliationResolver {
        AffiliationResolver::new(
            pairs
                .iter()
                .map(|(user, affs)| (user.to_string(), affs.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_resolve_known_user_returns_exact_set() {
        let r = resolver(&[(
            "p123456",
            vec![Affiliation::new("AI", "XYZ"), Affiliation::new("BME", "WXY")],
        )]);
        let affs = r.resolve("p123456");
        assert_eq!(affs.len(), 2);
        assert_eq!(affs[0], Affiliation::new("AI", "XYZ"));
        assert_eq!(affs[1], Affiliation::new("BME", "WXY"));
    }

    #[test]
    fn test_resolve_absent_user_returns_unknown_sentinel() {
        let r = resolver(&[]);
        let affs = r.resolve("ghost");
        assert_eq!(affs.len(), 1);
        assert_eq!(affs[0].faculty, UNKNOWN);
        assert_eq!(affs[0].department, UNKNOWN);
    }

    #[test]
    fn test_resolve_empty_set_falls_back_to_unknown() {
        let r = resolver(&[("p1", vec![])]);
        let affs = r.resolve("p1");
        assert_eq!(affs, &[Affiliation::unknown()]);
    }

    #[test]
    fn test_resolve_partial_fields_preserved() {
        // Department known, faculty not: the known field must survive.
        let r = resolver(&[("p1", vec![Affiliation::new("", "XYZ")])]);
        let affs = r.resolve("p1");
        assert_eq!(affs[0].faculty, UNKNOWN);
        assert_eq!(affs[0].department, "XYZ");
    }

    #[test]
    fn test_duplicate_affiliations_collapsed() {
        let r = resolver(&[(
            "p1",
            vec![
                Affiliation::new("AI", "XYZ"),
                Affiliation::new("AI", "XYZ"),
                Affiliation::new("BME", "WXY"),
            ],
        )]);
        assert_eq!(r.resolve("p1").len(), 2);
    }

    #[test]
    fn test_resolve_is_deterministic_within_run() {
        let r = resolver(&[(
            "p1",
            vec![Affiliation::new("AI", "XYZ"), Affiliation::new("BME", "WXY")],
        )]);
        assert_eq!(r.resolve("p1"), r.resolve("p1"));
    }
}
