//! Label selector matching
//!
//! Kubernetes relates Services, DisruptionBudgets, and workloads through
//! label selectors rather than direct references. The predicate here is the
//! single join condition used for all of those relationships.

use std::collections::BTreeMap;

/// Returns true iff every key/value pair of `selector` is present with an
/// equal value in `labels`.
///
/// An empty selector matches everything (vacuous truth); callers that
/// consider an empty selector too broad must guard for it themselves. Extra
/// labels on the candidate are irrelevant, and a missing key is a non-match,
/// never an error.
pub fn selector_matches(
    selector: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key).is_some_and(|v| v == value))
}
