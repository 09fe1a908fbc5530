//! Which concern flags count as negative signals.
//!
//! Some flags are informational (a shop down the street is not a risk in
//! itself). The table below is the single place that decides which flags
//! contribute to the concern count.

use std::collections::BTreeSet;

use area_report_neighborhood_models::ConcernFlag;

/// How a flag is presented to the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcernKind {
    /// Counts toward the concern total.
    Concern,
    /// Shown, but not counted.
    Informational,
}

/// Per-flag classification. Every [`ConcernFlag`] variant must appear.
pub const CONCERN_POLICY: &[(ConcernFlag, ConcernKind)] = &[
    (ConcernFlag::IndustrialNearby, ConcernKind::Concern),
    (ConcernFlag::HighTrafficNearby, ConcernKind::Concern),
    (ConcernFlag::CommercialNearby, ConcernKind::Informational),
    (ConcernFlag::MixedUseNearby, ConcernKind::Informational),
];

/// Looks up a flag's classification. Flags missing from the table are
/// treated as informational.
#[must_use]
pub fn kind_of(flag: ConcernFlag) -> ConcernKind {
    CONCERN_POLICY
        .iter()
        .find(|(f, _)| *f == flag)
        .map_or(ConcernKind::Informational, |(_, kind)| *kind)
}

/// Number of flags in the set that the policy classifies as concerns.
#[must_use]
pub fn count_concerns(flags: &BTreeSet<ConcernFlag>) -> usize {
    flags
        .iter()
        .filter(|flag| kind_of(**flag) == ConcernKind::Concern)
        .count()
}
