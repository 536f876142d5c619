/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pure statistics feeding the filter controls.
//!
//! Nothing here holds state: ranges are recomputed from the loaded values
//! and set intersections take both operands explicitly.

use std::collections::{BTreeMap, BTreeSet};

/// Percentile used to seed the relative-risk cutoff of disease comorbidities.
/// Disease-level networks are dense, so only the top of the range is shown.
pub const DISEASE_CUTOFF_PERCENTILE: f64 = 0.95;

/// Percentile used to seed the relative-risk cutoff of patient-subgroup comorbidities.
pub const PATIENT_SUBGROUP_CUTOFF_PERCENTILE: f64 = 0.5;

/// Percentile seeding the minimum shared-genes slider. Starts fully open.
pub const SHARED_GENES_PERCENTILE: f64 = 0.0;

/// Percentile seeding the minimum shared-evidence slider of regulation networks
pub const SHARED_EVIDENCE_PERCENTILE: f64 = 0.0;

/// Percentile seeding the minimum patient count of study links
pub const MIN_PATIENTS_PERCENTILE: f64 = 0.0;

/// Range of a weight distribution plus the default cutoff picked inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskRange {
    pub min: f64,
    pub initial: f64,
    pub max: f64,
}

impl RiskRange {
    /// The "no data" range. A cutoff of `-inf` never hides anything.
    pub const EMPTY: RiskRange = RiskRange {
        min: f64::INFINITY,
        initial: f64::NEG_INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// Compute `{min, initial, max}` over the distinct sorted `values`.
///
/// `initial` is the element at `floor(distinct_count * percentile)`, clamped to
/// the last distinct value so a percentile of 1.0 stays in range.
pub fn compute_range(values: &[f64], percentile: f64) -> RiskRange {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return RiskRange::EMPTY;
    }
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();

    let last = sorted.len() - 1;
    let index = ((sorted.len() as f64) * percentile.clamp(0.0, 1.0)).floor() as usize;

    RiskRange {
        min: sorted[0],
        initial: sorted[index.min(last)],
        max: sorted[last],
    }
}

/// Smallest and largest value of an integer attribute, `None` for no values.
pub fn size_range(values: impl IntoIterator<Item = u64>) -> Option<(u64, u64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Elements present in both `a` and `b`
pub fn intersect_sets<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|v| large.contains(v)).cloned().collect()
}

/// Direction of a gene or drug regulation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Regulation {
    Up,
    Down,
}

impl Regulation {
    /// Map a `regulation_sign` value; zero carries no direction.
    pub fn from_sign(sign: i64) -> Option<Self> {
        match sign.signum() {
            1 => Some(Regulation::Up),
            -1 => Some(Regulation::Down),
            _ => None,
        }
    }

    pub fn sign(self) -> i64 {
        match self {
            Regulation::Up => 1,
            Regulation::Down => -1,
        }
    }
}

/// Entities regulated in the same direction by two owners
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedRegulation {
    pub up: BTreeSet<String>,
    pub down: BTreeSet<String>,
}

impl SharedRegulation {
    pub fn total(&self) -> usize {
        self.up.len() + self.down.len()
    }
}

#[derive(Debug, Clone, Default)]
struct RegulatedSets {
    up: BTreeSet<String>,
    down: BTreeSet<String>,
}

/// Up/down regulated entity sets per owner (usually a patient subgroup)
#[derive(Debug, Clone, Default)]
pub struct RegulationIndex {
    by_owner: BTreeMap<String, RegulatedSets>,
}

impl RegulationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(owner, entity, sign)` triples; zero signs are ignored.
    pub fn from_records<I, O, E>(records: I) -> Self
    where
        I: IntoIterator<Item = (O, E, i64)>,
        O: Into<String>,
        E: Into<String>,
    {
        let mut index = Self::new();
        for (owner, entity, sign) in records {
            if let Some(direction) = Regulation::from_sign(sign) {
                index.insert(owner, entity, direction);
            }
        }
        index
    }

    pub fn insert(&mut self, owner: impl Into<String>, entity: impl Into<String>, direction: Regulation) {
        let sets = self.by_owner.entry(owner.into()).or_default();
        match direction {
            Regulation::Up => sets.up.insert(entity.into()),
            Regulation::Down => sets.down.insert(entity.into()),
        };
    }

    /// Entities regulated in `direction` by `owner` (empty for unknown owners)
    pub fn regulated(&self, owner: &str, direction: Regulation) -> BTreeSet<String> {
        self.by_owner
            .get(owner)
            .map(|sets| match direction {
                Regulation::Up => sets.up.clone(),
                Regulation::Down => sets.down.clone(),
            })
            .unwrap_or_default()
    }

    /// Entities both owners regulate in the same direction
    pub fn shared_between(&self, a: &str, b: &str) -> SharedRegulation {
        let (Some(sa), Some(sb)) = (self.by_owner.get(a), self.by_owner.get(b)) else {
            return SharedRegulation::default();
        };
        SharedRegulation {
            up: intersect_sets(&sa.up, &sb.up),
            down: intersect_sets(&sa.down, &sb.down),
        }
    }

    /// How many of `owners` regulate `entity` in `direction`
    pub fn support<'a>(
        &self,
        owners: impl IntoIterator<Item = &'a str>,
        entity: &str,
        direction: Regulation,
    ) -> usize {
        owners
            .into_iter()
            .filter_map(|owner| self.by_owner.get(owner))
            .filter(|sets| match direction {
                Regulation::Up => sets.up.contains(entity),
                Regulation::Down => sets.down.contains(entity),
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compute_range_percentile_pick() {
        let range = compute_range(&[1.0, 1.0, 2.0, 5.0, 9.0], 0.95);
        assert_eq!(range.min, 1.0);
        assert_eq!(range.initial, 9.0);
        assert_eq!(range.max, 9.0);
    }

    #[test]
    fn test_compute_range_median_pick() {
        // distinct [1, 2, 5, 9], floor(4 * 0.5) = 2
        let range = compute_range(&[9.0, 5.0, 1.0, 2.0, 2.0], PATIENT_SUBGROUP_CUTOFF_PERCENTILE);
        assert_eq!(range.initial, 5.0);
        assert_eq!(range.min, 1.0);
        assert_eq!(range.max, 9.0);
    }

    #[test]
    fn test_slider_percentiles_start_at_minimum() {
        for percentile in [SHARED_GENES_PERCENTILE, SHARED_EVIDENCE_PERCENTILE, MIN_PATIENTS_PERCENTILE] {
            let range = compute_range(&[4.0, 1.0, 3.0], percentile);
            assert_eq!(range.initial, range.min);
        }
    }

    #[test]
    fn test_compute_range_empty_is_sentinel() {
        let range = compute_range(&[], DISEASE_CUTOFF_PERCENTILE);
        assert_eq!(range.min, f64::INFINITY);
        assert_eq!(range.max, f64::NEG_INFINITY);
        assert_eq!(range.initial, f64::NEG_INFINITY);
        assert!(range.is_empty());
        assert_eq!(range, RiskRange::EMPTY);
    }

    #[test]
    fn test_compute_range_single_value() {
        let range = compute_range(&[3.5], 0.95);
        assert_eq!(range, RiskRange { min: 3.5, initial: 3.5, max: 3.5 });
        assert!(!range.is_empty());
    }

    #[test]
    fn test_compute_range_full_percentile_clamped() {
        let range = compute_range(&[1.0, 2.0], 1.0);
        assert_eq!(range.initial, 2.0);
    }

    #[test]
    fn test_compute_range_does_not_mutate_input() {
        let values = vec![5.0, 1.0, 5.0];
        let _ = compute_range(&values, 0.5);
        assert_eq!(values, vec![5.0, 1.0, 5.0]);
    }

    #[test]
    fn test_size_range() {
        assert_eq!(size_range(Vec::<u64>::new()), None);
        assert_eq!(size_range(vec![7, 3, 12, 4]), Some((3, 12)));
    }

    #[test]
    fn test_intersect_sets() {
        let a = set(&["BRCA1", "TP53", "EGFR"]);
        let b = set(&["TP53", "EGFR", "MYC"]);
        assert_eq!(intersect_sets(&a, &b), set(&["EGFR", "TP53"]));
        assert_eq!(intersect_sets(&b, &a), set(&["EGFR", "TP53"]));
        assert!(intersect_sets(&a, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_regulation_from_sign() {
        assert_eq!(Regulation::from_sign(1), Some(Regulation::Up));
        assert_eq!(Regulation::from_sign(-3), Some(Regulation::Down));
        assert_eq!(Regulation::from_sign(0), None);
        assert_eq!(Regulation::Down.sign(), -1);
    }

    #[test]
    fn test_shared_regulation_between_owners() {
        let index = RegulationIndex::from_records(vec![
            ("PSG1", "TP53", 1),
            ("PSG1", "EGFR", -1),
            ("PSG1", "MYC", 1),
            ("PSG2", "TP53", 1),
            ("PSG2", "EGFR", -1),
            ("PSG2", "MYC", -1),
            ("PSG2", "KRAS", 0),
        ]);

        let shared = index.shared_between("PSG1", "PSG2");
        assert_eq!(shared.up, set(&["TP53"]));
        assert_eq!(shared.down, set(&["EGFR"]));
        assert_eq!(shared.total(), 2);

        assert_eq!(index.shared_between("PSG1", "PSG9"), SharedRegulation::default());
        assert!(index.regulated("PSG2", Regulation::Up).contains("TP53"));
        assert!(!index.regulated("PSG2", Regulation::Up).contains("KRAS"));
    }

    #[test]
    fn test_regulation_support_counts_owners() {
        let index = RegulationIndex::from_records(vec![
            ("PSG1", "TP53", 1),
            ("PSG2", "TP53", 1),
            ("PSG3", "TP53", -1),
        ]);
        assert_eq!(index.support(["PSG1", "PSG2", "PSG3"], "TP53", Regulation::Up), 2);
        assert_eq!(index.support(["PSG1", "PSG2", "PSG3"], "TP53", Regulation::Down), 1);
        assert_eq!(index.support(["PSG4"], "TP53", Regulation::Up), 0);
    }
}
