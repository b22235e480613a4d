//! Combination search over modifier sources.
//!
//! A dynamic-programming table maps every achievable total delta to the
//! cheapest way of reaching it. Each source contributes at most one of its
//! options. With sources capped at a handful and small menus, the table
//! stays tiny.

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::modifiers::ModifierSource;

/// A set of chosen sources and the delta they add up to.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Selection {
    /// `(source index, chosen delta)`, in ascending source index.
    pub picks: SmallVec<[(usize, i64); 4]>,
    pub delta: i64,
    pub cost: u64,
}

impl Selection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Cheaper first, then lexicographically smaller source sequence.
    ///
    /// Sources are indexed in key order, so comparing index sequences is
    /// the same as comparing key sequences.
    #[must_use]
    pub fn precedes(&self, other: &Selection) -> bool {
        (self.cost, self.source_indices()) < (other.cost, other.source_indices())
    }

    /// Full tie order between equally scored selections: cost, then source
    /// sequence, then delta.
    #[must_use]
    pub fn tie_order(&self, other: &Selection) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.source_indices().cmp(&other.source_indices()))
            .then(self.delta.cmp(&other.delta))
    }

    fn source_indices(&self) -> SmallVec<[usize; 4]> {
        self.picks.iter().map(|&(idx, _)| idx).collect()
    }
}

/// Cheapest selection for every reachable delta (including the empty
/// selection at delta 0).
///
/// `costs[i]` is the price of spending `sources[i]`. Every cheapest
/// selection per delta is kept until all sources are seen: with uneven
/// costs, the lexicographic order of two partial selections can change
/// once both are extended by the same source.
#[must_use]
pub fn cheapest_by_delta(sources: &[ModifierSource], costs: &[u64]) -> BTreeMap<i64, Selection> {
    let mut table: BTreeMap<i64, Vec<Selection>> = BTreeMap::new();
    table.insert(0, vec![Selection::default()]);

    for (idx, source) in sources.iter().enumerate() {
        let cost = costs.get(idx).copied().unwrap_or(1);
        let before: Vec<Selection> = table.values().flatten().cloned().collect();
        for base in &before {
            for &option in &source.options {
                let mut candidate = base.clone();
                candidate.picks.push((idx, option));
                candidate.delta += option;
                candidate.cost += cost;

                let cheapest = table.entry(candidate.delta).or_default();
                match cheapest.first().map(|kept| candidate.cost.cmp(&kept.cost)) {
                    Some(Ordering::Greater) => {}
                    Some(Ordering::Equal) => cheapest.push(candidate),
                    Some(Ordering::Less) | None => *cheapest = vec![candidate],
                }
            }
        }
    }

    table
        .into_iter()
        .filter_map(|(delta, tied)| {
            tied.into_iter()
                .reduce(|best, next| if next.precedes(&best) { next } else { best })
                .map(|best| (delta, best))
        })
        .collect()
}
