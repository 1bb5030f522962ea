//! Overlap resolution
//!
//! Merges candidates from every detector into one non-overlapping sequence
//! sorted by start offset.
//!
//! `LastKept` compares each candidate only with the most recently kept
//! entity: higher confidence replaces it, equal confidence with a longer
//! span replaces it, anything else is dropped. On clusters of three or more
//! overlapping candidates this can keep less total confidence than
//! possible. `Weighted` instead picks the non-overlapping subset with the
//! highest summed confidence.

use crate::config::ResolutionStrategy;
use crate::entity::EntityCandidate;
use crate::error::{Error, Result};
use std::cmp::Ordering;

/// Non-overlapping candidates sorted ascending by start.
///
/// Only [`OverlapResolver`] constructs this, so the invariant holds for
/// every value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEntities(Vec<EntityCandidate>);

impl ResolvedEntities {
    pub fn as_slice(&self) -> &[EntityCandidate] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<EntityCandidate> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityCandidate> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedEntities {
    type Item = &'a EntityCandidate;
    type IntoIter = std::slice::Iter<'a, EntityCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Settles overlapping candidates with a fixed strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapResolver {
    strategy: ResolutionStrategy,
}

impl OverlapResolver {
    pub fn new(strategy: ResolutionStrategy) -> Self {
        Self { strategy }
    }

    /// Resolve `candidates`. Fails on any candidate with an empty or
    /// inverted span.
    pub fn resolve(&self, candidates: Vec<EntityCandidate>) -> Result<ResolvedEntities> {
        for candidate in &candidates {
            if candidate.span.start >= candidate.span.end {
                return Err(Error::InvalidSpan {
                    start: candidate.span.start,
                    end: candidate.span.end,
                    reason: "candidate span is empty or inverted".to_string(),
                });
            }
        }

        let total = candidates.len();
        let resolved = match self.strategy {
            ResolutionStrategy::LastKept => resolve_last_kept(candidates),
            ResolutionStrategy::Weighted => resolve_weighted(candidates),
        };

        tracing::debug!(
            strategy = ?self.strategy,
            candidates = total,
            kept = resolved.len(),
            "Resolved overlapping entities"
        );
        Ok(ResolvedEntities(resolved))
    }
}

/// Resolve with the default `LastKept` strategy.
pub fn resolve_overlaps(candidates: Vec<EntityCandidate>) -> Result<ResolvedEntities> {
    OverlapResolver::default().resolve(candidates)
}

fn resolve_last_kept(mut candidates: Vec<EntityCandidate>) -> Vec<EntityCandidate> {
    // Stable: equal starts keep detector order.
    candidates.sort_by_key(|c| c.span.start);

    let mut kept: Vec<EntityCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match kept.last_mut() {
            Some(last) if candidate.span.start < last.span.end => {
                let wins = candidate.confidence > last.confidence
                    || (candidate.confidence == last.confidence
                        && candidate.span.len() > last.span.len());
                if wins {
                    *last = candidate;
                }
            }
            _ => kept.push(candidate),
        }
    }
    kept
}

/// Accumulated value of a selection: summed confidence, then covered length.
#[derive(Debug, Clone, Copy, Default)]
struct Weight {
    confidence: f64,
    covered: usize,
}

impl Weight {
    fn of(candidate: &EntityCandidate) -> Self {
        Self {
            confidence: candidate.confidence,
            covered: candidate.span.len(),
        }
    }

    fn plus(self, other: Self) -> Self {
        Self {
            confidence: self.confidence + other.confidence,
            covered: self.covered + other.covered,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        const EPSILON: f64 = 1e-9;
        let diff = self.confidence - other.confidence;
        if diff > EPSILON {
            Ordering::Greater
        } else if diff < -EPSILON {
            Ordering::Less
        } else {
            self.covered.cmp(&other.covered)
        }
    }
}

/// Weighted interval scheduling over candidate spans.
fn resolve_weighted(mut candidates: Vec<EntityCandidate>) -> Vec<EntityCandidate> {
    if candidates.len() <= 1 {
        return candidates;
    }
    candidates.sort_by(|a, b| {
        a.span
            .end
            .cmp(&b.span.end)
            .then(a.span.start.cmp(&b.span.start))
    });

    let n = candidates.len();
    // predecessor[j]: number of candidates ending at or before candidate j starts
    let predecessor: Vec<usize> = candidates
        .iter()
        .map(|c| candidates.partition_point(|p| p.span.end <= c.span.start))
        .collect();

    let mut best = vec![Weight::default(); n + 1];
    for j in 0..n {
        let take = best[predecessor[j]].plus(Weight::of(&candidates[j]));
        best[j + 1] = if take.compare(&best[j]) == Ordering::Greater {
            take
        } else {
            best[j]
        };
    }

    let mut chosen = Vec::new();
    let mut j = n;
    while j > 0 {
        let take = best[predecessor[j - 1]].plus(Weight::of(&candidates[j - 1]));
        if take.compare(&best[j - 1]) == Ordering::Greater {
            chosen.push(j - 1);
            j = predecessor[j - 1];
        } else {
            j -= 1;
        }
    }

    let mut slots: Vec<Option<EntityCandidate>> = candidates.into_iter().map(Some).collect();
    let mut resolved: Vec<EntityCandidate> = chosen
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();
    resolved.sort_by_key(|c| c.span.start);
    resolved
}
