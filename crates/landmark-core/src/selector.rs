//! Next-target selection without repeats.

use std::collections::HashSet;

use crate::model::Landmark;
use crate::random::RandomSource;

/// Result of asking for the next landmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Next(Landmark),
    SessionComplete,
}

/// Pick the next landmark uniformly from `known \ completed`.
///
/// The candidate set is filtered first, so the draw is uniform over the
/// remaining landmarks.
pub fn next_target(
    completed: &HashSet<Landmark>,
    known: &[Landmark],
    rng: &mut dyn RandomSource,
) -> Selection {
    let remaining: Vec<&Landmark> = known.iter().filter(|l| !completed.contains(*l)).collect();
    if remaining.is_empty() {
        return Selection::SessionComplete;
    }
    Selection::Next(remaining[rng.index(remaining.len())].clone())
}
