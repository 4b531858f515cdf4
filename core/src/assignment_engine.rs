//! Assignment engine — picks the operator for one inbound contact.
//!
//! Pure function of (source, weight mappings, rng). It never reads or
//! writes the store; the intake workflow feeds it snapshots and applies
//! the capacity side effect itself.
//!
//! Selection policy:
//!   - Only mappings for the requested source are considered.
//!   - An operator is eligible while active and `current_load < max_load`.
//!   - Among eligible mappings, P(i) = weight_i / sum(weights).
//!   - A non-positive weight counts as zero. If every eligible weight is
//!     non-positive, the choice falls back to uniform over eligible.
//!   - No eligible mapping means no operator. That is an outcome, not an error.

use crate::{
    model::{AssignmentSnapshot, Operator},
    rng::RoutingRng,
    types::SourceId,
};

pub fn select_operator<'a>(
    source_id: SourceId,
    assignments: &'a [AssignmentSnapshot],
    rng: &mut RoutingRng,
) -> Option<&'a Operator> {
    let eligible: Vec<&AssignmentSnapshot> = assignments
        .iter()
        .filter(|a| a.source_id == source_id && a.operator.has_capacity())
        .collect();

    if eligible.is_empty() {
        return None;
    }

    // u128 so any number of i64::MAX weights still sums without wrapping.
    let total: u128 = eligible.iter().map(|a| effective_weight(a.weight)).sum();
    if total == 0 {
        let idx = rng.next_u64_below(eligible.len() as u64) as usize;
        return Some(&eligible[idx].operator);
    }

    let mut roll = rng.next_u128_below(total);
    for mapping in &eligible {
        let w = effective_weight(mapping.weight);
        if roll < w {
            return Some(&mapping.operator);
        }
        roll -= w;
    }
    None
}

fn effective_weight(weight: i64) -> u128 {
    weight.max(0) as u128
}
