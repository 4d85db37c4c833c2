// ABOUTME: Phase-length allocation across the Foundation..Recovery sequence
// ABOUTME: Largest-remainder split over minimums, plus rescaling of a plan's remaining tail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::cmp::Ordering;
use std::iter;

use pierre_training_core::errors::{TrainingError, TrainingResult};
use pierre_training_core::models::Phase;

use crate::config::PhaseConfig;

/// Split `total` weeks into lengths, each at least its minimum
///
/// Spare weeks beyond the minimums are distributed by weight using the
/// largest-remainder method; equal remainders go to the earlier entry. When
/// every weight is zero the spare weeks are split evenly.
///
/// Returns `None` when `total` is below the sum of minimums.
#[must_use]
pub fn split_weeks(total: u32, weights: &[f64], minimums: &[u32]) -> Option<Vec<u32>> {
    let floor: u32 = minimums.iter().sum();
    let spare = total.checked_sub(floor)?;
    let mut lengths = minimums.to_vec();
    if spare == 0 || lengths.is_empty() {
        return Some(lengths);
    }

    let weight_sum: f64 = weights.iter().sum();
    let shares: Vec<f64> = if weight_sum > 0.0 {
        weights
            .iter()
            .map(|weight| round_share(f64::from(spare) * weight / weight_sum))
            .collect()
    } else {
        vec![f64::from(spare) / lengths.len() as f64; lengths.len()]
    };

    let mut assigned = 0;
    for (length, share) in lengths.iter_mut().zip(&shares) {
        let whole = share.floor() as u32;
        *length += whole;
        assigned += whole;
    }

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = shares[a] - shares[a].floor();
        let frac_b = shares[b] - shares[b].floor();
        frac_b
            .partial_cmp(&frac_a)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    let leftover = spare.saturating_sub(assigned) as usize;
    for &index in order.iter().cycle().take(leftover) {
        lengths[index] += 1;
    }
    Some(lengths)
}

// Absorbs binary representation noise so 0.1-style weights split exactly
fn round_share(share: f64) -> f64 {
    (share * 1e9).round() / 1e9
}

fn expand(phases: &[Phase], lengths: &[u32]) -> Vec<Phase> {
    phases
        .iter()
        .zip(lengths)
        .flat_map(|(phase, length)| iter::repeat(*phase).take(*length as usize))
        .collect()
}

/// Phase of every week of a fresh plan, in order
///
/// # Errors
///
/// Returns `InfeasibleAdaptation` when `total_weeks` is below the sum of phase
/// minimums and `Validation` when it exceeds the configured maximum.
pub fn allocate_weeks(total_weeks: u32, config: &PhaseConfig) -> TrainingResult<Vec<Phase>> {
    if total_weeks > config.max_total_weeks {
        return Err(TrainingError::validation(format!(
            "plan length {total_weeks} exceeds the maximum of {} weeks",
            config.max_total_weeks
        )));
    }
    let weights: Vec<f64> = Phase::SEQUENCE.iter().map(|p| config.weight(*p)).collect();
    let minimums: Vec<u32> = Phase::SEQUENCE.iter().map(|p| config.min_weeks(*p)).collect();
    let lengths = split_weeks(total_weeks, &weights, &minimums).ok_or_else(|| {
        TrainingError::infeasible(format!(
            "{total_weeks} weeks cannot fit the minimum phase lengths ({} weeks)",
            config.minimum_total()
        ))
    })?;
    Ok(expand(&Phase::SEQUENCE, &lengths))
}

/// Phases for the weeks after `kept`, rescaled to `remaining_weeks`
///
/// `kept` holds the phases of the weeks that stay untouched (history and the
/// current week); `tail` holds the phases the plan currently has after them.
/// The current phase continues with its minimum reduced by the weeks already
/// spent in it; later phases keep their full minimum. Lengths are rescaled in
/// proportion to the tail's current lengths, falling back to the configured
/// weights when the tail is empty.
///
/// # Errors
///
/// Returns `InfeasibleAdaptation` when some phase would drop below its
/// minimum viable length.
pub fn rescale_tail(
    kept: &[Phase],
    tail: &[Phase],
    remaining_weeks: u32,
    config: &PhaseConfig,
) -> TrainingResult<Vec<Phase>> {
    let Some(&current) = kept.last() else {
        return allocate_weeks(remaining_weeks, config);
    };
    let spent = kept.iter().rev().take_while(|phase| **phase == current).count() as u32;

    let phases: Vec<Phase> = Phase::SEQUENCE[current.index()..].to_vec();
    let minimums: Vec<u32> = phases
        .iter()
        .map(|phase| {
            if *phase == current {
                config.min_weeks(*phase).saturating_sub(spent)
            } else {
                config.min_weeks(*phase)
            }
        })
        .collect();

    let tail_counts: Vec<f64> = phases
        .iter()
        .map(|phase| tail.iter().filter(|p| *p == phase).count() as f64)
        .collect();
    let weights = if tail_counts.iter().sum::<f64>() > 0.0 {
        tail_counts
    } else {
        phases.iter().map(|phase| config.weight(*phase)).collect()
    };

    let lengths = split_weeks(remaining_weeks, &weights, &minimums).ok_or_else(|| {
        TrainingError::infeasible(format!(
            "{remaining_weeks} remaining weeks cannot hold the minimum lengths of {} remaining phases ({} weeks)",
            phases.len(),
            minimums.iter().sum::<u32>()
        ))
    })?;
    Ok(expand(&phases, &lengths))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths_of(phases: &[Phase]) -> Vec<u32> {
        Phase::SEQUENCE
            .iter()
            .map(|phase| phases.iter().filter(|p| *p == phase).count() as u32)
            .collect()
    }

    #[test]
    fn test_minimum_plan_gets_one_week_per_phase() {
        let phases = allocate_weeks(6, &PhaseConfig::default()).unwrap();
        assert_eq!(phases, Phase::SEQUENCE.to_vec());
    }

    #[test]
    fn test_below_minimum_is_infeasible() {
        let result = allocate_weeks(5, &PhaseConfig::default());
        assert!(matches!(
            result,
            Err(TrainingError::InfeasibleAdaptation { .. })
        ));
    }

    #[test]
    fn test_above_maximum_is_rejected() {
        let result = allocate_weeks(53, &PhaseConfig::default());
        assert!(matches!(result, Err(TrainingError::Validation { .. })));
    }

    #[test]
    fn test_sixteen_week_split_follows_weights() {
        // spare 10 weeks: shares 2.5, 2.5, 2.0, 1.0, 1.0, 1.0
        let phases = allocate_weeks(16, &PhaseConfig::default()).unwrap();
        assert_eq!(lengths_of(&phases), vec![4, 3, 3, 2, 2, 2]);
        assert_eq!(phases.len(), 16);
    }

    #[test]
    fn test_phases_stay_in_sequence_order() {
        let phases = allocate_weeks(23, &PhaseConfig::default()).unwrap();
        let indices: Vec<usize> = phases.iter().map(Phase::index).collect();
        assert!(indices.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_split_with_zero_weights_is_even() {
        let lengths = split_weeks(6, &[0.0, 0.0, 0.0], &[0, 0, 0]).unwrap();
        assert_eq!(lengths, vec![2, 2, 2]);
    }

    #[test]
    fn test_rescale_tail_shrinks_in_proportion() {
        let config = PhaseConfig::default();
        let plan = allocate_weeks(16, &config).unwrap();
        let (kept, tail) = plan.split_at(2);
        let rescaled = rescale_tail(kept, tail, 8, &config).unwrap();
        assert_eq!(rescaled.len(), 8);
        assert_eq!(rescaled.first(), Some(&Phase::Foundation));
        assert_eq!(rescaled.last(), Some(&Phase::Recovery));
        for phase in &Phase::SEQUENCE[1..] {
            assert!(rescaled.contains(phase), "{phase} dropped");
        }
    }

    #[test]
    fn test_rescale_tail_rejects_compression_below_minimums() {
        let config = PhaseConfig::default();
        let plan = allocate_weeks(16, &config).unwrap();
        let (kept, tail) = plan.split_at(5);
        // Build already met its minimum; four later phases need a week each
        let result = rescale_tail(kept, tail, 3, &config);
        assert!(matches!(
            result,
            Err(TrainingError::InfeasibleAdaptation { .. })
        ));
    }

    #[test]
    fn test_rescale_tail_can_extend() {
        let config = PhaseConfig::default();
        let plan = allocate_weeks(8, &config).unwrap();
        let (kept, tail) = plan.split_at(1);
        let rescaled = rescale_tail(kept, tail, 15, &config).unwrap();
        assert_eq!(rescaled.len(), 15);
    }
}
