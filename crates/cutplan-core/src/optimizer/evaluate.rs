use super::plate::PlateSolution;
use crate::types::{Evaluation, OptimizeOptions};
use std::collections::HashMap;

/// Fixed deduction per plate. It outweighs any realistic area gain, so fewer
/// plates always beats less waste.
pub const PLATE_PENALTY: f64 = 10_000.0;

/// Computes utilization, waste, rotation statistics and the overall score of a
/// plate set.
pub fn evaluate(plates: &[PlateSolution], options: &OptimizeOptions) -> Evaluation {
    let rotation_penalty = non_negative(options.rotation_penalty);
    let rotation_mix_penalty = non_negative(options.rotation_mix_penalty);

    let total_area: f64 = plates.iter().map(PlateSolution::total_area).sum();
    let used_area: f64 = plates.iter().map(PlateSolution::used_area).sum();
    let waste_area = total_area - used_area;
    let utilization = if total_area > 0.0 {
        (used_area / total_area) * 100.0
    } else {
        0.0
    };

    let mut rotated_count = 0;
    let mut mixed_rotation_rows = 0;
    if options.allow_rotation && (rotation_penalty > 0.0 || rotation_mix_penalty > 0.0) {
        // group id -> (rotated, total)
        let mut groups: HashMap<&str, (usize, usize)> = HashMap::new();

        for placement in plates.iter().flat_map(|p| p.placed_pieces()) {
            let rotated = usize::from(placement.piece.rotated);
            rotated_count += rotated;

            if rotation_mix_penalty > 0.0 {
                if let Some(group_id) = placement.piece.group_id.as_deref() {
                    let state = groups.entry(group_id).or_insert((0, 0));
                    state.0 += rotated;
                    state.1 += 1;
                }
            }
        }

        mixed_rotation_rows = groups
            .values()
            .filter(|(rotated, total)| *rotated > 0 && rotated < total)
            .count();
    }

    let rotation_penalty_applied = rotated_count as f64 * rotation_penalty;
    let rotation_mix_penalty_applied = mixed_rotation_rows as f64 * rotation_mix_penalty;
    let score = used_area
        - plates.len() as f64 * PLATE_PENALTY
        - rotation_penalty_applied
        - rotation_mix_penalty_applied;

    Evaluation {
        plate_count: plates.len(),
        total_area,
        used_area,
        waste_area,
        utilization,
        rotated_count,
        mixed_rotation_rows,
        rotation_penalty_applied,
        rotation_mix_penalty_applied,
        score,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
