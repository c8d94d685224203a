use super::plate::PlateSolution;
use super::sorting::sort_pieces;
use crate::types::*;
use std::cmp::Ordering;
use tracing::debug;

/// Plates produced by a heuristic run plus the pieces no plate could hold.
#[derive(Debug, Clone, Default)]
pub struct Packing {
    pub plates: Vec<PlateSolution>,
    pub remaining: Vec<Piece>,
}

/// First-Fit-Decreasing: each piece goes to the first plate, in creation
/// order, that accepts one of its orientations.
pub fn first_fit_decreasing(
    pieces: &[Piece],
    plate: &PlateSpec,
    options: &OptimizeOptions,
) -> Packing {
    let model = options.model;
    let mut packing = Packing::default();

    for piece in sort_pieces(pieces, default_strategy(model)) {
        let orientations = orientations(&piece, options.allow_rotation, model);

        let placed = packing
            .plates
            .iter_mut()
            .any(|existing| orientations.iter().any(|o| existing.try_place(o)));

        if !placed {
            place_on_new_plate(&mut packing, piece, &orientations, plate, options);
        }
    }

    packing
}

/// Best-Fit-Decreasing: each piece goes to the plate and orientation that
/// leave the least waste once placed.
pub fn best_fit_decreasing(
    pieces: &[Piece],
    plate: &PlateSpec,
    options: &OptimizeOptions,
) -> Packing {
    let model = options.model;
    let mut packing = Packing::default();

    for piece in sort_pieces(pieces, default_strategy(model)) {
        let orientations = orientations(&piece, options.allow_rotation, model);
        let mut best: Option<(usize, usize, f64)> = None;

        for (plate_idx, existing) in packing.plates.iter().enumerate() {
            for (orientation_idx, orientation) in orientations.iter().enumerate() {
                // Placement is deterministic, so a clone behaves exactly like
                // the plate rebuilt from its own placements.
                let mut trial = existing.clone();
                if !trial.try_place(orientation) {
                    continue;
                }

                let waste = trial.total_area() - trial.used_area();
                match best {
                    Some((_, _, best_waste)) if waste >= best_waste => {}
                    _ => best = Some((plate_idx, orientation_idx, waste)),
                }
            }
        }

        match best {
            Some((plate_idx, orientation_idx, _)) => {
                packing.plates[plate_idx].try_place(&orientations[orientation_idx]);
            }
            None => place_on_new_plate(&mut packing, piece, &orientations, plate, options),
        }
    }

    packing
}

/// Ordering applied before placement: bands need height-homogeneous rows, so
/// the band model groups by height first.
pub(crate) fn default_strategy(model: PackingModel) -> SortStrategy {
    match model {
        PackingModel::Strip => SortStrategy::AreaDesc,
        PackingModel::Band => SortStrategy::HeightDesc,
    }
}

/// Candidate orientations of a piece, in the order they are tried.
///
/// The piece as given always comes first in the strip model. The band model
/// prefers the lower orientation to keep bands thin, then the wider one.
pub(crate) fn orientations(
    piece: &Piece,
    allow_rotation: bool,
    model: PackingModel,
) -> Vec<Piece> {
    let mut candidates = vec![piece.clone()];
    if allow_rotation && !piece.is_square() {
        candidates.push(piece.rotated());
    }

    if model == PackingModel::Band {
        candidates.sort_by(|a, b| {
            if !approx_eq(a.height, b.height) {
                return a.height.partial_cmp(&b.height).unwrap_or(Ordering::Equal);
            }
            if !approx_eq(a.width, b.width) {
                return b.width.partial_cmp(&a.width).unwrap_or(Ordering::Equal);
            }
            b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal)
        });
    }

    candidates
}

/// Opens a fresh plate for the piece, or records it as remaining when even an
/// empty plate cannot hold any orientation.
fn place_on_new_plate(
    packing: &mut Packing,
    piece: Piece,
    orientations: &[Piece],
    plate: &PlateSpec,
    options: &OptimizeOptions,
) {
    let mut fresh = PlateSolution::new(options.model, plate, options);
    if orientations.iter().any(|o| fresh.try_place(o)) {
        packing.plates.push(fresh);
    } else {
        debug!(
            piece_id = %piece.id,
            width = piece.width,
            height = piece.height,
            "Piece does not fit an empty plate"
        );
        packing.remaining.push(piece);
    }
}
