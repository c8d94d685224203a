use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

pub(crate) mod annealing;
pub(crate) mod evaluate;
pub(crate) mod heuristics;
pub(crate) mod plate;
pub(crate) mod rows;
pub(crate) mod sorting;

use annealing::simulated_annealing;
use evaluate::evaluate;
use heuristics::{best_fit_decreasing, first_fit_decreasing, Packing};

/// Plans guillotine cuts for a batch of pieces on identical plates.
pub struct Optimizer {
    pieces: Vec<Piece>,
    plate: PlateSpec,
    options: OptimizeOptions,
}

impl Optimizer {
    /// Validates the input and options and builds a new optimizer instance.
    ///
    /// An empty batch or a plate left without usable area by its trims is not
    /// an error: the run produces no plates and every piece ends up remaining.
    pub fn new(pieces: Vec<Piece>, plate: PlateSpec, options: OptimizeOptions) -> Result<Self> {
        if !is_positive(plate.width) || !is_positive(plate.height) {
            return Err(OptimizerError::InvalidInput(format!(
                "Plate dimensions must be positive, got {} x {}",
                plate.width, plate.height
            )));
        }

        for piece in &pieces {
            if piece.id.is_empty() {
                return Err(OptimizerError::InvalidInput(
                    "Every piece needs a non-empty id".to_string(),
                ));
            }
            if !is_positive(piece.width) || !is_positive(piece.height) {
                return Err(OptimizerError::InvalidInput(format!(
                    "Piece '{}' has non-positive dimensions",
                    piece.id
                )));
            }
        }

        let lengths = [
            ("kerf", options.kerf),
            ("trim_left", options.trim_left),
            ("trim_top", options.trim_top),
            ("trim_right", options.trim_right),
            ("trim_bottom", options.trim_bottom),
            ("rotation_penalty", options.rotation_penalty),
            ("rotation_mix_penalty", options.rotation_mix_penalty),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(OptimizerError::InvalidConfiguration(format!(
                    "'{}' must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            pieces,
            plate,
            options,
        })
    }

    /// Runs the configured algorithm. Annealing draws from a generator seeded
    /// with `options.seed`, or from system entropy when no seed is set.
    pub fn optimize(&self) -> OptimizationResult {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.optimize_with_rng(&mut rng)
    }

    /// Runs the configured algorithm drawing randomness from `rng`.
    pub fn optimize_with_rng<R: Rng>(&self, rng: &mut R) -> OptimizationResult {
        let options = &self.options;
        info!(
            pieces = self.pieces.len(),
            plate_width = self.plate.width,
            plate_height = self.plate.height,
            algorithm = %options.algorithm,
            model = %options.model,
            "Starting optimization"
        );

        let (packing, evaluation) = match options.algorithm {
            Algorithm::Ffd => {
                let packing = first_fit_decreasing(&self.pieces, &self.plate, options);
                let evaluation = evaluate(&packing.plates, options);
                (packing, evaluation)
            }
            Algorithm::Bfd => {
                let packing = best_fit_decreasing(&self.pieces, &self.plate, options);
                let evaluation = evaluate(&packing.plates, options);
                (packing, evaluation)
            }
            Algorithm::SimulatedAnnealing => {
                let outcome = simulated_annealing(&self.pieces, &self.plate, options, rng);
                (outcome.packing, outcome.evaluation)
            }
        };

        let Packing { plates, remaining } = packing;
        for piece in &remaining {
            warn!(
                piece_id = %piece.id,
                width = piece.width,
                height = piece.height,
                "Piece does not fit an empty plate in any orientation"
            );
        }

        info!(
            plates = evaluation.plate_count,
            utilization = evaluation.utilization,
            remaining = remaining.len(),
            "Optimization complete"
        );

        OptimizationResult {
            plates,
            remaining,
            evaluation,
        }
    }
}

/// Validates the input and runs the configured algorithm.
pub fn optimize(
    pieces: Vec<Piece>,
    plate: PlateSpec,
    options: OptimizeOptions,
) -> Result<OptimizationResult> {
    Ok(Optimizer::new(pieces, plate, options)?.optimize())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
