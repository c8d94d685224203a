use super::evaluate::evaluate;
use super::heuristics::{first_fit_decreasing, Packing};
use super::sorting::sort_pieces;
use crate::types::*;
use rand::Rng;
use std::cmp::Ordering;
use tracing::debug;

const INITIAL_TEMPERATURE: f64 = 2000.0;
const COOLING_RATE: f64 = 0.92;

/// Probability of re-sorting a shuffled neighbor largest-first.
const STRIP_RESTART_BIAS: f64 = 0.3;
const BAND_RESTART_BIAS: f64 = 0.35;

const BAND_INITIAL_STRATEGIES: [SortStrategy; 4] = [
    SortStrategy::HeightDesc,
    SortStrategy::AreaDesc,
    SortStrategy::WidthDesc,
    SortStrategy::PerimeterDesc,
];

/// Best packing found by the annealing search.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    pub packing: Packing,
    pub evaluation: Evaluation,
    /// Best score after each iteration
    pub best_scores: Vec<f64>,
}

/// Simulated annealing over FFD orderings and piece orientations.
///
/// The search starts from the best FFD run over every sort strategy. Each
/// iteration perturbs the input order (random swaps, forced rotations and an
/// occasional largest-first re-sort), packs it with FFD and accepts the result
/// by the Metropolis criterion. The temperature starts at 2000 and decays
/// geometrically; the loop runs exactly `options.iterations` times.
pub fn simulated_annealing<R: Rng>(
    pieces: &[Piece],
    plate: &PlateSpec,
    options: &OptimizeOptions,
    rng: &mut R,
) -> AnnealingOutcome {
    let strategies: &[SortStrategy] = match options.model {
        PackingModel::Strip => &SortStrategy::ALL,
        PackingModel::Band => &BAND_INITIAL_STRATEGIES,
    };

    let initial_run = |strategy: SortStrategy| {
        let packing = first_fit_decreasing(&sort_pieces(pieces, strategy), plate, options);
        let evaluation = evaluate(&packing.plates, options);
        (packing, evaluation, strategy)
    };

    let (mut best, mut best_eval, mut initial_strategy) = initial_run(strategies[0]);
    for &strategy in &strategies[1..] {
        let (packing, evaluation, _) = initial_run(strategy);
        if evaluation.score > best_eval.score {
            best = packing;
            best_eval = evaluation;
            initial_strategy = strategy;
        }
    }
    debug!(
        strategy = ?initial_strategy,
        plates = best_eval.plate_count,
        score = best_eval.score,
        "Initial annealing solution"
    );

    let mut current_score = best_eval.score;
    let mut best_scores = Vec::with_capacity(options.iterations);

    for iteration in 0..options.iterations {
        let candidate = neighbor(pieces, options, rng);
        let packing = first_fit_decreasing(&candidate, plate, options);
        let evaluation = evaluate(&packing.plates, options);

        let delta = evaluation.score - current_score;

        if accept(delta, temperature(iteration), rng) {
            current_score = evaluation.score;

            if evaluation.score > best_eval.score {
                debug!(
                    iteration,
                    plates = evaluation.plate_count,
                    utilization = evaluation.utilization,
                    score = evaluation.score,
                    "Annealing found a better solution"
                );
                best = packing;
                best_eval = evaluation;
            }
        }

        best_scores.push(best_eval.score);
    }

    AnnealingOutcome {
        packing: best,
        evaluation: best_eval,
        best_scores,
    }
}

/// Temperature in effect at the given iteration.
pub(crate) fn temperature(iteration: usize) -> f64 {
    INITIAL_TEMPERATURE * COOLING_RATE.powi(iteration as i32)
}

/// Metropolis criterion: improvements always pass, a worsening move passes
/// with probability `exp(delta / temperature)`.
pub(crate) fn accept<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    delta > 0.0 || rng.gen::<f64>() < (delta / temperature).exp()
}

/// Perturbed copy of the input ordering.
fn neighbor<R: Rng>(pieces: &[Piece], options: &OptimizeOptions, rng: &mut R) -> Vec<Piece> {
    let mut shuffled = pieces.to_vec();
    let len = shuffled.len();
    if len == 0 {
        return shuffled;
    }

    let swaps = rng.gen_range(2..=9);
    for _ in 0..swaps {
        let a = rng.gen_range(0..len);
        let b = rng.gen_range(0..len);
        shuffled.swap(a, b);
    }

    if options.allow_rotation {
        let rotations = rng.gen_range(1..=4);
        for _ in 0..rotations {
            let idx = rng.gen_range(0..len);
            if !shuffled[idx].is_square() {
                shuffled[idx] = shuffled[idx].rotated();
            }
        }
    }

    match options.model {
        PackingModel::Strip => {
            if rng.gen_bool(STRIP_RESTART_BIAS) {
                shuffled = sort_pieces(&shuffled, SortStrategy::AreaDesc);
            }
        }
        PackingModel::Band => {
            if rng.gen_bool(BAND_RESTART_BIAS) {
                shuffled.sort_by(|a, b| {
                    if !approx_eq(a.height, b.height) {
                        return b.height.partial_cmp(&a.height).unwrap_or(Ordering::Equal);
                    }
                    b.area().partial_cmp(&a.area()).unwrap_or(Ordering::Equal)
                });
            }
        }
    }

    shuffled
}
