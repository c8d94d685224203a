use cutplan_core::{
    optimize, Algorithm, CutSegment, OptimizationResult, OptimizeOptions, PackingModel, Piece,
    PlateSolution, PlateSpec, EPSILON,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn random_pieces(count: usize, seed: u64) -> Vec<Piece> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let width = rng.gen_range(40..900) as f64;
            let height = rng.gen_range(40..900) as f64;
            let piece = Piece::new(format!("piece-{}", i), width, height);
            if i % 3 == 0 {
                piece.with_group(format!("row-{}", i % 4))
            } else {
                piece
            }
        })
        .collect()
}

fn run(pieces: &[Piece], algorithm: Algorithm, model: PackingModel) -> OptimizationResult {
    let options = OptimizeOptions {
        algorithm,
        model,
        iterations: 30,
        trim_right: 7.0,
        trim_bottom: 4.0,
        rotation_mix_penalty: 50.0,
        seed: Some(11),
        ..OptimizeOptions::default()
    };
    optimize(pieces.to_vec(), PlateSpec::new(1220.0, 2440.0), options).unwrap()
}

fn all_runs(pieces: &[Piece]) -> Vec<(Algorithm, PackingModel, OptimizationResult)> {
    let mut runs = Vec::new();
    for algorithm in [Algorithm::Ffd, Algorithm::Bfd, Algorithm::SimulatedAnnealing] {
        for model in [PackingModel::Strip, PackingModel::Band] {
            runs.push((algorithm, model, run(pieces, algorithm, model)));
        }
    }
    runs
}

#[test]
fn test_every_piece_is_placed_or_remaining() {
    let mut pieces = random_pieces(40, 1);
    pieces.push(Piece::new("oversized", 1300.0, 2500.0));

    for (algorithm, model, result) in all_runs(&pieces) {
        let placed: Vec<&str> = result
            .plates
            .iter()
            .flat_map(|p| p.placed_pieces())
            .map(|p| p.piece.id.as_str())
            .chain(result.remaining.iter().map(|p| p.id.as_str()))
            .collect();
        let unique: HashSet<&str> = placed.iter().copied().collect();

        assert_eq!(placed.len(), pieces.len(), "{} {}", algorithm, model);
        assert_eq!(unique.len(), pieces.len(), "{} {}", algorithm, model);
        assert_eq!(result.remaining.len(), 1);
        assert_eq!(result.remaining[0].id, "oversized");
    }
}

#[test]
fn test_areas_and_utilization_are_bounded() {
    let pieces = random_pieces(35, 2);

    for (algorithm, model, result) in all_runs(&pieces) {
        let used: f64 = result.plates.iter().map(PlateSolution::used_area).sum();
        let total: f64 = result.plates.iter().map(PlateSolution::total_area).sum();

        assert!(used <= total, "{} {}", algorithm, model);
        for plate in &result.plates {
            assert!(plate.utilization() >= 0.0);
            assert!(plate.utilization() <= 100.0);
            assert!(plate.used_area() <= plate.usable_area() + EPSILON);
        }
        assert_eq!(result.evaluation.plate_count, result.plates.len());
        assert!((result.evaluation.used_area - used).abs() < 1e-6);
    }
}

#[test]
fn test_placements_do_not_overlap_and_stay_inside_trims() {
    let pieces = random_pieces(50, 3);

    for (algorithm, model, result) in all_runs(&pieces) {
        for plate in &result.plates {
            let placed = plate.placed_pieces();
            for (i, a) in placed.iter().enumerate() {
                assert!(a.x >= plate.trim_left - EPSILON, "{} {}", algorithm, model);
                assert!(a.y >= plate.trim_top - EPSILON);
                assert!(a.right() <= plate.plate_width - plate.trim_right + EPSILON);
                assert!(a.bottom() <= plate.plate_height - plate.trim_bottom + EPSILON);

                for b in &placed[i + 1..] {
                    assert!(
                        !a.overlaps(b),
                        "{} and {} overlap ({} {})",
                        a.piece.id,
                        b.piece.id,
                        algorithm,
                        model
                    );
                }
            }
        }
    }
}

#[test]
fn test_rotated_placements_swap_declared_dimensions() {
    let pieces = random_pieces(40, 4);

    for (_, _, result) in all_runs(&pieces) {
        for placement in result.plates.iter().flat_map(|p| p.placed_pieces()) {
            let declared = pieces
                .iter()
                .find(|p| p.id == placement.piece.id)
                .unwrap();
            if placement.piece.rotated {
                assert_eq!(placement.width, declared.height);
                assert_eq!(placement.height, declared.width);
            } else {
                assert_eq!(placement.width, declared.width);
                assert_eq!(placement.height, declared.height);
            }
        }
    }
}

#[test]
fn test_cut_sequence_separates_every_piece() {
    let pieces = random_pieces(45, 5);

    for (algorithm, model, result) in all_runs(&pieces) {
        for plate in &result.plates {
            assert_guillotine(plate);
            let cuts = plate.cut_sequence();
            assert_eq!(
                cuts.sequence.len(),
                cuts.vertical.len() + cuts.horizontal.len(),
                "{} {}",
                algorithm,
                model
            );
        }
    }
}

/// Splits `[start, end]` at each cut position, dropping the kerf after each cut.
fn segments(start: f64, end: f64, mut cuts: Vec<f64>, kerf: f64) -> Vec<(f64, f64)> {
    cuts.sort_by(|a, b| a.total_cmp(b));
    let mut result = Vec::new();
    let mut from = start;
    for cut in cuts {
        result.push((from, cut));
        from = cut + kerf;
    }
    result.push((from, end));
    result
}

fn contains(segment: (f64, f64), from: f64, to: f64) -> bool {
    segment.0 - EPSILON <= from && to <= segment.1 + EPSILON
}

/// Applies the first-stage cuts, then the second-stage cuts inside each
/// first-stage segment, and checks that every resulting cell holds at most one
/// piece and every piece lies inside exactly one cell.
fn assert_guillotine(plate: &PlateSolution) {
    let cuts = plate.cut_sequence();
    let (x0, y0, width, height) = plate.usable_rect();

    // Work in (primary, secondary) coordinates: the primary axis is the one the
    // first-stage cuts split.
    let (primary, secondary, first, second): (_, _, Vec<f64>, Vec<&CutSegment>) =
        match plate.model() {
            PackingModel::Strip => (
                (x0, x0 + width),
                (y0, y0 + height),
                cuts.vertical.iter().map(|c| c.position).collect(),
                cuts.horizontal.iter().collect(),
            ),
            PackingModel::Band => (
                (y0, y0 + height),
                (x0, x0 + width),
                cuts.horizontal.iter().map(|c| c.position).collect(),
                cuts.vertical.iter().collect(),
            ),
        };
    let span_start = |c: &CutSegment| match plate.model() {
        PackingModel::Strip => c.x,
        PackingModel::Band => c.y,
    };

    let columns = segments(primary.0, primary.1, first, plate.kerf);
    let mut occupied = HashSet::new();

    for placement in plate.placed_pieces() {
        let (p0, p1, s0, s1) = match plate.model() {
            PackingModel::Strip => (
                placement.x,
                placement.right(),
                placement.y,
                placement.bottom(),
            ),
            PackingModel::Band => (
                placement.y,
                placement.bottom(),
                placement.x,
                placement.right(),
            ),
        };

        let holding: Vec<usize> = (0..columns.len())
            .filter(|&i| contains(columns[i], p0, p1))
            .collect();
        assert_eq!(
            holding.len(),
            1,
            "piece {} crosses a first-stage cut",
            placement.piece.id
        );
        let column = columns[holding[0]];

        let inner_cuts: Vec<f64> = second
            .iter()
            .filter(|c| contains(column, span_start(**c), span_start(**c)))
            .map(|c| c.position)
            .collect();
        let cells = segments(secondary.0, secondary.1, inner_cuts, plate.kerf);
        let cell: Vec<usize> = (0..cells.len())
            .filter(|&i| contains(cells[i], s0, s1))
            .collect();
        assert_eq!(
            cell.len(),
            1,
            "piece {} crosses a second-stage cut",
            placement.piece.id
        );

        assert!(
            occupied.insert((holding[0], cell[0])),
            "piece {} shares its cell",
            placement.piece.id
        );
    }
}
