use crate::types::{Piece, SortStrategy};
use std::cmp::Ordering;

/// Returns a copy of `pieces` ordered by the given strategy, largest first.
/// The sort is stable, so equal pieces keep their relative input order.
pub fn sort_pieces(pieces: &[Piece], strategy: SortStrategy) -> Vec<Piece> {
    let mut sorted = pieces.to_vec();

    match strategy {
        SortStrategy::AreaDesc => sorted.sort_by(|a, b| descending(a.area(), b.area())),
        SortStrategy::WidthDesc => sorted.sort_by(|a, b| {
            descending(a.width, b.width).then_with(|| descending(a.height, b.height))
        }),
        SortStrategy::HeightDesc => sorted.sort_by(|a, b| {
            descending(a.height, b.height).then_with(|| descending(a.width, b.width))
        }),
        SortStrategy::PerimeterDesc => {
            sorted.sort_by(|a, b| descending(a.perimeter(), b.perimeter()))
        }
    }

    sorted
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
