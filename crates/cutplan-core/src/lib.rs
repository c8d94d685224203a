//! Guillotine cut planning for rectangular plates.
//!
//! Pieces are packed with First-Fit-Decreasing, Best-Fit-Decreasing or a
//! simulated-annealing search over FFD orderings, using either the
//! strip+shelf or the horizontal band layout. Every plate can report the
//! two-stage guillotine cut sequence that produces its pieces.

mod optimizer;
mod types;

pub use optimizer::annealing::{simulated_annealing, AnnealingOutcome};
pub use optimizer::evaluate::evaluate;
pub use optimizer::heuristics::{best_fit_decreasing, first_fit_decreasing, Packing};
pub use optimizer::plate::{PlateSolution, Rows};
pub use optimizer::rows::{Band, Container, Shelf, Strip};
pub use optimizer::sorting::sort_pieces;
pub use optimizer::{optimize, Optimizer};
pub use types::*;
