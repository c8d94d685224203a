use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance used for every dimension comparison.
pub const EPSILON: f64 = 0.0001;

/// Returns true when `value` is larger than `limit` by more than [`EPSILON`].
pub fn exceeds(value: f64, limit: f64) -> bool {
    value > limit + EPSILON
}

/// Returns true when two dimensions differ by less than [`EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Rectangular piece to be cut out of a plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Set when width and height are swapped relative to the declared piece
    #[serde(default)]
    pub rotated: bool,
    /// Pieces sharing a group are expected to share an orientation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Piece {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            rotated: false,
            group_id: None,
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * self.width + 2.0 * self.height
    }

    /// Whether a 90° turn leaves the footprint unchanged.
    pub fn is_square(&self) -> bool {
        approx_eq(self.width, self.height)
    }

    /// Copy turned by 90°, with the rotation flag toggled.
    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            rotated: !self.rotated,
            ..self.clone()
        }
    }
}

/// Nominal stock dimensions shared by every plate of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateSpec {
    pub width: f64,
    pub height: f64,
}

impl PlateSpec {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Absolute position of a piece on a plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub piece: Piece,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub(crate) fn at(piece: &Piece, x: f64, y: f64) -> Self {
        Self {
            piece: piece.clone(),
            x,
            y,
            width: piece.width,
            height: piece.height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Axis-aligned intersection test; touching edges do not overlap.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.right() - EPSILON
            && other.x < self.right() - EPSILON
            && self.y < other.bottom() - EPSILON
            && other.y < self.bottom() - EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutKind {
    Vertical,
    Horizontal,
}

/// Full-length straight cut. `position` is the trailing edge of the segment
/// being separated; the blade removes `[position, position + kerf]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutSegment {
    pub kind: CutKind,
    pub position: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CutSegment {
    pub(crate) fn vertical(position: f64, y: f64, height: f64) -> Self {
        Self {
            kind: CutKind::Vertical,
            position,
            x: position,
            y,
            width: 0.0,
            height,
        }
    }

    pub(crate) fn horizontal(position: f64, x: f64, width: f64) -> Self {
        Self {
            kind: CutKind::Horizontal,
            position,
            x,
            y: position,
            width,
            height: 0.0,
        }
    }
}

/// Guillotine cuts of one plate, grouped by direction and in execution order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutSequence {
    pub vertical: Vec<CutSegment>,
    pub horizontal: Vec<CutSegment>,
    /// First-stage cuts followed by second-stage cuts
    pub sequence: Vec<CutSegment>,
}

/// Quality metrics of a set of plates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub plate_count: usize,
    pub total_area: f64,
    pub used_area: f64,
    pub waste_area: f64,
    /// Used area over total area, in percent
    pub utilization: f64,
    pub rotated_count: usize,
    /// Groups holding both rotated and unrotated pieces
    pub mixed_rotation_rows: usize,
    pub rotation_penalty_applied: f64,
    pub rotation_mix_penalty_applied: f64,
    /// Higher is better
    pub score: f64,
}

/// Search procedure used by [`crate::Optimizer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Ffd,
    Bfd,
    #[default]
    #[serde(alias = "simulated-annealing-horizontal")]
    SimulatedAnnealing,
}

impl FromStr for Algorithm {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ffd" => Ok(Self::Ffd),
            "bfd" => Ok(Self::Bfd),
            "simulated-annealing" | "simulated-annealing-horizontal" => {
                Ok(Self::SimulatedAnnealing)
            }
            other => Err(OptimizerError::InvalidConfiguration(format!(
                "Unknown algorithm '{}', expected ffd, bfd or simulated-annealing",
                other
            ))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ffd => "ffd",
            Self::Bfd => "bfd",
            Self::SimulatedAnnealing => "simulated-annealing",
        };
        f.write_str(name)
    }
}

/// Geometric layout used to fill a plate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackingModel {
    /// Vertical strips first, one-piece shelves inside each strip
    #[default]
    Strip,
    /// Horizontal bands spanning the plate, pieces laid left to right
    Band,
}

impl FromStr for PackingModel {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strip" => Ok(Self::Strip),
            "band" => Ok(Self::Band),
            other => Err(OptimizerError::InvalidConfiguration(format!(
                "Unknown packing model '{}', expected strip or band",
                other
            ))),
        }
    }
}

impl fmt::Display for PackingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strip => f.write_str("strip"),
            Self::Band => f.write_str("band"),
        }
    }
}

/// Ordering applied to pieces before placement, always descending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    #[default]
    AreaDesc,
    WidthDesc,
    HeightDesc,
    PerimeterDesc,
}

impl SortStrategy {
    pub const ALL: [SortStrategy; 4] = [
        SortStrategy::AreaDesc,
        SortStrategy::WidthDesc,
        SortStrategy::HeightDesc,
        SortStrategy::PerimeterDesc,
    ];
}

impl FromStr for SortStrategy {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "area-desc" => Ok(Self::AreaDesc),
            "width-desc" => Ok(Self::WidthDesc),
            "height-desc" => Ok(Self::HeightDesc),
            "perimeter-desc" => Ok(Self::PerimeterDesc),
            other => Err(OptimizerError::InvalidConfiguration(format!(
                "Unknown sort strategy '{}'",
                other
            ))),
        }
    }
}

/// Input: how the optimizer should run. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    pub algorithm: Algorithm,
    pub model: PackingModel,
    /// Annealing iteration budget
    pub iterations: usize,
    /// Width removed by the saw blade between adjacent pieces
    pub kerf: f64,
    pub trim_left: f64,
    pub trim_top: f64,
    pub trim_right: f64,
    pub trim_bottom: f64,
    pub allow_rotation: bool,
    /// Score deducted per rotated piece
    pub rotation_penalty: f64,
    /// Score deducted per group mixing rotated and unrotated pieces
    pub rotation_mix_penalty: f64,
    /// Seed for the annealing random source; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            model: PackingModel::default(),
            iterations: 100,
            kerf: 5.0,
            trim_left: 13.0,
            trim_top: 13.0,
            trim_right: 0.0,
            trim_bottom: 0.0,
            allow_rotation: true,
            rotation_penalty: 0.0,
            rotation_mix_penalty: 0.0,
            seed: None,
        }
    }
}

/// Output: plates, unplaceable pieces and the evaluation of the plate set
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub plates: Vec<crate::PlateSolution>,
    /// Pieces that do not fit even an empty plate
    pub remaining: Vec<Piece>,
    pub evaluation: Evaluation,
}

/// Error type for optimization
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
