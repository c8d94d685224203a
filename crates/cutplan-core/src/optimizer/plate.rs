use super::rows::{Band, Container, Strip};
use crate::types::*;
use serde::Serialize;

/// First-stage segments of a plate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "model", content = "rows")]
pub enum Rows {
    Strips(Vec<Strip>),
    Bands(Vec<Band>),
}

/// Packing of one physical plate.
#[derive(Debug, Clone, Serialize)]
pub struct PlateSolution {
    pub plate_width: f64,
    pub plate_height: f64,
    pub trim_left: f64,
    pub trim_top: f64,
    pub trim_right: f64,
    pub trim_bottom: f64,
    pub kerf: f64,
    rows: Rows,
    /// Offset of the next row from the usable origin, along the first-stage axis
    cursor: f64,
    /// Placements in the order they were made
    placed_pieces: Vec<Placement>,
}

impl PlateSolution {
    pub fn new(model: PackingModel, plate: &PlateSpec, options: &OptimizeOptions) -> Self {
        let rows = match model {
            PackingModel::Strip => Rows::Strips(Vec::new()),
            PackingModel::Band => Rows::Bands(Vec::new()),
        };

        Self {
            plate_width: plate.width,
            plate_height: plate.height,
            trim_left: options.trim_left,
            trim_top: options.trim_top,
            trim_right: options.trim_right,
            trim_bottom: options.trim_bottom,
            kerf: options.kerf,
            rows,
            cursor: 0.0,
            placed_pieces: Vec::new(),
        }
    }

    pub fn model(&self) -> PackingModel {
        match self.rows {
            Rows::Strips(_) => PackingModel::Strip,
            Rows::Bands(_) => PackingModel::Band,
        }
    }

    pub fn rows(&self) -> &Rows {
        &self.rows
    }

    pub fn usable_width(&self) -> f64 {
        (self.plate_width - self.trim_left - self.trim_right).max(0.0)
    }

    pub fn usable_height(&self) -> f64 {
        (self.plate_height - self.trim_top - self.trim_bottom).max(0.0)
    }

    /// Usable rectangle as `(x, y, width, height)`.
    pub fn usable_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.trim_left,
            self.trim_top,
            self.usable_width(),
            self.usable_height(),
        )
    }

    pub fn usable_area(&self) -> f64 {
        self.usable_width() * self.usable_height()
    }

    pub fn total_area(&self) -> f64 {
        self.plate_width * self.plate_height
    }

    pub fn used_area(&self) -> f64 {
        match &self.rows {
            Rows::Strips(strips) => strips.iter().map(Container::used_area).sum(),
            Rows::Bands(bands) => bands.iter().map(Container::used_area).sum(),
        }
    }

    pub fn utilization(&self) -> f64 {
        let total_area = self.total_area();
        if total_area > 0.0 {
            (self.used_area() / total_area) * 100.0
        } else {
            0.0
        }
    }

    /// Placements in the order they were made.
    pub fn placed_pieces(&self) -> &[Placement] {
        &self.placed_pieces
    }

    /// Placements grouped row by row, for report generation.
    pub fn placed_pieces_with_coords(&self) -> Vec<Placement> {
        match &self.rows {
            Rows::Strips(strips) => strips
                .iter()
                .flat_map(|s| s.placements().iter().cloned())
                .collect(),
            Rows::Bands(bands) => bands
                .iter()
                .flat_map(|b| b.placements().iter().cloned())
                .collect(),
        }
    }

    /// Places the piece as given, first-fit among existing rows, opening a new
    /// row when none accepts it. Returns false without changes when the piece
    /// does not fit.
    pub fn try_place(&mut self, piece: &Piece) -> bool {
        let (usable_width, usable_height) = (self.usable_width(), self.usable_height());
        if usable_width <= EPSILON || usable_height <= EPSILON {
            return false;
        }

        let placement = match &mut self.rows {
            Rows::Strips(strips) => Self::place_in_strips(
                strips,
                &mut self.cursor,
                piece,
                (self.trim_left, self.trim_top),
                usable_width,
                usable_height,
                self.kerf,
            ),
            Rows::Bands(bands) => Self::place_in_bands(
                bands,
                &mut self.cursor,
                piece,
                (self.trim_left, self.trim_top),
                usable_width,
                usable_height,
                self.kerf,
            ),
        };

        match placement {
            Some(placement) => {
                self.placed_pieces.push(placement);
                true
            }
            None => false,
        }
    }

    fn place_in_strips(
        strips: &mut Vec<Strip>,
        cursor: &mut f64,
        piece: &Piece,
        origin: (f64, f64),
        usable_width: f64,
        usable_height: f64,
        kerf: f64,
    ) -> Option<Placement> {
        if let Some(placement) = first_fit(strips, piece) {
            return Some(placement);
        }

        let offset = if strips.is_empty() { 0.0 } else { *cursor + kerf };
        if exceeds(offset + piece.width, usable_width) {
            return None;
        }

        let mut strip = Strip::new(
            origin.0 + offset,
            origin.1,
            piece.width,
            usable_height,
            kerf,
        );
        if !strip.try_place(piece) {
            return None;
        }

        let placement = strip.placements().last().cloned();
        *cursor = offset + piece.width;
        strips.push(strip);
        placement
    }

    fn place_in_bands(
        bands: &mut Vec<Band>,
        cursor: &mut f64,
        piece: &Piece,
        origin: (f64, f64),
        usable_width: f64,
        usable_height: f64,
        kerf: f64,
    ) -> Option<Placement> {
        if let Some(placement) = first_fit(bands, piece) {
            return Some(placement);
        }

        let offset = if bands.is_empty() { 0.0 } else { *cursor + kerf };
        if exceeds(offset + piece.height, usable_height) {
            return None;
        }

        let mut band = Band::new(origin.0, origin.1 + offset, usable_width, kerf);
        if !band.try_place(piece) {
            return None;
        }

        let placement = band.placements().last().cloned();
        *cursor = offset + band.height();
        bands.push(band);
        placement
    }

    /// Two-stage guillotine cut sequence.
    ///
    /// Strip layouts cut vertically between strips first, then horizontally
    /// under each shelf that does not reach the bottom of its strip. Band
    /// layouts cut horizontally under each band first, then vertically after
    /// each piece that does not reach the right edge of the usable area.
    /// Cuts that would fall on the usable boundary are omitted.
    pub fn cut_sequence(&self) -> CutSequence {
        let (x0, y0, width, height) = self.usable_rect();
        let right = x0 + width;
        let bottom = y0 + height;

        let mut vertical: Vec<CutSegment> = Vec::new();
        let mut horizontal: Vec<CutSegment> = Vec::new();

        match &self.rows {
            Rows::Strips(strips) => {
                for strip in strips {
                    let edge = strip.right();
                    if edge > x0 + EPSILON
                        && edge < right - EPSILON
                        && !vertical.iter().any(|c| approx_eq(c.position, edge))
                    {
                        vertical.push(CutSegment::vertical(edge, y0, height));
                    }

                    for shelf in strip.shelves() {
                        let shelf_bottom = shelf.y + shelf.height;
                        if shelf_bottom < strip.bottom() - EPSILON {
                            horizontal.push(CutSegment::horizontal(
                                shelf_bottom,
                                strip.x,
                                strip.width,
                            ));
                        }
                    }
                }

                let sequence = vertical.iter().chain(&horizontal).copied().collect();
                CutSequence {
                    vertical,
                    horizontal,
                    sequence,
                }
            }
            Rows::Bands(bands) => {
                for band in bands {
                    let edge = band.bottom();
                    if edge > y0 + EPSILON
                        && edge < bottom - EPSILON
                        && !horizontal.iter().any(|c| approx_eq(c.position, edge))
                    {
                        horizontal.push(CutSegment::horizontal(edge, x0, width));
                    }

                    let mut pieces: Vec<&Placement> = band.placements().iter().collect();
                    pieces.sort_by(|a, b| a.x.total_cmp(&b.x));
                    for placement in pieces {
                        let piece_right = placement.right();
                        if piece_right < right - EPSILON {
                            vertical.push(CutSegment::vertical(
                                piece_right,
                                band.y,
                                band.height(),
                            ));
                        }
                    }
                }

                let sequence = horizontal.iter().chain(&vertical).copied().collect();
                CutSequence {
                    vertical,
                    horizontal,
                    sequence,
                }
            }
        }
    }
}

/// Offers the piece to each container in order, returning the placement made
/// by the first one that accepts it.
fn first_fit<C: Container>(containers: &mut [C], piece: &Piece) -> Option<Placement> {
    for container in containers.iter_mut() {
        if container.try_place(piece) {
            return container.placements().last().cloned();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(kerf: f64) -> OptimizeOptions {
        OptimizeOptions {
            kerf,
            trim_left: 10.0,
            trim_top: 10.0,
            ..OptimizeOptions::default()
        }
    }

    #[test]
    fn test_strips_open_left_to_right_with_kerf() {
        let mut plate = PlateSolution::new(
            PackingModel::Strip,
            &PlateSpec::new(1000.0, 500.0),
            &options(5.0),
        );

        assert!(plate.try_place(&Piece::new("a", 300.0, 400.0)));
        assert!(plate.try_place(&Piece::new("b", 200.0, 450.0)));

        let placed = plate.placed_pieces();
        assert_eq!((placed[0].x, placed[0].y), (10.0, 10.0));
        assert_eq!((placed[1].x, placed[1].y), (315.0, 10.0));
    }

    #[test]
    fn test_strip_stacks_narrower_piece_below() {
        let mut plate = PlateSolution::new(
            PackingModel::Strip,
            &PlateSpec::new(1000.0, 500.0),
            &options(5.0),
        );

        assert!(plate.try_place(&Piece::new("a", 300.0, 200.0)));
        assert!(plate.try_place(&Piece::new("b", 250.0, 100.0)));

        let placed = plate.placed_pieces();
        assert_eq!(placed[1].x, 10.0);
        assert_eq!(placed[1].y, 215.0);
        match plate.rows() {
            Rows::Strips(strips) => assert_eq!(strips.len(), 1),
            Rows::Bands(_) => panic!("expected strips"),
        }
    }

    #[test]
    fn test_band_rejects_taller_piece_and_opens_new_band() {
        let mut plate = PlateSolution::new(
            PackingModel::Band,
            &PlateSpec::new(1000.0, 500.0),
            &options(5.0),
        );

        assert!(plate.try_place(&Piece::new("a", 300.0, 100.0)));
        assert!(plate.try_place(&Piece::new("b", 300.0, 80.0)));
        assert!(plate.try_place(&Piece::new("c", 300.0, 150.0)));

        let placed = plate.placed_pieces();
        assert_eq!((placed[1].x, placed[1].y), (315.0, 10.0));
        assert_eq!((placed[2].x, placed[2].y), (10.0, 115.0));
    }

    #[test]
    fn test_rejects_piece_larger_than_usable_area() {
        let mut plate = PlateSolution::new(
            PackingModel::Strip,
            &PlateSpec::new(100.0, 100.0),
            &options(0.0),
        );

        assert!(!plate.try_place(&Piece::new("big", 95.0, 50.0)));
        assert!(plate.placed_pieces().is_empty());
        assert_eq!(plate.used_area(), 0.0);
    }

    #[test]
    fn test_exact_fit_within_tolerance() {
        let mut plate = PlateSolution::new(
            PackingModel::Band,
            &PlateSpec::new(110.0, 110.0),
            &options(0.0),
        );

        assert!(plate.try_place(&Piece::new("full", 100.00005, 100.0)));
        assert!(plate.cut_sequence().sequence.is_empty());
    }

    #[test]
    fn test_strip_cut_sequence_orders_vertical_first() {
        let mut plate = PlateSolution::new(
            PackingModel::Strip,
            &PlateSpec::new(1000.0, 500.0),
            &options(5.0),
        );
        plate.try_place(&Piece::new("a", 300.0, 200.0));
        plate.try_place(&Piece::new("b", 300.0, 200.0));
        plate.try_place(&Piece::new("c", 400.0, 100.0));

        let cuts = plate.cut_sequence();
        let positions: Vec<f64> = cuts.vertical.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![310.0, 715.0]);
        assert_eq!(cuts.horizontal.len(), 3);
        assert_eq!(cuts.horizontal[0].position, 210.0);
        assert_eq!(cuts.sequence.len(), 5);
        assert!(cuts.sequence[..2]
            .iter()
            .all(|c| c.kind == CutKind::Vertical));
    }

    #[test]
    fn test_band_cut_sequence_orders_horizontal_first() {
        let mut plate = PlateSolution::new(
            PackingModel::Band,
            &PlateSpec::new(1000.0, 500.0),
            &options(5.0),
        );
        plate.try_place(&Piece::new("a", 300.0, 100.0));
        plate.try_place(&Piece::new("b", 300.0, 100.0));

        let cuts = plate.cut_sequence();
        assert_eq!(cuts.horizontal.len(), 1);
        assert_eq!(cuts.horizontal[0].position, 110.0);
        let positions: Vec<f64> = cuts.vertical.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![310.0, 615.0]);
        assert_eq!(cuts.sequence[0].kind, CutKind::Horizontal);
    }
}
