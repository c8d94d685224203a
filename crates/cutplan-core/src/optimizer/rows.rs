use crate::types::{exceeds, Piece, Placement};
use serde::Serialize;

/// A rectangular region of a plate that accepts pieces one at a time.
///
/// `try_place` either records a [`Placement`] and returns true, or leaves the
/// container untouched and returns false.
pub trait Container {
    fn try_place(&mut self, piece: &Piece) -> bool;

    /// Placements in insertion order.
    fn placements(&self) -> &[Placement];

    /// Sum of placed piece areas, not the container area.
    fn used_area(&self) -> f64 {
        self.placements().iter().map(Placement::area).sum()
    }
}

/// Row of a strip holding exactly one piece.
#[derive(Debug, Clone, Serialize)]
pub struct Shelf {
    pub x: f64,
    pub y: f64,
    pub capacity_width: f64,
    pub height: f64,
    placements: Vec<Placement>,
}

impl Shelf {
    pub fn new(x: f64, y: f64, capacity_width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            capacity_width,
            height,
            placements: Vec::new(),
        }
    }
}

impl Container for Shelf {
    fn try_place(&mut self, piece: &Piece) -> bool {
        if !self.placements.is_empty()
            || exceeds(piece.height, self.height)
            || exceeds(piece.width, self.capacity_width)
        {
            return false;
        }

        self.placements.push(Placement::at(piece, self.x, self.y));
        true
    }

    fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

/// Horizontal row laid out left to right. The first piece fixes its height.
#[derive(Debug, Clone, Serialize)]
pub struct Band {
    pub x: f64,
    pub y: f64,
    pub capacity_width: f64,
    kerf: f64,
    used_width: f64,
    height: f64,
    placements: Vec<Placement>,
}

impl Band {
    pub fn new(x: f64, y: f64, capacity_width: f64, kerf: f64) -> Self {
        Self {
            x,
            y,
            capacity_width,
            kerf,
            used_width: 0.0,
            height: 0.0,
            placements: Vec::new(),
        }
    }

    /// Height fixed by the first piece; zero while empty.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Occupied width including kerf gaps.
    pub fn used_width(&self) -> f64 {
        self.used_width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

impl Container for Band {
    fn try_place(&mut self, piece: &Piece) -> bool {
        let is_empty = self.placements.is_empty();
        if !is_empty && exceeds(piece.height, self.height) {
            return false;
        }

        let spacing = if is_empty { 0.0 } else { self.kerf };
        let next_width = self.used_width + spacing + piece.width;
        if exceeds(next_width, self.capacity_width) {
            return false;
        }

        if is_empty {
            self.height = piece.height;
        }
        let x = self.x + self.used_width + spacing;
        self.placements.push(Placement::at(piece, x, self.y));
        self.used_width = next_width;
        true
    }

    fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

/// Vertical column of a plate, subdivided into shelves.
#[derive(Debug, Clone, Serialize)]
pub struct Strip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub max_height: f64,
    kerf: f64,
    /// Height consumed by shelves and the kerf gaps between them
    used_height: f64,
    shelves: Vec<Shelf>,
    placements: Vec<Placement>,
}

impl Strip {
    pub fn new(x: f64, y: f64, width: f64, max_height: f64, kerf: f64) -> Self {
        Self {
            x,
            y,
            width,
            max_height,
            kerf,
            used_height: 0.0,
            shelves: Vec::new(),
            placements: Vec::new(),
        }
    }

    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    pub fn used_height(&self) -> f64 {
        self.used_height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.max_height
    }

    pub fn utilization(&self) -> f64 {
        let total_area = self.width * self.max_height;
        if total_area > 0.0 {
            (self.used_area() / total_area) * 100.0
        } else {
            0.0
        }
    }
}

impl Container for Strip {
    fn try_place(&mut self, piece: &Piece) -> bool {
        if exceeds(piece.width, self.width) {
            return false;
        }

        for shelf in &mut self.shelves {
            if shelf.try_place(piece) {
                if let Some(placement) = shelf.placements().last() {
                    self.placements.push(placement.clone());
                }
                return true;
            }
        }

        let offset = if self.shelves.is_empty() {
            0.0
        } else {
            self.used_height + self.kerf
        };
        if exceeds(offset + piece.height, self.max_height) {
            return false;
        }

        let mut shelf = Shelf::new(self.x, self.y + offset, self.width, piece.height);
        if !shelf.try_place(piece) {
            return false;
        }

        self.placements.extend(shelf.placements().iter().cloned());
        self.shelves.push(shelf);
        self.used_height = offset + piece.height;
        true
    }

    fn placements(&self) -> &[Placement] {
        &self.placements
    }
}
