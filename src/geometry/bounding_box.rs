use crate::spacial::Position;

/// Axis-aligned extent, in board coordinates.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl Default for BoundingBox {
    /// An empty box, including any point makes it non-empty.
    fn default() -> Self {
        Self {
            min: Position::new(f64::MAX, f64::MAX),
            max: Position::new(f64::MIN, f64::MIN),
        }
    }
}

impl BoundingBox {
    /// A box around a single point, e.g. a zero-length line, is not empty.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Position {
        Position::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    pub fn include(&mut self, position: Position) {
        self.min = self.min.inf(&position);
        self.max = self.max.sup(&position);
    }

    pub fn from_points(points: &[Position]) -> Self {
        points
            .iter()
            .fold(Self::default(), |mut bbox, position| {
                bbox.include(*position);
                bbox
            })
    }

    /// Touching boxes count as intersecting, empty boxes never intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x <= other.max.x && other.min.x <= self.max.x && self.min.y <= other.max.y && other.min.y <= self.max.y
    }
}
