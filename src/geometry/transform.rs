use crate::geometry::Mirroring;
use crate::spacial::{Position, Vector};

/// Places part-local geometry onto the board.
///
/// Order of application: mirroring (around the part origin), rotation (counter-clockwise), then translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub rotation_degrees: f64,
    pub mirroring: Mirroring,
    /// offset, in board coordinates
    pub offset: Vector,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        rotation_degrees: 0.0,
        mirroring: Mirroring {
            x: false,
            y: false,
        },
        offset: Vector::new(0.0, 0.0),
    };

    pub fn new(offset: Vector, rotation_degrees: f64, mirroring: Mirroring) -> Self {
        Self {
            rotation_degrees,
            mirroring,
            offset,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.eq(&Self::IDENTITY)
    }

    /// Apply the transform to a part-local `Position`
    pub fn apply_to_position(&self, pos: Position) -> Position {
        let [mirror_x, mirror_y] = self.mirroring.as_f64();
        let x = pos.x * mirror_x;
        let y = pos.y * mirror_y;

        let (sin_theta, cos_theta) = self
            .rotation_degrees
            .to_radians()
            .sin_cos();
        let rotated_x = x * cos_theta - y * sin_theta;
        let rotated_y = x * sin_theta + y * cos_theta;

        Position::new(rotated_x + self.offset.x, rotated_y + self.offset.y)
    }

    /// Apply the transform to a direction or shape orientation, in degrees.
    pub fn apply_to_angle(&self, degrees: f64) -> f64 {
        let mirrored = match (self.mirroring.x, self.mirroring.y) {
            (false, false) => degrees,
            (true, false) => 180.0 - degrees,
            (false, true) => -degrees,
            (true, true) => 180.0 + degrees,
        };
        mirrored + self.rotation_degrees
    }

    /// Arcs change direction when the transform is a reflection.
    pub fn apply_to_sweep(&self, sweep_degrees: f64) -> f64 {
        match self.mirroring.is_reflection() {
            true => -sweep_degrees,
            false => sweep_degrees,
        }
    }
}
