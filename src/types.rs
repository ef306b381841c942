use gerber_types::Polarity;

use crate::spacial::FixedPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Winding {
    /// Aka 'Negative' in Geometry
    Clockwise,
    /// Aka 'Positive' in Geometry
    CounterClockwise,
}

impl Winding {
    pub(crate) fn from_vertices(vertices: &[FixedPoint]) -> Self {
        // i128, the products of two nanometre coordinates overflow i64 for boards larger than ~3m.
        let mut sum: i128 = 0;
        for i in 0..vertices.len() {
            let j = (i + 1) % vertices.len();
            sum += vertices[i].x as i128 * vertices[j].y as i128 - vertices[j].x as i128 * vertices[i].y as i128;
        }
        if sum > 0 {
            Winding::CounterClockwise
        } else {
            Winding::Clockwise
        }
    }

    /// Reverses the vertices in-place, if required, so they have the requested winding.
    pub(crate) fn apply(self, vertices: &mut [FixedPoint]) {
        if Winding::from_vertices(vertices) != self {
            vertices.reverse();
        }
    }
}

/// Nesting level of a region contour, 1 = outermost fill.
///
/// Odd levels add copper, even levels remove it again.
pub(crate) fn polarity_for_level(level: usize) -> Polarity {
    match level % 2 {
        1 => Polarity::Dark,
        _ => Polarity::Clear,
    }
}

pub(crate) fn winding_for_level(level: usize) -> Winding {
    match level % 2 {
        1 => Winding::CounterClockwise,
        _ => Winding::Clockwise,
    }
}
