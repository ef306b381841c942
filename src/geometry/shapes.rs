use std::f64::consts::PI;

use crate::spacial::{Position, Vector};

/// Full circles are never flattened into fewer segments than this.
const MIN_CIRCLE_SEGMENTS: usize = 8;

/// Rotates counter-clockwise.
pub fn rotate(vector: Vector, degrees: f64) -> Vector {
    if degrees == 0.0 {
        return vector;
    }
    let (sin_theta, cos_theta) = degrees.to_radians().sin_cos();
    Vector::new(
        vector.x * cos_theta - vector.y * sin_theta,
        vector.x * sin_theta + vector.y * cos_theta,
    )
}

fn segments_for_sweep(sweep_degrees: f64, step_degrees: f64) -> usize {
    let step = if step_degrees > 0.0 { step_degrees } else { 5.0 };
    ((sweep_degrees.abs() / step).ceil() as usize).max(1)
}

/// Flattens an arc into points, both end points included.
///
/// Angles in degrees, a positive sweep is counter-clockwise.
pub fn arc_points(center: Position, radius: f64, start_degrees: f64, sweep_degrees: f64, step_degrees: f64) -> Vec<Position> {
    let segments = segments_for_sweep(sweep_degrees, step_degrees);
    let angle_step = sweep_degrees / segments as f64;

    (0..=segments)
        .map(|i| {
            let angle = (start_degrees + angle_step * i as f64).to_radians();
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Finds the center and radius of the arc from `start` to `end` that sweeps `sweep_degrees`.
///
/// Returns `None` for coincident end points or a sweep that is (nearly) zero or a full turn.
pub fn arc_center(start: Position, end: Position, sweep_degrees: f64) -> Option<(Position, f64)> {
    let chord = end - start;
    let chord_length = chord.norm();
    let half_sweep = (sweep_degrees / 2.0).to_radians();
    if chord_length < 1e-9 || half_sweep.tan().abs() < 1e-9 || sweep_degrees.abs() >= 360.0 {
        return None;
    }

    let direction = chord / chord_length;
    let left = Vector::new(-direction.y, direction.x);
    let distance = (chord_length / 2.0) / half_sweep.tan();
    let center = start + chord / 2.0 + left * distance;

    Some((center, (start - center).norm()))
}

/// Counter-clockwise contour, without a closing vertex.
pub fn circle_outline(center: Position, radius: f64, step_degrees: f64) -> Vec<Position> {
    let segments = segments_for_sweep(360.0, step_degrees).max(MIN_CIRCLE_SEGMENTS);
    let angle_step = 2.0 * PI / segments as f64;

    (0..segments)
        .map(|i| {
            let angle = angle_step * i as f64;
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

pub fn rectangle_outline(center: Position, width: f64, height: f64, rotation_degrees: f64) -> Vec<Position> {
    let half_width = width / 2.0;
    let half_height = height / 2.0;
    [
        Vector::new(-half_width, -half_height),
        Vector::new(half_width, -half_height),
        Vector::new(half_width, half_height),
        Vector::new(-half_width, half_height),
    ]
    .into_iter()
    .map(|corner| center + rotate(corner, rotation_degrees))
    .collect()
}

pub fn rounded_rectangle_outline(
    center: Position,
    width: f64,
    height: f64,
    radius: f64,
    rotation_degrees: f64,
    step_degrees: f64,
) -> Vec<Position> {
    let radius = radius.min(width / 2.0).min(height / 2.0);
    if radius <= 0.0 {
        return rectangle_outline(center, width, height, rotation_degrees);
    }

    let inner_x = width / 2.0 - radius;
    let inner_y = height / 2.0 - radius;
    // corner centers, counter-clockwise starting bottom-right, with the start angle of each corner arc
    let corners = [
        (Vector::new(inner_x, -inner_y), -90.0),
        (Vector::new(inner_x, inner_y), 0.0),
        (Vector::new(-inner_x, inner_y), 90.0),
        (Vector::new(-inner_x, -inner_y), 180.0),
    ];

    let mut points = Vec::new();
    for (corner, start) in corners {
        let arc = arc_points(Position::from(corner), radius, start, 90.0, step_degrees);
        points.extend(
            arc.into_iter()
                .map(|point| center + rotate(point.coords, rotation_degrees)),
        );
    }
    points
}

/// Regular octagon with its flats on the axes at zero rotation, `size` is the distance across flats.
pub fn octagon_outline(center: Position, size: f64, rotation_degrees: f64) -> Vec<Position> {
    let outer_radius = size / 2.0 / (PI / 8.0).cos();
    (0..8)
        .map(|i| {
            let angle = 22.5 + 45.0 * i as f64 + rotation_degrees;
            center + rotate(Vector::new(outer_radius, 0.0), angle)
        })
        .collect()
}

/// Obround, i.e. a rectangle with fully rounded short ends.
pub fn oval_outline(center: Position, width: f64, height: f64, rotation_degrees: f64, step_degrees: f64) -> Vec<Position> {
    let (length, thickness, axis_degrees) = if width >= height {
        (width - height, height, rotation_degrees)
    } else {
        (height - width, width, rotation_degrees + 90.0)
    };

    let half = rotate(Vector::new(length / 2.0, 0.0), axis_degrees);
    stroke_outline(center - half, center + half, thickness, step_degrees)
}

/// Outline of a line drawn with a round tool, a capsule. Degenerates to a circle for zero length lines.
pub fn stroke_outline(start: Position, end: Position, width: f64, step_degrees: f64) -> Vec<Position> {
    let radius = width / 2.0;
    let direction = end - start;
    if direction.norm() < 1e-9 {
        return circle_outline(start, radius, step_degrees);
    }

    let angle = direction.y.atan2(direction.x).to_degrees();
    let mut points = arc_points(end, radius, angle - 90.0, 180.0, step_degrees);
    points.extend(arc_points(start, radius, angle + 90.0, 180.0, step_degrees));
    points
}

/// Annular sector between `start_degrees` and `start_degrees + sweep_degrees`, from the center out to `radius`.
pub fn wedge_outline(center: Position, radius: f64, start_degrees: f64, sweep_degrees: f64, step_degrees: f64) -> Vec<Position> {
    let mut points = vec![center];
    points.extend(arc_points(center, radius, start_degrees, sweep_degrees, step_degrees));
    points
}

/// Signed area, positive for counter-clockwise contours.
pub fn polygon_area(points: &[Position]) -> f64 {
    let mut sum = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum / 2.0
}

/// Even-odd point in polygon test.
pub fn contains_point(points: &[Position], point: Position) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y) && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A pad or via footprint, in board coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Circle {
        center: Position,
        diameter: f64,
    },
    Rectangle {
        center: Position,
        width: f64,
        height: f64,
        rotation: f64,
    },
    RoundRectangle {
        center: Position,
        width: f64,
        height: f64,
        radius: f64,
        rotation: f64,
    },
    Octagon {
        center: Position,
        /// distance across flats
        size: f64,
        rotation: f64,
    },
    Oval {
        center: Position,
        width: f64,
        height: f64,
        rotation: f64,
    },
}

impl Footprint {
    pub fn center(&self) -> Position {
        match self {
            Footprint::Circle {
                center, ..
            }
            | Footprint::Rectangle {
                center, ..
            }
            | Footprint::RoundRectangle {
                center, ..
            }
            | Footprint::Octagon {
                center, ..
            }
            | Footprint::Oval {
                center, ..
            } => *center,
        }
    }

    /// Degrees, always 0 for circles.
    pub fn rotation(&self) -> f64 {
        match self {
            Footprint::Circle {
                ..
            } => 0.0,
            Footprint::Rectangle {
                rotation, ..
            }
            | Footprint::RoundRectangle {
                rotation, ..
            }
            | Footprint::Octagon {
                rotation, ..
            }
            | Footprint::Oval {
                rotation, ..
            } => *rotation,
        }
    }

    /// Radius of the smallest circle around the center that contains the footprint.
    pub fn extent(&self) -> f64 {
        match self {
            Footprint::Circle {
                diameter, ..
            } => diameter / 2.0,
            Footprint::Rectangle {
                width,
                height,
                ..
            }
            | Footprint::RoundRectangle {
                width,
                height,
                ..
            } => width.hypot(*height) / 2.0,
            Footprint::Octagon {
                size, ..
            } => size / 2.0 / (PI / 8.0).cos(),
            Footprint::Oval {
                width,
                height,
                ..
            } => width.max(*height) / 2.0,
        }
    }

    pub fn outline(&self, step_degrees: f64) -> Vec<Position> {
        match *self {
            Footprint::Circle {
                center,
                diameter,
            } => circle_outline(center, diameter / 2.0, step_degrees),
            Footprint::Rectangle {
                center,
                width,
                height,
                rotation,
            } => rectangle_outline(center, width, height, rotation),
            Footprint::RoundRectangle {
                center,
                width,
                height,
                radius,
                rotation,
            } => rounded_rectangle_outline(center, width, height, radius, rotation, step_degrees),
            Footprint::Octagon {
                center,
                size,
                rotation,
            } => octagon_outline(center, size, rotation),
            Footprint::Oval {
                center,
                width,
                height,
                rotation,
            } => oval_outline(center, width, height, rotation, step_degrees),
        }
    }

    /// Grows the footprint by `margin` on every side, corners of rectangles become rounded.
    pub fn inflate(&self, margin: f64) -> Footprint {
        if margin <= 0.0 {
            return self.clone();
        }
        match *self {
            Footprint::Circle {
                center,
                diameter,
            } => Footprint::Circle {
                center,
                diameter: diameter + 2.0 * margin,
            },
            Footprint::Rectangle {
                center,
                width,
                height,
                rotation,
            } => Footprint::RoundRectangle {
                center,
                width: width + 2.0 * margin,
                height: height + 2.0 * margin,
                radius: margin,
                rotation,
            },
            Footprint::RoundRectangle {
                center,
                width,
                height,
                radius,
                rotation,
            } => Footprint::RoundRectangle {
                center,
                width: width + 2.0 * margin,
                height: height + 2.0 * margin,
                radius: radius + margin,
                rotation,
            },
            Footprint::Octagon {
                center,
                size,
                rotation,
            } => Footprint::Octagon {
                center,
                size: size + 2.0 * margin,
                rotation,
            },
            Footprint::Oval {
                center,
                width,
                height,
                rotation,
            } => Footprint::Oval {
                center,
                width: width + 2.0 * margin,
                height: height + 2.0 * margin,
                rotation,
            },
        }
    }
}
