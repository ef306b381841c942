use std::fmt::{Display, Formatter};

use super::ApertureError;
use crate::spacial::{fixed_to_mm, mm_to_fixed};

/// A requested aperture shape, sizes in millimetres.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    Circle { diameter: f64 },
    Rectangle { width: f64, height: f64 },
    RoundRectangle { width: f64, height: f64, radius: f64 },
    /// Regular octagon, `size` is the distance across flats.
    Octagon { size: f64 },
    Oval { width: f64, height: f64 },
}

impl Shape {
    /// Grows the shape by `margin` on every side, keeping its kind.
    pub fn grow(&self, margin: f64) -> Shape {
        match *self {
            Shape::Circle {
                diameter,
            } => Shape::Circle {
                diameter: diameter + 2.0 * margin,
            },
            Shape::Rectangle {
                width,
                height,
            } => Shape::Rectangle {
                width: width + 2.0 * margin,
                height: height + 2.0 * margin,
            },
            Shape::RoundRectangle {
                width,
                height,
                radius,
            } => Shape::RoundRectangle {
                width: width + 2.0 * margin,
                height: height + 2.0 * margin,
                radius: (radius + margin).max(0.0),
            },
            Shape::Octagon {
                size,
            } => Shape::Octagon {
                size: size + 2.0 * margin,
            },
            Shape::Oval {
                width,
                height,
            } => Shape::Oval {
                width: width + 2.0 * margin,
                height: height + 2.0 * margin,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ApertureError> {
        fn positive(name: &'static str, value: f64) -> Result<(), ApertureError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ApertureError::InvalidSize {
                    name,
                    value,
                })
            }
        }

        match *self {
            Shape::Circle {
                diameter,
            } => positive("diameter", diameter),
            Shape::Rectangle {
                width,
                height,
            }
            | Shape::Oval {
                width,
                height,
            } => {
                positive("width", width)?;
                positive("height", height)
            }
            Shape::RoundRectangle {
                width,
                height,
                radius,
            } => {
                positive("width", width)?;
                positive("height", height)?;
                positive("radius", radius)?;
                if width - 2.0 * radius > 0.0 && height - 2.0 * radius > 0.0 {
                    Ok(())
                } else {
                    Err(ApertureError::DegenerateRoundRectangle {
                        width,
                        height,
                        radius,
                    })
                }
            }
            Shape::Octagon {
                size,
            } => positive("size", size),
        }
    }
}

/// Lengths in nanometres, angles in millidegrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyGeometry {
    Circle { diameter: i64 },
    Rectangle { width: i64, height: i64 },
    /// rotation normalized to (0, 90) degrees
    RotatedRectangle { width: i64, height: i64, rotation: i64 },
    /// rotation normalized to [0, 90) degrees
    RoundRectangle { width: i64, height: i64, radius: i64, rotation: i64 },
    /// rotation includes the construction offset, normalized to [0, 45) degrees
    Octagon { size: i64, rotation: i64 },
    Oval { width: i64, height: i64 },
}

/// Identity of an aperture, equal keys share one aperture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeKey {
    pub geometry: KeyGeometry,
    pub tag: Option<String>,
}

const FULL_TURN: i64 = 360_000;
const HALF_TURN: i64 = 180_000;
const QUARTER_TURN: i64 = 90_000;

/// Rotates octagon vertices off the axes so their flats land on them.
pub const OCTAGON_CONSTRUCTION_OFFSET: i64 = 22_500;
const OCTAGON_SYMMETRY: i64 = 45_000;

pub fn millidegrees(degrees: f64) -> i64 {
    ((degrees * 1000.0).round() as i64).rem_euclid(FULL_TURN)
}

pub fn degrees(millidegrees: i64) -> f64 {
    millidegrees as f64 / 1000.0
}

/// Folds a rectangle's rotation into [0, 90) degrees, a further quarter turn swaps its sides.
fn quarter_turn_normalized(width: f64, height: f64, rotation: i64) -> (f64, f64, i64) {
    match rotation % HALF_TURN {
        rotation if rotation >= QUARTER_TURN => (height, width, rotation - QUARTER_TURN),
        rotation => (width, height, rotation),
    }
}

impl ShapeKey {
    pub fn new(shape: &Shape, rotation: f64, tag: Option<&str>) -> Result<Self, ApertureError> {
        shape.validate()?;
        if !rotation.is_finite() {
            return Err(ApertureError::InvalidSize {
                name: "rotation",
                value: rotation,
            });
        }

        let rotation = millidegrees(rotation);
        let nm = mm_to_fixed;

        let geometry = match *shape {
            Shape::Circle {
                diameter,
            } => KeyGeometry::Circle {
                diameter: nm(diameter),
            },
            Shape::Rectangle {
                width,
                height,
            } => match quarter_turn_normalized(width, height, rotation) {
                (width, height, 0) => KeyGeometry::Rectangle {
                    width: nm(width),
                    height: nm(height),
                },
                (width, height, rotation) => KeyGeometry::RotatedRectangle {
                    width: nm(width),
                    height: nm(height),
                    rotation,
                },
            },
            Shape::RoundRectangle {
                width,
                height,
                radius,
            } => {
                let (width, height, rotation) = quarter_turn_normalized(width, height, rotation);
                KeyGeometry::RoundRectangle {
                    width: nm(width),
                    height: nm(height),
                    radius: nm(radius),
                    rotation,
                }
            }
            Shape::Octagon {
                size,
            } => KeyGeometry::Octagon {
                size: nm(size),
                rotation: (rotation + OCTAGON_CONSTRUCTION_OFFSET) % OCTAGON_SYMMETRY,
            },
            Shape::Oval {
                width,
                height,
            } => match rotation % HALF_TURN {
                0 => KeyGeometry::Oval {
                    width: nm(width),
                    height: nm(height),
                },
                QUARTER_TURN => KeyGeometry::Oval {
                    width: nm(height),
                    height: nm(width),
                },
                _ => {
                    return Err(ApertureError::UnsupportedGeometry(format!(
                        "oval {}x{} at {} degrees, only multiples of 90 degrees are supported",
                        width,
                        height,
                        degrees(rotation)
                    )))
                }
            },
        };

        Ok(Self {
            geometry,
            tag: tag.map(str::to_string),
        })
    }
}

impl Display for ShapeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mm = fixed_to_mm;
        match self.geometry {
            KeyGeometry::Circle {
                diameter,
            } => write!(f, "circle {}", mm(diameter))?,
            KeyGeometry::Rectangle {
                width,
                height,
            } => write!(f, "rectangle {}x{}", mm(width), mm(height))?,
            KeyGeometry::RotatedRectangle {
                width,
                height,
                rotation,
            } => write!(f, "rectangle {}x{} at {}", mm(width), mm(height), degrees(rotation))?,
            KeyGeometry::RoundRectangle {
                width,
                height,
                radius,
                rotation,
            } => write!(
                f,
                "round rectangle {}x{} r{} at {}",
                mm(width),
                mm(height),
                mm(radius),
                degrees(rotation)
            )?,
            KeyGeometry::Octagon {
                size,
                rotation,
            } => write!(f, "octagon {} at {}", mm(size), degrees(rotation))?,
            KeyGeometry::Oval {
                width,
                height,
            } => write!(f, "oval {}x{}", mm(width), mm(height))?,
        }
        if let Some(tag) = &self.tag {
            write!(f, " ({})", tag)?;
        }
        Ok(())
    }
}
