//! Aperture resolution.
//!
//! Shapes are canonicalized into a [`ShapeKey`] and each distinct key gets one aperture. Files are generated in two
//! passes, the definition pass calls the `define_*` methods for every shape the file uses, the emission pass resolves
//! the same shapes again with the `get_*` methods.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use thiserror::Error;

mod key;
mod macros;

pub use key::*;
pub use macros::*;

use crate::spacial::fixed_to_mm;

/// Aperture codes 0-9 are reserved.
pub const FIRST_APERTURE_CODE: i32 = 10;

#[derive(Error, Debug)]
pub enum ApertureError {
    #[error("invalid {name}: {value}, sizes must be finite and greater than zero")]
    InvalidSize { name: &'static str, value: f64 },
    #[error("degenerate round rectangle {width}x{height} with radius {radius}")]
    DegenerateRoundRectangle { width: f64, height: f64, radius: f64 },
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
    #[error("aperture not defined: {0}")]
    Undefined(ShapeKey),
}

/// A macro argument, in millimetres or degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MacroArgument {
    Length(f64),
    Angle(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApertureShape {
    Circle {
        diameter: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
    },
    Obround {
        width: f64,
        height: f64,
    },
    /// Regular polygon, the first vertex at `rotation` degrees.
    Polygon {
        outer_diameter: f64,
        vertices: u8,
        rotation: f64,
    },
    Macro {
        macro_id: u32,
        name: String,
        arguments: Vec<MacroArgument>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    pub code: i32,
    pub shape: ApertureShape,
}

impl Aperture {
    fn from_key(code: i32, key: &ShapeKey, macros: &MacroTable) -> Self {
        let mm = fixed_to_mm;

        let macro_shape = |id: u32, arguments: Vec<MacroArgument>| {
            let name = macros
                .get(id)
                .map(|found| found.name().to_string())
                .unwrap_or_default();
            ApertureShape::Macro {
                macro_id: id,
                name,
                arguments,
            }
        };

        let shape = match key.geometry {
            KeyGeometry::Circle {
                diameter,
            } => ApertureShape::Circle {
                diameter: mm(diameter),
            },
            KeyGeometry::Rectangle {
                width,
                height,
            } => ApertureShape::Rectangle {
                width: mm(width),
                height: mm(height),
            },
            KeyGeometry::RotatedRectangle {
                width,
                height,
                rotation,
            } => macro_shape(ROTATED_RECTANGLE_MACRO, vec![
                MacroArgument::Length(mm(width)),
                MacroArgument::Length(mm(height)),
                MacroArgument::Angle(degrees(rotation)),
            ]),
            KeyGeometry::RoundRectangle {
                width,
                height,
                radius,
                rotation,
            } => macro_shape(ROUND_RECTANGLE_MACRO, vec![
                MacroArgument::Length(mm(width)),
                MacroArgument::Length(mm(height)),
                MacroArgument::Length(mm(radius)),
                MacroArgument::Angle(degrees(rotation)),
            ]),
            KeyGeometry::Octagon {
                size,
                rotation,
            } => ApertureShape::Polygon {
                outer_diameter: mm(size) / (std::f64::consts::PI / 8.0).cos(),
                vertices: 8,
                rotation: degrees(rotation),
            },
            KeyGeometry::Oval {
                width,
                height,
            } => ApertureShape::Obround {
                width: mm(width),
                height: mm(height),
            },
        };

        Self {
            code,
            shape,
        }
    }

    pub fn macro_id(&self) -> Option<u32> {
        match &self.shape {
            ApertureShape::Macro {
                macro_id, ..
            } => Some(*macro_id),
            _ => None,
        }
    }
}

/// A shape request, as made by the generators for each element.
#[derive(Debug, Clone, PartialEq)]
pub struct ApertureRequest {
    pub shape: Shape,
    pub rotation: f64,
    pub tag: Option<&'static str>,
}

impl ApertureRequest {
    pub fn new(shape: Shape, rotation: f64) -> Self {
        Self {
            shape,
            rotation,
            tag: None,
        }
    }

    pub fn circle(diameter: f64) -> Self {
        Self::new(
            Shape::Circle {
                diameter,
            },
            0.0,
        )
    }

    pub fn tagged(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Deduplicating aperture registry, one per generated file.
#[derive(Debug, Default)]
pub struct ApertureDictionary {
    macro_table: MacroTable,
    apertures: Vec<Arc<Aperture>>,
    index: HashMap<ShapeKey, usize>,
    macros_in_use: Vec<Arc<Macro>>,
}

impl ApertureDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the aperture for the shape, creating it if required.
    pub fn define(&mut self, shape: &Shape, rotation: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        let key = ShapeKey::new(shape, rotation, tag)?;
        if let Some(&index) = self.index.get(&key) {
            return Ok(self.apertures[index].clone());
        }

        let code = FIRST_APERTURE_CODE + self.apertures.len() as i32;
        let aperture = Arc::new(Aperture::from_key(code, &key, &self.macro_table));

        if let Some(macro_id) = aperture.macro_id() {
            let registered = self
                .macros_in_use
                .iter()
                .any(|candidate| candidate.id == macro_id);
            if !registered {
                if let Some(found) = self.macro_table.get(macro_id) {
                    self.macros_in_use.push(found.clone());
                }
            }
        }

        debug!("defined aperture D{} for {}", code, key);

        self.index
            .insert(key, self.apertures.len());
        self.apertures.push(aperture.clone());

        Ok(aperture)
    }

    /// Looks up an aperture defined earlier, it's an error if the shape was never defined.
    pub fn get(&self, shape: &Shape, rotation: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        let key = ShapeKey::new(shape, rotation, tag)?;
        match self.index.get(&key) {
            Some(&index) => Ok(self.apertures[index].clone()),
            None => Err(ApertureError::Undefined(key)),
        }
    }

    pub fn define_for(&mut self, request: &ApertureRequest) -> Result<Arc<Aperture>, ApertureError> {
        self.define(&request.shape, request.rotation, request.tag)
    }

    pub fn get_for(&self, request: &ApertureRequest) -> Result<Arc<Aperture>, ApertureError> {
        self.get(&request.shape, request.rotation, request.tag)
    }

    pub fn define_circle(&mut self, diameter: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        self.define(
            &Shape::Circle {
                diameter,
            },
            0.0,
            tag,
        )
    }

    pub fn get_circle(&self, diameter: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        self.get(
            &Shape::Circle {
                diameter,
            },
            0.0,
            tag,
        )
    }

    pub fn define_rectangle(
        &mut self,
        width: f64,
        height: f64,
        rotation: f64,
        tag: Option<&str>,
    ) -> Result<Arc<Aperture>, ApertureError> {
        self.define(
            &Shape::Rectangle {
                width,
                height,
            },
            rotation,
            tag,
        )
    }

    pub fn get_rectangle(
        &self,
        width: f64,
        height: f64,
        rotation: f64,
        tag: Option<&str>,
    ) -> Result<Arc<Aperture>, ApertureError> {
        self.get(
            &Shape::Rectangle {
                width,
                height,
            },
            rotation,
            tag,
        )
    }

    pub fn define_round_rectangle(
        &mut self,
        width: f64,
        height: f64,
        radius: f64,
        rotation: f64,
        tag: Option<&str>,
    ) -> Result<Arc<Aperture>, ApertureError> {
        self.define(
            &Shape::RoundRectangle {
                width,
                height,
                radius,
            },
            rotation,
            tag,
        )
    }

    pub fn get_round_rectangle(
        &self,
        width: f64,
        height: f64,
        radius: f64,
        rotation: f64,
        tag: Option<&str>,
    ) -> Result<Arc<Aperture>, ApertureError> {
        self.get(
            &Shape::RoundRectangle {
                width,
                height,
                radius,
            },
            rotation,
            tag,
        )
    }

    pub fn define_octagon(&mut self, size: f64, rotation: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        self.define(
            &Shape::Octagon {
                size,
            },
            rotation,
            tag,
        )
    }

    pub fn get_octagon(&self, size: f64, rotation: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        self.get(
            &Shape::Octagon {
                size,
            },
            rotation,
            tag,
        )
    }

    pub fn define_oval(
        &mut self,
        width: f64,
        height: f64,
        rotation: f64,
        tag: Option<&str>,
    ) -> Result<Arc<Aperture>, ApertureError> {
        self.define(
            &Shape::Oval {
                width,
                height,
            },
            rotation,
            tag,
        )
    }

    pub fn get_oval(&self, width: f64, height: f64, rotation: f64, tag: Option<&str>) -> Result<Arc<Aperture>, ApertureError> {
        self.get(
            &Shape::Oval {
                width,
                height,
            },
            rotation,
            tag,
        )
    }

    /// In code order.
    pub fn apertures(&self) -> &[Arc<Aperture>] {
        &self.apertures
    }

    /// The macros referenced by at least one aperture, in order of first use.
    pub fn macros(&self) -> &[Arc<Macro>] {
        &self.macros_in_use
    }

    pub fn len(&self) -> usize {
        self.apertures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apertures.is_empty()
    }
}
