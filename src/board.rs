//! A minimal in-memory board model.
//!
//! Layers, signals, board-level elements and parts. Part elements are stored in part-local coordinates, their layers
//! are absolute (a mirrored part already refers to the bottom layers).

use thiserror::Error;

use crate::geometry::{arc_points, rectangle_outline, rotate, BoundingBox, Footprint, Mirroring, Transform2D};
use crate::spacial::{Position, Vector};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Top,
    Bottom,
    /// 1-based index of the inner copper layer
    Inner(u32),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerFunction {
    Signal { side: Side },
    /// Keep-out area for the copper layer `target`.
    Restrict { target: LayerId },
    Outline,
    Milling,
    SolderMask { side: Side },
    Paste { side: Side },
    Silkscreen { side: Side },
    Documentation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub function: LayerFunction,
}

impl Layer {
    pub fn is_copper(&self) -> bool {
        matches!(self.function, LayerFunction::Signal { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub id: SignalId,
    pub name: String,
}

/// Through-hole pad and via shapes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PadShape {
    Round,
    Square,
    Octagon,
    /// Oval, twice as long as wide.
    Long,
    /// Like `Long` but extending to one side of the drill only.
    Offset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineElement {
    pub layer: LayerId,
    pub start: Position,
    pub end: Position,
    pub width: f64,
    pub signal: Option<SignalId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcElement {
    pub layer: LayerId,
    pub center: Position,
    pub radius: f64,
    /// degrees
    pub start_angle: f64,
    /// degrees, positive = counter-clockwise
    pub sweep: f64,
    pub width: f64,
    pub signal: Option<SignalId>,
}

impl ArcElement {
    pub fn start(&self) -> Position {
        let angle = self.start_angle.to_radians();
        self.center + Vector::new(angle.cos(), angle.sin()) * self.radius
    }

    pub fn end(&self) -> Position {
        let angle = (self.start_angle + self.sweep).to_radians();
        self.center + Vector::new(angle.cos(), angle.sin()) * self.radius
    }
}

/// A filled rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleElement {
    pub layer: LayerId,
    pub center: Position,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleElement {
    pub layer: LayerId,
    pub center: Position,
    pub radius: f64,
    /// 0 = filled disc
    pub width: f64,
    pub signal: Option<SignalId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmdPadElement {
    pub name: String,
    pub layer: LayerId,
    pub center: Position,
    pub width: f64,
    pub height: f64,
    /// 0..=100 percent of the shorter side
    pub roundness: u8,
    pub rotation: f64,
}

impl SmdPadElement {
    /// The pad's copper footprint, in board coordinates.
    pub fn footprint(&self, transform: &Transform2D) -> Footprint {
        let Self {
            center,
            width,
            height,
            roundness,
            rotation,
            ..
        } = self;

        let center = transform.apply_to_position(*center);
        let rotation = transform.apply_to_angle(*rotation);
        let (width, height) = (*width, *height);

        match (*roundness).min(100) {
            0 => Footprint::Rectangle {
                center,
                width,
                height,
                rotation,
            },
            100 if width == height => Footprint::Circle {
                center,
                diameter: width,
            },
            100 => Footprint::Oval {
                center,
                width,
                height,
                rotation,
            },
            percent => Footprint::RoundRectangle {
                center,
                width,
                height,
                radius: percent as f64 / 100.0 * width.min(height) / 2.0,
                rotation,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThroughHolePadElement {
    pub name: String,
    pub center: Position,
    pub drill: f64,
    pub diameter: f64,
    pub shape: PadShape,
    pub rotation: f64,
}

impl ThroughHolePadElement {
    pub fn footprint(&self, transform: &Transform2D) -> Footprint {
        pad_shape_footprint(self.shape, self.center, self.diameter, self.rotation, transform)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViaElement {
    pub center: Position,
    pub drill: f64,
    pub diameter: f64,
    pub shape: PadShape,
    pub signal: Option<SignalId>,
}

impl ViaElement {
    pub fn footprint(&self, transform: &Transform2D) -> Footprint {
        pad_shape_footprint(self.shape, self.center, self.diameter, 0.0, transform)
    }
}

fn pad_shape_footprint(
    shape: PadShape,
    center: Position,
    diameter: f64,
    local_rotation: f64,
    transform: &Transform2D,
) -> Footprint {
    let rotation = transform.apply_to_angle(local_rotation);
    let board_center = transform.apply_to_position(center);

    match shape {
        PadShape::Round => Footprint::Circle {
            center: board_center,
            diameter,
        },
        PadShape::Square => Footprint::Rectangle {
            center: board_center,
            width: diameter,
            height: diameter,
            rotation,
        },
        PadShape::Octagon => Footprint::Octagon {
            center: board_center,
            size: diameter,
            rotation,
        },
        PadShape::Long => Footprint::Oval {
            center: board_center,
            width: diameter * 2.0,
            height: diameter,
            rotation,
        },
        PadShape::Offset => {
            // shifted in part-local space, so mirrored parts extend to the other side
            let shift = rotate(Vector::new(diameter / 2.0, 0.0), local_rotation);
            Footprint::Oval {
                center: transform.apply_to_position(center + shift),
                width: diameter * 2.0,
                height: diameter,
                rotation,
            }
        }
    }
}

/// Vector text, already converted to strokes by the font renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub layer: LayerId,
    pub text: String,
    pub strokes: Vec<(Position, Position)>,
    pub width: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionVertex {
    pub point: Position,
    /// Sweep, in degrees, of the segment from this vertex to the next one, 0 = straight.
    pub curve: f64,
}

impl From<Position> for RegionVertex {
    fn from(point: Position) -> Self {
        Self {
            point,
            curve: 0.0,
        }
    }
}

/// A copper pour when on a signal layer, a plain filled area elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionElement {
    pub layer: LayerId,
    pub vertices: Vec<RegionVertex>,
    /// outline stroke thickness
    pub width: f64,
    /// isolation clearance, the larger of this and the design clearance applies
    pub isolate: f64,
    pub signal: Option<SignalId>,
    /// connect same-signal pads with thermal reliefs instead of pouring solid around them
    pub thermals: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Line(LineElement),
    Arc(ArcElement),
    Rectangle(RectangleElement),
    Circle(CircleElement),
    SmdPad(SmdPadElement),
    ThroughHolePad(ThroughHolePadElement),
    Via(ViaElement),
    Text(TextElement),
    Region(RegionElement),
}

impl Element {
    /// `None` for elements on every copper layer.
    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Element::Line(line) => Some(line.layer),
            Element::Arc(arc) => Some(arc.layer),
            Element::Rectangle(rectangle) => Some(rectangle.layer),
            Element::Circle(circle) => Some(circle.layer),
            Element::SmdPad(pad) => Some(pad.layer),
            Element::Text(text) => Some(text.layer),
            Element::Region(region) => Some(region.layer),
            Element::ThroughHolePad(_) | Element::Via(_) => None,
        }
    }

    pub fn is_pad(&self) -> bool {
        matches!(self, Element::SmdPad(_) | Element::ThroughHolePad(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Line(_) => "line",
            Element::Arc(_) => "arc",
            Element::Rectangle(_) => "rectangle",
            Element::Circle(_) => "circle",
            Element::SmdPad(_) => "smd pad",
            Element::ThroughHolePad(_) => "through-hole pad",
            Element::Via(_) => "via",
            Element::Text(_) => "text",
            Element::Region(_) => "region",
        }
    }

    /// A reference point, used for diagnostics.
    pub fn anchor(&self) -> Position {
        match self {
            Element::Line(line) => line.start,
            Element::Arc(arc) => arc.center,
            Element::Rectangle(rectangle) => rectangle.center,
            Element::Circle(circle) => circle.center,
            Element::SmdPad(pad) => pad.center,
            Element::ThroughHolePad(pad) => pad.center,
            Element::Via(via) => via.center,
            Element::Text(text) => text
                .strokes
                .first()
                .map(|(start, _)| *start)
                .unwrap_or(Position::origin()),
            Element::Region(region) => region
                .vertices
                .first()
                .map(|vertex| vertex.point)
                .unwrap_or(Position::origin()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub value: Option<String>,
    pub package: Option<String>,
    pub position: Position,
    /// degrees, counter-clockwise
    pub rotation: f64,
    /// placed on the bottom side
    pub mirrored: bool,
    pub elements: Vec<Element>,
}

/// Pad `pad` of part `part` is connected to `signal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub part: String,
    pub pad: String,
    pub signal: SignalId,
}

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("{kind} at ({x:.4}, {y:.4}) is not connected to a signal")]
    MissingSignal { kind: &'static str, x: f64, y: f64 },
    #[error("unknown layer {0:?}")]
    UnknownLayer(LayerId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub layers: Vec<Layer>,
    pub signals: Vec<Signal>,
    pub elements: Vec<Element>,
    pub parts: Vec<Part>,
    pub connections: Vec<Connection>,
}

impl Board {
    pub fn layer(&self, id: LayerId) -> Result<&Layer, BoardError> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .ok_or(BoardError::UnknownLayer(id))
    }

    pub fn is_copper(&self, id: LayerId) -> bool {
        self.layer(id)
            .map(Layer::is_copper)
            .unwrap_or(false)
    }

    pub fn layers_with<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Layer> + 'a
    where
        P: Fn(&LayerFunction) -> bool + 'a,
    {
        self.layers
            .iter()
            .filter(move |layer| predicate(&layer.function))
    }

    pub fn copper_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers_with(|function| matches!(function, LayerFunction::Signal { .. }))
    }

    /// Keep-out layers that apply to the copper layer `layer`.
    pub fn restrict_layers_for(&self, layer: LayerId) -> Vec<LayerId> {
        self.layers_with(move |function| matches!(function, LayerFunction::Restrict { target } if *target == layer))
            .map(|layer| layer.id)
            .collect()
    }

    /// Through-hole pads and vias are on every copper layer.
    pub fn is_on_layer(&self, element: &Element, layer: LayerId) -> bool {
        match element.layer() {
            Some(element_layer) => element_layer == layer,
            None => self.is_copper(layer),
        }
    }

    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals
            .iter()
            .find(|signal| signal.id == id)
    }

    /// Returns the signal the element is connected to, if any.
    ///
    /// Pads only have a signal through the board's connection list, which needs the part the pad belongs to.
    pub fn signal_of(&self, element: &Element, part: Option<&Part>) -> Option<&Signal> {
        let id = match element {
            Element::Line(line) => line.signal,
            Element::Arc(arc) => arc.signal,
            Element::Circle(circle) => circle.signal,
            Element::Via(via) => via.signal,
            Element::Region(region) => region.signal,
            Element::SmdPad(SmdPadElement {
                name, ..
            })
            | Element::ThroughHolePad(ThroughHolePadElement {
                name, ..
            }) => part.and_then(|part| {
                self.connections
                    .iter()
                    .find(|connection| connection.part == part.name && connection.pad == *name)
                    .map(|connection| connection.signal)
            }),
            Element::Rectangle(_) | Element::Text(_) => None,
        }?;
        self.signal(id)
    }

    pub fn require_signal(&self, element: &Element, part: Option<&Part>) -> Result<&Signal, BoardError> {
        self.signal_of(element, part)
            .ok_or_else(|| {
                let anchor = part
                    .map(|part| self.local_transformation(part))
                    .unwrap_or_default()
                    .apply_to_position(element.anchor());
                BoardError::MissingSignal {
                    kind: element.kind(),
                    x: anchor.x,
                    y: anchor.y,
                }
            })
    }

    pub fn local_transformation(&self, part: &Part) -> Transform2D {
        let mirroring = match part.mirrored {
            true => Mirroring::BOTTOM_SIDE,
            false => Mirroring::default(),
        };
        Transform2D::new(part.position.coords, part.rotation, mirroring)
    }

    /// Every element, board-level elements first, then each part's elements along with their part.
    pub fn elements_with_parts(&self) -> impl Iterator<Item = (&Element, Option<&Part>)> {
        self.elements
            .iter()
            .map(|element| (element, None))
            .chain(self.parts.iter().flat_map(|part| {
                part.elements
                    .iter()
                    .map(move |element| (element, Some(part)))
            }))
    }

    /// Extent of the board, from the elements on the outline layers.
    pub fn outline_bounding_box(&self) -> BoundingBox {
        let outline_layers: Vec<LayerId> = self
            .layers_with(|function| matches!(function, LayerFunction::Outline))
            .map(|layer| layer.id)
            .collect();

        let mut bbox = BoundingBox::default();
        for (element, part) in self.elements_with_parts() {
            let Some(layer) = element.layer() else {
                continue;
            };
            if !outline_layers.contains(&layer) {
                continue;
            }
            let transform = part
                .map(|part| self.local_transformation(part))
                .unwrap_or_default();
            match element {
                Element::Line(line) => {
                    bbox.include(transform.apply_to_position(line.start));
                    bbox.include(transform.apply_to_position(line.end));
                }
                Element::Arc(arc) => {
                    let points = arc_points(arc.center, arc.radius, arc.start_angle, arc.sweep, 5.0);
                    for point in points {
                        bbox.include(transform.apply_to_position(point));
                    }
                }
                Element::Rectangle(rectangle) => {
                    let outline = rectangle_outline(
                        rectangle.center,
                        rectangle.width,
                        rectangle.height,
                        rectangle.rotation,
                    );
                    for point in outline {
                        bbox.include(transform.apply_to_position(point));
                    }
                }
                Element::Circle(circle) => {
                    let radius = circle.radius + circle.width / 2.0;
                    let center = transform.apply_to_position(circle.center);
                    bbox.include(center - Vector::new(radius, radius));
                    bbox.include(center + Vector::new(radius, radius));
                }
                Element::Region(region) => {
                    for vertex in &region.vertices {
                        bbox.include(transform.apply_to_position(vertex.point));
                    }
                }
                Element::SmdPad(_) | Element::ThroughHolePad(_) | Element::Via(_) | Element::Text(_) => {}
            }
        }
        bbox
    }
}
