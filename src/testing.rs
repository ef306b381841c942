//! Test helpers, enabled with the `testing` feature.

use crate::board::{
    Board, Connection, Element, Layer, LayerFunction, LayerId, LineElement, Part, PadShape, RegionElement,
    RegionVertex, Side, Signal, SignalId, SmdPadElement, TextElement, ThroughHolePadElement, ViaElement,
};
use crate::generator::GeneratedFile;
use crate::spacial::Position;

pub const TOP: LayerId = LayerId(1);
pub const BOTTOM: LayerId = LayerId(16);
pub const DIMENSION: LayerId = LayerId(20);
pub const SILKSCREEN_TOP: LayerId = LayerId(21);
pub const STOP_TOP: LayerId = LayerId(29);
pub const STOP_BOTTOM: LayerId = LayerId(30);
pub const CREAM_TOP: LayerId = LayerId(31);
pub const RESTRICT_TOP: LayerId = LayerId(41);
/// Not part of [`two_layer_board`], tests add it when needed.
pub const MILLING: LayerId = LayerId(46);

pub const GND: SignalId = SignalId(1);
pub const VCC: SignalId = SignalId(2);

pub fn logging_init() {
    let _ = env_logger::builder()
        .is_test(true)
        .try_init();
}

pub fn gerber_source(file: &GeneratedFile) -> String {
    let source = String::from_utf8(file.content.clone()).expect("Generated file is not UTF-8");
    println!("{}:\n{}", file.name, source);
    source
}

pub fn layer(id: LayerId, name: &str, function: LayerFunction) -> Layer {
    Layer {
        id,
        name: name.to_string(),
        function,
    }
}

pub fn two_layer_layers() -> Vec<Layer> {
    vec![
        layer(TOP, "Top", LayerFunction::Signal {
            side: Side::Top,
        }),
        layer(BOTTOM, "Bottom", LayerFunction::Signal {
            side: Side::Bottom,
        }),
        layer(DIMENSION, "Dimension", LayerFunction::Outline),
        layer(SILKSCREEN_TOP, "tPlace", LayerFunction::Silkscreen {
            side: Side::Top,
        }),
        layer(STOP_TOP, "tStop", LayerFunction::SolderMask {
            side: Side::Top,
        }),
        layer(STOP_BOTTOM, "bStop", LayerFunction::SolderMask {
            side: Side::Bottom,
        }),
        layer(CREAM_TOP, "tCream", LayerFunction::Paste {
            side: Side::Top,
        }),
        layer(RESTRICT_TOP, "tRestrict", LayerFunction::Restrict {
            target: TOP,
        }),
    ]
}

pub fn signals() -> Vec<Signal> {
    vec![
        Signal {
            id: GND,
            name: "GND".to_string(),
        },
        Signal {
            id: VCC,
            name: "VCC".to_string(),
        },
    ]
}

pub fn line(layer: LayerId, start: (f64, f64), end: (f64, f64), width: f64, signal: Option<SignalId>) -> Element {
    Element::Line(LineElement {
        layer,
        start: Position::new(start.0, start.1),
        end: Position::new(end.0, end.1),
        width,
        signal,
    })
}

/// A straight-edged region, for pours and keep-outs.
pub fn polygon_region(layer: LayerId, points: &[(f64, f64)], signal: Option<SignalId>) -> RegionElement {
    RegionElement {
        layer,
        vertices: points
            .iter()
            .map(|(x, y)| RegionVertex {
                point: Position::new(*x, *y),
                curve: 0.0,
            })
            .collect(),
        width: 0.0,
        isolate: 0.0,
        signal,
        thermals: true,
    }
}

pub fn rectangle_region(layer: LayerId, min: (f64, f64), max: (f64, f64), signal: Option<SignalId>) -> RegionElement {
    polygon_region(layer, &[min, (max.0, min.1), max, (min.0, max.1)], signal)
}

fn smd_pad(name: &str, x: f64) -> Element {
    Element::SmdPad(SmdPadElement {
        name: name.to_string(),
        layer: TOP,
        center: Position::new(x, 0.0),
        width: 1.0,
        height: 1.2,
        roundness: 0,
        rotation: 0.0,
    })
}

fn through_hole_pad(name: &str, x: f64) -> Element {
    Element::ThroughHolePad(ThroughHolePadElement {
        name: name.to_string(),
        center: Position::new(x, 0.0),
        drill: 0.8,
        diameter: 1.6,
        shape: PadShape::Round,
        rotation: 0.0,
    })
}

fn connection(part: &str, pad: &str, signal: SignalId) -> Connection {
    Connection {
        part: part.to_string(),
        pad: pad.to_string(),
        signal,
    }
}

/// A 50x30mm two layer board.
///
/// * R1, an SMD resistor at (10, 10) on the top side, pad 1 on GND, pad 2 on VCC.
/// * J1, a two pin through-hole header at (30, 15) rotated by 90 degrees, pad 1 on GND, pad 2 on VCC.
/// * a VCC trace on the top from R1.2 to J1.2.
/// * a GND via at (20, 5).
/// * a GND pour covering the bottom side.
/// * a two stroke label on the top silkscreen.
pub fn two_layer_board() -> Board {
    let outline = [(0.0, 0.0), (50.0, 0.0), (50.0, 30.0), (0.0, 30.0)];
    let mut elements: Vec<Element> = (0..outline.len())
        .map(|index| {
            line(
                DIMENSION,
                outline[index],
                outline[(index + 1) % outline.len()],
                0.1,
                None,
            )
        })
        .collect();

    elements.push(line(TOP, (11.0, 10.0), (30.0, 17.54), 0.25, Some(VCC)));
    elements.push(Element::Via(ViaElement {
        center: Position::new(20.0, 5.0),
        drill: 0.3,
        diameter: 0.6,
        shape: PadShape::Round,
        signal: Some(GND),
    }));

    let mut pour = rectangle_region(BOTTOM, (1.0, 1.0), (49.0, 29.0), Some(GND));
    pour.isolate = 0.3;
    elements.push(Element::Region(pour));

    elements.push(Element::Text(TextElement {
        layer: SILKSCREEN_TOP,
        text: "R1".to_string(),
        strokes: vec![
            (Position::new(9.0, 12.0), Position::new(9.0, 13.5)),
            (Position::new(9.0, 13.5), Position::new(10.0, 13.5)),
        ],
        width: 0.15,
    }));

    let resistor = Part {
        name: "R1".to_string(),
        value: Some("10k".to_string()),
        package: Some("R0805".to_string()),
        position: Position::new(10.0, 10.0),
        rotation: 0.0,
        mirrored: false,
        elements: vec![smd_pad("1", -1.0), smd_pad("2", 1.0)],
    };
    let header = Part {
        name: "J1".to_string(),
        value: None,
        package: Some("PINHD-1X2".to_string()),
        position: Position::new(30.0, 15.0),
        rotation: 90.0,
        mirrored: false,
        elements: vec![through_hole_pad("1", 0.0), through_hole_pad("2", 2.54)],
    };

    Board {
        layers: two_layer_layers(),
        signals: signals(),
        elements,
        parts: vec![resistor, header],
        connections: vec![
            connection("R1", "1", GND),
            connection("R1", "2", VCC),
            connection("J1", "1", GND),
            connection("J1", "2", VCC),
        ],
    }
}
