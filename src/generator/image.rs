use gerber_types::Polarity;
use log::{debug, trace};

use super::{copper_layer_number, copper_side, finish, write_definitions, write_header, FileFunction, FilePolarity};
use super::{GeneratedFile, GeneratorError};
use crate::aperture::{ApertureDictionary, ApertureError, ApertureRequest, Shape};
use crate::board::{Board, Element, LayerFunction, LayerId, Part, RegionElement, Side};
use crate::builder::GerberBuilder;
use crate::config::GeneratorConfig;
use crate::geometry::{rectangle_outline, rotate, Footprint, Transform2D};
use crate::region::RegionSynthesizer;
use crate::spacial::{Position, Vector};

/// The image to generate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageKind {
    /// Everything on a single layer.
    Layer(LayerId),
    /// Mask openings for pads and vias, plus anything drawn on the solder mask layers of that side.
    SolderMask(Side),
    /// SMD pads, plus anything drawn on the paste layers of that side.
    Paste(Side),
}

/// Geometry an element adds to an image.
#[derive(Debug, Clone, PartialEq)]
enum Primitive {
    Flash {
        request: ApertureRequest,
        position: Position,
    },
    Draw {
        request: ApertureRequest,
        path: Vec<Position>,
    },
    Arc {
        request: ApertureRequest,
        start: Position,
        center: Position,
        sweep: f64,
    },
    Fill {
        contour: Vec<Position>,
    },
}

impl Primitive {
    fn request(&self) -> Option<&ApertureRequest> {
        match self {
            Primitive::Flash {
                request, ..
            }
            | Primitive::Draw {
                request, ..
            }
            | Primitive::Arc {
                request, ..
            } => Some(request),
            Primitive::Fill {
                ..
            } => None,
        }
    }
}

struct Item<'a> {
    element: &'a Element,
    part: Option<&'a Part>,
    primitives: Vec<Primitive>,
}

/// Everything that goes into one image, pours are synthesized separately.
#[derive(Default)]
struct Plan<'a> {
    pours: Vec<(&'a RegionElement, Option<&'a Part>)>,
    items: Vec<Item<'a>>,
}

pub(crate) fn footprint_request(footprint: &Footprint) -> ApertureRequest {
    match *footprint {
        Footprint::Circle {
            diameter, ..
        } => ApertureRequest::circle(diameter),
        Footprint::Rectangle {
            width,
            height,
            rotation,
            ..
        } => ApertureRequest::new(
            Shape::Rectangle {
                width,
                height,
            },
            rotation,
        ),
        Footprint::RoundRectangle {
            width,
            height,
            radius,
            rotation,
            ..
        } => ApertureRequest::new(
            Shape::RoundRectangle {
                width,
                height,
                radius,
            },
            rotation,
        ),
        Footprint::Octagon {
            size,
            rotation,
            ..
        } => ApertureRequest::new(
            Shape::Octagon {
                size,
            },
            rotation,
        ),
        Footprint::Oval {
            width,
            height,
            rotation,
            ..
        } => ApertureRequest::new(
            Shape::Oval {
                width,
                height,
            },
            rotation,
        ),
    }
}

fn grown(request: ApertureRequest, margin: f64) -> ApertureRequest {
    ApertureRequest {
        shape: request.shape.grow(margin),
        ..request
    }
}

fn flash(footprint: Footprint) -> Primitive {
    Primitive::Flash {
        request: footprint_request(&footprint),
        position: footprint.center(),
    }
}

/// How an element is drawn on a layer image.
fn element_primitives(element: &Element, transform: &Transform2D) -> Vec<Primitive> {
    let stroke = |width: f64, start: Position, end: Position| Primitive::Draw {
        request: ApertureRequest::circle(width),
        path: vec![transform.apply_to_position(start), transform.apply_to_position(end)],
    };

    match element {
        Element::Line(line) if line.width > 0.0 => vec![stroke(line.width, line.start, line.end)],
        Element::Arc(arc) if arc.width > 0.0 => vec![Primitive::Arc {
            request: ApertureRequest::circle(arc.width),
            start: transform.apply_to_position(arc.start()),
            center: transform.apply_to_position(arc.center),
            sweep: transform.apply_to_sweep(arc.sweep),
        }],
        Element::Line(_) | Element::Arc(_) => {
            debug!("skipping zero width {}", element.kind());
            vec![]
        }
        Element::Rectangle(rectangle) => vec![Primitive::Fill {
            contour: rectangle_outline(
                rectangle.center,
                rectangle.width,
                rectangle.height,
                rectangle.rotation,
            )
            .into_iter()
            .map(|point| transform.apply_to_position(point))
            .collect(),
        }],
        Element::Circle(circle) if circle.width > 0.0 => vec![Primitive::Arc {
            request: ApertureRequest::circle(circle.width),
            start: transform.apply_to_position(circle.center + Vector::new(circle.radius, 0.0)),
            center: transform.apply_to_position(circle.center),
            sweep: 360.0,
        }],
        Element::Circle(circle) => vec![Primitive::Flash {
            request: ApertureRequest::circle(circle.radius * 2.0),
            position: transform.apply_to_position(circle.center),
        }],
        Element::SmdPad(pad) => vec![flash(pad.footprint(transform))],
        Element::ThroughHolePad(pad) => vec![flash(pad.footprint(transform))],
        Element::Via(via) => vec![flash(via.footprint(transform))],
        Element::Text(text) if text.width > 0.0 => text
            .strokes
            .iter()
            .map(|(start, end)| stroke(text.width, *start, *end))
            .collect(),
        Element::Text(_) => vec![],
        // pours are synthesized
        Element::Region(_) => vec![],
    }
}

/// Pad and via openings in the solder mask.
fn mask_primitives(
    element: &Element,
    transform: &Transform2D,
    copper_layer: Option<LayerId>,
    config: &GeneratorConfig,
) -> Vec<Primitive> {
    let footprint = match element {
        Element::SmdPad(pad) if Some(pad.layer) == copper_layer => pad.footprint(transform),
        Element::ThroughHolePad(pad) => pad.footprint(transform),
        Element::Via(via) if !config.tent_vias => via.footprint(transform),
        _ => return vec![],
    };
    vec![Primitive::Flash {
        request: grown(footprint_request(&footprint), config.mask_expansion),
        position: footprint.center(),
    }]
}

fn paste_primitives(element: &Element, transform: &Transform2D, copper_layer: Option<LayerId>) -> Vec<Primitive> {
    match element {
        Element::SmdPad(pad) if Some(pad.layer) == copper_layer => vec![flash(pad.footprint(transform))],
        _ => vec![],
    }
}

fn layers_for_side(board: &Board, side: Side, matcher: fn(&LayerFunction, Side) -> bool) -> Vec<LayerId> {
    board
        .layers_with(move |function| matcher(function, side))
        .map(|layer| layer.id)
        .collect()
}

fn copper_layer_for_side(board: &Board, side: Side) -> Option<LayerId> {
    board
        .copper_layers()
        .find(|layer| copper_side(&layer.function) == Some(side))
        .map(|layer| layer.id)
}

fn plan<'a>(board: &'a Board, kind: ImageKind, config: &GeneratorConfig) -> Plan<'a> {
    // layers drawn as they are, plus the copper layer the pads come from
    let (drawn_layers, copper_layer) = match kind {
        ImageKind::Layer(layer) => (vec![layer], None),
        ImageKind::SolderMask(side) => (
            layers_for_side(
                board,
                side,
                |function, side| matches!(function, LayerFunction::SolderMask { side: candidate } if *candidate == side),
            ),
            copper_layer_for_side(board, side),
        ),
        ImageKind::Paste(side) => (
            layers_for_side(
                board,
                side,
                |function, side| matches!(function, LayerFunction::Paste { side: candidate } if *candidate == side),
            ),
            copper_layer_for_side(board, side),
        ),
    };

    let mut plan = Plan::default();
    for (element, part) in board.elements_with_parts() {
        let transform = part
            .map(|part| board.local_transformation(part))
            .unwrap_or_default();

        let drawn = drawn_layers
            .iter()
            .any(|layer| board.is_on_layer(element, *layer));

        let primitives = if drawn {
            if let Element::Region(region) = element {
                plan.pours.push((region, part));
                continue;
            }
            element_primitives(element, &transform)
        } else {
            match kind {
                ImageKind::Layer(_) => continue,
                ImageKind::SolderMask(_) => mask_primitives(element, &transform, copper_layer, config),
                ImageKind::Paste(_) => paste_primitives(element, &transform, copper_layer),
            }
        };

        if !primitives.is_empty() {
            plan.items.push(Item {
                element,
                part,
                primitives,
            });
        }
    }
    plan
}

fn side_name(side: Side) -> String {
    match side {
        Side::Top => "top".to_string(),
        Side::Bottom => "bottom".to_string(),
        Side::Inner(index) => format!("inner{}", index),
    }
}

fn describe(
    board: &Board,
    kind: ImageKind,
    config: &GeneratorConfig,
) -> Result<(String, FileFunction, FilePolarity), GeneratorError> {
    let project = &config.project_name;
    let described = match kind {
        ImageKind::Layer(id) => {
            let layer = board.layer(id)?;
            let function = match layer.function {
                LayerFunction::Signal {
                    side,
                } => FileFunction::Copper {
                    number: copper_layer_number(board, side),
                    side,
                },
                LayerFunction::SolderMask {
                    side,
                } => FileFunction::SolderMask(side),
                LayerFunction::Paste {
                    side,
                } => FileFunction::Paste(side),
                LayerFunction::Silkscreen {
                    side,
                } => FileFunction::Legend(side),
                LayerFunction::Outline => FileFunction::Profile,
                LayerFunction::Milling
                | LayerFunction::Restrict {
                    ..
                }
                | LayerFunction::Documentation => FileFunction::Other(layer.name.clone()),
            };
            let name = format!("{}-{}.gbr", project, layer.name.to_lowercase().replace(' ', "_"));
            (name, function, FilePolarity::Positive)
        }
        ImageKind::SolderMask(side) => (
            format!("{}-soldermask_{}.gbr", project, side_name(side)),
            FileFunction::SolderMask(side),
            FilePolarity::Negative,
        ),
        ImageKind::Paste(side) => (
            format!("{}-paste_{}.gbr", project, side_name(side)),
            FileFunction::Paste(side),
            FilePolarity::Positive,
        ),
    };
    Ok(described)
}

/// X2 object attributes for a copper element, returns true if any were written.
fn write_object_attributes(
    builder: &mut GerberBuilder<Vec<u8>>,
    board: &Board,
    item: &Item,
) -> Result<bool, GeneratorError> {
    let Item {
        element,
        part,
        ..
    } = item;

    let mut written = false;
    if let (Element::SmdPad(_) | Element::ThroughHolePad(_), Some(part)) = (element, part) {
        let pad_name = match element {
            Element::SmdPad(pad) => pad.name.as_str(),
            Element::ThroughHolePad(pad) => pad.name.as_str(),
            _ => "",
        };
        builder.object_attribute(".P", &[&part.name, pad_name])?;
        written = true;
    }

    let signal = match element {
        Element::Via(_) => Some(board.require_signal(element, *part)?),
        _ => board.signal_of(element, *part),
    };
    if let Some(signal) = signal {
        builder.object_attribute(".N", &[&signal.name])?;
        written = true;
    }
    Ok(written)
}

fn emit_primitive(
    builder: &mut GerberBuilder<Vec<u8>>,
    dictionary: &ApertureDictionary,
    primitive: &Primitive,
) -> Result<(), GeneratorError> {
    match primitive {
        Primitive::Flash {
            request,
            position,
        } => {
            builder.select_aperture(&*dictionary.get_for(request)?)?;
            builder.flash_at(*position)?;
        }
        Primitive::Draw {
            request,
            path,
        } => {
            let Some((first, rest)) = path.split_first() else {
                return Ok(());
            };
            builder.select_aperture(&*dictionary.get_for(request)?)?;
            builder.move_to(*first)?;
            for position in rest {
                builder.line_to(*position)?;
            }
        }
        Primitive::Arc {
            request,
            start,
            center,
            sweep,
        } => {
            builder.select_aperture(&*dictionary.get_for(request)?)?;
            builder.move_to(*start)?;
            let end = *center + rotate(*start - *center, *sweep);
            builder.arc_to(end, *center, *sweep)?;
        }
        Primitive::Fill {
            contour,
        } => {
            builder.begin_region()?;
            builder.region(contour, true)?;
            builder.end_region()?;
        }
    }
    Ok(())
}

fn define_all(plan: &Plan, dictionary: &mut ApertureDictionary) -> Result<(), ApertureError> {
    for (region, _) in &plan.pours {
        if region.width > 0.0 {
            dictionary.define_circle(region.width, None)?;
        }
    }
    for item in &plan.items {
        for request in item
            .primitives
            .iter()
            .filter_map(Primitive::request)
        {
            dictionary.define_for(request)?;
        }
    }
    Ok(())
}

/// Generates a layer, solder mask or paste image.
///
/// Pours are emitted first, then every other element in board order.
#[profiling::function]
pub fn generate_image(board: &Board, kind: ImageKind, config: &GeneratorConfig) -> Result<GeneratedFile, GeneratorError> {
    let (name, function, polarity) = describe(board, kind, config)?;
    let plan = plan(board, kind, config);
    let copper = matches!(function, FileFunction::Copper { .. });
    let attributes = copper && config.x2_attributes;

    let mut dictionary = ApertureDictionary::new();
    define_all(&plan, &mut dictionary)?;

    let mut builder = GerberBuilder::new(Vec::new());
    write_header(&mut builder, config, &function, polarity)?;
    write_definitions(&mut builder, &dictionary)?;
    builder.set_polarity(Polarity::Dark)?;
    builder.set_rotation(0.0)?;

    let synthesizer = RegionSynthesizer::new(board, config.arc_step_degrees);
    for (region, part) in &plan.pours {
        let clearance = config
            .design_clearance
            .max(region.isolate);
        let tree = synthesizer.synthesize(region, *part, clearance);
        if tree.is_empty() {
            continue;
        }
        let stroke = match region.width > 0.0 {
            true => Some(dictionary.get_circle(region.width, None)?),
            false => None,
        };

        let signal = region
            .signal
            .and_then(|id| board.signal(id));
        if let (true, Some(signal)) = (attributes, signal) {
            builder.object_attribute(".N", &[&signal.name])?;
        }
        tree.emit(&mut builder, stroke.as_deref())?;
        builder.set_polarity(Polarity::Dark)?;
        if attributes && signal.is_some() {
            builder.delete_attributes()?;
        }
    }

    for item in &plan.items {
        let written = match attributes {
            true => write_object_attributes(&mut builder, board, item)?,
            false => false,
        };
        for primitive in &item.primitives {
            emit_primitive(&mut builder, &dictionary, primitive)?;
        }
        if written {
            builder.delete_attributes()?;
        }
    }
    trace!("image {:?}, apertures: {}, pours: {}", kind, dictionary.len(), plan.pours.len());

    finish(builder, name, function, polarity)
}

#[cfg(test)]
mod image_tests {
    use super::*;
    use crate::testing::{gerber_source, two_layer_board, BOTTOM, DIMENSION, SILKSCREEN_TOP, TOP};

    #[test]
    fn test_copper_image() {
        // given
        let board = two_layer_board();

        // when
        let file = generate_image(&board, ImageKind::Layer(TOP), &GeneratorConfig::default()).unwrap();

        // then
        let source = gerber_source(&file);
        assert_eq!(file.function, FileFunction::Copper {
            number: 1,
            side: Side::Top
        });
        assert!(source.contains("%TF.FileFunction,Copper,L1,Top*%"));
        // smd pads and through-hole pads
        assert!(source.contains("R,1X1.2*%"));
        assert!(source.contains("C,1.6*%"));
        assert!(source.contains("%TO.P,R1,1*%"));
        assert!(source.contains("%TO.N,GND*%"));
        assert!(source.contains("M02*"));
    }

    #[test]
    fn test_definitions_precede_geometry() {
        // given
        let board = two_layer_board();

        // when
        let file = generate_image(&board, ImageKind::Layer(TOP), &GeneratorConfig::default()).unwrap();

        // then
        let source = gerber_source(&file);
        let last_definition = source.rfind("%ADD").unwrap();
        let first_flash = source.find("D03*").unwrap();
        assert!(source.find("%MOMM*%").unwrap() < source.find("%FSLAX35Y35*%").unwrap());
        assert!(last_definition < first_flash);
    }

    #[test]
    fn test_pours_precede_elements() {
        // given
        let board = two_layer_board();

        // when
        let file = generate_image(&board, ImageKind::Layer(BOTTOM), &GeneratorConfig::default()).unwrap();

        // then
        let source = gerber_source(&file);
        let pour = source.find("G36*").unwrap();
        let first_flash = source.find("D03*").unwrap();
        assert!(pour < first_flash);
        // isolation around the VCC pad of J1, thermal relief for the GND pad
        assert!(source.contains("%LPC*%"));
    }

    #[test]
    fn test_mask_openings_are_grown() {
        // given
        let board = two_layer_board();
        let config = GeneratorConfig {
            mask_expansion: 0.1,
            ..GeneratorConfig::default()
        };

        // when
        let file = generate_image(&board, ImageKind::SolderMask(Side::Top), &config).unwrap();

        // then
        let source = gerber_source(&file);
        assert_eq!(file.polarity, FilePolarity::Negative);
        assert!(source.contains("R,1.2X1.4*%"));
        assert!(source.contains("C,1.8*%"));
    }

    #[test]
    fn test_tented_vias_have_no_openings() {
        // given
        let board = two_layer_board();
        let tented = GeneratorConfig {
            tent_vias: true,
            ..GeneratorConfig::default()
        };
        let open = GeneratorConfig {
            tent_vias: false,
            ..GeneratorConfig::default()
        };

        // when
        let tented = generate_image(&board, ImageKind::SolderMask(Side::Top), &tented).unwrap();
        let open = generate_image(&board, ImageKind::SolderMask(Side::Top), &open).unwrap();

        // then
        // the via is 0.6, plus 0.1 on each side
        assert!(!gerber_source(&tented).contains("C,0.8*%"));
        assert!(gerber_source(&open).contains("C,0.8*%"));
    }

    #[test]
    fn test_paste_has_smd_pads_only() {
        // given
        let board = two_layer_board();

        // when
        let file = generate_image(&board, ImageKind::Paste(Side::Top), &GeneratorConfig::default()).unwrap();

        // then
        let source = gerber_source(&file);
        assert_eq!(source.matches("D03*").count(), 2);
        assert!(!source.contains("C,1.6*%"));
    }

    #[test]
    fn test_silkscreen_strokes() {
        // given
        let board = two_layer_board();

        // when
        let file = generate_image(&board, ImageKind::Layer(SILKSCREEN_TOP), &GeneratorConfig::default()).unwrap();

        // then
        let source = gerber_source(&file);
        assert_eq!(file.function, FileFunction::Legend(Side::Top));
        assert!(source.contains("%ADD10C,0.15*%"));
        assert!(source.contains("D01*"));
        assert!(!source.contains("%TO"));
    }

    #[test]
    fn test_outline_image() {
        // given
        let board = two_layer_board();

        // when
        let file = generate_image(&board, ImageKind::Layer(DIMENSION), &GeneratorConfig::default()).unwrap();

        // then
        assert_eq!(file.function, FileFunction::Profile);
        assert_eq!(gerber_source(&file).matches("D01*").count(), 4);
    }

    #[test]
    fn test_via_without_signal_is_an_error() {
        // given
        let mut board = two_layer_board();
        for element in board.elements.iter_mut() {
            if let Element::Via(via) = element {
                via.signal = None;
            }
        }

        // when
        let result = generate_image(&board, ImageKind::Layer(TOP), &GeneratorConfig::default());

        // then
        assert!(matches!(result, Err(GeneratorError::Board(_))));
    }

    #[test]
    fn test_non_axis_oval_pad_is_an_error() {
        // given
        let mut board = two_layer_board();
        board.parts[1].rotation = 45.0;
        for element in board.parts[1].elements.iter_mut() {
            if let Element::ThroughHolePad(pad) = element {
                pad.shape = crate::board::PadShape::Long;
            }
        }

        // when
        let result = generate_image(&board, ImageKind::Layer(TOP), &GeneratorConfig::default());

        // then
        assert!(matches!(
            result,
            Err(GeneratorError::Aperture(ApertureError::UnsupportedGeometry(_)))
        ));
    }
}
