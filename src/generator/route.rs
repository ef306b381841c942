use log::debug;

use super::{copper_layer_count, finish, write_definitions, write_header, FileFunction, FilePolarity, GeneratedFile, GeneratorError};
use crate::aperture::{ApertureDictionary, ApertureRequest};
use crate::board::{Board, Element, LayerFunction, LayerId};
use crate::builder::GerberBuilder;
use crate::config::GeneratorConfig;
use crate::geometry::{rectangle_outline, rotate, Transform2D};
use crate::region::region_outline;
use crate::spacial::{Position, Vector};

const ROUTE: &str = "route";

/// A tool path, in board coordinates.
#[derive(Debug, Clone, PartialEq)]
enum Path {
    Polyline { points: Vec<Position>, closed: bool },
    Arc { start: Position, center: Position, sweep: f64 },
}

fn element_path(element: &Element, transform: &Transform2D, step: f64) -> Option<Path> {
    let transformed = |points: Vec<Position>| -> Vec<Position> {
        points
            .into_iter()
            .map(|point| transform.apply_to_position(point))
            .collect()
    };

    match element {
        Element::Line(line) => Some(Path::Polyline {
            points: transformed(vec![line.start, line.end]),
            closed: false,
        }),
        Element::Arc(arc) => Some(Path::Arc {
            start: transform.apply_to_position(arc.start()),
            center: transform.apply_to_position(arc.center),
            sweep: transform.apply_to_sweep(arc.sweep),
        }),
        Element::Circle(circle) => Some(Path::Arc {
            start: transform.apply_to_position(circle.center + Vector::new(circle.radius, 0.0)),
            center: transform.apply_to_position(circle.center),
            sweep: 360.0,
        }),
        Element::Rectangle(rectangle) => Some(Path::Polyline {
            points: transformed(rectangle_outline(
                rectangle.center,
                rectangle.width,
                rectangle.height,
                rectangle.rotation,
            )),
            closed: true,
        }),
        Element::Region(region) => Some(Path::Polyline {
            points: region_outline(region, transform, step),
            closed: true,
        }),
        Element::SmdPad(_) | Element::ThroughHolePad(_) | Element::Via(_) | Element::Text(_) => {
            debug!("not routing {}", element.kind());
            None
        }
    }
}

/// Gerber route file, the board outline and milling paths drawn with the routing tool.
pub fn generate_route(board: &Board, config: &GeneratorConfig) -> Result<GeneratedFile, GeneratorError> {
    let route_layers: Vec<LayerId> = board
        .layers_with(|function| matches!(function, LayerFunction::Outline | LayerFunction::Milling))
        .map(|layer| layer.id)
        .collect();

    let paths: Vec<Path> = board
        .elements_with_parts()
        .filter(|(element, _)| {
            element
                .layer()
                .is_some_and(|layer| route_layers.contains(&layer))
        })
        .filter_map(|(element, part)| {
            let transform = part
                .map(|part| board.local_transformation(part))
                .unwrap_or_default();
            element_path(element, &transform, config.arc_step_degrees)
        })
        .collect();

    let request = ApertureRequest::circle(config.route_tool_diameter).tagged(ROUTE);
    let mut dictionary = ApertureDictionary::new();
    if !paths.is_empty() {
        dictionary.define_for(&request)?;
    }

    let function = FileFunction::Route {
        from: 1,
        to: copper_layer_count(board),
    };
    let mut builder = GerberBuilder::new(Vec::new());
    write_header(&mut builder, config, &function, FilePolarity::Positive)?;
    if config.x2_attributes && !paths.is_empty() {
        builder.aperture_attribute(".AperFunction", &["Profile"])?;
    }
    write_definitions(&mut builder, &dictionary)?;
    if config.x2_attributes && !paths.is_empty() {
        builder.delete_attributes()?;
    }

    if !paths.is_empty() {
        let tool = dictionary.get_for(&request)?;
        builder.select_aperture(&tool)?;
    }
    for path in &paths {
        match path {
            Path::Polyline {
                points,
                closed,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    continue;
                };
                builder.move_to(*first)?;
                for point in rest {
                    builder.line_to(*point)?;
                }
                if *closed && rest.last() != Some(first) {
                    builder.line_to(*first)?;
                }
            }
            Path::Arc {
                start,
                center,
                sweep,
            } => {
                let end = *center + rotate(*start - *center, *sweep);
                builder.move_to(*start)?;
                builder.arc_to(end, *center, *sweep)?;
            }
        }
    }

    let name = format!("{}-route.gbr", config.project_name);
    finish(builder, name, function, FilePolarity::Positive)
}
