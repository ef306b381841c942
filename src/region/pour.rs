//! Hole candidates, the areas a copper pour keeps clear of.

use super::clipping::{intersection, Area};
use crate::board::{ArcElement, CircleElement, Element, RegionElement};
use crate::geometry::{
    arc_center, arc_points, circle_outline, rotate, stroke_outline, wedge_outline, Footprint, Transform2D,
};
use crate::spacial::{Position, Vector};

/// Angular width of each thermal spoke, in degrees.
pub const THERMAL_SPOKE_GAP_DEGREES: f64 = 30.0;
const THERMAL_SPOKES: usize = 4;

/// Region outline in board coordinates, curved segments flattened.
pub(crate) fn region_outline(region: &RegionElement, transform: &Transform2D, step: f64) -> Vec<Position> {
    let count = region.vertices.len();
    let mut points = Vec::with_capacity(count);

    for (index, vertex) in region.vertices.iter().enumerate() {
        points.push(vertex.point);
        if vertex.curve == 0.0 {
            continue;
        }
        let next = region.vertices[(index + 1) % count].point;
        let Some((center, radius)) = arc_center(vertex.point, next, vertex.curve) else {
            continue;
        };
        let start = vertex.point - center;
        let arc = arc_points(
            center,
            radius,
            start.y.atan2(start.x).to_degrees(),
            vertex.curve,
            step,
        );
        // the end points are region vertices
        points.extend(
            arc.iter()
                .skip(1)
                .take(arc.len().saturating_sub(2)),
        );
    }

    points
        .into_iter()
        .map(|point| transform.apply_to_position(point))
        .collect()
}

/// The element grown by `spacing` on every side.
pub(crate) fn pour_areas(element: &Element, transform: &Transform2D, spacing: f64, step: f64) -> Vec<Area> {
    match element {
        Element::Line(line) => vec![Area::new(stroke_outline(
            transform.apply_to_position(line.start),
            transform.apply_to_position(line.end),
            line.width + 2.0 * spacing,
            step,
        ))],
        Element::Arc(arc) => arc_areas(arc, transform, arc.width / 2.0 + spacing, step),
        Element::Rectangle(rectangle) => {
            let footprint = Footprint::Rectangle {
                center: transform.apply_to_position(rectangle.center),
                width: rectangle.width,
                height: rectangle.height,
                rotation: transform.apply_to_angle(rectangle.rotation),
            };
            vec![footprint_area(&footprint, spacing, step)]
        }
        Element::Circle(circle) => vec![circle_area(circle, transform, spacing, step)],
        Element::SmdPad(pad) => vec![footprint_area(&pad.footprint(transform), spacing, step)],
        Element::ThroughHolePad(pad) => vec![footprint_area(&pad.footprint(transform), spacing, step)],
        Element::Via(via) => vec![footprint_area(&via.footprint(transform), spacing, step)],
        Element::Text(text) => text
            .strokes
            .iter()
            .map(|(start, end)| {
                Area::new(stroke_outline(
                    transform.apply_to_position(*start),
                    transform.apply_to_position(*end),
                    text.width + 2.0 * spacing,
                    step,
                ))
            })
            .collect(),
        Element::Region(region) => {
            let outline = region_outline(region, transform, step);
            if outline.len() < 3 {
                return vec![];
            }
            let width = region.width + 2.0 * spacing;
            let mut areas = Vec::with_capacity(outline.len() + 1);
            if width > 0.0 {
                for (index, start) in outline.iter().enumerate() {
                    let end = outline[(index + 1) % outline.len()];
                    areas.push(Area::new(stroke_outline(*start, end, width, step)));
                }
            }
            areas.push(Area::new(outline));
            areas
        }
    }
}

/// Pad footprint plus one lobe per spoke gap, copper flows into the pad between the lobes.
///
/// Non-pad elements have no thermal relief and fall back to [`pour_areas`].
pub(crate) fn thermal_areas(element: &Element, transform: &Transform2D, spacing: f64, step: f64) -> Vec<Area> {
    let footprint = match element {
        Element::SmdPad(pad) => pad.footprint(transform),
        Element::ThroughHolePad(pad) => pad.footprint(transform),
        Element::Line(_)
        | Element::Arc(_)
        | Element::Rectangle(_)
        | Element::Circle(_)
        | Element::Via(_)
        | Element::Text(_)
        | Element::Region(_) => return pour_areas(element, transform, spacing, step),
    };

    let relief = footprint_area(&footprint, spacing, step);
    // far enough out that the flattened wedge arc clears the relief
    let reach = 2.0 * (footprint.extent() + spacing) + 1.0;
    let lobe_sweep = 360.0 / THERMAL_SPOKES as f64 - THERMAL_SPOKE_GAP_DEGREES;

    let mut areas = vec![Area::new(footprint.outline(step))];
    for spoke in 0..THERMAL_SPOKES {
        let start = footprint.rotation() + spoke as f64 * 360.0 / THERMAL_SPOKES as f64 + THERMAL_SPOKE_GAP_DEGREES / 2.0;
        let wedge = Area::new(wedge_outline(footprint.center(), reach, start, lobe_sweep, step));
        areas.extend(intersection(&relief, &wedge));
    }
    areas
}

fn footprint_area(footprint: &Footprint, spacing: f64, step: f64) -> Area {
    Area::new(
        footprint
            .inflate(spacing)
            .outline(step),
    )
}

fn annulus(center: Position, outer: f64, inner: f64, step: f64) -> Area {
    let area = Area::new(circle_outline(center, outer, step));
    match inner > 0.0 {
        true => area.with_hole(circle_outline(center, inner, step)),
        false => area,
    }
}

fn circle_area(circle: &CircleElement, transform: &Transform2D, spacing: f64, step: f64) -> Area {
    let center = transform.apply_to_position(circle.center);
    if circle.width <= 0.0 {
        return Area::new(circle_outline(center, circle.radius + spacing, step));
    }
    let half_width = circle.width / 2.0 + spacing;
    annulus(center, circle.radius + half_width, circle.radius - half_width, step)
}

/// The band swept by the arc plus a round cap at each end.
fn arc_areas(arc: &ArcElement, transform: &Transform2D, half_width: f64, step: f64) -> Vec<Area> {
    let center = transform.apply_to_position(arc.center);
    let start = transform.apply_to_angle(arc.start_angle);
    let sweep = transform.apply_to_sweep(arc.sweep);
    let outer = arc.radius + half_width;
    let inner = arc.radius - half_width;

    if sweep.abs() >= 360.0 {
        return vec![annulus(center, outer, inner, step)];
    }

    let mut band = arc_points(center, outer, start, sweep, step);
    match inner > 0.0 {
        true => band.extend(arc_points(center, inner, start + sweep, -sweep, step)),
        false => band.push(center),
    }

    let cap = |angle: f64| {
        Area::new(circle_outline(
            center + rotate(Vector::new(arc.radius, 0.0), angle),
            half_width,
            step,
        ))
    };

    vec![Area::new(band), cap(start), cap(start + sweep)]
}

#[cfg(test)]
mod pour_tests {
    use std::f64::consts::PI;

    use rstest::rstest;

    use super::*;
    use crate::board::{LayerId, LineElement, PadShape, RegionVertex, SmdPadElement, ThroughHolePadElement};
    use crate::region::clipping::union;

    const STEP: f64 = 2.0;

    fn total_area(areas: &[Area]) -> f64 {
        areas
            .iter()
            .map(Area::area)
            .sum()
    }

    fn round_pad(diameter: f64) -> Element {
        Element::ThroughHolePad(ThroughHolePadElement {
            name: "1".to_string(),
            center: Position::new(0.0, 0.0),
            drill: diameter / 2.0,
            diameter,
            shape: PadShape::Round,
            rotation: 0.0,
        })
    }

    #[test]
    fn test_line_pour_is_a_capsule() {
        // given
        let line = Element::Line(LineElement {
            layer: LayerId(1),
            start: Position::new(0.0, 0.0),
            end: Position::new(10.0, 0.0),
            width: 0.2,
            signal: None,
        });

        // when
        let areas = pour_areas(&line, &Transform2D::default(), 0.4, STEP);

        // then
        // 10 x 1.0 body plus a 1.0 diameter disc
        assert_eq!(areas.len(), 1);
        let expected = 10.0 + PI * 0.25;
        assert!((areas[0].area() - expected).abs() < 0.01);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.5, 0.3)]
    fn test_circle_pour(#[case] width: f64, #[case] spacing: f64) {
        // given
        let circle = Element::Circle(CircleElement {
            layer: LayerId(1),
            center: Position::new(0.0, 0.0),
            radius: 2.0,
            width,
            signal: None,
        });

        // when
        let areas = pour_areas(&circle, &Transform2D::default(), spacing, STEP);

        // then
        assert_eq!(areas.len(), 1);
        let expected_holes = if width > 0.0 { 1 } else { 0 };
        assert_eq!(areas[0].holes.len(), expected_holes);
    }

    #[test]
    fn test_pad_pour_follows_part_transform() {
        // given
        let pad = Element::SmdPad(SmdPadElement {
            name: "1".to_string(),
            layer: LayerId(1),
            center: Position::new(1.0, 0.0),
            width: 1.0,
            height: 1.0,
            roundness: 0,
            rotation: 0.0,
        });
        let transform = Transform2D::new(Vector::new(10.0, 10.0), 90.0, Default::default());

        // when
        let areas = pour_areas(&pad, &transform, 0.0, STEP);

        // then
        let center = areas[0]
            .bounding_box()
            .center();
        assert!((center.x - 10.0).abs() < 1e-9);
        assert!((center.y - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_thermal_is_smaller_than_isolation() {
        // given
        let pad = round_pad(2.0);
        let transform = Transform2D::default();

        // when
        let thermal = union(&thermal_areas(&pad, &transform, 0.2, STEP));
        let isolation = pour_areas(&pad, &transform, 0.2, STEP);

        // then
        let thermal_area = total_area(&thermal);
        let isolation_area = total_area(&isolation);
        assert_eq!(thermal.len(), 1);
        assert!(thermal_area > PI);
        assert!(thermal_area < isolation_area * 0.95);
    }

    #[test]
    fn test_thermal_has_one_lobe_per_spoke_gap() {
        // when
        let areas = thermal_areas(&round_pad(2.0), &Transform2D::default(), 0.2, STEP);

        // then
        // the pad itself plus four lobes
        assert_eq!(areas.len(), 1 + THERMAL_SPOKES);
    }

    #[test]
    fn test_thermal_spokes_are_left_clear() {
        // given
        let spoke = Position::new(1.1, 0.0);
        let lobe = Position::new(1.1 * 45f64.to_radians().cos(), 1.1 * 45f64.to_radians().sin());

        // when
        let areas = thermal_areas(&round_pad(2.0), &Transform2D::default(), 0.2, STEP);

        // then
        let covers = |point: Position| {
            areas
                .iter()
                .any(|area| crate::geometry::contains_point(&area.exterior, point))
        };
        assert!(!covers(spoke));
        assert!(covers(lobe));
    }

    #[test]
    fn test_thermal_for_non_pad_falls_back_to_pour() {
        // given
        let line = Element::Line(LineElement {
            layer: LayerId(1),
            start: Position::new(0.0, 0.0),
            end: Position::new(1.0, 0.0),
            width: 0.2,
            signal: None,
        });

        // expect
        assert_eq!(
            thermal_areas(&line, &Transform2D::default(), 0.1, STEP),
            pour_areas(&line, &Transform2D::default(), 0.1, STEP)
        );
    }

    #[test]
    fn test_region_outline_flattens_curves() {
        // given
        // a half disc, the curved segment sweeps back from (-1, 0) to (1, 0) through (0, -1)
        let region = RegionElement {
            layer: LayerId(1),
            vertices: vec![
                RegionVertex {
                    point: Position::new(1.0, 0.0),
                    curve: 0.0,
                },
                RegionVertex {
                    point: Position::new(-1.0, 0.0),
                    curve: 180.0,
                },
            ],
            width: 0.0,
            isolate: 0.0,
            signal: None,
            thermals: true,
        };

        // when
        let outline = region_outline(&region, &Transform2D::default(), 10.0);

        // then
        assert_eq!(outline.len(), 2 + 17);
        assert!(outline
            .iter()
            .all(|point| point.y <= 1e-9));
        assert!(outline
            .iter()
            .any(|point| (point.y + 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_clockwise_arc_pour() {
        // given
        let arc = Element::Arc(ArcElement {
            layer: LayerId(1),
            center: Position::new(0.0, 0.0),
            radius: 5.0,
            start_angle: 90.0,
            sweep: -90.0,
            width: 0.5,
            signal: None,
        });

        // when
        let areas = pour_areas(&arc, &Transform2D::default(), 0.25, STEP);

        // then
        // quarter annulus 4.5..5.5 plus two end caps
        assert_eq!(areas.len(), 3);
        let band = areas[0].area();
        let expected = PI * (5.5 * 5.5 - 4.5 * 4.5) / 4.0;
        assert!((band - expected).abs() < 0.05);
    }
}
