use csgrs::sketch::Sketch;
use csgrs::traits::CSG;

use crate::geometry::{polygon_area, BoundingBox};
use crate::spacial::Position;

/// An area in board coordinates, an exterior contour with optional holes.
///
/// Contours are open, the closing vertex is implied.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Area {
    pub exterior: Vec<Position>,
    pub holes: Vec<Vec<Position>>,
}

impl Area {
    pub fn new(exterior: Vec<Position>) -> Self {
        Self {
            exterior,
            holes: vec![],
        }
    }

    pub fn with_hole(mut self, hole: Vec<Position>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.exterior)
    }

    /// Enclosed area in mm², holes subtracted.
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .holes
            .iter()
            .map(|hole| polygon_area(hole).abs())
            .sum();
        polygon_area(&self.exterior).abs() - holes
    }

    fn to_sketch(&self) -> Sketch<()> {
        let mut sketch = contour_sketch(&self.exterior);
        for hole in &self.holes {
            sketch = sketch.difference(&contour_sketch(hole));
        }
        sketch
    }
}

fn contour_sketch(contour: &[Position]) -> Sketch<()> {
    if contour.len() < 3 {
        return Sketch::new();
    }
    let mut points: Vec<[f64; 2]> = contour
        .iter()
        .map(|point| [point.x, point.y])
        .collect();
    // counter-clockwise, clockwise arcs produce clockwise outlines
    if polygon_area(contour) < 0.0 {
        points.reverse();
    }
    Sketch::polygon(&points, None)
}

fn areas_from_sketch(sketch: &Sketch<()>) -> Vec<Area> {
    let multipolygon = sketch.to_multipolygon();
    let mut areas = Vec::with_capacity(multipolygon.0.len());
    for polygon in multipolygon.0 {
        let exterior = open_contour(
            polygon
                .exterior()
                .0
                .iter()
                .map(|coord| Position::new(coord.x, coord.y)),
        );
        if exterior.len() < 3 {
            continue;
        }
        let holes = polygon
            .interiors()
            .iter()
            .map(|interior| {
                open_contour(
                    interior
                        .0
                        .iter()
                        .map(|coord| Position::new(coord.x, coord.y)),
                )
            })
            .filter(|hole| hole.len() >= 3)
            .collect();
        areas.push(Area {
            exterior,
            holes,
        });
    }
    areas
}

/// Rings from the clipper repeat their first vertex at the end.
fn open_contour(points: impl Iterator<Item = Position>) -> Vec<Position> {
    let mut contour: Vec<Position> = points.collect();
    while contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    contour
}

fn union_sketch(areas: &[Area]) -> Sketch<()> {
    areas
        .iter()
        .fold(Sketch::new(), |merged, area| merged.union(&area.to_sketch()))
}

#[cfg(test)]
pub(crate) fn union(areas: &[Area]) -> Vec<Area> {
    areas_from_sketch(&union_sketch(areas))
}

/// `subject` minus the union of `clips`.
pub(crate) fn difference(subject: &Area, clips: &[Area]) -> Vec<Area> {
    if clips.is_empty() {
        return areas_from_sketch(&subject.to_sketch());
    }
    let clips = union_sketch(clips);
    areas_from_sketch(&subject.to_sketch().difference(&clips))
}

pub(crate) fn intersection(a: &Area, b: &Area) -> Vec<Area> {
    areas_from_sketch(&a.to_sketch().intersection(&b.to_sketch()))
}
