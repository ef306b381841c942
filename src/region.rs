//! Copper pour synthesis.
//!
//! A pour region is filled with copper everywhere except where it would come too close to a conductor of another
//! signal. The result is a tree of contours, filled contours contain clear holes which may contain filled islands.

use std::io::Write;

use gerber_types::Polarity;
use log::{info, trace, warn};

use crate::aperture::Aperture;
use crate::board::{Board, Element, Part, RegionElement};
use crate::builder::{BuilderError, GerberBuilder};
use crate::geometry::{contains_point, polygon_area, BoundingBox};
use crate::spacial::deduplicate::DedupClosed;
use crate::spacial::{FixedPoint, Position, ToFixed, ToPosition};
use crate::types::{polarity_for_level, winding_for_level};

mod clipping;
mod pour;

use clipping::{difference, Area};
pub use pour::THERMAL_SPOKE_GAP_DEGREES;
pub(crate) use pour::region_outline;
use pour::{pour_areas, thermal_areas};

/// Root = 0, holes = 1, islands = 2. Islands that would need holes are dropped.
pub const MAX_REGION_DEPTH: usize = 2;

/// A closed contour, the closing vertex is implied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<FixedPoint>,
    /// Contours directly inside this one, of opposite polarity.
    pub children: Vec<Polygon>,
}

impl Polygon {
    pub fn positions(&self) -> Vec<Position> {
        self.points
            .iter()
            .map(|point| point.to_position())
            .collect()
    }

    /// Enclosed area in mm², children not subtracted.
    pub fn area(&self) -> f64 {
        polygon_area(&self.positions()).abs()
    }

    pub fn contains(&self, position: Position) -> bool {
        contains_point(&self.positions(), position)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTree {
    pub roots: Vec<Polygon>,
}

impl RegionTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every polygon with its depth, parents before children.
    pub fn nodes(&self) -> Vec<(usize, &Polygon)> {
        fn visit<'a>(polygon: &'a Polygon, depth: usize, nodes: &mut Vec<(usize, &'a Polygon)>) {
            nodes.push((depth, polygon));
            for child in &polygon.children {
                visit(child, depth + 1, nodes);
            }
        }

        let mut nodes = vec![];
        for root in &self.roots {
            visit(root, 0, &mut nodes);
        }
        nodes
    }

    /// Depth of the deepest polygon, `None` for an empty tree.
    pub fn depth(&self) -> Option<usize> {
        self.nodes()
            .into_iter()
            .map(|(depth, _)| depth)
            .max()
    }

    /// Whether copper ends up at `position`, the deepest contour containing it decides.
    pub fn is_filled(&self, position: Position) -> bool {
        self.nodes()
            .into_iter()
            .filter(|(_, polygon)| polygon.contains(position))
            .map(|(depth, _)| depth)
            .max()
            .is_some_and(|depth| depth % 2 == 0)
    }

    /// Emits the tree as region blocks, odd levels dark and even levels clear.
    ///
    /// With a `stroke` aperture every contour is also outlined in dark polarity, after its own fill and before its
    /// children.
    pub fn emit<W: Write>(&self, builder: &mut GerberBuilder<W>, stroke: Option<&Aperture>) -> Result<(), BuilderError> {
        for root in &self.roots {
            emit_polygon(builder, root, 1, stroke)?;
        }
        Ok(())
    }
}

fn emit_polygon<W: Write>(
    builder: &mut GerberBuilder<W>,
    polygon: &Polygon,
    level: usize,
    stroke: Option<&Aperture>,
) -> Result<(), BuilderError> {
    let mut points = polygon.points.clone();
    winding_for_level(level).apply(&mut points);
    let positions: Vec<Position> = points
        .into_iter()
        .map(ToPosition::to_position)
        .collect();

    builder.set_polarity(polarity_for_level(level))?;
    builder.begin_region()?;
    builder.region(&positions, true)?;
    builder.end_region()?;

    if let (Some(aperture), Some(first)) = (stroke, positions.first()) {
        builder.set_polarity(Polarity::Dark)?;
        builder.select_aperture(aperture)?;
        builder.move_to(*first)?;
        for position in positions.iter().skip(1) {
            builder.line_to(*position)?;
        }
        builder.line_to(*first)?;
    }

    for child in &polygon.children {
        emit_polygon(builder, child, level + 1, stroke)?;
    }
    Ok(())
}

pub struct RegionSynthesizer<'a> {
    board: &'a Board,
    arc_step: f64,
}

impl<'a> RegionSynthesizer<'a> {
    /// `arc_step` is the flattening step for arcs and round shapes, in degrees.
    pub fn new(board: &'a Board, arc_step: f64) -> Self {
        Self {
            board,
            arc_step,
        }
    }

    /// Computes the fill of `region`, which belongs to `part` if it is a part element.
    ///
    /// `clearance` is the minimum copper to copper distance, the region's stroke thickness is added to it.
    #[profiling::function]
    pub fn synthesize(&self, region: &RegionElement, part: Option<&Part>, clearance: f64) -> RegionTree {
        let Self {
            board,
            arc_step,
        } = self;

        let transform = part
            .map(|part| board.local_transformation(part))
            .unwrap_or_default();
        let outline = region_outline(region, &transform, *arc_step);
        let Some(fixed_outline) = fixed_contour(&outline) else {
            warn!(
                "ignoring degenerate region on layer {:?}, points: {}",
                region.layer,
                region.vertices.len()
            );
            return RegionTree::default();
        };

        if !board.is_copper(region.layer) {
            return RegionTree {
                roots: vec![Polygon {
                    points: fixed_outline,
                    children: vec![],
                }],
            };
        }

        let spacing = clearance + region.width / 2.0;
        let holes = self.hole_candidates(region, &outline, spacing);
        let areas = difference(&Area::new(outline), &holes);
        let tree = build_tree(&areas);

        info!(
            "synthesized region on layer {:?}, hole candidates: {}, polygons: {}",
            region.layer,
            holes.len(),
            tree.nodes().len()
        );
        tree
    }

    #[cfg_attr(feature = "profile-regions", profiling::function)]
    fn hole_candidates(&self, region: &RegionElement, outline: &[Position], spacing: f64) -> Vec<Area> {
        let Self {
            board,
            arc_step,
        } = self;

        let restrict_layers = board.restrict_layers_for(region.layer);
        let region_signal = region
            .signal
            .and_then(|id| board.signal(id));
        let bbox = BoundingBox::from_points(outline);

        let mut holes = vec![];
        for (element, part) in board.elements_with_parts() {
            if let Element::Region(other) = element {
                if std::ptr::eq(other, region) {
                    continue;
                }
            }

            let restricted = element
                .layer()
                .is_some_and(|layer| restrict_layers.contains(&layer));
            if !restricted && !board.is_on_layer(element, region.layer) {
                continue;
            }

            let transform = part
                .map(|part| board.local_transformation(part))
                .unwrap_or_default();

            let same_signal = match (region_signal, board.signal_of(element, part)) {
                (Some(region_signal), Some(signal)) => region_signal.id == signal.id,
                _ => false,
            };

            let candidates = match (restricted, same_signal && element.is_pad()) {
                (false, true) if region.thermals => thermal_areas(element, &transform, spacing, *arc_step),
                // solid connection
                (false, true) => continue,
                _ => pour_areas(element, &transform, spacing, *arc_step),
            };

            holes.extend(
                candidates
                    .into_iter()
                    .filter(|candidate| candidate.bounding_box().intersects(&bbox)),
            );
        }
        holes
    }
}

fn fixed_contour(points: &[Position]) -> Option<Vec<FixedPoint>> {
    let contour = points
        .iter()
        .map(|point| point.to_fixed())
        .collect::<Vec<_>>()
        .dedup_closed();
    (contour.len() >= 3).then_some(contour)
}

/// Nests the clipped areas, each area's holes are its children and an area inside a hole of another area is an island
/// of that hole.
fn build_tree(areas: &[Area]) -> RegionTree {
    let parents: Vec<Option<(usize, usize)>> = areas
        .iter()
        .enumerate()
        .map(|(index, area)| enclosing_hole(areas, index, area))
        .collect();

    let roots = (0..areas.len())
        .filter(|index| parents[*index].is_none())
        .filter_map(|index| tree_node(areas, &parents, index, 0))
        .collect();

    RegionTree {
        roots,
    }
}

/// The smallest hole of another area that contains `area`.
fn enclosing_hole(areas: &[Area], index: usize, area: &Area) -> Option<(usize, usize)> {
    let sample = *area.exterior.first()?;
    areas
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != index)
        .flat_map(|(other, candidate)| {
            candidate
                .holes
                .iter()
                .enumerate()
                .map(move |(hole, contour)| (other, hole, contour))
        })
        .filter(|(_, _, contour)| contains_point(contour, sample))
        .min_by(|(_, _, a), (_, _, b)| {
            polygon_area(a)
                .abs()
                .total_cmp(&polygon_area(b).abs())
        })
        .map(|(other, hole, _)| (other, hole))
}

/// An island that would need holes of its own is dropped along with everything inside it.
fn tree_node(areas: &[Area], parents: &[Option<(usize, usize)>], index: usize, depth: usize) -> Option<Polygon> {
    let area = &areas[index];
    let points = fixed_contour(&area.exterior)?;

    let holes: Vec<(usize, Vec<FixedPoint>)> = area
        .holes
        .iter()
        .enumerate()
        .filter_map(|(hole_index, hole)| fixed_contour(hole).map(|contour| (hole_index, contour)))
        .collect();
    if depth >= MAX_REGION_DEPTH && !holes.is_empty() {
        trace!("dropping island with {} holes at depth {}", holes.len(), depth);
        return None;
    }

    let children = holes
        .into_iter()
        .map(|(hole_index, hole_points)| Polygon {
            points: hole_points,
            children: (0..areas.len())
                .filter(|island| parents[*island] == Some((index, hole_index)))
                .filter_map(|island| tree_node(areas, parents, island, depth + 2))
                .collect(),
        })
        .collect();

    Some(Polygon {
        points,
        children,
    })
}
