use std::collections::HashSet;

use super::{copper_layer_count, finish, write_header, FileFunction, FilePolarity, GeneratedFile, GeneratorError};
use crate::aperture::{ApertureDictionary, ApertureRequest};
use crate::board::{Board, Element};
use crate::builder::GerberBuilder;
use crate::config::GeneratorConfig;
use crate::spacial::Position;

const COMPONENT_DRILL: &str = "component-drill";
const VIA_DRILL: &str = "via-drill";

/// Every plated hole, with the tagged drill request for it.
fn holes(board: &Board) -> Vec<(ApertureRequest, Position)> {
    board
        .elements_with_parts()
        .filter_map(|(element, part)| {
            let transform = part
                .map(|part| board.local_transformation(part))
                .unwrap_or_default();
            match element {
                Element::ThroughHolePad(pad) => Some((
                    ApertureRequest::circle(pad.drill).tagged(COMPONENT_DRILL),
                    transform.apply_to_position(pad.center),
                )),
                Element::Via(via) => Some((
                    ApertureRequest::circle(via.drill).tagged(VIA_DRILL),
                    transform.apply_to_position(via.center),
                )),
                _ => None,
            }
        })
        .collect()
}

/// Gerber drill file for the plated holes, flashed tool by tool.
///
/// Component and via holes of the same diameter use different apertures, so their aperture functions can differ.
pub fn generate_drill(board: &Board, config: &GeneratorConfig) -> Result<GeneratedFile, GeneratorError> {
    let holes = holes(board);

    let mut dictionary = ApertureDictionary::new();
    let mut via_codes = HashSet::new();
    for (request, _) in &holes {
        let aperture = dictionary.define_for(request)?;
        if request.tag == Some(VIA_DRILL) {
            via_codes.insert(aperture.code);
        }
    }

    let function = FileFunction::Drill {
        from: 1,
        to: copper_layer_count(board),
    };
    let mut builder = GerberBuilder::new(Vec::new());
    write_header(&mut builder, config, &function, FilePolarity::Positive)?;
    for aperture in dictionary.apertures() {
        if config.x2_attributes {
            let aperture_function = match via_codes.contains(&aperture.code) {
                true => "ViaDrill",
                false => "ComponentDrill",
            };
            builder.aperture_attribute(".AperFunction", &[aperture_function])?;
        }
        builder.define_aperture(aperture)?;
    }
    if config.x2_attributes && !dictionary.is_empty() {
        builder.delete_attributes()?;
    }

    for aperture in dictionary.apertures() {
        for (request, position) in &holes {
            if dictionary.get_for(request)?.code != aperture.code {
                continue;
            }
            builder.select_aperture(aperture)?;
            builder.flash_at(*position)?;
        }
    }

    let name = format!("{}-drill.gbr", config.project_name);
    finish(builder, name, function, FilePolarity::Positive)
}
