use super::{copper_layer_number, finish, write_header, FileFunction, FilePolarity, GeneratedFile, GeneratorError};
use crate::aperture::{ApertureDictionary, ApertureRequest};
use crate::board::{Board, Element, Part, Side};
use crate::builder::GerberBuilder;
use crate::config::GeneratorConfig;

/// Diameter of the flash marking a component's reference point.
const COMPONENT_MARK_DIAMETER: f64 = 0.3;

fn part_side(part: &Part) -> Side {
    match part.mirrored {
        true => Side::Bottom,
        false => Side::Top,
    }
}

fn mount_type(part: &Part) -> Option<&'static str> {
    let mut mount_type = None;
    for element in &part.elements {
        match element {
            Element::ThroughHolePad(_) => return Some("TH"),
            Element::SmdPad(_) => mount_type = Some("SMD"),
            _ => {}
        }
    }
    mount_type
}

fn component_file(board: &Board, config: &GeneratorConfig, side: Side, parts: &[&Part]) -> Result<GeneratedFile, GeneratorError> {
    let request = ApertureRequest::circle(COMPONENT_MARK_DIAMETER).tagged("component");
    let mut dictionary = ApertureDictionary::new();
    let mark = dictionary.define_for(&request)?;

    let function = FileFunction::Component {
        number: copper_layer_number(board, side),
        side,
    };
    let mut builder = GerberBuilder::new(Vec::new());
    write_header(&mut builder, config, &function, FilePolarity::Positive)?;
    if config.x2_attributes {
        builder.aperture_attribute(".AperFunction", &["ComponentMain"])?;
    }
    builder.define_aperture(&mark)?;
    if config.x2_attributes {
        builder.delete_attributes()?;
    }
    builder.select_aperture(&mark)?;

    for part in parts {
        if config.x2_attributes {
            builder.object_attribute(".C", &[&part.name])?;
            builder.object_attribute(".CRot", &[&format!("{}", part.rotation)])?;
            if let Some(value) = &part.value {
                builder.object_attribute(".CVal", &[value])?;
            }
            if let Some(package) = &part.package {
                builder.object_attribute(".CFtp", &[package])?;
            }
            if let Some(mount_type) = mount_type(part) {
                builder.object_attribute(".CMnt", &[mount_type])?;
            }
        }
        builder.flash_at(part.position)?;
        if config.x2_attributes {
            builder.delete_attributes()?;
        }
    }

    let side_name = match side {
        Side::Bottom => "bottom",
        _ => "top",
    };
    let name = format!("{}-component_{}.gbr", config.project_name, side_name);
    finish(builder, name, function, FilePolarity::Positive)
}

/// Gerber component files, one per side that has parts placed on it.
pub fn generate_components(board: &Board, config: &GeneratorConfig) -> Result<Vec<GeneratedFile>, GeneratorError> {
    [Side::Top, Side::Bottom]
        .into_iter()
        .filter_map(|side| {
            let parts: Vec<&Part> = board
                .parts
                .iter()
                .filter(|part| part_side(part) == side)
                .collect();
            match parts.is_empty() {
                true => None,
                false => Some(component_file(board, config, side, &parts)),
            }
        })
        .collect()
}

#[cfg(test)]
mod component_tests {
    use super::*;
    use crate::testing::{gerber_source, two_layer_board};

    #[test]
    fn test_top_side_components() {
        // given
        let board = two_layer_board();

        // when
        let files = generate_components(&board, &GeneratorConfig::default()).unwrap();

        // then
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.name, "board-component_top.gbr");
        let source = gerber_source(file);
        assert!(source.contains("%TF.FileFunction,Component,L1,Top*%"));
        assert!(source.contains("%TA.AperFunction,ComponentMain*%"));
        assert!(source.contains("%TO.C,R1*%"));
        assert!(source.contains("%TO.CRot,90*%"));
        assert!(source.contains("%TO.CMnt,SMD*%"));
        assert!(source.contains("%TO.CMnt,TH*%"));
        assert_eq!(source.matches("D03*").count(), 2);
    }

    #[test]
    fn test_mirrored_part_goes_to_the_bottom() {
        // given
        let mut board = two_layer_board();
        board.parts[1].mirrored = true;

        // when
        let files = generate_components(&board, &GeneratorConfig::default()).unwrap();

        // then
        let names: Vec<&str> = files
            .iter()
            .map(|file| file.name.as_str())
            .collect();
        assert_eq!(names, vec!["board-component_top.gbr", "board-component_bottom.gbr"]);
        let bottom = gerber_source(&files[1]);
        assert!(bottom.contains("%TF.FileFunction,Component,L2,Bot*%"));
        assert!(bottom.contains("%TO.C,J1*%"));
        assert!(!bottom.contains("%TO.C,R1*%"));
    }

    #[test]
    fn test_without_attributes_only_marks_are_flashed() {
        // given
        let board = two_layer_board();
        let config = GeneratorConfig {
            x2_attributes: false,
            ..GeneratorConfig::default()
        };

        // when
        let files = generate_components(&board, &config).unwrap();

        // then
        let source = gerber_source(&files[0]);
        assert!(!source.contains("%TO"));
        assert_eq!(source.matches("D03*").count(), 2);
    }
}
