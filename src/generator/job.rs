//! Gerber job file, a JSON summary of the fabrication data set.

use log::info;
use serde::Serialize;

use super::{copper_layer_count, FileFunction, FilePolarity, GeneratedFile, GeneratorError};
use crate::board::Board;
use crate::config::GeneratorConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct JobFile {
    header: Header,
    general_specs: GeneralSpecs,
    files_attributes: Vec<FileAttributes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Header {
    generation_software: Software,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Software {
    vendor: String,
    application: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GeneralSpecs {
    project_id: ProjectId,
    size: Size,
    layer_number: u32,
    board_thickness: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProjectId {
    name: String,
}

#[derive(Debug, Serialize)]
struct Size {
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FileAttributes {
    path: String,
    file_function: String,
    file_polarity: &'static str,
}

/// Job file for the given set of generated files, the board size comes from the outline layers.
pub fn generate_job(board: &Board, config: &GeneratorConfig, files: &[GeneratedFile]) -> Result<GeneratedFile, GeneratorError> {
    let bbox = board.outline_bounding_box();
    let size = match bbox.is_empty() {
        true => Size {
            x: 0.0,
            y: 0.0,
        },
        false => Size {
            x: bbox.width(),
            y: bbox.height(),
        },
    };

    let job = JobFile {
        header: Header {
            generation_software: Software {
                vendor: config.software.vendor.clone(),
                application: config.software.application.clone(),
                version: config.software.version.clone(),
            },
        },
        general_specs: GeneralSpecs {
            project_id: ProjectId {
                name: config.project_name.clone(),
            },
            size,
            layer_number: copper_layer_count(board),
            board_thickness: config.board_thickness,
        },
        files_attributes: files
            .iter()
            .map(|file| FileAttributes {
                path: file.name.clone(),
                file_function: file.function.attribute_value(),
                file_polarity: file.polarity.as_str(),
            })
            .collect(),
    };

    let content = serde_json::to_vec_pretty(&job)?;
    info!("generated job file, files: {}", files.len());

    Ok(GeneratedFile {
        name: format!("{}.gbrjob", config.project_name),
        function: FileFunction::Other("Job".to_string()),
        polarity: FilePolarity::Positive,
        content,
    })
}

#[cfg(test)]
mod job_tests {
    use super::*;
    use crate::generator::{generate_drill, generate_image, ImageKind};
    use crate::testing::{two_layer_board, TOP};

    #[test]
    fn test_job_lists_files() {
        // given
        let board = two_layer_board();
        let config = GeneratorConfig::default();
        let files = vec![
            generate_image(&board, ImageKind::Layer(TOP), &config).unwrap(),
            generate_drill(&board, &config).unwrap(),
        ];

        // when
        let job = generate_job(&board, &config, &files).unwrap();

        // then
        assert_eq!(job.name, "board.gbrjob");
        let value: serde_json::Value = serde_json::from_slice(&job.content).unwrap();
        assert_eq!(value["GeneralSpecs"]["LayerNumber"], 2);
        assert_eq!(value["GeneralSpecs"]["ProjectId"]["Name"], "board");
        assert_eq!(value["Header"]["GenerationSoftware"]["Vendor"], "MakerPnP");

        let attributes = value["FilesAttributes"]
            .as_array()
            .unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0]["FileFunction"], "Copper,L1,Top");
        assert_eq!(attributes[1]["FileFunction"], "Plated,1,2,PTH");
        assert_eq!(attributes[1]["FilePolarity"], "Positive");
    }

    #[test]
    fn test_board_size_from_outline() {
        // given
        let board = two_layer_board();

        // when
        let job = generate_job(&board, &GeneratorConfig::default(), &[]).unwrap();

        // then
        let value: serde_json::Value = serde_json::from_slice(&job.content).unwrap();
        let size = &value["GeneralSpecs"]["Size"];
        assert!((size["X"].as_f64().unwrap() - 50.0).abs() < 1e-9);
        assert!((size["Y"].as_f64().unwrap() - 30.0).abs() < 1e-9);
    }
}
