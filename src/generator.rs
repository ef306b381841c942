//! Output file generators.
//!
//! Each generator builds one file in two passes over the board, the first defines every aperture the file needs and
//! the second emits the geometry using the same apertures.

use std::io::Write;

use gerber_types::GenerationSoftware;
use log::info;
use thiserror::Error;

use crate::aperture::{ApertureDictionary, ApertureError};
use crate::board::{Board, BoardError, LayerFunction, Side};
use crate::builder::{BuilderError, GerberBuilder};
use crate::config::GeneratorConfig;

mod component;
mod drill;
mod image;
#[cfg(feature = "job")]
mod job;
mod output;
mod route;

pub use component::generate_components;
pub use drill::generate_drill;
pub use image::{generate_image, ImageKind};
#[cfg(feature = "job")]
pub use job::generate_job;
pub use output::write_atomically;
pub use route::generate_route;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("aperture error: {0}")]
    Aperture(#[from] ApertureError),
    #[error("builder error: {0}")]
    Builder(#[from] BuilderError),
    #[error("board error: {0}")]
    Board(#[from] BoardError),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "job")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilePolarity {
    Positive,
    Negative,
}

impl FilePolarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilePolarity::Positive => "Positive",
            FilePolarity::Negative => "Negative",
        }
    }
}

/// What a generated file contains, see the `.FileFunction` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FileFunction {
    /// `number` is 1-based, counted from the top.
    Copper { number: u32, side: Side },
    SolderMask(Side),
    Paste(Side),
    Legend(Side),
    Profile,
    /// Plated holes through copper layers `from` to `to`.
    Drill { from: u32, to: u32 },
    /// Non-plated routing through copper layers `from` to `to`.
    Route { from: u32, to: u32 },
    Component { number: u32, side: Side },
    Other(String),
}

fn side_value(side: Side) -> &'static str {
    match side {
        Side::Top => "Top",
        Side::Bottom => "Bot",
        Side::Inner(_) => "Inr",
    }
}

impl FileFunction {
    pub fn values(&self) -> Vec<String> {
        match self {
            FileFunction::Copper {
                number,
                side,
            } => vec!["Copper".to_string(), format!("L{}", number), side_value(*side).to_string()],
            FileFunction::SolderMask(side) => vec!["Soldermask".to_string(), side_value(*side).to_string()],
            FileFunction::Paste(side) => vec!["Paste".to_string(), side_value(*side).to_string()],
            FileFunction::Legend(side) => vec!["Legend".to_string(), side_value(*side).to_string()],
            FileFunction::Profile => vec!["Profile".to_string(), "NP".to_string()],
            FileFunction::Drill {
                from,
                to,
            } => vec![
                "Plated".to_string(),
                from.to_string(),
                to.to_string(),
                "PTH".to_string(),
            ],
            FileFunction::Route {
                from,
                to,
            } => vec![
                "NonPlated".to_string(),
                from.to_string(),
                to.to_string(),
                "NPTH".to_string(),
                "Route".to_string(),
            ],
            FileFunction::Component {
                number,
                side,
            } => vec!["Component".to_string(), format!("L{}", number), side_value(*side).to_string()],
            FileFunction::Other(name) => vec!["Other".to_string(), name.clone()],
        }
    }

    /// The attribute value, e.g. `Copper,L1,Top`.
    pub fn attribute_value(&self) -> String {
        self.values().join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub name: String,
    pub function: FileFunction,
    pub polarity: FilePolarity,
    pub content: Vec<u8>,
}

/// Number of copper layers, at least 1.
pub(crate) fn copper_layer_count(board: &Board) -> u32 {
    (board.copper_layers().count() as u32).max(1)
}

/// 1-based copper layer number, counted from the top.
pub(crate) fn copper_layer_number(board: &Board, side: Side) -> u32 {
    match side {
        Side::Top => 1,
        Side::Inner(index) => index + 1,
        Side::Bottom => copper_layer_count(board),
    }
}

pub(crate) fn copper_side(function: &LayerFunction) -> Option<Side> {
    match function {
        LayerFunction::Signal {
            side,
        } => Some(*side),
        _ => None,
    }
}

/// Unit, format and file attributes.
pub(crate) fn write_header<W: Write>(
    builder: &mut GerberBuilder<W>,
    config: &GeneratorConfig,
    function: &FileFunction,
    polarity: FilePolarity,
) -> Result<(), GeneratorError> {
    builder.set_unit(config.unit)?;
    builder.set_format(config.coordinate_format()?)?;

    if config.x2_attributes {
        let software = &config.software;
        builder.generation_software(GenerationSoftware {
            vendor: software.vendor.clone(),
            application: software.application.clone(),
            version: software.version.clone(),
        })?;
        builder.file_attribute(".Part", &["Single"])?;
        let values = function.values();
        let values: Vec<&str> = values
            .iter()
            .map(String::as_str)
            .collect();
        builder.file_attribute(".FileFunction", &values)?;
        builder.file_attribute(".FilePolarity", &[polarity.as_str()])?;
        builder.file_attribute(".ProjectId", &[&config.project_name])?;
    } else {
        builder.comment(&config.project_name)?;
    }
    Ok(())
}

/// Macros in use, then every aperture in code order.
pub(crate) fn write_definitions<W: Write>(
    builder: &mut GerberBuilder<W>,
    dictionary: &ApertureDictionary,
) -> Result<(), GeneratorError> {
    for definition in dictionary.macros() {
        builder.define_macro(definition)?;
    }
    for aperture in dictionary.apertures() {
        builder.define_aperture(aperture)?;
    }
    Ok(())
}

pub(crate) fn finish(
    mut builder: GerberBuilder<Vec<u8>>,
    name: String,
    function: FileFunction,
    polarity: FilePolarity,
) -> Result<GeneratedFile, GeneratorError> {
    builder.end_of_file()?;
    let content = builder.into_inner();
    info!(
        "generated {}, function: {}, size: {}",
        name,
        function.attribute_value(),
        content.len()
    );
    Ok(GeneratedFile {
        name,
        function,
        polarity,
        content,
    })
}
