//! Gerber RS-274X/X2 file generation for printed circuit boards.
//!
//! The aperture dictionary turns element shapes into deduplicated Gerber apertures, the region synthesizer turns
//! copper pours into filled contours with isolation and thermal relief holes, and the generators combine them into
//! the files of a fabrication data set.

pub mod aperture;
pub mod board;
pub mod builder;
pub mod config;
pub mod generator;
pub mod geometry;
pub mod region;
pub mod spacial;
mod types;

pub use aperture::{Aperture, ApertureDictionary, ApertureError, ApertureRequest, ApertureShape};
pub use board::{Board, BoardError, Element};
pub use builder::{BuilderError, CoordinateFormat, GerberBuilder, OutputUnit};
pub use config::{GeneratorConfig, SoftwareIdentity};
pub use generator::*;
/// re-export 'gerber_types' crate
#[cfg(feature = "types")]
pub use gerber_types;
pub use region::{RegionSynthesizer, RegionTree, MAX_REGION_DEPTH, THERMAL_SPOKE_GAP_DEGREES};
pub use spacial::{Position, Vector};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
