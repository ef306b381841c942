use crate::builder::{BuilderError, CoordinateFormat, OutputUnit};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftwareIdentity {
    pub vendor: String,
    pub application: String,
    pub version: Option<String>,
}

impl Default for SoftwareIdentity {
    fn default() -> Self {
        Self {
            vendor: "MakerPnP".to_string(),
            application: env!("CARGO_PKG_NAME").to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }
}

/// Options shared by all generators, lengths in millimetres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorConfig {
    pub unit: OutputUnit,
    /// total number of coordinate digits
    pub precision: u8,
    pub decimals: u8,
    /// flattening step for arcs and round shapes, in degrees
    pub arc_step_degrees: f64,
    /// minimum copper to copper distance for pours
    pub design_clearance: f64,
    /// solder mask openings are this much larger than the pad on every side
    pub mask_expansion: f64,
    /// no solder mask openings over vias
    pub tent_vias: bool,
    pub route_tool_diameter: f64,
    /// emit X2 file, aperture and object attributes
    pub x2_attributes: bool,
    pub software: SoftwareIdentity,
    pub project_name: String,
    pub board_thickness: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            unit: OutputUnit::Millimeters,
            precision: 8,
            decimals: 5,
            arc_step_degrees: 5.0,
            design_clearance: 0.2,
            mask_expansion: 0.1,
            tent_vias: true,
            route_tool_diameter: 2.0,
            x2_attributes: true,
            software: SoftwareIdentity::default(),
            project_name: "board".to_string(),
            board_thickness: 1.6,
        }
    }
}

impl GeneratorConfig {
    pub fn coordinate_format(&self) -> Result<CoordinateFormat, BuilderError> {
        CoordinateFormat::new(self.precision, self.decimals)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = GeneratorConfig::default()
            .coordinate_format()
            .unwrap();
        assert_eq!(format.integer_digits(), 3);
        assert_eq!(format.decimals(), 5);
    }

    #[test]
    fn test_invalid_format_is_reported() {
        let config = GeneratorConfig {
            precision: 12,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.coordinate_format(),
            Err(BuilderError::UnsupportedFormat { .. })
        ));
    }

    #[cfg(feature = "job")]
    #[test]
    fn test_partial_config_uses_defaults() {
        // given
        let json = r#"{ "design_clearance": 0.3, "tent_vias": false }"#;

        // when
        let config: GeneratorConfig = serde_json::from_str(json).unwrap();

        // then
        assert_eq!(config.design_clearance, 0.3);
        assert!(!config.tent_vias);
        assert_eq!(config.precision, 8);
    }
}
