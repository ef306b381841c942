//! Gerber command builder.
//!
//! A modal emitter over a single output stream. All coordinates and sizes are given in millimetres and converted to the
//! file unit on output.

use std::io::Write;

use gerber_types::{
    ApertureAttribute, ApertureDefinition, Circle, Command, CommentContent, DCode, ExtendedCode, FileAttribute,
    FunctionCode, GCode, GenerationSoftware, GerberCode, InterpolationMode, MCode, MacroDecimal, ObjectAttribute,
    Polarity, QuadrantMode, Rectangular, Rotation, Unit,
};
use log::trace;
use thiserror::Error;

use crate::aperture::{Aperture, ApertureShape, Macro, MacroArgument};
use crate::spacial::Position;

const MM_PER_INCH: f64 = 25.4;

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("unsupported coordinate format, precision: {precision}, decimals: {decimals}")]
    UnsupportedFormat { precision: u8, decimals: u8 },
    #[error("coordinate format already set to {0:?}")]
    FormatAlreadySet(CoordinateFormat),
    #[error("unit already set to {0:?}")]
    UnitAlreadySet(OutputUnit),
    #[error("unit and format must be set before any geometry")]
    GeometryStarted,
    #[error("coordinate format not set")]
    FormatNotSet,
    #[error("value {0} does not fit the coordinate format")]
    CoordinateOverflow(f64),
    #[error("no region open")]
    RegionNotOpen,
    #[error("region already open")]
    RegionAlreadyOpen,
    #[error("no current position")]
    NoPosition,
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputUnit {
    #[default]
    Millimeters,
    Inches,
}

impl OutputUnit {
    fn to_gerber(self) -> Unit {
        match self {
            OutputUnit::Millimeters => Unit::Millimeters,
            OutputUnit::Inches => Unit::Inches,
        }
    }

    /// Converts millimetres to this unit.
    pub fn from_mm(self, value: f64) -> f64 {
        match self {
            OutputUnit::Millimeters => value,
            OutputUnit::Inches => value / MM_PER_INCH,
        }
    }
}

/// Fixed-point coordinate format.
///
/// `precision` is the total number of digits, `decimals` the number of those after the decimal point.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CoordinateFormat {
    precision: u8,
    decimals: u8,
}

impl CoordinateFormat {
    pub fn new(precision: u8, decimals: u8) -> Result<Self, BuilderError> {
        if !(4..=9).contains(&precision) || decimals < 1 || decimals > precision - 2 {
            return Err(BuilderError::UnsupportedFormat {
                precision,
                decimals,
            });
        }
        Ok(Self {
            precision,
            decimals,
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn integer_digits(&self) -> u8 {
        self.precision - self.decimals
    }

    /// Scales the value by 10^decimals, rounds it, and zero-pads it to `precision` digits.
    pub fn format(&self, value: f64) -> Result<String, BuilderError> {
        let scaled = (value * 10_f64.powi(self.decimals as i32)).round();
        let limit = 10_i64.pow(self.precision as u32);
        if !scaled.is_finite() || scaled.abs() >= limit as f64 {
            return Err(BuilderError::CoordinateOverflow(value));
        }

        let scaled = scaled as i64;
        let sign = if scaled < 0 { "-" } else { "" };
        Ok(format!(
            "{}{:0width$}",
            sign,
            scaled.abs(),
            width = self.precision as usize
        ))
    }
}

/// Aperture and macro parameters are rounded to 6 decimal places.
fn parameter(value: f64) -> f64 {
    // adding zero turns -0 into 0
    (value * 1e6).round() / 1e6 + 0.0
}

fn sanitized(values: &[&str]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.replace(['*', '%', ','], "_"))
        .collect()
}

pub struct GerberBuilder<W: Write> {
    writer: W,
    unit: Option<OutputUnit>,
    format: Option<CoordinateFormat>,
    aperture: Option<i32>,
    dark: Option<bool>,
    rotation: Option<f64>,
    position: Option<Position>,
    interpolation: Option<InterpolationMode>,
    multi_quadrant: bool,
    in_region: bool,
    geometry_started: bool,
}

impl<W: Write> GerberBuilder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            unit: None,
            format: None,
            aperture: None,
            dark: None,
            rotation: None,
            position: None,
            interpolation: None,
            multi_quadrant: false,
            in_region: false,
            geometry_started: false,
        }
    }

    fn serialize<C: Into<Command>>(&mut self, command: C) -> Result<(), BuilderError> {
        let command: Command = command.into();
        command
            .serialize(&mut self.writer)
            .map_err(|error| BuilderError::Serialization(error.to_string()))
    }

    fn unit(&self) -> OutputUnit {
        self.unit.unwrap_or_default()
    }

    fn coordinate(&self, value: f64) -> Result<String, BuilderError> {
        let format = self
            .format
            .ok_or(BuilderError::FormatNotSet)?;
        format.format(self.unit().from_mm(value))
    }

    fn length(&self, value: f64) -> f64 {
        parameter(self.unit().from_mm(value))
    }

    fn xy(&self, position: Position) -> Result<String, BuilderError> {
        Ok(format!("X{}Y{}", self.coordinate(position.x)?, self.coordinate(position.y)?))
    }

    pub fn comment(&mut self, text: &str) -> Result<(), BuilderError> {
        // '*' terminates the command
        self.serialize(FunctionCode::GCode(GCode::Comment(CommentContent::String(
            text.replace('*', "_"),
        ))))
    }

    pub fn generation_software(&mut self, software: GenerationSoftware) -> Result<(), BuilderError> {
        self.serialize(ExtendedCode::FileAttribute(FileAttribute::GenerationSoftware(software)))
    }

    /// `%TF<name>,<values>*%`, standard attribute names start with a '.'.
    pub fn file_attribute(&mut self, name: &str, values: &[&str]) -> Result<(), BuilderError> {
        self.serialize(ExtendedCode::FileAttribute(FileAttribute::UserDefined {
            name: name.to_string(),
            values: sanitized(values),
        }))
    }

    pub fn aperture_attribute(&mut self, name: &str, values: &[&str]) -> Result<(), BuilderError> {
        self.serialize(ExtendedCode::ApertureAttribute(ApertureAttribute::UserDefined {
            name: name.to_string(),
            values: sanitized(values),
        }))
    }

    pub fn object_attribute(&mut self, name: &str, values: &[&str]) -> Result<(), BuilderError> {
        self.serialize(ExtendedCode::ObjectAttribute(ObjectAttribute::UserDefined {
            name: name.to_string(),
            values: sanitized(values),
        }))
    }

    /// Deletes all aperture and object attributes.
    pub fn delete_attributes(&mut self) -> Result<(), BuilderError> {
        self.serialize(ExtendedCode::DeleteAttribute(String::new()))
    }

    pub fn set_unit(&mut self, unit: OutputUnit) -> Result<(), BuilderError> {
        match self.unit {
            Some(current) if current == unit => return Ok(()),
            Some(current) => return Err(BuilderError::UnitAlreadySet(current)),
            None if self.geometry_started => return Err(BuilderError::GeometryStarted),
            None => {}
        }
        self.serialize(ExtendedCode::Unit(unit.to_gerber()))?;
        self.unit = Some(unit);
        Ok(())
    }

    pub fn set_format(&mut self, format: CoordinateFormat) -> Result<(), BuilderError> {
        match self.format {
            Some(current) if current == format => return Ok(()),
            Some(current) => return Err(BuilderError::FormatAlreadySet(current)),
            None if self.geometry_started => return Err(BuilderError::GeometryStarted),
            None => {}
        }
        self.serialize(ExtendedCode::CoordinateFormat(gerber_types::CoordinateFormat::new(
            format.integer_digits(),
            format.decimals(),
        )))?;
        self.format = Some(format);
        Ok(())
    }

    pub fn define_macro(&mut self, definition: &Macro) -> Result<(), BuilderError> {
        self.serialize(ExtendedCode::ApertureMacro(definition.definition.clone()))
    }

    pub fn define_aperture(&mut self, aperture: &Aperture) -> Result<(), BuilderError> {
        let template = match &aperture.shape {
            ApertureShape::Circle {
                diameter,
            } => gerber_types::Aperture::Circle(Circle::new(self.length(*diameter))),
            ApertureShape::Rectangle {
                width,
                height,
            } => gerber_types::Aperture::Rectangle(Rectangular::new(self.length(*width), self.length(*height))),
            ApertureShape::Obround {
                width,
                height,
            } => gerber_types::Aperture::Obround(Rectangular::new(self.length(*width), self.length(*height))),
            ApertureShape::Polygon {
                outer_diameter,
                vertices,
                rotation,
            } => gerber_types::Aperture::Polygon(
                gerber_types::Polygon::new(self.length(*outer_diameter), *vertices).with_rotation(parameter(*rotation)),
            ),
            ApertureShape::Macro {
                name,
                arguments,
                ..
            } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| match argument {
                        MacroArgument::Length(value) => MacroDecimal::Value(self.length(*value)),
                        MacroArgument::Angle(value) => MacroDecimal::Value(parameter(*value)),
                    })
                    .collect();
                gerber_types::Aperture::Macro(name.clone(), Some(arguments))
            }
        };
        self.serialize(ExtendedCode::ApertureDefinition(ApertureDefinition::new(aperture.code, template)))
    }

    /// No output if the aperture is already selected.
    pub fn select_aperture(&mut self, aperture: &Aperture) -> Result<(), BuilderError> {
        if self.aperture == Some(aperture.code) {
            return Ok(());
        }
        self.serialize(FunctionCode::DCode(DCode::SelectAperture(aperture.code)))?;
        self.aperture = Some(aperture.code);
        Ok(())
    }

    /// No output if the polarity is unchanged.
    pub fn set_polarity(&mut self, polarity: Polarity) -> Result<(), BuilderError> {
        let dark = matches!(polarity, Polarity::Dark);
        if self.dark == Some(dark) {
            return Ok(());
        }
        self.serialize(ExtendedCode::LoadPolarity(polarity))?;
        self.dark = Some(dark);
        Ok(())
    }

    /// Sets the rotation applied to subsequent flashes, in degrees. No output if unchanged.
    pub fn set_rotation(&mut self, degrees: f64) -> Result<(), BuilderError> {
        if self.rotation == Some(degrees) {
            return Ok(());
        }
        self.serialize(ExtendedCode::LoadRotation(Rotation {
            rotation: parameter(degrees),
        }))?;
        self.rotation = Some(degrees);
        Ok(())
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn move_to(&mut self, position: Position) -> Result<(), BuilderError> {
        let xy = self.xy(position)?;
        writeln!(self.writer, "{}D02*", xy)?;
        self.geometry_started = true;
        self.position = Some(position);
        Ok(())
    }

    fn set_interpolation(&mut self, interpolation: InterpolationMode) -> Result<(), BuilderError> {
        if self.interpolation == Some(interpolation) {
            return Ok(());
        }
        self.serialize(FunctionCode::GCode(GCode::InterpolationMode(interpolation)))?;
        self.interpolation = Some(interpolation);
        Ok(())
    }

    pub fn line_to(&mut self, position: Position) -> Result<(), BuilderError> {
        let xy = self.xy(position)?;
        self.set_interpolation(InterpolationMode::Linear)?;
        writeln!(self.writer, "{}D01*", xy)?;
        self.geometry_started = true;
        self.position = Some(position);
        Ok(())
    }

    /// Draws an arc from the current position to `end` around `center`, a negative sweep is clockwise.
    pub fn arc_to(&mut self, end: Position, center: Position, sweep_degrees: f64) -> Result<(), BuilderError> {
        let start = self
            .position
            .ok_or(BuilderError::NoPosition)?;
        if sweep_degrees == 0.0 {
            return self.line_to(end);
        }

        let xy = self.xy(end)?;
        let offset = center - start;
        let ij = format!("I{}J{}", self.coordinate(offset.x)?, self.coordinate(offset.y)?);

        if !self.multi_quadrant {
            self.serialize(FunctionCode::GCode(GCode::QuadrantMode(QuadrantMode::Multi)))?;
            self.multi_quadrant = true;
        }
        let interpolation = match sweep_degrees < 0.0 {
            true => InterpolationMode::ClockwiseCircular,
            false => InterpolationMode::CounterclockwiseCircular,
        };
        self.set_interpolation(interpolation)?;

        writeln!(self.writer, "{}{}D01*", xy, ij)?;
        self.geometry_started = true;
        self.position = Some(end);
        Ok(())
    }

    pub fn flash_at(&mut self, position: Position) -> Result<(), BuilderError> {
        let xy = self.xy(position)?;
        writeln!(self.writer, "{}D03*", xy)?;
        self.geometry_started = true;
        self.position = Some(position);
        Ok(())
    }

    pub fn begin_region(&mut self) -> Result<(), BuilderError> {
        if self.in_region {
            return Err(BuilderError::RegionAlreadyOpen);
        }
        self.serialize(FunctionCode::GCode(GCode::RegionMode(true)))?;
        self.in_region = true;
        Ok(())
    }

    /// Adds a contour to the open region, `closed` adds a closing segment back to the first point if required.
    pub fn region(&mut self, points: &[Position], closed: bool) -> Result<(), BuilderError> {
        if !self.in_region {
            return Err(BuilderError::RegionNotOpen);
        }
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };

        self.move_to(*first)?;
        for point in rest {
            self.line_to(*point)?;
        }
        if closed && points.last() != Some(first) {
            self.line_to(*first)?;
        }
        trace!("region contour, points: {}", points.len());
        Ok(())
    }

    pub fn end_region(&mut self) -> Result<(), BuilderError> {
        if !self.in_region {
            return Err(BuilderError::RegionNotOpen);
        }
        self.serialize(FunctionCode::GCode(GCode::RegionMode(false)))?;
        self.in_region = false;
        Ok(())
    }

    pub fn end_of_file(&mut self) -> Result<(), BuilderError> {
        self.serialize(FunctionCode::MCode(MCode::EndOfFile))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod builder_tests {
    use rstest::rstest;

    use super::*;
    use crate::aperture::ApertureDictionary;

    fn builder() -> GerberBuilder<Vec<u8>> {
        let mut builder = GerberBuilder::new(Vec::new());
        builder
            .set_unit(OutputUnit::Millimeters)
            .unwrap();
        builder
            .set_format(CoordinateFormat::new(8, 5).unwrap())
            .unwrap();
        builder
    }

    fn source(builder: GerberBuilder<Vec<u8>>) -> String {
        String::from_utf8(builder.into_inner()).unwrap()
    }

    #[rstest]
    #[case(1.0, "00100000")]
    #[case(-2.5, "-00250000")]
    #[case(0.000004, "00000000")]
    #[case(0.000006, "00000001")]
    #[case(123.45678, "12345678")]
    fn test_format(#[case] value: f64, #[case] expected: &str) {
        let format = CoordinateFormat::new(8, 5).unwrap();
        assert_eq!(format.format(value).unwrap(), expected);
    }

    #[rstest]
    #[case(0.0)]
    #[case(12.345678)]
    #[case(-999.99999)]
    #[case(0.1 + 0.2)]
    #[case(25.4 / 3.0)]
    fn test_format_round_trip(#[case] value: f64) {
        // given
        let format = CoordinateFormat::new(8, 5).unwrap();

        // when
        let text = format.format(value).unwrap();
        let parsed = text.parse::<i64>().unwrap() as f64 / 1e5;

        // then
        assert!((parsed - value).abs() <= 1e-5, "value: {}, parsed: {}", value, parsed);
    }

    #[test]
    fn test_format_overflow() {
        let format = CoordinateFormat::new(8, 5).unwrap();
        assert!(matches!(format.format(1000.0), Err(BuilderError::CoordinateOverflow(_))));
    }

    #[rstest]
    #[case(3, 1)]
    #[case(10, 5)]
    #[case(8, 0)]
    #[case(8, 7)]
    fn test_unsupported_formats(#[case] precision: u8, #[case] decimals: u8) {
        assert!(matches!(
            CoordinateFormat::new(precision, decimals),
            Err(BuilderError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_header() {
        let source = source(builder());
        assert!(source.contains("%MOMM*%"));
        assert!(source.contains("%FSLAX35Y35*%"));
    }

    #[test]
    fn test_format_change_is_rejected() {
        // given
        let mut builder = builder();

        // when
        let same = builder.set_format(CoordinateFormat::new(8, 5).unwrap());
        let different = builder.set_format(CoordinateFormat::new(6, 4).unwrap());

        // then
        assert!(same.is_ok());
        assert!(matches!(different, Err(BuilderError::FormatAlreadySet(_))));
        assert!(matches!(
            builder.set_unit(OutputUnit::Inches),
            Err(BuilderError::UnitAlreadySet(OutputUnit::Millimeters))
        ));
    }

    #[test]
    fn test_format_after_geometry_is_rejected() {
        let mut builder = GerberBuilder::new(Vec::new());
        builder
            .set_format(CoordinateFormat::new(8, 5).unwrap())
            .unwrap();
        builder
            .move_to(Position::new(0.0, 0.0))
            .unwrap();
        assert!(matches!(
            builder.set_unit(OutputUnit::Millimeters),
            Err(BuilderError::GeometryStarted)
        ));
    }

    #[test]
    fn test_geometry_requires_format() {
        let mut builder = GerberBuilder::new(Vec::new());
        assert!(matches!(
            builder.move_to(Position::new(0.0, 0.0)),
            Err(BuilderError::FormatNotSet)
        ));
    }

    #[test]
    fn test_select_aperture_is_modal() {
        // given
        let mut dictionary = ApertureDictionary::new();
        let first = dictionary
            .define_circle(0.1, None)
            .unwrap();
        let second = dictionary
            .define_circle(0.2, None)
            .unwrap();
        let mut builder = builder();

        // when
        builder
            .select_aperture(&first)
            .unwrap();
        builder
            .select_aperture(&first)
            .unwrap();
        builder
            .select_aperture(&second)
            .unwrap();

        // then
        let source = source(builder);
        assert_eq!(source.matches("D10*").count(), 1);
        assert_eq!(source.matches("D11*").count(), 1);
    }

    #[test]
    fn test_polarity_is_modal() {
        // given
        let mut builder = builder();

        // when
        builder
            .set_polarity(Polarity::Dark)
            .unwrap();
        builder
            .set_polarity(Polarity::Dark)
            .unwrap();
        builder
            .set_polarity(Polarity::Clear)
            .unwrap();
        builder.set_rotation(0.0).unwrap();
        builder.set_rotation(0.0).unwrap();

        // then
        let source = source(builder);
        assert_eq!(source.matches("%LPD*%").count(), 1);
        assert_eq!(source.matches("%LPC*%").count(), 1);
        assert_eq!(source.matches("%LR0*%").count(), 1);
    }

    #[test]
    fn test_region_is_closed() {
        // given
        let mut builder = builder();
        let points = [
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
            Position::new(1.0, 1.0),
        ];

        // when
        builder.begin_region().unwrap();
        builder
            .region(&points, true)
            .unwrap();
        builder.end_region().unwrap();

        // then
        let source = source(builder);
        let expected = "G36*\nX00000000Y00000000D02*\nG01*\nX00100000Y00000000D01*\nX00100000Y00100000D01*\nX00000000Y00000000D01*\nG37*\n";
        assert!(source.ends_with(expected), "source: {}", source);
    }

    #[test]
    fn test_region_must_be_open() {
        let mut builder = builder();
        assert!(matches!(
            builder.region(&[Position::new(0.0, 0.0)], true),
            Err(BuilderError::RegionNotOpen)
        ));
        builder.begin_region().unwrap();
        assert!(matches!(builder.begin_region(), Err(BuilderError::RegionAlreadyOpen)));
    }

    #[rstest]
    #[case(-90.0, "G02*")]
    #[case(90.0, "G03*")]
    fn test_arc_direction(#[case] sweep: f64, #[case] expected: &str) {
        // given
        let mut builder = builder();
        builder
            .move_to(Position::new(1.0, 0.0))
            .unwrap();

        // when
        builder
            .arc_to(Position::new(0.0, 1.0), Position::new(0.0, 0.0), sweep)
            .unwrap();

        // then
        let source = source(builder);
        assert!(source.contains("G75*"));
        assert!(source.contains(expected));
        assert!(source.contains("X00000000Y00100000I-00100000J00000000D01*"));
    }

    #[test]
    fn test_inch_output() {
        // given
        let mut builder = GerberBuilder::new(Vec::new());
        builder
            .set_unit(OutputUnit::Inches)
            .unwrap();
        builder
            .set_format(CoordinateFormat::new(6, 4).unwrap())
            .unwrap();

        // when
        builder
            .flash_at(Position::new(25.4, 12.7))
            .unwrap();

        // then
        let source = source(builder);
        assert!(source.contains("%MOIN*%"));
        assert!(source.contains("X010000Y005000D03*"));
    }

    #[test]
    fn test_aperture_definitions() {
        // given
        let mut dictionary = ApertureDictionary::new();
        dictionary
            .define_circle(0.5, None)
            .unwrap();
        dictionary
            .define_round_rectangle(2.0, 1.0, 0.25, 30.0, None)
            .unwrap();
        let mut builder = builder();

        // when
        for definition in dictionary.macros() {
            builder
                .define_macro(definition)
                .unwrap();
        }
        for aperture in dictionary.apertures() {
            builder
                .define_aperture(aperture)
                .unwrap();
        }

        // then
        let source = source(builder);
        assert!(source.contains("%AMROUNDRECT2*\n21,1,$1,$2-2x$3,0,0,$4*\n"));
        assert!(source.contains("1,1,2x$3,$1/2-$3,-$2/2+$3,$4*%\n"));
        assert!(source.contains("%ADD10C,0.5*%"));
        assert!(source.contains("%ADD11ROUNDRECT2,2X1X0.25X30*%"));
    }

    #[test]
    fn test_attributes() {
        let mut builder = builder();
        builder
            .file_attribute(".FileFunction", &["Copper", "L1", "Top"])
            .unwrap();
        builder
            .object_attribute(".N", &["GND*"])
            .unwrap();
        builder.delete_attributes().unwrap();
        builder.comment("a * b").unwrap();
        let source = source(builder);
        assert!(source.contains("%TF.FileFunction,Copper,L1,Top*%"));
        assert!(source.contains("%TO.N,GND_*%"));
        assert!(source.contains("%TD*%"));
        assert!(source.contains("G04 a _ b*"));
    }

    #[test]
    fn test_commands_are_gerber_types_commands() {
        // given
        let mut dictionary = ApertureDictionary::new();
        let aperture = dictionary
            .define_circle(0.5, None)
            .unwrap();
        let mut builder = builder();

        // when
        builder
            .define_aperture(&aperture)
            .unwrap();
        builder
            .select_aperture(&aperture)
            .unwrap();
        builder.set_rotation(45.5).unwrap();
        builder.begin_region().unwrap();
        builder.end_region().unwrap();

        // then
        let commands: Vec<Command> = vec![
            ExtendedCode::ApertureDefinition(ApertureDefinition::new(
                10,
                gerber_types::Aperture::Circle(Circle::new(0.5)),
            ))
            .into(),
            FunctionCode::DCode(DCode::SelectAperture(10)).into(),
            ExtendedCode::LoadRotation(Rotation {
                rotation: 45.5,
            })
            .into(),
            FunctionCode::GCode(GCode::RegionMode(true)).into(),
            FunctionCode::GCode(GCode::RegionMode(false)).into(),
        ];
        let mut expected = Vec::new();
        commands
            .serialize(&mut expected)
            .unwrap();
        let source = source(builder);
        assert!(source.ends_with(&String::from_utf8(expected).unwrap()), "source: {}", source);
    }

    #[test]
    fn test_octagon_definition() {
        // given
        let mut dictionary = ApertureDictionary::new();
        let octagon = dictionary
            .define_octagon(1.6, 0.0, None)
            .unwrap();
        let mut builder = builder();

        // when
        builder
            .define_aperture(&octagon)
            .unwrap();

        // then
        let source = source(builder);
        assert!(source.contains("%ADD10P,1.731828X8X22.5*%"), "source: {}", source);
    }
}
