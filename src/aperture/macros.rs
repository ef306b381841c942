use std::sync::Arc;

use gerber_types::{ApertureMacro, CenterLinePrimitive, CirclePrimitive, MacroDecimal};

pub const ROTATED_RECTANGLE_MACRO: u32 = 1;
pub const ROUND_RECTANGLE_MACRO: u32 = 2;

fn expression(value: &str) -> MacroDecimal {
    MacroDecimal::Expression(value.to_string())
}

fn origin() -> (MacroDecimal, MacroDecimal) {
    (MacroDecimal::Value(0.0), MacroDecimal::Value(0.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub id: u32,
    pub definition: ApertureMacro,
}

impl Macro {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Parameters: `$1` width, `$2` height, `$3` rotation.
    pub fn rotated_rectangle() -> Self {
        let definition = ApertureMacro::new(format!("RECTANGLE{}", ROTATED_RECTANGLE_MACRO)).add_content(
            CenterLinePrimitive::new((MacroDecimal::Variable(1), MacroDecimal::Variable(2)))
                .centered_at(origin())
                .with_angle(MacroDecimal::Variable(3)),
        );

        Self {
            id: ROTATED_RECTANGLE_MACRO,
            definition,
        }
    }

    /// Parameters: `$1` width, `$2` height, `$3` corner radius, `$4` rotation.
    ///
    /// Two overlapping rectangles, one full width and one full height, with a circle at each corner center.
    pub fn round_rectangle() -> Self {
        let corner = |x: &str, y: &str| {
            CirclePrimitive::new(expression("2x$3"))
                .centered_at((expression(x), expression(y)))
                .with_angle(MacroDecimal::Variable(4))
        };

        let definition = ApertureMacro::new(format!("ROUNDRECT{}", ROUND_RECTANGLE_MACRO))
            .add_content(
                CenterLinePrimitive::new((MacroDecimal::Variable(1), expression("$2-2x$3")))
                    .with_angle(MacroDecimal::Variable(4)),
            )
            .add_content(
                CenterLinePrimitive::new((expression("$1-2x$3"), MacroDecimal::Variable(2)))
                    .with_angle(MacroDecimal::Variable(4)),
            )
            .add_content(corner("$1/2-$3", "$2/2-$3"))
            .add_content(corner("-$1/2+$3", "$2/2-$3"))
            .add_content(corner("-$1/2+$3", "-$2/2+$3"))
            .add_content(corner("$1/2-$3", "-$2/2+$3"));

        Self {
            id: ROUND_RECTANGLE_MACRO,
            definition,
        }
    }
}

/// The built-in macros, shared by every dictionary.
#[derive(Debug, Clone)]
pub struct MacroTable {
    macros: Vec<Arc<Macro>>,
}

impl Default for MacroTable {
    fn default() -> Self {
        Self {
            macros: vec![Arc::new(Macro::rotated_rectangle()), Arc::new(Macro::round_rectangle())],
        }
    }
}

impl MacroTable {
    pub fn get(&self, id: u32) -> Option<&Arc<Macro>> {
        self.macros
            .iter()
            .find(|candidate| candidate.id == id)
    }
}

#[cfg(test)]
mod macro_tests {
    use gerber_types::{Command, ExtendedCode, GerberCode};

    use super::*;

    fn source(definition: &Macro) -> String {
        let mut buffer = Vec::new();
        Command::ExtendedCode(ExtendedCode::ApertureMacro(definition.definition.clone()))
            .serialize(&mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_rotated_rectangle_source() {
        assert_eq!(source(&Macro::rotated_rectangle()), "%AMRECTANGLE1*\n21,1,$1,$2,0,0,$3*%\n");
    }

    #[test]
    fn test_round_rectangle_source() {
        // when
        let source = source(&Macro::round_rectangle());

        // then
        assert_eq!(
            source,
            concat!(
                "%AMROUNDRECT2*\n",
                "21,1,$1,$2-2x$3,0,0,$4*\n",
                "21,1,$1-2x$3,$2,0,0,$4*\n",
                "1,1,2x$3,$1/2-$3,$2/2-$3,$4*\n",
                "1,1,2x$3,-$1/2+$3,$2/2-$3,$4*\n",
                "1,1,2x$3,-$1/2+$3,-$2/2+$3,$4*\n",
                "1,1,2x$3,$1/2-$3,-$2/2+$3,$4*%\n",
            )
        );
    }

    #[test]
    fn test_name_includes_id() {
        let table = MacroTable::default();
        let round_rectangle = table
            .get(ROUND_RECTANGLE_MACRO)
            .unwrap();
        assert_eq!(round_rectangle.name(), "ROUNDRECT2");
        assert!(table.get(3).is_none());
    }
}
