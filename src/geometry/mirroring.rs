#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mirroring {
    pub x: bool,
    pub y: bool,
}

impl From<[bool; 2]> for Mirroring {
    fn from(value: [bool; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl Mirroring {
    /// Parts placed on the bottom side are mirrored around the Y axis, i.e. X coordinates are negated.
    pub const BOTTOM_SIDE: Mirroring = Mirroring {
        x: true,
        y: false,
    };

    pub fn as_f64(&self) -> [f64; 2] {
        [
            if self.x { -1.0 } else { 1.0 },
            if self.y { -1.0 } else { 1.0 },
        ]
    }

    /// Mirroring in exactly one axis reverses the direction of arcs and the sense of rotations.
    pub fn is_reflection(&self) -> bool {
        self.x ^ self.y
    }
}
