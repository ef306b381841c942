pub type Vector = nalgebra::Vector2<f64>;
pub type Position = nalgebra::Point2<f64>;

/// A point in fixed-point board units, see [`FIXED_UNITS_PER_MM`].
pub type FixedPoint = nalgebra::Point2<i64>;

/// 1 fixed-point unit = 1 nanometre.
pub const FIXED_UNITS_PER_MM: f64 = 1_000_000.0;

pub fn mm_to_fixed(value: f64) -> i64 {
    (value * FIXED_UNITS_PER_MM).round() as i64
}

pub fn fixed_to_mm(value: i64) -> f64 {
    value as f64 / FIXED_UNITS_PER_MM
}

pub trait ToFixed {
    fn to_fixed(self) -> FixedPoint;
}

impl ToFixed for Position {
    fn to_fixed(self) -> FixedPoint {
        FixedPoint::new(mm_to_fixed(self.x), mm_to_fixed(self.y))
    }
}

pub trait ToPosition {
    fn to_position(self) -> Position;
}

impl ToPosition for FixedPoint {
    fn to_position(self) -> Position {
        Position::new(fixed_to_mm(self.x), fixed_to_mm(self.y))
    }
}

pub mod deduplicate {
    use super::FixedPoint;

    /// Removes repeated vertices of a closed contour, including a trailing vertex that repeats the first one.
    ///
    /// Callers check the remaining vertex count to detect degenerate contours.
    pub trait DedupClosed {
        fn dedup_closed(self) -> Self;
    }

    impl DedupClosed for Vec<FixedPoint> {
        fn dedup_closed(mut self) -> Self {
            self.dedup();
            while self.len() > 1 && self.first() == self.last() {
                self.pop();
            }
            self
        }
    }

}

#[cfg(test)]
mod fixed_point_tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.0, 1_000_000)]
    #[case(-2.5, -2_500_000)]
    #[case(0.0000004, 0)]
    #[case(0.0000006, 1)]
    fn test_mm_to_fixed(#[case] value: f64, #[case] expected: i64) {
        assert_eq!(mm_to_fixed(value), expected);
    }

    #[test]
    fn test_fixed_round_trip() {
        // given
        let position = Position::new(12.345678, -0.000123);

        // when
        let result = position.to_fixed().to_position();

        // then
        assert!((result.x - position.x).abs() < 1e-6);
        assert!((result.y - position.y).abs() < 1e-6);
    }
}
