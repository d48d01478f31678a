//! Extensions for numbers that are not present in the stable standard library.

pub(crate) trait NumExt {
    /// Division with rounding up.
    fn ceil_div(self, other: Self) -> Self;

    /// Division with rounding down.
    ///
    /// Note this is different from truncating, which is rounding toward zero.
    fn floor_div(self, other: Self) -> Self;
}

impl NumExt for i64 {
    fn ceil_div(self, other: Self) -> Self {
        let d = self / other;
        let r = self % other;
        if (r > 0 && other > 0) || (r < 0 && other < 0) {
            d + 1
        } else {
            d
        }
    }

    fn floor_div(self, other: Self) -> Self {
        let d = self / other;
        let r = self % other;
        if (r > 0 && other < 0) || (r < 0 && other > 0) {
            d - 1
        } else {
            d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NumExt;

    #[test]
    fn ceil_division_rounds_towards_positive_infinity() {
        assert_eq!(3, 7_i64.ceil_div(3));
        assert_eq!(-2, (-7_i64).ceil_div(3));
        assert_eq!(-2, 7_i64.ceil_div(-3));
        assert_eq!(3, (-7_i64).ceil_div(-3));
        assert_eq!(2, 6_i64.ceil_div(3));
    }

    #[test]
    fn floor_division_rounds_towards_negative_infinity() {
        assert_eq!(2, 7_i64.floor_div(3));
        assert_eq!(-3, (-7_i64).floor_div(3));
        assert_eq!(-3, 7_i64.floor_div(-3));
        assert_eq!(2, (-7_i64).floor_div(-3));
        assert_eq!(-2, (-6_i64).floor_div(3));
    }
}
