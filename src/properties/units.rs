//! Exact-integer internal units (spec §3). Conversion to real-world units
//! (points, inches) only happens at render time, in the PDF export pipeline.

/// 1/20 of a point. Used for paragraph-scale geometry (indents, spacing).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Twip(pub i32);

impl Twip {
    pub const PER_INCH: i32 = 1440;
    pub const PER_POINT: i32 = 20;

    pub fn from_points(points: f32) -> Self {
        Twip((points * Self::PER_POINT as f32).round() as i32)
    }

    pub fn to_points(self) -> f32 {
        self.0 as f32 / Self::PER_POINT as f32
    }
}

/// English Metric Unit, 914 400 per inch. Used for drawings and images.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Emu(pub i64);

impl Emu {
    pub const PER_INCH: i64 = 914_400;
    pub const PER_POINT: i64 = 12_700;

    pub fn from_points(points: f32) -> Self {
        Emu((points as f64 * Self::PER_POINT as f64).round() as i64)
    }

    pub fn to_points(self) -> f32 {
        (self.0 as f64 / Self::PER_POINT as f64) as f32
    }
}

/// Font-size unit: half-points (22 == 11pt).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HalfPoint(pub i32);

impl HalfPoint {
    pub fn to_points(self) -> f32 {
        self.0 as f32 / 2.0
    }

    pub fn from_points(points: f32) -> Self {
        HalfPoint((points * 2.0).round() as i32)
    }
}

/// Border-width unit: eighths of a point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EighthPoint(pub i32);

impl EighthPoint {
    pub fn to_points(self) -> f32 {
        self.0 as f32 / 8.0
    }

    pub fn from_points(points: f32) -> Self {
        EighthPoint((points * 8.0).round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twip_round_trips_points() {
        assert_eq!(Twip::from_points(12.0).0, 240);
        assert_eq!(Twip(240).to_points(), 12.0);
    }

    #[test]
    fn emu_inch_constant() {
        assert_eq!(Emu::from_points(72.0).0, Emu::PER_INCH);
    }

    #[test]
    fn half_point_font_size() {
        assert_eq!(HalfPoint::from_points(11.0).0, 22);
        assert_eq!(HalfPoint(22).to_points(), 11.0);
    }
}
