use glam::Vec2;
use std::f32::consts::TAU;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// An angle in radians, always wrapped to `0..TAU`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Angle(f32);

impl Angle {
    /// Will always wrap < 0 to > PI
    #[inline]
    pub const fn new(mut radians: f32) -> Self {
        radians %= TAU;
        if radians < 0.0 {
            radians += TAU;
        }
        Angle(radians)
    }

    /// Definitions store angles in degrees
    #[inline]
    pub fn from_degrees(degrees: f32) -> Self {
        Angle::new(degrees.to_radians())
    }

    #[inline]
    pub const fn rad(&self) -> f32 {
        self.0
    }

    #[inline]
    pub fn degrees(&self) -> f32 {
        self.0.to_degrees()
    }

    #[inline]
    pub fn sin_cos(&self) -> (f32, f32) {
        self.0.sin_cos()
    }

    #[inline(always)]
    pub fn unit(&self) -> Vec2 {
        let (y, x) = self.sin_cos();
        Vec2::new(x, y)
    }

    pub fn from_vector(input: Vec2) -> Self {
        Angle::new(input.y.atan2(input.x))
    }
}

impl Add for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: Angle) -> Angle {
        Angle::new(self.0 + other.0)
    }
}

impl Add<f32> for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: f32) -> Angle {
        Angle::new(self.0 + other)
    }
}

impl AddAssign<f32> for Angle {
    #[inline]
    fn add_assign(&mut self, other: f32) {
        *self = Angle::new(self.0 + other);
    }
}

impl Sub for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, other: Angle) -> Angle {
        Angle::new(self.0 - other.0)
    }
}

impl Sub<f32> for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, other: f32) -> Angle {
        Angle::new(self.0 - other)
    }
}

impl SubAssign<f32> for Angle {
    #[inline]
    fn sub_assign(&mut self, other: f32) {
        *self = Angle::new(self.0 - other);
    }
}

impl Neg for Angle {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Angle::new(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Angle;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn wraps_negative() {
        let a = Angle::new(-FRAC_PI_2);
        assert!((a.rad() - (TAU - FRAC_PI_2)).abs() < 0.0001);
    }

    #[test]
    fn degrees_round_trip_and_unit() {
        let a = Angle::from_degrees(180.0);
        assert!((a.rad() - PI).abs() < 0.0001);
        let u = Angle::from_degrees(90.0).unit();
        assert!(u.x.abs() < 0.0001);
        assert!((u.y - 1.0).abs() < 0.0001);
    }

    #[test]
    fn sub_wraps() {
        let a = Angle::new(0.1) - Angle::new(0.2);
        assert!(a.rad() > PI);
    }
}
