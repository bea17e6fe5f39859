//! Minimal geometry types for engine crates (no Raylib dependency).
//!
//! The world is z-up: x runs east, y runs north, z is altitude.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn distance(self, rhs: Vec3) -> f32 {
        (rhs - self).length()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Axis-aligned rectangle on the ground plane, used for hit volumes and the
/// camera's terrain-occlusion zones.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    #[inline]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rect centered at (cx, cy) with the given full width/height.
    #[inline]
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

/// Cardinal facing on the ground plane.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit step along x for this facing.
    #[inline]
    pub const fn dx(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
            _ => 0.0,
        }
    }

    /// Unit step along y for this facing (y grows northward).
    #[inline]
    pub const fn dy(self) -> f32 {
        match self {
            Facing::Up => 1.0,
            Facing::Down => -1.0,
            _ => 0.0,
        }
    }

    /// Sprite rotation about z when facing this way; Down is the rest pose.
    #[inline]
    pub fn rot_z(self) -> f32 {
        use core::f32::consts::{FRAC_PI_2, PI};
        match self {
            Facing::Down => 0.0,
            Facing::Up => PI,
            Facing::Left => -FRAC_PI_2,
            Facing::Right => FRAC_PI_2,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Facing {
        match self {
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// The next facing going clockwise (looking down on the map).
    #[inline]
    pub const fn clockwise(self) -> Facing {
        match self {
            Facing::Up => Facing::Right,
            Facing::Right => Facing::Down,
            Facing::Down => Facing::Left,
            Facing::Left => Facing::Up,
        }
    }

    #[inline]
    pub const fn is_opposite(self, other: Facing) -> bool {
        matches!(
            (self, other),
            (Facing::Up, Facing::Down)
                | (Facing::Down, Facing::Up)
                | (Facing::Left, Facing::Right)
                | (Facing::Right, Facing::Left)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn facing_steps_are_unit() {
        for f in [Facing::Up, Facing::Down, Facing::Left, Facing::Right] {
            assert_eq!(f.dx().abs() + f.dy().abs(), 1.0);
        }
    }

    #[test]
    fn opposite_is_involutive() {
        for f in [Facing::Up, Facing::Down, Facing::Left, Facing::Right] {
            assert_eq!(f.opposite().opposite(), f);
            assert!(f.is_opposite(f.opposite()));
            assert!(!f.is_opposite(f));
        }
    }

    #[test]
    fn clockwise_cycles_in_four() {
        let f = Facing::Up;
        assert_eq!(f.clockwise().clockwise().clockwise().clockwise(), f);
    }

    proptest! {
        #[test]
        fn rect_contains_its_center(cx in -1e4f32..1e4, cy in -1e4f32..1e4, w in 0.1f32..100.0, h in 0.1f32..100.0) {
            let r = Rect::centered(cx, cy, w, h);
            prop_assert!(r.contains(cx, cy));
        }

        #[test]
        fn normalized_has_unit_length_or_zero(v in any::<Vec3>()) {
            prop_assume!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
            prop_assume!(v.length().is_finite());
            let n = v.normalized();
            if v.length() > 0.0 {
                prop_assert!((n.length() - 1.0).abs() < 1e-3);
            } else {
                prop_assert_eq!(n, v);
            }
        }
    }
}
