//! Vectors and the oriented bounding volume used for membership tests.
//!
//! Building the volume from the tool arrangement happens outside this
//! crate; here we only need containment and a few size queries.

use serde::{Deserialize, Serialize};

/// 3D position vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// Slack for containment tests so blocks sitting exactly on a face count as inside.
const CONTAINMENT_EPSILON: f32 = 1e-3;

/// Oriented bounding box: a center, three orthonormal axes and the half
/// size along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub axes: [Vec3; 3],
}

impl OrientedBox {
    pub fn new(center: Vec3, half_extents: Vec3, axes: [Vec3; 3]) -> Self {
        Self {
            center,
            half_extents,
            axes: [axes[0].normalize(), axes[1].normalize(), axes[2].normalize()],
        }
    }

    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
        }
    }

    /// Axis-aligned box spanning two corners.
    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        Self::axis_aligned(center, Vec3::new(half.x.abs(), half.y.abs(), half.z.abs()))
    }

    fn half(&self, axis: usize) -> f32 {
        match axis {
            0 => self.half_extents.x,
            1 => self.half_extents.y,
            _ => self.half_extents.z,
        }
    }

    pub fn contains_point(&self, point: &Vec3) -> bool {
        let d = *point - self.center;
        (0..3).all(|i| d.dot(&self.axes[i]).abs() <= self.half(i) + CONTAINMENT_EPSILON)
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let ex = self.axes[0] * self.half_extents.x;
        let ey = self.axes[1] * self.half_extents.y;
        let ez = self.axes[2] * self.half_extents.z;
        let c = self.center;
        [
            c - ex - ey - ez,
            c + ex - ey - ez,
            c - ex + ey - ez,
            c + ex + ey - ez,
            c - ex - ey + ez,
            c + ex - ey + ez,
            c - ex + ey + ez,
            c + ex + ey + ez,
        ]
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &OrientedBox) -> bool {
        other.corners().iter().all(|p| self.contains_point(p))
    }

    /// Squared radius of the sphere circumscribing this box. Anything whose
    /// center is further than this cannot be fully inside.
    pub fn bounding_radius_squared(&self) -> f32 {
        self.half_extents.length_squared()
    }

    /// Length of the space diagonal.
    pub fn diagonal(&self) -> f32 {
        self.half_extents.length() * 2.0
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center + offset,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!((b - a).x, 3.0);
        assert_eq!(a.dot(&b), 32.0);
        assert_eq!(a.distance_squared(&b), 27.0);
    }

    #[test]
    fn test_axis_aligned_contains() {
        let bb = OrientedBox::axis_aligned(Vec3::ZERO, Vec3::new(10.0, 5.0, 5.0));
        assert!(bb.contains_point(&Vec3::new(9.0, 4.0, -4.0)));
        assert!(bb.contains_point(&Vec3::new(10.0, 5.0, 5.0)));
        assert!(!bb.contains_point(&Vec3::new(11.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotated_box_containment() {
        // 45 degrees around z: a long thin box along the diagonal.
        let d = std::f32::consts::FRAC_1_SQRT_2;
        let bb = OrientedBox::new(
            Vec3::ZERO,
            Vec3::new(10.0, 1.0, 1.0),
            [Vec3::new(d, d, 0.0), Vec3::new(-d, d, 0.0), Vec3::Z],
        );
        assert!(bb.contains_point(&Vec3::new(6.0, 6.0, 0.0)));
        assert!(!bb.contains_point(&Vec3::new(6.0, -6.0, 0.0)));
    }

    #[test]
    fn test_contains_box() {
        let outer = OrientedBox::axis_aligned(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        let inner = OrientedBox::axis_aligned(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        let straddling = inner.translated(Vec3::new(6.0, 0.0, 0.0));
        assert!(outer.contains_box(&inner));
        assert!(!outer.contains_box(&straddling));
    }

    #[test]
    fn test_diagonal() {
        let bb = OrientedBox::from_corners(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert!((bb.diagonal() - 5.0).abs() < 1e-5);
        assert!((bb.bounding_radius_squared() - 6.25).abs() < 1e-5);
    }
}
