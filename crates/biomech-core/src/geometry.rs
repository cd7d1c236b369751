//! Vector geometry for joint angles.
//!
//! Image coordinates have `y` pointing down, so "up" is `(0, -1, 0)`.
//! Angles are returned in degrees, rounded to one decimal place.

use formcheck_common::timing::round_to;

/// Vectors shorter than this are treated as zero-length.
pub const MIN_VECTOR_LENGTH: f64 = 1e-9;

/// A 3D vector or point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Component-wise midpoint.
    pub fn midpoint(self, other: Vec3) -> Vec3 {
        Vec3::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    /// Projection onto the image plane.
    pub fn flatten(self) -> Vec3 {
        Vec3::new(self.x, self.y, 0.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Fixed reference directions in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Straight up on screen.
    Vertical,
    /// Left to right on screen.
    Horizontal,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::Vertical => Vec3::new(0.0, -1.0, 0.0),
            Axis::Horizontal => Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Unit vector in the direction of `v`, or `None` for a zero-length vector.
pub fn normalize(v: Vec3) -> Option<Vec3> {
    let n = v.norm();
    if !n.is_finite() || n < MIN_VECTOR_LENGTH {
        return None;
    }
    Some(Vec3::new(v.x / n, v.y / n, v.z / n))
}

/// Unrounded angle between two vectors in degrees, `[0, 180]`.
///
/// Returns `0.0` when either vector has zero length. The cosine is clamped
/// to `[-1, 1]` before `acos`.
pub fn angle_between(v1: Vec3, v2: Vec3) -> f64 {
    let (Some(u1), Some(u2)) = (normalize(v1), normalize(v2)) else {
        return 0.0;
    };
    u1.dot(u2).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angle at vertex `b` formed by `a`-`b`-`c`, in degrees `[0, 180]`.
pub fn angle_at_vertex(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    round_to(angle_between(a.sub(b), c.sub(b)), 1)
}

/// Angle between `origin -> target` projected onto the image plane and a
/// reference axis, in degrees `[0, 180]`.
pub fn angle_to_axis(origin: Vec3, target: Vec3, axis: Axis) -> f64 {
    round_to(angle_between(target.sub(origin).flatten(), axis.unit()), 1)
}

/// Distance between two points on the image plane.
pub fn planar_distance(a: Vec3, b: Vec3) -> f64 {
    a.sub(b).flatten().norm()
}
