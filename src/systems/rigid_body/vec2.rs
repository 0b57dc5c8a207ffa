use serde::{Deserialize, Serialize};

/// 2D Vector for physics calculations
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross)
    pub fn cross(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// `self x s` for a scalar `s` (vector crossed with the z axis)
    pub fn cross_scalar(&self, s: f32) -> Vec2 {
        Vec2::new(s * self.y, -s * self.x)
    }

    /// `s x v` for a scalar angular velocity `s`
    pub fn scalar_cross(s: f32, v: Vec2) -> Vec2 {
        Vec2::new(-s * v.y, s * v.x)
    }

    pub fn abs(&self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    pub fn min(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn normalize(&self) -> Self {
        self.try_normalize().unwrap_or(Self::ZERO)
    }

    /// Unit vector, or `None` for (near) zero length
    pub fn try_normalize(&self) -> Option<Self> {
        let len = self.length();
        if len > f32::EPSILON && len.is_finite() {
            Some(Self { x: self.x / len, y: self.y / len })
        } else {
            None
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self * rhs.x, y: self * rhs.y }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// Rotation stored as a unit complex number (cos, sin)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rot {
    pub c: f32,
    pub s: f32,
}

impl Default for Rot {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rot {
    pub const IDENTITY: Rot = Rot { c: 1.0, s: 0.0 };

    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self { c, s }
    }

    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotate a local vector into world space
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotate a world vector into local space
    #[inline]
    pub fn inv_rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Local x axis in world space
    pub fn x_axis(&self) -> Vec2 {
        Vec2::new(self.c, self.s)
    }

    /// Local y axis in world space
    pub fn y_axis(&self) -> Vec2 {
        Vec2::new(-self.s, self.c)
    }

    /// Advance by `delta` radians and renormalize to keep the complex unit length.
    pub fn integrate(&self, delta: f32) -> Rot {
        let step = Rot::from_angle(delta);
        let c = self.c * step.c - self.s * step.s;
        let s = self.s * step.c + self.c * step.s;
        let len = (c * c + s * s).sqrt();
        if len > f32::EPSILON {
            Rot { c: c / len, s: s / len }
        } else {
            Rot::IDENTITY
        }
    }

    pub fn to_mat22(&self) -> Mat22 {
        Mat22 { col1: self.x_axis(), col2: self.y_axis() }
    }
}

/// Column-major 2x2 matrix
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat22 {
    pub col1: Vec2,
    pub col2: Vec2,
}

impl Mat22 {
    pub fn new(col1: Vec2, col2: Vec2) -> Self {
        Self { col1, col2 }
    }

    pub fn identity() -> Self {
        Self { col1: Vec2::new(1.0, 0.0), col2: Vec2::new(0.0, 1.0) }
    }

    pub fn transpose(&self) -> Mat22 {
        Mat22 {
            col1: Vec2::new(self.col1.x, self.col2.x),
            col2: Vec2::new(self.col1.y, self.col2.y),
        }
    }

    pub fn abs(&self) -> Mat22 {
        Mat22 { col1: self.col1.abs(), col2: self.col2.abs() }
    }

    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.col1.x * v.x + self.col2.x * v.y,
            self.col1.y * v.x + self.col2.y * v.y,
        )
    }

    pub fn mul_mat(&self, m: &Mat22) -> Mat22 {
        Mat22 { col1: self.mul_vec(m.col1), col2: self.mul_vec(m.col2) }
    }

    /// Inverse, or `None` when the matrix is singular relative to its own
    /// scale or not finite
    pub fn invert(&self) -> Option<Mat22> {
        let a = self.col1.x;
        let b = self.col2.x;
        let c = self.col1.y;
        let d = self.col2.y;
        let det = a * d - b * c;
        let scale = (a * d).abs() + (b * c).abs();
        if !det.is_finite() || det.abs() <= f32::EPSILON * scale {
            return None;
        }
        let inv = 1.0 / det;
        Some(Mat22 {
            col1: Vec2::new(inv * d, -inv * c),
            col2: Vec2::new(-inv * b, inv * a),
        })
    }
}

impl std::ops::Add for Mat22 {
    type Output = Mat22;
    fn add(self, rhs: Mat22) -> Mat22 {
        Mat22 { col1: self.col1 + rhs.col1, col2: self.col2 + rhs.col2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rot_round_trips_local_and_world() {
        let rot = Rot::from_angle(0.7);
        let v = Vec2::new(1.5, -2.0);
        let back = rot.inv_rotate(rot.rotate(v));
        assert!((back.x - v.x).abs() < 1e-5);
        assert!((back.y - v.y).abs() < 1e-5);
    }

    #[test]
    fn integrate_stays_unit_length() {
        let mut rot = Rot::IDENTITY;
        for _ in 0..1000 {
            rot = rot.integrate(0.037);
        }
        let len = (rot.c * rot.c + rot.s * rot.s).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Mat22::new(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert!(m.invert().is_none());
        let inv = Mat22::identity().invert().unwrap();
        assert_eq!(inv, Mat22::identity());
    }

    #[test]
    fn tiny_but_well_conditioned_matrix_inverts() {
        // Effective mass of a very heavy body: small entries, identity shape
        let k = 1.4e-4;
        let m = Mat22::new(Vec2::new(k, 0.0), Vec2::new(0.0, k));
        let inv = m.invert().expect("scaled identity is invertible");
        assert!((inv.col1.x * k - 1.0).abs() < 1e-5);
        assert!((inv.col2.y * k - 1.0).abs() < 1e-5);
        assert_eq!(inv.col1.y, 0.0);
    }

    #[test]
    fn zero_vector_does_not_normalize() {
        assert!(Vec2::zero().try_normalize().is_none());
        assert_eq!(Vec2::zero().normalize(), Vec2::ZERO);
    }
}
