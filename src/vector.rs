//! Vector types and the semantic roles layered on them.
//!
//! Every role is the same fixed-size nalgebra vector; positions, normals and texture coordinates
//! differ only in name. Equality is exact component-wise comparison.

use nalgebra::{SVector, Vector2, Vector3, Vector4};

/// A fixed-size tuple of `N` components.
pub type Vector<const N: usize> = SVector<f32, N>;

pub type Position = Vector3<f32>;
pub type Normal = Vector3<f32>;
pub type Uv = Vector2<f32>;

/// Named texture-space accessors for 2-component vectors.
pub trait UvExt {
    fn u(&self) -> f32;
    fn v(&self) -> f32;
    fn u_mut(&mut self) -> &mut f32;
    fn v_mut(&mut self) -> &mut f32;
}

impl UvExt for Uv {
    #[inline]
    fn u(&self) -> f32 {
        self.x
    }
    #[inline]
    fn v(&self) -> f32 {
        self.y
    }
    #[inline]
    fn u_mut(&mut self) -> &mut f32 {
        &mut self.x
    }
    #[inline]
    fn v_mut(&mut self) -> &mut f32 {
        &mut self.y
    }
}

#[inline]
pub fn uv(u: f32, v: f32) -> Uv {
    Uv::new(u, v)
}

/// Build a new vector from components of `v` selected by index; components may repeat.
///
/// # Panics
///
/// * any index ≥ `N`
pub fn swizzle<const N: usize, const M: usize>(v: &Vector<N>, indices: [usize; M]) -> Vector<M> {
    Vector::<M>::from_fn(|i, _| v[indices[i]])
}

/// Reinterpret a 3-vector as a direction in homogeneous coordinates (`w = 0`).
#[inline]
pub fn to_homogeneous_vector(v: &Vector3<f32>) -> Vector4<f32> {
    with_w(v, 0.0)
}

#[inline]
pub fn with_w(v: &Vector3<f32>, w: f32) -> Vector4<f32> {
    Vector4::new(v.x, v.y, v.z, w)
}

/// Clamp both components to the valid texture range `[0, 1]`.
#[inline]
pub fn clamp_uv(uv: &Uv) -> Uv {
    uv.map(|c| c.clamp(0.0, 1.0))
}

/// Normalize `v`, or return the zero vector if it has no usable direction.
#[inline]
pub fn normalize_or_zero(v: &Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// The handedness of a tangent frame.
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    Negative = -1,
    #[default]
    Positive = 1,
}

impl Handedness {
    /// The sign as stored in the `w` component of a 4-component tangent.
    #[inline]
    pub fn sign(self) -> f32 {
        (self as i8) as f32
    }

    /// Negative `w` is left-handed; anything else (including zero) is right-handed.
    #[inline]
    pub fn from_sign(w: f32) -> Self {
        if w < 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Positive => Self::Negative,
        }
    }
}

/// Tangent vector of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tangent {
    pub direction: Vector3<f32>,
    pub handedness: Handedness,
}

impl Tangent {
    #[inline]
    pub fn new(direction: Vector3<f32>, handedness: Handedness) -> Self {
        Self {
            direction,
            handedness,
        }
    }

    #[inline]
    pub fn to_vector4(&self) -> Vector4<f32> {
        with_w(&self.direction, self.handedness.sign())
    }

    #[inline]
    pub fn from_vector4(v: &Vector4<f32>) -> Self {
        Self::new(v.xyz(), Handedness::from_sign(v.w))
    }
}

impl From<Tangent> for Vector3<f32> {
    fn from(value: Tangent) -> Self {
        value.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn swizzle_reorders_and_duplicates() {
        let v = vector![1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(swizzle(&v, [2, 0, 1]), vector![3.0, 1.0, 2.0]);
        assert_eq!(swizzle(&v, [3, 3, 0, 0]), vector![4.0, 4.0, 1.0, 1.0]);
        // pure
        assert_eq!(v, vector![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn cross_and_dot() {
        let x = Position::x();
        let y = Position::y();
        assert_eq!(x.cross(&y), Position::z());
        assert_eq!(x.dot(&y), 0.0);
        assert_eq!(vector![1.0f32, 2.0, 3.0].dot(&vector![4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn homogeneous_defaults_to_direction() {
        let v = vector![1.0f32, 2.0, 3.0];
        assert_eq!(to_homogeneous_vector(&v), vector![1.0, 2.0, 3.0, 0.0]);
        assert_eq!(with_w(&v, 1.0).w, 1.0);
    }

    #[test]
    fn uv_accessors_and_clamp() {
        let mut t = uv(-0.25, 1.5);
        assert_eq!((t.u(), t.v()), (-0.25, 1.5));
        assert_eq!(clamp_uv(&t), uv(0.0, 1.0));
        *t.u_mut() = 0.5;
        assert_eq!(t.u(), 0.5);
    }

    #[test]
    fn tangent_w_round_trip() {
        let t = Tangent::new(vector![0.0, 1.0, 0.0], Handedness::Negative);
        assert_eq!(t.to_vector4().w, -1.0);
        assert_eq!(Tangent::from_vector4(&t.to_vector4()), t);
        assert_eq!(Handedness::from_sign(0.0), Handedness::Positive);
        assert_eq!(Handedness::Negative.flipped(), Handedness::Positive);
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(normalize_or_zero(&Vector3::zeros()), Vector3::zeros());
        assert_eq!(normalize_or_zero(&vector![0.0, 3.0, 0.0]), vector![0.0, 1.0, 0.0]);
    }
}
