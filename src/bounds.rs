use nalgebra::{Point3, Vector3};
use wzmodel_common::Float;

/// Axis-Aligned Bounding Box
///
/// A box with `mins > maxs` on any axis is empty; [Aabb::empty] is the identity for
/// [Aabb::union].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<Real: Float> {
    pub mins: Point3<Real>,
    pub maxs: Point3<Real>,
}

impl<Real: Float> Default for Aabb<Real> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Real: Float> Aabb<Real> {
    #[inline]
    pub fn new(mins: Point3<Real>, maxs: Point3<Real>) -> Self {
        Self { mins, maxs }
    }

    /// A box containing nothing.
    pub fn empty() -> Self {
        let hi = Real::max_value();
        let lo = Real::min_value();
        Self {
            mins: Point3::new(hi, hi, hi),
            maxs: Point3::new(lo, lo, lo),
        }
    }

    /// The smallest box containing every point of `points`.
    pub fn from_points<'p>(points: impl IntoIterator<Item = &'p Point3<Real>>) -> Self {
        let mut res = Self::empty();
        for p in points {
            res.expand_to(p);
        }
        res
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        let Self { mins: i, maxs: a } = self;
        i.x > a.x || i.y > a.y || i.z > a.z
    }

    #[inline]
    pub fn contains(&self, p: &Point3<Real>) -> bool {
        let Self { mins: i, maxs: a } = self;
        (p.x >= i.x && p.y >= i.y && p.z >= i.z) && (p.x <= a.x && p.y <= a.y && p.z <= a.z)
    }

    /// Determine the center of `self`.
    #[inline]
    pub fn center(&self) -> Point3<Real> {
        let Self { mins: i, maxs: a } = self;
        nalgebra::point![
            (i.x + a.x) / Real::TWO,
            (i.y + a.y) / Real::TWO,
            (i.z + a.z) / Real::TWO
        ]
    }

    /// Grow `self` such that it contains `p`.
    #[inline]
    pub fn expand_to(&mut self, p: &Point3<Real>) {
        self.mins = self.mins.inf(p);
        self.maxs = self.maxs.sup(p);
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }
}

/// Arithmetic mean of `vectors` as a point, or `None` when there are none.
pub fn centroid<'v, Real: Float>(
    vectors: impl IntoIterator<Item = &'v Vector3<Real>>,
) -> Option<Point3<Real>> {
    let mut sum = [Real::ZERO; 3];
    let mut n = 0usize;
    for v in vectors {
        for (acc, c) in sum.iter_mut().zip(v.iter()) {
            *acc += *c;
        }
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let n = Real::from_count(n);
    Some(Point3::new(sum[0] / n, sum[1] / n, sum[2] / n))
}
