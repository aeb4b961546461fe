use std::{fmt, str::FromStr};

use nalgebra::{Point3, Vector3};

use super::Mesh;
use crate::normalize_or_zero;

/// A coordinate axis, used to pick the mirror plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Axis {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            n => Err(n),
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" | "0" => Ok(Self::X),
            "y" | "1" => Ok(Self::Y),
            "z" | "2" => Ok(Self::Z),
            _ => Err(format!("expected one of x, y, z; found {s:?}")),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        })
    }
}

impl Mesh {
    /// Scale positions, connectors and frame translations component-wise.
    ///
    /// Normals and bitangents are transformed by the inverse-transpose of the scale and tangents
    /// by the scale itself, then renormalised. A uniform scale leaves them untouched.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        if self.is_empty() {
            return;
        }
        let s = Vector3::new(x, y, z);
        for p in &mut self.positions {
            p.component_mul_assign(&s);
        }
        for c in &mut self.connectors {
            c.position.component_mul_assign(&s);
        }
        for f in &mut self.frames {
            f.translation.component_mul_assign(&s);
        }

        if !(x == y && y == z) {
            let inv = s.map(|c| if c == 0.0 { 0.0 } else { 1.0 / c });
            for n in self.normals.iter_mut().chain(self.bitangents.iter_mut()) {
                *n = normalize_or_zero(&n.component_mul(&inv));
            }
            for t in &mut self.tangents {
                t.direction = normalize_or_zero(&t.direction.component_mul(&s));
            }
        }
        self.recalculate_bound_data();
    }

    /// Mirror across the plane through the mesh centroid perpendicular to `axis`.
    pub fn mirror_using_local_center(&mut self, axis: Axis) {
        if self.is_empty() {
            return;
        }
        let center = self.center_point();
        self.mirror_from_point(&center, axis);
    }

    /// Mirror across the plane through `point` perpendicular to `axis`.
    ///
    /// Winding is reversed so faces keep pointing outwards, and tangent handedness flips.
    pub fn mirror_from_point(&mut self, point: &Point3<f32>, axis: Axis) {
        if self.is_empty() {
            return;
        }
        let a = axis.index();
        let twice = point[a] * 2.0;
        for p in &mut self.positions {
            p[a] = twice - p[a];
        }
        for c in &mut self.connectors {
            c.position[a] = twice - c.position[a];
        }
        for n in self.normals.iter_mut().chain(self.bitangents.iter_mut()) {
            n[a] = -n[a];
        }
        for t in &mut self.tangents {
            t.direction[a] = -t.direction[a];
            t.handedness = t.handedness.flipped();
        }
        for f in &mut self.frames {
            // rotation is axial: only the in-plane components change sign
            f.translation[a] = -f.translation[a];
            for (i, r) in f.rotation.iter_mut().enumerate() {
                if i != a {
                    *r = -*r;
                }
            }
        }
        self.reverse_winding_in_place();
        self.recalculate_bound_data();
    }

    /// Swap the 2nd and 3rd index of every triangle.
    pub fn reverse_winding(&mut self) {
        if self.is_empty() {
            return;
        }
        self.reverse_winding_in_place();
        self.recalculate_bound_data();
    }

    fn reverse_winding_in_place(&mut self) {
        for tri in &mut self.triangles {
            tri.reverse();
        }
    }
}
