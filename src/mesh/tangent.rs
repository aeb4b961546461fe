//! Derived per-vertex data for formats that do not store it.
//!
//! Tangents are accumulated per triangle from the UV derivatives (Lengyel's method), then
//! Gram-Schmidt orthogonalised against the vertex normal. This is best-effort shading data: it
//! is deterministic for a given winding and UV layout, nothing more.

use nalgebra::Vector3;

use super::Mesh;
use crate::{normalize_or_zero, Handedness, Tangent};

/// Any unit vector perpendicular to `n`, chosen deterministically.
fn perpendicular(n: &Vector3<f32>) -> Vector3<f32> {
    let axis = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    normalize_or_zero(&(axis - n * n.dot(&axis)))
}

impl Mesh {
    fn face_normal(&self, [a, b, c]: [u32; 3]) -> Vector3<f32> {
        let (p0, p1, p2) = (
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        );
        // unnormalised, so larger faces weigh more
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Replace zero-length normals with the area-weighted mean of the adjacent face normals.
    pub(super) fn fill_normals(&mut self) {
        if self.normals.len() != self.positions.len() {
            return;
        }
        let missing: Vec<usize> = (0..self.normals.len())
            .filter(|&i| self.normals[i].norm_squared() == 0.0)
            .collect();
        if missing.is_empty() {
            return;
        }
        let mut acc = vec![Vector3::zeros(); self.positions.len()];
        for tri in &self.triangles {
            let n = self.face_normal(tri.0);
            for i in tri.0 {
                acc[i as usize] += n;
            }
        }
        for &i in &missing {
            self.normals[i] = normalize_or_zero(&acc[i]);
        }
        tracing::debug!(count = missing.len(), "synthesised vertex normals");
    }

    /// Compute tangents and bitangents for every vertex.
    pub(super) fn generate_tangents(&mut self) {
        let n_verts = self.positions.len();
        if n_verts == 0 {
            return;
        }
        let mut tan1 = vec![Vector3::<f32>::zeros(); n_verts];
        let mut tan2 = vec![Vector3::<f32>::zeros(); n_verts];

        if self.uvs.len() == n_verts {
            for tri in &self.triangles {
                let [i0, i1, i2] = tri.0.map(|i| i as usize);
                let e1 = self.positions[i1] - self.positions[i0];
                let e2 = self.positions[i2] - self.positions[i0];
                let d1 = self.uvs[i1] - self.uvs[i0];
                let d2 = self.uvs[i2] - self.uvs[i0];

                let denom = d1.x * d2.y - d2.x * d1.y;
                if denom.abs() < 1e-12 {
                    continue; // degenerate UV mapping
                }
                let r = 1.0 / denom;
                let t = (e1 * d2.y - e2 * d1.y) * r;
                let b = (e2 * d1.x - e1 * d2.x) * r;
                for i in [i0, i1, i2] {
                    tan1[i] += t;
                    tan2[i] += b;
                }
            }
        }

        let mut tangents = Vec::with_capacity(n_verts);
        let mut bitangents = Vec::with_capacity(n_verts);
        for i in 0..n_verts {
            let n = self
                .normals
                .get(i)
                .copied()
                .unwrap_or_else(Vector3::zeros);
            let mut t = normalize_or_zero(&(tan1[i] - n * n.dot(&tan1[i])));
            if t == Vector3::zeros() {
                t = perpendicular(&n);
            }
            let handedness = if n.cross(&t).dot(&tan2[i]) < 0.0 {
                Handedness::Negative
            } else {
                Handedness::Positive
            };
            bitangents.push(n.cross(&t) * handedness.sign());
            tangents.push(Tangent::new(t, handedness));
        }
        self.tangents = tangents;
        self.bitangents = bitangents;
        tracing::debug!(count = n_verts, "synthesised tangents");
    }
}
