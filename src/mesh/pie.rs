//! Conversion between a mesh and one level of a PIE 3 model.
//!
//! A PIE level stores texture coordinates per polygon corner; a mesh stores them per vertex. Each
//! distinct (point, texture coordinate) pair becomes one vertex, and points no polygon uses are
//! kept with a zero texture coordinate. PIE polygons wind clockwise.

use std::collections::{HashMap, HashSet};

use nalgebra::Vector3;
use pie::{Pie3Level, Pie3Polygon, PieFrame, POLY_TEXTURED};

use super::{Connector, Frame, IndexedTri, Mesh, Point};
use crate::{Error, Uv};

impl From<PieFrame> for Frame {
    fn from(f: PieFrame) -> Self {
        Self {
            time: f.time,
            translation: f.translation,
            rotation: f.rotation,
        }
    }
}

impl From<Frame> for PieFrame {
    fn from(f: Frame) -> Self {
        Self {
            time: f.time,
            translation: f.translation,
            rotation: f.rotation,
        }
    }
}

fn corner_key(point: u32, uv: &Uv) -> (u32, [u32; 2]) {
    (point, [uv.x.to_bits(), uv.y.to_bits()])
}

impl TryFrom<&Pie3Level> for Mesh {
    type Error = Error;

    fn try_from(level: &Pie3Level) -> Result<Self, Self::Error> {
        let points = level.points.len();
        if !level.normals.is_empty() && level.normals.len() != points {
            return Err(Error::MismatchedArray {
                array: "normal",
                len: level.normals.len(),
                expected: points,
            });
        }

        // distinct corners, ordered by point so that point i stays vertex i where it can
        let mut corners: Vec<(u32, Uv)> = Vec::with_capacity(points);
        let mut seen: HashSet<(u32, [u32; 2])> = HashSet::new();
        let mut used = vec![false; points];
        for poly in &level.polygons {
            for (&point, uv) in poly.indices.iter().zip(&poly.texcoords) {
                if point as usize >= points {
                    return Err(Error::OutOfRange {
                        what: "point",
                        index: point as usize,
                        len: points,
                    });
                }
                used[point as usize] = true;
                if seen.insert(corner_key(point, uv)) {
                    corners.push((point, *uv));
                }
            }
        }
        let unused = used.iter().filter(|&&u| !u).count();
        if unused > 0 {
            tracing::trace!(points = unused, "keeping points no polygon uses");
            corners.extend(
                (0..points as u32)
                    .filter(|&p| !used[p as usize])
                    .map(|p| (p, Uv::zeros())),
            );
        }
        corners.sort_by_key(|&(point, _)| point);

        let mut mesh = Mesh::new();
        mesh.reserve_points(corners.len());
        mesh.reserve_indices(level.polygons.len());
        let mut vertex_of = HashMap::with_capacity(corners.len());
        for (index, &(point, uv)) in corners.iter().enumerate() {
            let p = point as usize;
            mesh.add_point(Point {
                position: level.points[p],
                uv,
                normal: level.normals.get(p).copied().unwrap_or_else(Vector3::zeros),
            });
            vertex_of.insert(corner_key(point, &uv), index as u32);
        }

        let mut animated = 0usize;
        for poly in &level.polygons {
            if poly.texture_array.is_some() {
                animated += 1;
            }
            let mut tri = [0u32; 3];
            for (slot, (&point, uv)) in tri
                .iter_mut()
                .zip(poly.indices.iter().zip(&poly.texcoords))
            {
                *slot = vertex_of[&corner_key(point, uv)];
            }
            // clockwise to counter-clockwise
            mesh.add_indices(IndexedTri(tri).reversed());
        }
        if animated > 0 {
            tracing::debug!(polygons = animated, "texture arrays are not kept on meshes");
        }

        mesh.connectors = level.connectors.iter().copied().map(Connector::from).collect();
        mesh.frames = level.frames.iter().copied().map(Frame::from).collect();
        mesh.finish_import()?;
        Ok(mesh)
    }
}

impl Mesh {
    /// Build a PIE 3 level with one point per vertex.
    pub fn back_convert(&self) -> Pie3Level {
        let uv_of = |i: u32| self.uvs.get(i as usize).copied().unwrap_or_else(Uv::zeros);
        Pie3Level {
            points: self.positions.clone(),
            normals: self.normals.clone(),
            polygons: self
                .triangles
                .iter()
                .map(|tri| {
                    let indices = tri.reversed().0;
                    Pie3Polygon {
                        flags: POLY_TEXTURED,
                        indices,
                        texture_array: None,
                        texcoords: indices.map(uv_of),
                    }
                })
                .collect(),
            connectors: self.connectors.iter().map(|c| c.position).collect(),
            frames: self.frames.iter().copied().map(PieFrame::from).collect(),
        }
    }
}
