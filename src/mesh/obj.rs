//! Wavefront OBJ exchange for a single mesh.
//!
//! OBJ keeps separate index streams for positions, texture coordinates and normals; meshes here
//! use one index per vertex, so every distinct index triple becomes one vertex. OBJ texture
//! space has its origin at the bottom left, so `v` is flipped both ways.

use std::collections::HashMap;
use std::io::{self, Write};

use nalgebra::Vector3;

use super::{IndexedTri, Mesh, Point};
use crate::{uv, Error, Normal, Position, Uv, UvExt};

/// One OBJ triangle: 0-based indices into the position, texture coordinate and normal lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjTri {
    pub positions: [u32; 3],
    pub uvs: Option<[u32; 3]>,
    pub normals: Option<[u32; 3]>,
}

impl ObjTri {
    #[inline]
    pub fn new(positions: [u32; 3]) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    #[inline]
    pub fn with_uvs(mut self, uvs: [u32; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    #[inline]
    pub fn with_normals(mut self, normals: [u32; 3]) -> Self {
        self.normals = Some(normals);
        self
    }
}

/// Running 1-based index bases, so several meshes can be written to the same OBJ file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjIndexOffsets {
    pub position: u32,
    pub uv: u32,
    pub normal: u32,
}

impl Default for ObjIndexOffsets {
    fn default() -> Self {
        Self {
            position: 1,
            uv: 1,
            normal: 1,
        }
    }
}

type CornerKey = (u32, Option<u32>, Option<u32>);

fn fetch<T: Copy>(what: &'static str, list: &[T], index: u32) -> Result<T, Error> {
    list.get(index as usize).copied().ok_or(Error::OutOfRange {
        what,
        index: index as usize,
        len: list.len(),
    })
}

fn flip_v(t: &Uv) -> Uv {
    uv(t.u(), 1.0 - t.v())
}

impl Mesh {
    /// Replace the geometry of this mesh with OBJ faces; the name is kept.
    ///
    /// On error the mesh is left cleared.
    pub fn import_from_obj(
        &mut self,
        faces: &[ObjTri],
        vertices: &[Position],
        uvs: &[Uv],
        normals: &[Normal],
    ) -> Result<(), Error> {
        let name = std::mem::take(&mut self.name);
        self.clear();
        if let Err(e) = self.build_from_obj(faces, vertices, uvs, normals) {
            self.clear();
            return Err(e);
        }
        self.name = name;
        self.finish_import()
    }

    fn build_from_obj(
        &mut self,
        faces: &[ObjTri],
        vertices: &[Position],
        uvs: &[Uv],
        normals: &[Normal],
    ) -> Result<(), Error> {
        let mut seen: HashMap<CornerKey, u32> = HashMap::new();
        self.reserve_indices(faces.len());
        for face in faces {
            let mut tri = [0u32; 3];
            for (corner, slot) in tri.iter_mut().enumerate() {
                let key = (
                    face.positions[corner],
                    face.uvs.map(|t| t[corner]),
                    face.normals.map(|n| n[corner]),
                );
                if let Some(&index) = seen.get(&key) {
                    *slot = index;
                    continue;
                }
                let point = Point {
                    position: fetch("position", vertices, key.0)?,
                    uv: match key.1 {
                        Some(i) => flip_v(&fetch("texture coordinate", uvs, i)?),
                        None => Uv::zeros(),
                    },
                    normal: match key.2 {
                        Some(i) => fetch("normal", normals, i)?,
                        None => Vector3::zeros(),
                    },
                };
                let index = self.positions.len() as u32;
                self.add_point(point);
                seen.insert(key, index);
                *slot = index;
            }
            self.add_indices(IndexedTri(tri));
        }
        tracing::trace!(
            faces = faces.len(),
            vertices = self.positions.len(),
            shared = faces.len() * 3 - self.positions.len(),
            "de-duplicated OBJ corners"
        );
        Ok(())
    }

    /// Write this mesh as an OBJ object and advance `offsets` past its records.
    pub fn export_to_obj<W: Write>(
        &self,
        offsets: &mut ObjIndexOffsets,
        w: &mut W,
    ) -> io::Result<()> {
        let name = super::sanitize_name(&self.name);
        if name.is_empty() {
            writeln!(w, "o mesh")?;
        } else {
            writeln!(w, "o {name}")?;
        }
        for p in &self.positions {
            writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for t in &self.uvs {
            let t = flip_v(t);
            writeln!(w, "vt {} {}", t.u(), t.v())?;
        }
        for n in &self.normals {
            writeln!(w, "vn {} {} {}", n.x, n.y, n.z)?;
        }

        let has_uvs = !self.uvs.is_empty();
        let has_normals = !self.normals.is_empty();
        for tri in &self.triangles {
            write!(w, "f")?;
            for i in tri.0 {
                let v = offsets.position + i;
                match (has_uvs, has_normals) {
                    (true, true) => write!(w, " {v}/{}/{}", offsets.uv + i, offsets.normal + i)?,
                    (true, false) => write!(w, " {v}/{}", offsets.uv + i)?,
                    (false, true) => write!(w, " {v}//{}", offsets.normal + i)?,
                    (false, false) => write!(w, " {v}")?,
                }
            }
            writeln!(w)?;
        }

        let n = self.positions.len() as u32;
        offsets.position += n;
        if has_uvs {
            offsets.uv += n;
        }
        if has_normals {
            offsets.normal += n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::vector;

    use super::*;

    /// A unit quad made of two triangles sharing an edge.
    fn quad() -> (Vec<ObjTri>, Vec<Position>, Vec<Uv>, Vec<Normal>) {
        let vertices = vec![
            vector![0.0, 0.0, 0.0],
            vector![1.0, 0.0, 0.0],
            vector![1.0, 1.0, 0.0],
            vector![0.0, 1.0, 0.0],
        ];
        let uvs = vec![uv(0.0, 0.0), uv(1.0, 0.0), uv(1.0, 1.0), uv(0.0, 1.0)];
        let normals = vec![vector![0.0, 0.0, 1.0]];
        let faces = vec![
            ObjTri::new([0, 1, 2])
                .with_uvs([0, 1, 2])
                .with_normals([0, 0, 0]),
            ObjTri::new([0, 2, 3])
                .with_uvs([0, 2, 3])
                .with_normals([0, 0, 0]),
        ];
        (faces, vertices, uvs, normals)
    }

    #[test]
    fn shared_corners_become_one_vertex() {
        let (faces, vertices, uvs, normals) = quad();
        let mut mesh = Mesh::with_name("quad");
        mesh.import_from_obj(&faces, &vertices, &uvs, &normals)
            .unwrap();
        assert_eq!(mesh.name(), "quad");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 2);
        assert_eq!(
            mesh.triangles(),
            &[IndexedTri::new(0, 1, 2), IndexedTri::new(0, 2, 3)]
        );
        // bottom-origin v
        assert_eq!(mesh.uvs()[0], uv(0.0, 1.0));
        assert_eq!(mesh.uvs()[2], uv(1.0, 0.0));
        assert_eq!(mesh.tangents().len(), 4);
    }

    #[test]
    fn distinct_uvs_split_a_position() {
        let (mut faces, vertices, mut uvs, normals) = quad();
        uvs.push(uv(0.5, 0.5));
        faces[1].uvs = Some([4, 2, 3]);
        let mut mesh = Mesh::new();
        mesh.import_from_obj(&faces, &vertices, &uvs, &normals)
            .unwrap();
        assert_eq!(mesh.vertex_count(), 5);
    }

    #[test]
    fn bad_index_clears() {
        let (mut faces, vertices, uvs, normals) = quad();
        faces[1].normals = Some([0, 0, 7]);
        let mut mesh = Mesh::with_name("doomed");
        let err = mesh
            .import_from_obj(&faces, &vertices, &uvs, &normals)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                what: "normal",
                index: 7,
                len: 1
            }
        ));
        assert_eq!(mesh, Mesh::default());
    }

    #[test]
    fn missing_attributes() {
        let (faces, vertices, _, _) = quad();
        let faces: Vec<_> = faces.iter().map(|f| ObjTri::new(f.positions)).collect();
        let mut mesh = Mesh::new();
        mesh.import_from_obj(&faces, &vertices, &[], &[]).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        // normals come from the faces
        assert!(mesh.normals().iter().all(|n| *n == vector![0.0, 0.0, 1.0]));
    }

    #[test]
    fn export_shares_offsets() {
        let (faces, vertices, uvs, normals) = quad();
        let mut mesh = Mesh::with_name("quad");
        mesh.import_from_obj(&faces, &vertices, &uvs, &normals)
            .unwrap();

        let mut offsets = ObjIndexOffsets::default();
        let mut out = Vec::new();
        mesh.export_to_obj(&mut offsets, &mut out).unwrap();
        mesh.export_to_obj(&mut offsets, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(offsets.position, 9);
        assert_eq!(offsets.uv, 9);
        assert_eq!(offsets.normal, 9);
        assert_eq!(text.matches("\nv ").count(), 8);
        assert!(text.contains("\nf 1/1/1 2/2/2 3/3/3\n"));
        assert!(text.contains("\nf 5/5/5 7/7/7 8/8/8\n"));
        assert!(text.contains("\nvt 0 0\n"));
    }
}
