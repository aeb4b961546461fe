use std::io::{self, BufRead, Read, Write};

use nalgebra::{Vector2, Vector3};

use super::Model;
use crate::{Error, Mesh, ObjIndexOffsets, ObjTri};

fn triples(what: &'static str, indices: &[u32], expected: usize) -> Result<Vec<[u32; 3]>, Error> {
    if indices.len() != expected {
        return Err(Error::MismatchedArray {
            array: what,
            len: indices.len(),
            expected,
        });
    }
    Ok(indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

fn mesh_from_tobj(model: &tobj::Model) -> Result<Mesh, Error> {
    let m = &model.mesh;
    let vertices: Vec<_> = m
        .positions
        .chunks_exact(3)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect();
    let uvs: Vec<_> = m
        .texcoords
        .chunks_exact(2)
        .map(|c| Vector2::new(c[0], c[1]))
        .collect();
    let normals: Vec<_> = m
        .normals
        .chunks_exact(3)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect();

    let count = m.indices.len();
    let mut faces: Vec<ObjTri> = triples("vertex index", &m.indices, count)?
        .into_iter()
        .map(ObjTri::new)
        .collect();
    if !m.texcoord_indices.is_empty() {
        let uv_faces = triples("texture coordinate index", &m.texcoord_indices, count)?;
        for (face, t) in faces.iter_mut().zip(uv_faces) {
            face.uvs = Some(t);
        }
    }
    if !m.normal_indices.is_empty() {
        let normal_faces = triples("normal index", &m.normal_indices, count)?;
        for (face, n) in faces.iter_mut().zip(normal_faces) {
            face.normals = Some(n);
        }
    }

    let mut mesh = Mesh::with_name(model.name.as_str());
    mesh.import_from_obj(&faces, &vertices, &uvs, &normals)?;
    Ok(mesh)
}

/// Reject faces that reference texture coordinates or normals when the file declares none.
///
/// tobj drops such references instead of reporting them.
fn check_empty_references(text: &str) -> Result<(), Error> {
    let (mut uvs, mut normals) = (0usize, 0usize);
    let mut uv_ref = None;
    let mut normal_ref = None;
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("vt") => uvs += 1,
            Some("vn") => normals += 1,
            Some("f") => {
                for corner in fields {
                    let mut parts = corner.split('/').skip(1);
                    let uv = parts.next().filter(|p| !p.is_empty());
                    let normal = parts.next().filter(|p| !p.is_empty());
                    uv_ref = uv_ref.or(uv);
                    normal_ref = normal_ref.or(normal);
                }
            }
            _ => {}
        }
    }
    let dangling = |what: &'static str, reference: &str| Error::OutOfRange {
        what,
        index: reference.parse::<usize>().map_or(0, |i| i.saturating_sub(1)),
        len: 0,
    };
    match (uv_ref, normal_ref) {
        (Some(r), _) if uvs == 0 => Err(dangling("texture coordinate", r)),
        (_, Some(r)) if normals == 0 => Err(dangling("normal", r)),
        _ => Ok(()),
    }
}

impl Model {
    /// Import every object of an OBJ stream as one mesh. Materials are ignored.
    pub fn import_obj<R: BufRead>(mut stream: R) -> Result<Self, Error> {
        let mut text = String::new();
        stream.read_to_string(&mut text)?;
        check_empty_references(&text)?;

        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, _) =
            tobj::load_obj_buf(&mut text.as_bytes(), &options, |_| Ok(Default::default()))?;

        let meshes = models
            .iter()
            .map(mesh_from_tobj)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(meshes = meshes.len(), "imported OBJ");
        Ok(Self {
            meshes,
            texture: None,
            tcmask: None,
        })
    }

    /// Write every mesh as one OBJ object sharing a single index space.
    pub fn export_obj<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut offsets = ObjIndexOffsets::default();
        for mesh in &self.meshes {
            mesh.export_to_obj(&mut offsets, w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use nalgebra::vector;

    use super::*;

    const CUBE_CORNER: &str = "# three faces of a unit cube
o corner
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 -1
vn 0 -1 0
f 1/1/1 4/4/1 3/3/1 2/2/1
f 1/1/2 2/2/2 5/3/2
";

    #[test]
    fn imports_and_triangulates() {
        let model = Model::import_obj(Cursor::new(CUBE_CORNER)).unwrap();
        assert_eq!(model.mesh_count(), 1);
        let mesh = model.mesh(0).unwrap();
        assert_eq!(mesh.name(), "corner");
        assert_eq!(mesh.index_count(), 3);
        // 4 corners of the quad, then 1, 2 and 5 again with another normal
        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(mesh.normals()[0], vector![0.0, 0.0, -1.0]);
    }

    #[test]
    fn export_then_import_keeps_counts() {
        let model = Model::import_obj(Cursor::new(CUBE_CORNER)).unwrap();
        let mut out = Vec::new();
        model.export_obj(&mut out).unwrap();
        let again = Model::import_obj(Cursor::new(out)).unwrap();
        let (a, b) = (model.mesh(0).unwrap(), again.mesh(0).unwrap());
        assert_eq!(a.vertex_count(), b.vertex_count());
        assert_eq!(a.index_count(), b.index_count());
        assert_eq!(a.triangles(), b.triangles());
    }

    #[test]
    fn bad_reference_is_an_error() {
        let broken = CUBE_CORNER.replace("5/3/2", "9/3/2");
        assert!(Model::import_obj(Cursor::new(broken)).is_err());
    }

    #[test]
    fn references_into_missing_lists_are_errors() {
        let normals = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//4 2//4 3//4\n";
        assert!(matches!(
            Model::import_obj(Cursor::new(normals)),
            Err(Error::OutOfRange {
                what: "normal",
                index: 3,
                len: 0
            })
        ));
        let uvs = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/7 2/8 3/9\n";
        assert!(matches!(
            Model::import_obj(Cursor::new(uvs)),
            Err(Error::OutOfRange {
                what: "texture coordinate",
                index: 6,
                len: 0
            })
        ));
        // plain faces still need neither list
        let plain = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        assert_eq!(Model::import_obj(Cursor::new(plain)).unwrap().mesh_count(), 1);
    }
}
