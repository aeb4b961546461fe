//! Mesh blocks of the native WZM text format.

use std::io::{self, BufRead, Write};

use nalgebra::{Vector2, Vector3, Vector4};
use wzmodel_common::{Record, RecordReader};

use super::{Connector, Frame, IndexedTri, Mesh};
use crate::{Error, Tangent};

fn vec3(v: [f32; 3]) -> Vector3<f32> {
    Vector3::new(v[0], v[1], v[2])
}

/// Read an array section introduced by a bare `keyword` record.
fn read_array<R: BufRead, const N: usize>(
    r: &mut RecordReader<R>,
    keyword: &str,
    count: usize,
) -> Result<Option<Vec<[f32; N]>>, Error> {
    match r.optional(keyword)? {
        Some(_) => Ok(Some(r.rows::<f32, N>(count, keyword)?)),
        None => Ok(None),
    }
}

fn write_rows<W: Write, const N: usize>(
    w: &mut W,
    keyword: &str,
    rows: impl Iterator<Item = [f32; N]>,
) -> io::Result<()> {
    writeln!(w, "{keyword}")?;
    for row in rows {
        let mut sep = "";
        for v in row {
            write!(w, "{sep}{v}")?;
            sep = " ";
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Names are single-line; line breaks become spaces.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.replace(['\r', '\n'], " ").trim().to_owned()
}

impl Mesh {
    /// Replace this mesh with the next mesh block of `stream`.
    ///
    /// On error the mesh is left cleared.
    pub fn read<R: BufRead>(&mut self, stream: R) -> Result<(), Error> {
        let mut r = RecordReader::new(stream);
        match Self::read_records(&mut r) {
            Ok(mesh) => {
                *self = mesh;
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    pub(crate) fn read_records<R: BufRead>(r: &mut RecordReader<R>) -> Result<Self, Error> {
        let header = r.directive("MESH")?;
        let mut mesh = Mesh::with_name(header.rest());

        if let Some(rec) = r.optional("TEAMCOLOURS")? {
            let [tc] = rec.values::<u8, 1>(1)?;
            mesh.team_colours = tc != 0;
        }
        if let Some(rec) = r.optional("MINMAX_TSCEN")? {
            check_minmax(&rec)?;
        }

        let vertices = r.count("VERTICES")?;
        let indices = r.count("INDICES")?;

        r.directive("VERTEXARRAY")?;
        mesh.positions = r
            .rows::<f32, 3>(vertices, "VERTEXARRAY")?
            .into_iter()
            .map(vec3)
            .collect();
        if let Some(rows) = read_array::<_, 3>(r, "NORMALARRAY", vertices)? {
            mesh.normals = rows.into_iter().map(vec3).collect();
        }
        if let Some(rows) = read_array::<_, 2>(r, "TEXTUREARRAY", vertices)? {
            mesh.uvs = rows.into_iter().map(|[u, v]| Vector2::new(u, v)).collect();
        }
        if let Some(rows) = read_array::<_, 4>(r, "TANGENTARRAY", vertices)? {
            mesh.tangents = rows
                .into_iter()
                .map(|[x, y, z, w]| Tangent::from_vector4(&Vector4::new(x, y, z, w)))
                .collect();
        }
        if let Some(rows) = read_array::<_, 3>(r, "BITANGENTARRAY", vertices)? {
            mesh.bitangents = rows.into_iter().map(vec3).collect();
        }

        r.directive("INDEXARRAY")?;
        mesh.triangles = r
            .rows::<u32, 3>(indices, "INDEXARRAY")?
            .into_iter()
            .map(IndexedTri)
            .collect();

        if let Some(rec) = r.optional("FRAMES")? {
            let count = rec.count("FRAMES")?;
            mesh.frames = r
                .rows::<f32, 7>(count, "FRAMES")?
                .into_iter()
                .map(|[t, tx, ty, tz, rx, ry, rz]| Frame {
                    time: t,
                    translation: Vector3::new(tx, ty, tz),
                    rotation: Vector3::new(rx, ry, rz),
                })
                .collect();
        }
        if let Some(rec) = r.optional("CONNECTORS")? {
            let count = rec.count("CONNECTORS")?;
            mesh.connectors = r
                .rows::<f32, 3>(count, "CONNECTORS")?
                .into_iter()
                .map(|p| Connector::from(vec3(p)))
                .collect();
        }

        mesh.validate()?;
        mesh.recalculate_bound_data();
        tracing::trace!(
            name = mesh.name(),
            vertices,
            triangles = indices,
            "read WZM mesh"
        );
        Ok(mesh)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "MESH {}", sanitize_name(&self.name))?;
        if self.team_colours {
            writeln!(w, "TEAMCOLOURS 1")?;
        }
        if !self.positions.is_empty() {
            let b = &self.bounds;
            let (lo, hi, ts) = (b.aabb.mins, b.aabb.maxs, b.tangent_space_center);
            writeln!(
                w,
                "MINMAX_TSCEN {} {} {} {} {} {} {} {} {}",
                lo.x, lo.y, lo.z, hi.x, hi.y, hi.z, ts.x, ts.y, ts.z
            )?;
        }
        writeln!(w, "VERTICES {}", self.positions.len())?;
        writeln!(w, "INDICES {}", self.triangles.len())?;

        write_rows(w, "VERTEXARRAY", self.positions.iter().map(|p| [p.x, p.y, p.z]))?;
        if !self.normals.is_empty() {
            write_rows(w, "NORMALARRAY", self.normals.iter().map(|n| [n.x, n.y, n.z]))?;
        }
        if !self.uvs.is_empty() {
            write_rows(w, "TEXTUREARRAY", self.uvs.iter().map(|uv| [uv.x, uv.y]))?;
        }
        if !self.tangents.is_empty() {
            write_rows(
                w,
                "TANGENTARRAY",
                self.tangents.iter().map(|t| {
                    let v = t.to_vector4();
                    [v.x, v.y, v.z, v.w]
                }),
            )?;
        }
        if !self.bitangents.is_empty() {
            write_rows(
                w,
                "BITANGENTARRAY",
                self.bitangents.iter().map(|b| [b.x, b.y, b.z]),
            )?;
        }

        writeln!(w, "INDEXARRAY")?;
        for IndexedTri([a, b, c]) in &self.triangles {
            writeln!(w, "{a} {b} {c}")?;
        }

        if !self.frames.is_empty() {
            writeln!(w, "FRAMES {}", self.frames.len())?;
            for f in &self.frames {
                let (t, r) = (f.translation, f.rotation);
                writeln!(
                    w,
                    "{} {} {} {} {} {} {}",
                    f.time, t.x, t.y, t.z, r.x, r.y, r.z
                )?;
            }
        }
        if !self.connectors.is_empty() {
            writeln!(w, "CONNECTORS {}", self.connectors.len())?;
            for c in &self.connectors {
                let p = c.position;
                writeln!(w, "{} {} {}", p.x, p.y, p.z)?;
            }
        }
        Ok(())
    }
}

/// `MINMAX_TSCEN` is recomputed after reading; it only has to be well-formed.
fn check_minmax(rec: &Record) -> Result<(), Error> {
    let v = rec.values::<f32, 9>(1)?;
    if (0..3).any(|i| v[i] > v[i + 3]) {
        tracing::warn!(line = rec.line, "MINMAX_TSCEN minimum exceeds maximum; ignored");
    }
    Ok(())
}
