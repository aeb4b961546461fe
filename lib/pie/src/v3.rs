//! PIE 3: normalised texture coordinates, optional normals, texture arrays and frame sequences.

use std::io::{self, BufRead, Write};

use nalgebra::{Vector2, Vector3};
use wzmodel_common::{capacity_hint, RecordReader};

use crate::section::{self, PolygonRow};
use crate::{PieError, PieFrame, PieVersion, TextureArray, TexturePage};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pie3Model {
    pub flags: u32,
    pub texture: Option<TexturePage>,
    pub levels: Vec<Pie3Level>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pie3Level {
    pub points: Vec<Vector3<f32>>,
    /// Either empty or one normal per point.
    pub normals: Vec<Vector3<f32>>,
    pub polygons: Vec<Pie3Polygon>,
    pub connectors: Vec<Vector3<f32>>,
    pub frames: Vec<PieFrame>,
}

/// A clockwise triangle with normalised texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pie3Polygon {
    pub flags: u32,
    pub indices: [u32; 3],
    pub texture_array: Option<TextureArray>,
    pub texcoords: [Vector2<f32>; 3],
}

impl Pie3Model {
    pub fn read<R: BufRead>(stream: R) -> Result<Self, PieError> {
        let mut r = RecordReader::new(stream);
        let header = section::read_header(&mut r, PieVersion::V3)?;
        let mut levels = Vec::with_capacity(capacity_hint(header.levels));
        for index in 0..header.levels {
            levels.push(Pie3Level::read(&mut r, index)?);
        }
        r.finish()?;
        Ok(Self {
            flags: header.flags,
            texture: header.texture,
            levels,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        section::write_header(
            w,
            PieVersion::V3,
            self.flags,
            self.texture.as_ref(),
            self.levels.len(),
        )?;
        for (i, level) in self.levels.iter().enumerate() {
            writeln!(w, "LEVEL {}", i + 1)?;
            level.write(w)?;
        }
        Ok(())
    }
}

impl Pie3Level {
    fn read<R: BufRead>(r: &mut RecordReader<R>, index: usize) -> Result<Self, PieError> {
        section::read_level_marker(r, index)?;
        let points = section::read_vectors(r, "POINTS")?;
        let normals = section::read_optional_vectors(r, "NORMALS")?;
        if !normals.is_empty() && normals.len() != points.len() {
            return Err(wzmodel_common::RecordError::Parse {
                line: r.line(),
                reason: format!(
                    "{} normals given for {} points",
                    normals.len(),
                    points.len()
                ),
            }
            .into());
        }

        let count = r.count("POLYGONS")?;
        let mut polygons = Vec::with_capacity(capacity_hint(count));
        for p in 0..count {
            let rec = r.require("polygon")?;
            let row = section::parse_polygon::<f32>(&rec)?;
            section::check_indices(index, p, &row.indices, points.len())?;
            polygons.push(Pie3Polygon {
                flags: row.flags,
                indices: row.indices,
                texture_array: row.texture_array,
                texcoords: row.texcoords.map(|[u, v]| Vector2::new(u, v)),
            });
        }

        let connectors = section::read_optional_vectors(r, "CONNECTORS")?;
        let frames = section::read_frames(r)?;
        tracing::trace!(
            level = index,
            points = points.len(),
            polygons = polygons.len(),
            connectors = connectors.len(),
            frames = frames.len(),
            "read PIE 3 level"
        );
        Ok(Self {
            points,
            normals,
            polygons,
            connectors,
            frames,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        section::write_vectors(w, "POINTS", &self.points)?;
        if !self.normals.is_empty() {
            section::write_vectors(w, "NORMALS", &self.normals)?;
        }
        writeln!(w, "POLYGONS {}", self.polygons.len())?;
        for p in &self.polygons {
            section::write_polygon(
                w,
                &PolygonRow {
                    flags: p.flags,
                    indices: p.indices,
                    texture_array: p.texture_array,
                    texcoords: p.texcoords.map(|uv| [uv.x, uv.y]),
                },
            )?;
        }
        if !self.connectors.is_empty() {
            section::write_vectors(w, "CONNECTORS", &self.connectors)?;
        }
        section::write_frames(w, &self.frames)
    }
}
