//! PIE 2: integer texel texture coordinates, no normals or texture arrays, at most one frame.

use std::io::{self, BufRead, Write};

use nalgebra::Vector3;
use wzmodel_common::{capacity_hint, RecordReader};

use crate::section::{self, PolygonRow};
use crate::{PieError, PieFrame, PieVersion, TexturePage};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pie2Model {
    pub flags: u32,
    pub texture: Option<TexturePage>,
    pub levels: Vec<Pie2Level>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pie2Level {
    pub points: Vec<Vector3<f32>>,
    pub polygons: Vec<Pie2Polygon>,
    pub connectors: Vec<Vector3<f32>>,
    /// The single rest pose this revision can carry.
    pub frame: Option<PieFrame>,
}

/// A clockwise triangle with texture coordinates in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pie2Polygon {
    pub flags: u32,
    pub indices: [u32; 3],
    pub texcoords: [[i32; 2]; 3],
}

impl Pie2Model {
    pub fn read<R: BufRead>(stream: R) -> Result<Self, PieError> {
        let mut r = RecordReader::new(stream);
        let header = section::read_header(&mut r, PieVersion::V2)?;
        let mut levels = Vec::with_capacity(capacity_hint(header.levels));
        for index in 0..header.levels {
            levels.push(Pie2Level::read(&mut r, index)?);
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
            PieVersion::V2,
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

impl Pie2Level {
    fn read<R: BufRead>(r: &mut RecordReader<R>, index: usize) -> Result<Self, PieError> {
        section::read_level_marker(r, index)?;
        let points = section::read_vectors(r, "POINTS")?;
        if matches!(r.peek()?, Some(rec) if rec.keyword() == "NORMALS") {
            return Err(PieError::Unsupported {
                version: PieVersion::V2,
                feature: "per-point normals",
            });
        }

        let count = r.count("POLYGONS")?;
        let mut polygons = Vec::with_capacity(capacity_hint(count));
        for p in 0..count {
            let rec = r.require("polygon")?;
            let row = section::parse_polygon::<i32>(&rec)?;
            if row.texture_array.is_some() {
                return Err(PieError::Unsupported {
                    version: PieVersion::V2,
                    feature: "texture arrays",
                });
            }
            section::check_indices(index, p, &row.indices, points.len())?;
            polygons.push(Pie2Polygon {
                flags: row.flags,
                indices: row.indices,
                texcoords: row.texcoords,
            });
        }

        let connectors = section::read_optional_vectors(r, "CONNECTORS")?;
        let mut frames = section::read_frames(r)?;
        if frames.len() > 1 {
            return Err(PieError::Unsupported {
                version: PieVersion::V2,
                feature: "multiple animation frames",
            });
        }
        tracing::trace!(
            level = index,
            points = points.len(),
            polygons = polygons.len(),
            connectors = connectors.len(),
            "read PIE 2 level"
        );
        Ok(Self {
            points,
            polygons,
            connectors,
            frame: frames.pop(),
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        section::write_vectors(w, "POINTS", &self.points)?;
        writeln!(w, "POLYGONS {}", self.polygons.len())?;
        for p in &self.polygons {
            section::write_polygon(
                w,
                &PolygonRow {
                    flags: p.flags,
                    indices: p.indices,
                    texture_array: None,
                    texcoords: p.texcoords,
                },
            )?;
        }
        if !self.connectors.is_empty() {
            section::write_vectors(w, "CONNECTORS", &self.connectors)?;
        }
        section::write_frames(w, self.frame.as_slice())
    }
}
