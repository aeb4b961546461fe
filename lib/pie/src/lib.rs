//! The engine's legacy PIE model format, in its two text revisions.
//!
//! # Layout
//!
//! ```text
//! PIE <version>
//! TYPE <hex flags>
//! TEXTURE 0 <page> <width> <height>        (optional)
//! LEVELS <n>
//! LEVEL <i>                                (repeated n times, 1-based)
//! POINTS <p>                               then p rows of "x y z"
//! NORMALS <p>                              then p rows of "x y z"             (PIE 3)
//! POLYGONS <q>                             then q polygon rows
//! CONNECTORS <c>                           then c rows of "x y z"             (optional)
//! ANIMOBJECT <k>                           then k rows of "t tx ty tz rx ry rz" (optional)
//! ```
//!
//! A polygon row is `<hex flags> 3 a b c [frames rate width height] u0 v0 u1 v1 u2 v2`, where
//! the bracketed texture array record is present iff the polygon has [POLY_TEXTURE_ARRAY] set.
//!
//! # Versions
//!
//! * PIE 2: texture coordinates are integer texels relative to the texture page size; no
//!   normals, no texture arrays, at most one animation frame per level.
//! * PIE 3: normalised floating-point texture coordinates, optional per-point normals, texture
//!   arrays, any number of frames.
//!
//! Polygons wind clockwise when viewed from the front.

mod convert;
mod error;
mod section;
pub mod v2;
pub mod v3;

pub use error::*;
pub use v2::{Pie2Level, Pie2Model, Pie2Polygon};
pub use v3::{Pie3Level, Pie3Model, Pie3Polygon};

use std::io::{BufRead, Seek};

use nalgebra::Vector3;

/// Model flag: polygons are textured.
pub const PIE_TEXTURED: u32 = 0x200;
/// Model flag: the texture page carries a team-colour mask.
pub const PIE_TEAM_COLOURS: u32 = 0x10000;

/// Polygon flag: the polygon samples the texture page.
pub const POLY_TEXTURED: u32 = 0x200;
/// Polygon flag: the polygon cycles through a texture array (PIE 3 only).
pub const POLY_TEXTURE_ARRAY: u32 = 0x4000;

/// Texture page size assumed when a header leaves it unspecified.
pub const DEFAULT_PAGE_SIZE: u32 = 256;

/// Revision of the PIE format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieVersion {
    V2 = 2,
    V3 = 3,
}

impl PieVersion {
    #[inline]
    pub fn number(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for PieVersion {
    type Error = PieError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(PieError::UnknownVersion(other)),
        }
    }
}

impl std::fmt::Display for PieVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// The `TEXTURE` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePage {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl TexturePage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: 0,
            height: 0,
        }
    }

    /// Page dimensions used for texel conversion, substituting [DEFAULT_PAGE_SIZE] for zero.
    pub fn texel_size(page: Option<&TexturePage>) -> (u32, u32) {
        let or_default = |n: u32| if n == 0 { DEFAULT_PAGE_SIZE } else { n };
        match page {
            Some(p) => (or_default(p.width), or_default(p.height)),
            None => (DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE),
        }
    }
}

/// One key of a level's transform animation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PieFrame {
    pub time: f32,
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

/// A PIE 3 animated texture: the polygon steps through `frames` tiles of `width`×`height`
/// (normalised units), advancing every `rate` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureArray {
    pub frames: u32,
    pub rate: u32,
    pub width: f32,
    pub height: f32,
}

/// A PIE model of either version.
#[derive(Debug, Clone, PartialEq)]
pub enum PieModel {
    V2(Pie2Model),
    V3(Pie3Model),
}

impl PieModel {
    /// Probe the version, then parse the whole stream with the matching reader.
    pub fn read<R: BufRead + Seek>(stream: &mut R) -> Result<Self, PieError> {
        match detect_version(stream)? {
            PieVersion::V2 => Pie2Model::read(stream).map(Self::V2),
            PieVersion::V3 => Pie3Model::read(stream).map(Self::V3),
        }
    }

    pub fn version(&self) -> PieVersion {
        match self {
            PieModel::V2(_) => PieVersion::V2,
            PieModel::V3(_) => PieVersion::V3,
        }
    }

    /// Upgrade to the newest revision; lossless.
    pub fn into_v3(self) -> Pie3Model {
        match self {
            PieModel::V2(m) => m.into(),
            PieModel::V3(m) => m,
        }
    }
}

/// Parse a `PIE <n>` signature line.
pub(crate) fn parse_signature(line: &str) -> Result<u32, PieError> {
    let mut fields = line.split_whitespace();
    if fields.next() != Some("PIE") {
        return Err(PieError::NotPie);
    }
    let number = fields.next().ok_or(PieError::NotPie)?;
    if fields.next().is_some() {
        return Err(PieError::NotPie);
    }
    number.parse().map_err(|_| PieError::NotPie)
}

/// Determine the PIE version of `stream` without consuming it.
///
/// Reads the first non-blank line, then seeks back to where the stream was, so the caller can
/// hand the same stream to the matching reader.
pub fn detect_version<R: BufRead + Seek>(stream: &mut R) -> Result<PieVersion, PieError> {
    let line = wzmodel_common::probe_first_line(stream)?.ok_or(PieError::NotPie)?;
    let version = PieVersion::try_from(parse_signature(&line)?)?;
    tracing::trace!(%version, "detected PIE version");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn signature() {
        assert_eq!(parse_signature("PIE 2").unwrap(), 2);
        assert_eq!(parse_signature("  PIE   3 ").unwrap(), 3);
        assert!(matches!(parse_signature("WZM 2"), Err(PieError::NotPie)));
        assert!(matches!(parse_signature("PIE"), Err(PieError::NotPie)));
        assert!(matches!(parse_signature("PIE x"), Err(PieError::NotPie)));
        assert!(matches!(parse_signature("PIE 3 3"), Err(PieError::NotPie)));
    }

    #[test]
    fn detect_does_not_consume() {
        let mut c = Cursor::new("PIE 3\nTYPE 200\nLEVELS 0\n");
        assert_eq!(detect_version(&mut c).unwrap(), PieVersion::V3);
        assert_eq!(c.position(), 0);
        assert!(matches!(
            detect_version(&mut Cursor::new("PIE 7\n")),
            Err(PieError::UnknownVersion(7))
        ));
        assert!(matches!(
            detect_version(&mut Cursor::new("")),
            Err(PieError::NotPie)
        ));
    }

    #[test]
    fn texel_size_defaults() {
        assert_eq!(TexturePage::texel_size(None), (256, 256));
        let page = TexturePage {
            name: "page-7.png".into(),
            width: 512,
            height: 0,
        };
        assert_eq!(TexturePage::texel_size(Some(&page)), (512, 256));
    }
}
