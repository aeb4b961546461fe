//! Record-level pieces shared by both PIE revisions.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use nalgebra::Vector3;
use wzmodel_common::{capacity_hint, Record, RecordReader};

use crate::{
    parse_signature, PieError, PieFrame, PieVersion, TextureArray, TexturePage, POLY_TEXTURE_ARRAY,
};

#[derive(Debug)]
pub(crate) struct Header {
    pub flags: u32,
    pub texture: Option<TexturePage>,
    pub levels: usize,
}

fn parse_hex(rec: &Record, index: usize) -> Result<u32, PieError> {
    let field = rec
        .fields()
        .nth(index)
        .ok_or_else(|| rec.error(format!("missing field {index}")))?;
    u32::from_str_radix(field, 16)
        .map_err(|_| rec.error(format!("invalid hexadecimal flags {field:?}")).into())
}

/// `TEXTURE <index> <page> <width> <height>`, where the page name may contain spaces.
fn parse_texture(rec: &Record) -> Result<TexturePage, PieError> {
    let bad = || rec.error("expected TEXTURE <index> <page> <width> <height>");
    if rec.field_count() < 5 {
        return Err(bad().into());
    }
    let (_, tail) = rec.rest().split_once(char::is_whitespace).ok_or_else(bad)?;
    let (tail, height) = tail.trim_end().rsplit_once(char::is_whitespace).ok_or_else(bad)?;
    let (name, width) = tail.trim_end().rsplit_once(char::is_whitespace).ok_or_else(bad)?;
    let size = |field: &str| {
        field
            .parse::<u32>()
            .map_err(|_| rec.error(format!("invalid texture size {field:?}")))
    };
    Ok(TexturePage {
        name: name.trim().to_owned(),
        width: size(width)?,
        height: size(height)?,
    })
}

pub(crate) fn read_header<R: BufRead>(
    r: &mut RecordReader<R>,
    expected: PieVersion,
) -> Result<Header, PieError> {
    let sig = r.require("PIE signature")?;
    let found = parse_signature(sig.text())?;
    if found != expected.number() {
        return Err(PieError::VersionMismatch { expected, found });
    }

    let ty = r.directive("TYPE")?;
    if ty.field_count() != 2 {
        return Err(ty.error("TYPE takes exactly one value").into());
    }
    let flags = parse_hex(&ty, 1)?;

    let texture = match r.optional("TEXTURE")? {
        Some(rec) => Some(parse_texture(&rec)?),
        None => None,
    };

    let levels = r.count("LEVELS")?;
    tracing::trace!(version = %expected, flags, levels, "read PIE header");
    Ok(Header {
        flags,
        texture,
        levels,
    })
}

pub(crate) fn write_header<W: Write>(
    w: &mut W,
    version: PieVersion,
    flags: u32,
    texture: Option<&TexturePage>,
    levels: usize,
) -> io::Result<()> {
    writeln!(w, "PIE {version}")?;
    writeln!(w, "TYPE {flags:x}")?;
    if let Some(page) = texture {
        // the header is one line
        let name = page.name.replace(['\r', '\n'], " ");
        let name = name.trim();
        if !name.is_empty() {
            writeln!(w, "TEXTURE 0 {name} {} {}", page.width, page.height)?;
        }
    }
    writeln!(w, "LEVELS {levels}")
}

pub(crate) fn read_level_marker<R: BufRead>(
    r: &mut RecordReader<R>,
    index: usize,
) -> Result<(), PieError> {
    let rec = r.directive("LEVEL")?;
    let [n] = rec.values::<usize, 1>(1)?;
    if n != index + 1 {
        return Err(rec
            .error(format!("expected LEVEL {}, found LEVEL {n}", index + 1))
            .into());
    }
    Ok(())
}

/// Read a `KEYWORD <n>` section of `n` three-component rows.
pub(crate) fn read_vectors<R: BufRead>(
    r: &mut RecordReader<R>,
    keyword: &str,
) -> Result<Vec<Vector3<f32>>, PieError> {
    let n = r.count(keyword)?;
    Ok(r
        .rows::<f32, 3>(n, keyword)?
        .into_iter()
        .map(|[x, y, z]| Vector3::new(x, y, z))
        .collect())
}

pub(crate) fn read_optional_vectors<R: BufRead>(
    r: &mut RecordReader<R>,
    keyword: &str,
) -> Result<Vec<Vector3<f32>>, PieError> {
    match r.peek()? {
        Some(rec) if rec.keyword() == keyword => read_vectors(r, keyword),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn write_vectors<W: Write>(
    w: &mut W,
    keyword: &str,
    vectors: &[Vector3<f32>],
) -> io::Result<()> {
    writeln!(w, "{keyword} {}", vectors.len())?;
    for v in vectors {
        writeln!(w, "\t{} {} {}", v.x, v.y, v.z)?;
    }
    Ok(())
}

pub(crate) fn read_frames<R: BufRead>(r: &mut RecordReader<R>) -> Result<Vec<PieFrame>, PieError> {
    let n = match r.optional("ANIMOBJECT")? {
        Some(rec) => rec.count("ANIMOBJECT")?,
        None => return Ok(Vec::new()),
    };
    let mut frames = Vec::with_capacity(capacity_hint(n));
    for [time, tx, ty, tz, rx, ry, rz] in r.rows::<f32, 7>(n, "animation frame")? {
        frames.push(PieFrame {
            time,
            translation: nalgebra::vector![tx, ty, tz],
            rotation: nalgebra::vector![rx, ry, rz],
        });
    }
    Ok(frames)
}

pub(crate) fn write_frames<W: Write>(w: &mut W, frames: &[PieFrame]) -> io::Result<()> {
    if frames.is_empty() {
        return Ok(());
    }
    writeln!(w, "ANIMOBJECT {}", frames.len())?;
    for f in frames {
        let (t, r) = (&f.translation, &f.rotation);
        writeln!(
            w,
            "\t{} {} {} {} {} {} {}",
            f.time, t.x, t.y, t.z, r.x, r.y, r.z
        )?;
    }
    Ok(())
}

/// The fields of a polygon row, before version-specific interpretation of the texture
/// coordinates.
#[derive(Debug)]
pub(crate) struct PolygonRow<T> {
    pub flags: u32,
    pub indices: [u32; 3],
    pub texture_array: Option<TextureArray>,
    pub texcoords: [[T; 2]; 3],
}

pub(crate) fn parse_polygon<T: FromStr + Copy + Default>(
    rec: &Record,
) -> Result<PolygonRow<T>, PieError> {
    let flags = parse_hex(rec, 0)?;
    let corners: usize = rec.parse(1)?;
    if corners != 3 {
        return Err(rec
            .error(format!("only triangles are supported, found {corners} corners"))
            .into());
    }
    let indices: [u32; 3] = [rec.parse(2)?, rec.parse(3)?, rec.parse(4)?];
    let mut next = 5;
    let texture_array = if flags & POLY_TEXTURE_ARRAY != 0 {
        let ta = TextureArray {
            frames: rec.parse(5)?,
            rate: rec.parse(6)?,
            width: rec.parse(7)?,
            height: rec.parse(8)?,
        };
        next = 9;
        Some(ta)
    } else {
        None
    };
    let [u0, v0, u1, v1, u2, v2] = rec.values::<T, 6>(next)?;
    Ok(PolygonRow {
        flags,
        indices,
        texture_array,
        texcoords: [[u0, v0], [u1, v1], [u2, v2]],
    })
}

pub(crate) fn write_polygon<W: Write, T: std::fmt::Display>(
    w: &mut W,
    row: &PolygonRow<T>,
) -> io::Result<()> {
    let [a, b, c] = row.indices;
    // the array record is only read back when the flag is set
    let flags = match row.texture_array {
        Some(_) => row.flags | POLY_TEXTURE_ARRAY,
        None => row.flags & !POLY_TEXTURE_ARRAY,
    };
    write!(w, "\t{flags:x} 3 {a} {b} {c}")?;
    if let Some(ta) = &row.texture_array {
        write!(w, " {} {} {} {}", ta.frames, ta.rate, ta.width, ta.height)?;
    }
    for [u, v] in &row.texcoords {
        write!(w, " {u} {v}")?;
    }
    writeln!(w)
}

pub(crate) fn check_indices(
    level: usize,
    polygon: usize,
    indices: &[u32; 3],
    points: usize,
) -> Result<(), PieError> {
    match indices.iter().find(|&&i| i as usize >= points) {
        Some(&index) => Err(PieError::PointOutOfRange {
            level,
            polygon,
            index,
            points,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_names_may_contain_spaces() {
        let rec = Record::new(3, "TEXTURE 0 my  page.png 512 0");
        let page = parse_texture(&rec).unwrap();
        assert_eq!(page.name, "my  page.png");
        assert_eq!((page.width, page.height), (512, 0));

        assert!(parse_texture(&Record::new(3, "TEXTURE 0 page.png 256")).is_err());
        assert!(parse_texture(&Record::new(3, "TEXTURE 0 page.png 256 x")).is_err());
    }

    #[test]
    fn texture_header_stays_on_one_line() {
        let page = TexturePage::new("two\nlines.png");
        let mut out = Vec::new();
        write_header(&mut out, PieVersion::V3, 0x200, Some(&page), 0).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "PIE 3\nTYPE 200\nTEXTURE 0 two lines.png 0 0\nLEVELS 0\n"
        );

        let mut out = Vec::new();
        write_header(&mut out, PieVersion::V2, 0x200, Some(&TexturePage::new(" ")), 0).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("TEXTURE"));
    }
}
