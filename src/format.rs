//! Format detection and path-based load/save.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, Write};
use std::path::Path;

use pie::PieVersion;
use wzmodel_common::probe_first_line;

use crate::{Error, Model};

/// The model formats this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Wzm,
    Pie(PieVersion),
    Obj,
}

/// First keywords that only appear at the top of OBJ files.
const OBJ_KEYWORDS: &[&str] = &[
    "#", "v", "vt", "vn", "vp", "f", "o", "g", "s", "mtllib", "usemtl",
];

impl Format {
    /// Classify a file by extension, case-insensitively. `.pie` files are opened and probed
    /// for their version.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("wzm") => Ok(Self::Wzm),
            Some("obj") => Ok(Self::Obj),
            Some("pie") => {
                let mut stream = BufReader::new(File::open(path)?);
                Ok(Self::Pie(pie::detect_version(&mut stream)?))
            }
            _ => Err(Error::UnknownFormat),
        }
    }

    /// Classify a stream by its first non-blank line; the stream is rewound afterwards.
    pub fn sniff<R: BufRead + Seek>(stream: &mut R) -> Result<Self, Error> {
        let line = probe_first_line(stream)?.ok_or(Error::UnknownFormat)?;
        let keyword = line.split_whitespace().next().unwrap_or_default();
        match keyword {
            "WZM" => Ok(Self::Wzm),
            "PIE" => Ok(Self::Pie(pie::detect_version(stream)?)),
            k if OBJ_KEYWORDS.contains(&k) || k.starts_with('#') => Ok(Self::Obj),
            _ => Err(Error::UnknownFormat),
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wzm => "wzm",
            Self::Pie(_) => "pie",
            Self::Obj => "obj",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wzm => f.write_str("WZM"),
            Self::Pie(v) => write!(f, "PIE {v}"),
            Self::Obj => f.write_str("OBJ"),
        }
    }
}

impl Model {
    pub fn read_format<R: BufRead>(stream: R, format: Format) -> Result<Self, Error> {
        match format {
            Format::Wzm => Self::read(stream),
            Format::Pie(version) => Self::read_pie(stream, version),
            Format::Obj => Self::import_obj(stream),
        }
    }

    pub fn write_format<W: Write>(&self, w: &mut W, format: Format) -> Result<(), Error> {
        match format {
            Format::Wzm => self.write(w)?,
            Format::Pie(version) => self.write_pie(w, version)?,
            Format::Obj => {
                if self.texture().is_some()
                    || self.tcmask().is_some()
                    || self.meshes().iter().any(|m| m.team_colours())
                {
                    tracing::debug!("OBJ does not keep texture pages or team colours");
                }
                self.export_obj(w)?
            }
        }
        Ok(())
    }
}

/// Load a model, choosing the format from the extension or, failing that, the content.
pub fn load(path: impl AsRef<Path>) -> Result<Model, Error> {
    let path = path.as_ref();
    let mut stream = BufReader::new(File::open(path)?);
    let format = match Format::from_path(path) {
        Ok(format) => format,
        Err(Error::UnknownFormat) => Format::sniff(&mut stream)?,
        Err(e) => return Err(e),
    };
    tracing::debug!(path = %path.display(), %format, "loading model");
    Model::read_format(stream, format)
}

/// Save `model` to `path` in `format`, replacing any existing file.
pub fn save(path: impl AsRef<Path>, format: Format, model: &Model) -> Result<(), Error> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), %format, "saving model");
    let mut w = BufWriter::new(File::create(path)?);
    model.write_format(&mut w, format)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn sniffs_and_rewinds() {
        let cases = [
            ("WZM 2\nMESHES 0\n", Format::Wzm),
            ("\n\nPIE 3\nTYPE 200\n", Format::Pie(PieVersion::V3)),
            ("PIE 2\n", Format::Pie(PieVersion::V2)),
            ("# exported\nv 0 0 0\n", Format::Obj),
            ("#no space\n", Format::Obj),
            ("o thing\n", Format::Obj),
        ];
        for (text, expected) in cases {
            let mut c = Cursor::new(text);
            assert_eq!(Format::sniff(&mut c).unwrap(), expected, "{text:?}");
            assert_eq!(c.position(), 0);
        }
    }

    #[test]
    fn unknown_content() {
        for junk in ["", "MESH a\n", "PIE 7\n"] {
            assert!(Format::sniff(&mut Cursor::new(junk)).is_err(), "{junk:?}");
        }
        assert!(matches!(
            Format::sniff(&mut Cursor::new(vec![0xffu8, 0xfe, 0x00])),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn extensions() {
        assert_eq!(Format::from_path("a/b/MODEL.WZM").unwrap(), Format::Wzm);
        assert_eq!(Format::from_path("thing.Obj").unwrap(), Format::Obj);
        assert!(matches!(
            Format::from_path("thing.fbx"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(Format::from_path("noext"), Err(Error::UnknownFormat)));
        // .pie has to be opened
        assert!(matches!(
            Format::from_path("/nonexistent/x.pie"),
            Err(Error::Io(_))
        ));
        assert_eq!(Format::Pie(PieVersion::V2).to_string(), "PIE 2");
        assert_eq!(Format::Obj.extension(), "obj");
    }
}
