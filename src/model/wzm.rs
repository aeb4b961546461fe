use std::io::{self, BufRead, Write};

use wzmodel_common::{capacity_hint, RecordReader};

use super::Model;
use crate::mesh::sanitize_name;
use crate::{Error, Mesh};

/// The only WZM revision this crate reads and writes.
pub const WZM_VERSION: u32 = 2;

impl Model {
    /// Read a complete WZM file. Nothing is returned unless every mesh parsed.
    pub fn read<R: BufRead>(stream: R) -> Result<Self, Error> {
        let mut r = RecordReader::new(stream);
        let signature = r.directive("WZM")?;
        let [version] = signature.values::<u32, 1>(1)?;
        if version != WZM_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let texture = r
            .optional("TEXTURE")?
            .map(|rec| rec.rest().to_owned())
            .filter(|name| !name.is_empty());
        let tcmask = r
            .optional("TCMASK")?
            .map(|rec| rec.rest().to_owned())
            .filter(|name| !name.is_empty());
        let count = r.count("MESHES")?;
        let mut meshes = Vec::with_capacity(capacity_hint(count));
        for _ in 0..count {
            meshes.push(Mesh::read_records(&mut r)?);
        }
        r.finish()?;

        tracing::debug!(meshes = meshes.len(), "read WZM model");
        Ok(Self {
            meshes,
            texture,
            tcmask,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "WZM {WZM_VERSION}")?;
        for (directive, page) in [("TEXTURE", &self.texture), ("TCMASK", &self.tcmask)] {
            let Some(page) = page else { continue };
            let page = sanitize_name(page);
            if !page.is_empty() {
                writeln!(w, "{directive} {page}")?;
            }
        }
        writeln!(w, "MESHES {}", self.meshes.len())?;
        for mesh in &self.meshes {
            mesh.write(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::mesh::tests::right_triangle;

    #[test]
    fn empty_model() {
        let mut out = Vec::new();
        Model::new().write(&mut out).unwrap();
        assert_eq!(out, b"WZM 2\nMESHES 0\n");
        assert_eq!(Model::read(Cursor::new(out)).unwrap(), Model::new());
    }

    #[test]
    fn texture_and_meshes_round_trip() {
        let mut model = Model::new();
        model.set_texture(Some("page-7-barbarians-arizona.png".into()));
        model.set_tcmask(Some("page-7_tcmask.png".into()));
        model.push(right_triangle());
        let mut empty = Mesh::with_name("nothing here");
        empty.set_team_colours(true);
        model.push(empty);

        let mut out = Vec::new();
        model.write(&mut out).unwrap();
        assert_eq!(Model::read(Cursor::new(out)).unwrap(), model);
    }

    #[test]
    fn tcmask_follows_texture() {
        let text = "WZM 2\nTEXTURE page-7.png\nTCMASK page-7 tcmask.png\nMESHES 0\n";
        let model = Model::read(Cursor::new(text)).unwrap();
        assert_eq!(model.texture(), Some("page-7.png"));
        assert_eq!(model.tcmask(), Some("page-7 tcmask.png"));
        let mut out = Vec::new();
        model.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), text);

        let bare = Model::read(Cursor::new("WZM 2\nMESHES 0\n")).unwrap();
        assert_eq!(bare.tcmask(), None);
    }

    #[test]
    fn rejects_other_versions_and_trailing_data() {
        assert!(matches!(
            Model::read(Cursor::new("WZM 3\nMESHES 0\n")),
            Err(Error::UnsupportedVersion(3))
        ));
        assert!(Model::read(Cursor::new("PIE 2\n")).is_err());
        assert!(Model::read(Cursor::new("WZM 2\nMESHES 0\nMESH extra\n")).is_err());
        assert!(Model::read(Cursor::new("WZM 2\nMESHES 1\n")).is_err());
    }
}
