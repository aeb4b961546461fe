use std::io::{BufRead, Write};

use pie::{
    Pie2Model, Pie3Model, PieModel, PieVersion, TexturePage, PIE_TEAM_COLOURS, PIE_TEXTURED,
};

use super::Model;
use crate::mesh::sanitize_name;
use crate::{Error, Mesh};

impl TryFrom<&Pie3Model> for Model {
    type Error = Error;

    /// One mesh per level. Every mesh inherits the model's team-colour flag.
    fn try_from(pie: &Pie3Model) -> Result<Self, Self::Error> {
        let team_colours = pie.flags & PIE_TEAM_COLOURS != 0;
        let mut meshes = Vec::with_capacity(pie.levels.len());
        for level in &pie.levels {
            let mut mesh = Mesh::try_from(level)?;
            mesh.set_team_colours(team_colours);
            meshes.push(mesh);
        }
        Ok(Self {
            meshes,
            texture: pie.texture.as_ref().map(|page| page.name.clone()),
            tcmask: None,
        })
    }
}

impl Model {
    /// Build a PIE 3 model with one level per mesh.
    ///
    /// The team-colour type flag is set when any mesh has team colours.
    pub fn back_convert(&self) -> Pie3Model {
        let mut flags = PIE_TEXTURED;
        if self.meshes.iter().any(Mesh::team_colours) {
            flags |= PIE_TEAM_COLOURS;
        }
        let named = self.meshes.iter().filter(|m| !m.name().is_empty()).count();
        if named > 0 {
            tracing::debug!(meshes = named, "PIE levels do not keep mesh names");
        }
        if self.tcmask.is_some() {
            tracing::debug!("PIE does not keep the team-colour mask page");
        }
        Pie3Model {
            flags,
            texture: self
                .texture
                .as_deref()
                .map(sanitize_name)
                .filter(|name| !name.is_empty())
                .map(TexturePage::new),
            levels: self.meshes.iter().map(Mesh::back_convert).collect(),
        }
    }

    /// Read a PIE stream of the given version.
    pub fn read_pie<R: BufRead>(stream: R, version: PieVersion) -> Result<Self, Error> {
        let pie = match version {
            PieVersion::V2 => PieModel::V2(Pie2Model::read(stream)?),
            PieVersion::V3 => PieModel::V3(Pie3Model::read(stream)?),
        };
        Self::try_from(&pie.into_v3())
    }

    /// Write as PIE 3, or back-convert to PIE 2.
    pub fn write_pie<W: Write>(&self, w: &mut W, version: PieVersion) -> Result<(), Error> {
        let pie = self.back_convert();
        match version {
            PieVersion::V2 => pie.back_convert().write(w)?,
            PieVersion::V3 => pie.write(w)?,
        }
        Ok(())
    }
}
