//! An ordered collection of meshes sharing one texture page.

mod obj;
mod pie;
mod wzm;

pub use wzm::WZM_VERSION;

use nalgebra::Point3;

use crate::{centroid, Aabb, Axis, Error, Mesh};

/// Which meshes of a [Model] a transform applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshSelection {
    #[default]
    All,
    Index(usize),
}

impl From<Option<usize>> for MeshSelection {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Self::All, Self::Index)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    meshes: Vec<Mesh>,
    texture: Option<String>,
    tcmask: Option<String>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        self.texture = None;
        self.tcmask = None;
    }

    /// Name of the texture page shared by every mesh.
    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    pub fn set_texture(&mut self, texture: Option<String>) {
        self.texture = texture;
    }

    /// Name of the team-colour mask page that goes with [Model::texture].
    pub fn tcmask(&self) -> Option<&str> {
        self.tcmask.as_deref()
    }

    pub fn set_tcmask(&mut self, tcmask: Option<String>) {
        self.tcmask = tcmask;
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn mesh(&self, index: usize) -> Result<&Mesh, Error> {
        let count = self.meshes.len();
        self.meshes
            .get(index)
            .ok_or(Error::NoSuchMesh { index, count })
    }

    pub fn mesh_mut(&mut self, index: usize) -> Result<&mut Mesh, Error> {
        let count = self.meshes.len();
        self.meshes
            .get_mut(index)
            .ok_or(Error::NoSuchMesh { index, count })
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn remove(&mut self, index: usize) -> Result<Mesh, Error> {
        if index >= self.meshes.len() {
            return Err(Error::NoSuchMesh {
                index,
                count: self.meshes.len(),
            });
        }
        Ok(self.meshes.remove(index))
    }

    fn selected(&mut self, selection: MeshSelection) -> Result<&mut [Mesh], Error> {
        match selection {
            MeshSelection::All => Ok(&mut self.meshes),
            MeshSelection::Index(i) => self.mesh_mut(i).map(std::slice::from_mut),
        }
    }

    pub fn scale(&mut self, selection: MeshSelection, x: f32, y: f32, z: f32) -> Result<(), Error> {
        for mesh in self.selected(selection)? {
            mesh.scale(x, y, z);
        }
        Ok(())
    }

    /// Mirror the whole model about its centroid, or a single mesh about its own.
    pub fn mirror(&mut self, selection: MeshSelection, axis: Axis) -> Result<(), Error> {
        match selection {
            MeshSelection::All => {
                let center = self.center_point();
                for mesh in &mut self.meshes {
                    mesh.mirror_from_point(&center, axis);
                }
            }
            MeshSelection::Index(i) => self.mesh_mut(i)?.mirror_using_local_center(axis),
        }
        Ok(())
    }

    pub fn reverse_winding(&mut self, selection: MeshSelection) -> Result<(), Error> {
        for mesh in self.selected(selection)? {
            mesh.reverse_winding();
        }
        Ok(())
    }

    /// Bounding box of every mesh with at least one vertex.
    pub fn bounds(&self) -> Aabb<f32> {
        self.meshes
            .iter()
            .filter(|m| !m.is_empty())
            .fold(Aabb::empty(), |acc, m| acc.union(&m.bounds().aabb))
    }

    /// Mean of every vertex position in the model.
    pub fn center_point(&self) -> Point3<f32> {
        centroid(self.meshes.iter().flat_map(|m| m.positions())).unwrap_or_else(Point3::origin)
    }
}
