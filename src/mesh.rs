//! The [Mesh] aggregate: parallel vertex attribute arrays, triangles, connectors and frames.
//!
//! # Invariants
//!
//! * every attribute array is either empty (feature absent) or as long as the position array
//! * every triangle index is less than the number of positions
//! * the cached [BoundData] describes the current positions and tangents
//!
//! Triangles wind counter-clockwise when viewed from the front.

mod obj;
mod pie;
mod tangent;
mod transform;
mod wzm;

pub use obj::*;
pub use transform::Axis;
pub(crate) use wzm::sanitize_name;

use nalgebra::{Point3, Vector3};

use crate::{centroid, Aabb, Error, Normal, Position, Tangent, Uv};

/// Three indices into a mesh's vertex arrays, in winding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexedTri(pub [u32; 3]);

impl IndexedTri {
    #[inline]
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self([a, b, c])
    }

    #[inline]
    pub fn indices(&self) -> [u32; 3] {
        self.0
    }

    /// The same face with opposite winding; the first index is kept in place.
    #[inline]
    pub fn reversed(self) -> Self {
        let [a, b, c] = self.0;
        Self([a, c, b])
    }

    #[inline]
    pub fn reverse(&mut self) {
        self.0.swap(1, 2);
    }
}

impl From<[u32; 3]> for IndexedTri {
    fn from(value: [u32; 3]) -> Self {
        Self(value)
    }
}

/// An attachment point for external objects (weapons, effects, ...).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Connector {
    pub position: Position,
}

impl Connector {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Position::new(x, y, z),
        }
    }
}

impl From<Position> for Connector {
    fn from(position: Position) -> Self {
        Self { position }
    }
}

/// One key of a mesh's transform animation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub time: f32,
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

/// One vertex's worth of attributes, as appended by importers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub position: Position,
    pub uv: Uv,
    /// A zero normal is filled in by [Mesh::finish_import].
    pub normal: Normal,
}

/// Geometry derived from a mesh's attribute arrays.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundData {
    /// Arithmetic mean of the positions.
    pub center: Point3<f32>,
    pub aabb: Aabb<f32>,
    /// Arithmetic mean of the tangent directions.
    pub tangent_space_center: Vector3<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    name: String,
    team_colours: bool,

    positions: Vec<Position>,
    normals: Vec<Normal>,
    uvs: Vec<Uv>,
    tangents: Vec<Tangent>,
    /// Only synthesised for imported meshes; not a stable geometric invariant.
    bitangents: Vec<Vector3<f32>>,
    triangles: Vec<IndexedTri>,

    connectors: Vec<Connector>,
    frames: Vec<Frame>,

    bounds: BoundData,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reset every array, flag and cached value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn team_colours(&self) -> bool {
        self.team_colours
    }

    pub fn set_team_colours(&mut self, tc: bool) {
        self.team_colours = tc;
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn normals(&self) -> &[Normal] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Uv] {
        &self.uvs
    }

    pub fn tangents(&self) -> &[Tangent] {
        &self.tangents
    }

    pub fn bitangents(&self) -> &[Vector3<f32>] {
        &self.bitangents
    }

    pub fn triangles(&self) -> &[IndexedTri] {
        &self.triangles
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn index_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn connector(&self, index: usize) -> Result<&Connector, Error> {
        self.connectors.get(index).ok_or(Error::OutOfRange {
            what: "connector",
            index,
            len: self.connectors.len(),
        })
    }

    pub fn add_connector(&mut self, conn: Connector) {
        self.connectors.push(conn);
    }

    /// Remove the connector at `index`; later connectors shift down by one.
    pub fn remove_connector(&mut self, index: usize) -> Result<Connector, Error> {
        if index >= self.connectors.len() {
            return Err(Error::OutOfRange {
                what: "connector",
                index,
                len: self.connectors.len(),
            });
        }
        Ok(self.connectors.remove(index))
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn bounds(&self) -> &BoundData {
        &self.bounds
    }

    /// The arithmetic mean of the positions.
    pub fn center_point(&self) -> Point3<f32> {
        self.bounds.center
    }

    pub fn tangent_space_center(&self) -> Vector3<f32> {
        self.bounds.tangent_space_center
    }

    /// Capacity hint; does not change the contents.
    pub fn reserve_points(&mut self, additional: usize) {
        self.positions.reserve(additional);
        self.normals.reserve(additional);
        self.uvs.reserve(additional);
    }

    /// Capacity hint; does not change the contents.
    pub fn reserve_indices(&mut self, additional: usize) {
        self.triangles.reserve(additional);
    }

    /// Append one vertex. Call [Mesh::finish_import] once all points and indices are in.
    pub fn add_point(&mut self, point: Point) {
        self.positions.push(point.position);
        self.uvs.push(point.uv);
        self.normals.push(point.normal);
    }

    pub fn add_indices(&mut self, tri: IndexedTri) {
        self.triangles.push(tri);
    }

    /// Complete a bulk import: validate indices, fill in missing normals, synthesise tangents
    /// when none were supplied and recompute the bound data.
    ///
    /// On error the mesh is cleared.
    pub fn finish_import(&mut self) -> Result<(), Error> {
        if let Err(e) = self.validate() {
            self.clear();
            return Err(e);
        }
        self.fill_normals();
        if self.tangents.is_empty() {
            self.generate_tangents();
        }
        self.recalculate_bound_data();
        tracing::trace!(
            name = self.name.as_str(),
            vertices = self.vertex_count(),
            triangles = self.index_count(),
            "finished mesh import"
        );
        Ok(())
    }

    /// Check the array-length and index invariants.
    pub fn validate(&self) -> Result<(), Error> {
        let expected = self.positions.len();
        let lengths = [
            ("normal", self.normals.len()),
            ("texture coordinate", self.uvs.len()),
            ("tangent", self.tangents.len()),
            ("bitangent", self.bitangents.len()),
        ];
        if let Some(&(array, len)) = lengths
            .iter()
            .find(|(_, len)| *len != 0 && *len != expected)
        {
            return Err(Error::MismatchedArray {
                array,
                len,
                expected,
            });
        }
        for tri in &self.triangles {
            if let Some(&index) = tri.0.iter().find(|&&i| i as usize >= expected) {
                return Err(Error::OutOfRange {
                    what: "vertex",
                    index: index as usize,
                    len: expected,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Recompute the centroid, bounding box and tangent-space center.
    pub fn recalculate_bound_data(&mut self) {
        if self.positions.is_empty() {
            self.bounds = BoundData::default();
            return;
        }
        let center = centroid(&self.positions).unwrap_or_else(Point3::origin);
        let mut aabb = Aabb::empty();
        for p in &self.positions {
            aabb.expand_to(&Point3::from(*p));
        }
        let tangent_space_center = centroid(self.tangents.iter().map(|t| &t.direction))
            .map_or_else(Vector3::zeros, |p| p.coords);
        self.bounds = BoundData {
            center,
            aabb,
            tangent_space_center,
        };
    }
}
