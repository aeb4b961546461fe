//! Mesh data model for game models, with conversion between the native WZM text format, the
//! legacy PIE 2 / PIE 3 formats and Wavefront OBJ.
//!
//! A [Model] is an ordered list of [Meshes](Mesh) sharing one texture page. Meshes keep their
//! vertex attributes in parallel arrays and carry connectors (attachment points) and animation
//! frames. Every reader either produces a complete, valid value or an [Error]; nothing is
//! partially loaded.
//!
//! ```no_run
//! use wzmodel::{Axis, Format, MeshSelection, PieVersion};
//!
//! let mut model = wzmodel::load("tank.pie")?;
//! model.scale(MeshSelection::All, 2.0, 2.0, 2.0)?;
//! model.mirror(MeshSelection::Index(0), Axis::X)?;
//! wzmodel::save("tank.wzm", Format::Wzm, &model)?;
//! wzmodel::save("tank-old.pie", Format::Pie(PieVersion::V2), &model)?;
//! # Ok::<(), wzmodel::Error>(())
//! ```
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

mod bounds;
pub mod error;
mod format;
pub mod mesh;
pub mod model;
mod vector;

pub use bounds::*;
pub use error::{Error, Result};
pub use format::*;
pub use mesh::*;
pub use model::*;
pub use vector::*;

pub use pie::PieVersion;
