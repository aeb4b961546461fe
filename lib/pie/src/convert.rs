//! Upgrade (PIE 2 → PIE 3) and back-conversion (PIE 3 → PIE 2).
//!
//! Upgrading is lossless. Back-conversion keeps geometry, connectors and the first frame of
//! every level, and deterministically drops what PIE 2 cannot express:
//!
//! * per-point normals
//! * texture arrays (the polygon keeps its static texture coordinates)
//! * every frame after the first
//!
//! Texture coordinates outside `[0, 1]` (tiling, negative offsets) stay outside the page; only
//! the cast to `i32` saturates.

use nalgebra::Vector2;

use crate::{
    Pie2Level, Pie2Model, Pie2Polygon, Pie3Level, Pie3Model, Pie3Polygon, TexturePage,
    POLY_TEXTURE_ARRAY,
};

fn texel_to_unit(texel: i32, size: u32) -> f32 {
    texel as f32 / size as f32
}

fn unit_to_texel(unit: f32, size: u32) -> i32 {
    (unit * size as f32).round() as i32
}

impl From<Pie2Model> for Pie3Model {
    fn from(old: Pie2Model) -> Self {
        let (w, h) = TexturePage::texel_size(old.texture.as_ref());
        let levels = old
            .levels
            .into_iter()
            .map(|level| Pie3Level {
                points: level.points,
                normals: Vec::new(),
                polygons: level
                    .polygons
                    .iter()
                    .map(|p| Pie3Polygon {
                        flags: p.flags,
                        indices: p.indices,
                        texture_array: None,
                        texcoords: p.texcoords.map(|[u, v]| {
                            Vector2::new(texel_to_unit(u, w), texel_to_unit(v, h))
                        }),
                    })
                    .collect(),
                connectors: level.connectors,
                frames: level.frame.into_iter().collect(),
            })
            .collect();
        Self {
            flags: old.flags,
            texture: old.texture,
            levels,
        }
    }
}

impl From<&Pie3Model> for Pie2Model {
    fn from(new: &Pie3Model) -> Self {
        new.back_convert()
    }
}

impl Pie3Model {
    /// Lossy conversion to PIE 2. See the [module documentation](self) for what is dropped.
    pub fn back_convert(&self) -> Pie2Model {
        let (w, h) = TexturePage::texel_size(self.texture.as_ref());
        let mut dropped_normals = 0usize;
        let mut dropped_arrays = 0usize;
        let mut dropped_frames = 0usize;

        let levels = self
            .levels
            .iter()
            .map(|level| {
                dropped_normals += level.normals.len();
                dropped_frames += level.frames.len().saturating_sub(1);
                Pie2Level {
                    points: level.points.clone(),
                    polygons: level
                        .polygons
                        .iter()
                        .map(|p| {
                            if p.texture_array.is_some() {
                                dropped_arrays += 1;
                            }
                            Pie2Polygon {
                                flags: p.flags & !POLY_TEXTURE_ARRAY,
                                indices: p.indices,
                                texcoords: p
                                    .texcoords
                                    .map(|uv| [unit_to_texel(uv.x, w), unit_to_texel(uv.y, h)]),
                            }
                        })
                        .collect(),
                    connectors: level.connectors.clone(),
                    frame: level.frames.first().copied(),
                }
            })
            .collect();

        if dropped_normals + dropped_arrays + dropped_frames > 0 {
            tracing::debug!(
                dropped_normals,
                dropped_arrays,
                dropped_frames,
                "dropped data unsupported by PIE 2"
            );
        }
        Pie2Model {
            flags: self.flags,
            texture: self.texture.clone(),
            levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texels_survive_a_round_trip() {
        for size in [1, 64, 256, 300, 1024, 4096] {
            for texel in 0..=size as i32 {
                assert_eq!(unit_to_texel(texel_to_unit(texel, size), size), texel);
            }
        }
    }

    #[test]
    fn texels_outside_the_page_are_kept() {
        assert_eq!(unit_to_texel(-0.0625, 256), -16);
        assert_eq!(unit_to_texel(1.171875, 256), 300);
        assert_eq!(unit_to_texel(f32::MAX, 256), i32::MAX);
        assert_eq!(unit_to_texel(f32::NEG_INFINITY, 256), i32::MIN);
    }
}
