/*
ptanks
Copyright (C) 2025  Oreste Bernardi

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! Object-space decal painting.
//!
//! A [`DecalPainter`] owns one persistent accumulation texture per paintable
//! mesh and bakes brush stamps into it. A stamp is projected onto the mesh
//! in object space: every texel covered by the mesh UV layout is mapped back
//! to its position on the surface, that position is projected onto the
//! tangent frame of the paint point, and the brush image is sampled there.
//! The result is composited over the accumulation texture, so paint
//! persists, layers and follows the real surface geometry at any view angle.

mod brush;
mod mesh;
mod painter;
mod raster;
mod texture;

pub use brush::BrushStamp;
pub use mesh::TriangleMesh;
pub use painter::{DecalPainter, ProjectionParameters};
pub use texture::Texture;

use thiserror::Error;

/// RGBA color, components in range [0.0,1.0].
pub type Color = [f32; 4];

pub const COLOR_WHITE: Color = [1.0, 1.0, 1.0, 1.0];
pub const COLOR_TRANSPARENT: Color = [0.0, 0.0, 0.0, 0.0];

#[derive(Error, Debug)]
pub enum PaintError {
    /// A resource required by the stamping pass could not be acquired.
    /// Surfaces hit by this error stay unpainted for their whole lifetime.
    #[error("painting resource unavailable: {0}")]
    ResourceInitialization(String),
    /// Geometry unusable for UV-space stamping.
    #[error("invalid mesh: {0}")]
    InvalidMesh(&'static str),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
