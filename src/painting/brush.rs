use super::texture::Texture;
use super::{Color, PaintError};
use std::path::Path;

/// Brush stamp image sampled by the stamping pass.
///
/// One stamp is shared read-only by every paintable surface; it is never
/// owned by a single surface. Outside the unit square the stamp is fully
/// transparent, so mesh points beyond the projected footprint receive no
/// paint.
pub struct BrushStamp {
    texture: Texture,
}

impl BrushStamp {
    /// Load the stamp from an image file. A missing or unreadable file is a
    /// [`PaintError::ResourceInitialization`]: the caller is expected to
    /// degrade to unpaintable surfaces rather than abort.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BrushStamp, PaintError> {
        let path = path.as_ref();
        let texture = Texture::load(path).map_err(|err| {
            PaintError::ResourceInitialization(format!(
                "brush stamp {}: {}",
                path.display(),
                err
            ))
        })?;
        Ok(BrushStamp { texture })
    }

    pub fn from_texture(texture: Texture) -> BrushStamp {
        BrushStamp { texture }
    }

    /// Procedural white disc with a radial alpha falloff. `hardness` 1.0
    /// gives a hard-edged disc, lower values feather the edge.
    pub fn soft_circle(size: u32, hardness: f32) -> BrushStamp {
        let mut texture = Texture::filled(size, super::COLOR_TRANSPARENT);
        let radius = size as f32 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 + 0.5) - radius;
                let dy = (y as f32 + 0.5) - radius;
                let distance = (dx * dx + dy * dy).sqrt() / radius;
                let alpha = falloff(distance, hardness);
                if alpha > 0.0 {
                    texture.put_texel(x, y, [1.0, 1.0, 1.0, alpha]);
                }
            }
        }
        BrushStamp { texture }
    }

    /// Sample the stamp at `(u,v)`. Coordinates outside [0.0,1.0] return a
    /// fully transparent color.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return super::COLOR_TRANSPARENT;
        }
        self.texture.sample_bilinear(u, v)
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

fn falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if distance_normalized >= 1.0 {
        return 0.0;
    }
    if hardness >= 1.0 {
        return 1.0;
    }
    let t = distance_normalized.clamp(0.0, 1.0);
    let soft = 1.0 - t;
    soft * (1.0 - hardness) + hardness
}
