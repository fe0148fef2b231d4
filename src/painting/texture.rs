use super::{Color, PaintError};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Square RGBA image buffer used for accumulation textures, brush stamps and
/// scratch render targets.
#[derive(Clone)]
pub struct Texture {
    image: RgbaImage,
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[inline]
fn to_unit(value: u8) -> f32 {
    value as f32 / 255.0
}

impl Texture {
    /// Allocate a `size x size` texture with every texel set to `color`.
    pub fn filled(size: u32, color: Color) -> Texture {
        let texel = Rgba([
            to_byte(color[0]),
            to_byte(color[1]),
            to_byte(color[2]),
            to_byte(color[3]),
        ]);
        Texture {
            image: RgbaImage::from_pixel(size, size, texel),
        }
    }

    pub fn from_image(image: RgbaImage) -> Texture {
        Texture { image }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Texture, PaintError> {
        let image = image::open(path.as_ref())?.to_rgba8();
        Ok(Texture { image })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PaintError> {
        self.image.save(path.as_ref())?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Color {
        let p = self.image.get_pixel(x, y);
        [to_unit(p[0]), to_unit(p[1]), to_unit(p[2]), to_unit(p[3])]
    }

    #[inline]
    pub fn put_texel(&mut self, x: u32, y: u32, color: Color) {
        self.image.put_pixel(
            x,
            y,
            Rgba([
                to_byte(color[0]),
                to_byte(color[1]),
                to_byte(color[2]),
                to_byte(color[3]),
            ]),
        );
    }

    /// Bilinear sample with clamped addressing. `u`,`v` in range [0.0,1.0],
    /// `v` grows upward as in the mesh UV convention.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Color {
        let w = self.width() as f32;
        let h = self.height() as f32;
        let x = u.clamp(0.0, 1.0) * w - 0.5;
        let y = (1.0 - v.clamp(0.0, 1.0)) * h - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let max_x = self.width() as i64 - 1;
        let max_y = self.height() as i64 - 1;
        let clamp_x = |ix: i64| ix.clamp(0, max_x) as u32;
        let clamp_y = |iy: i64| iy.clamp(0, max_y) as u32;
        let x0i = x0 as i64;
        let y0i = y0 as i64;
        let c00 = self.texel(clamp_x(x0i), clamp_y(y0i));
        let c10 = self.texel(clamp_x(x0i + 1), clamp_y(y0i));
        let c01 = self.texel(clamp_x(x0i), clamp_y(y0i + 1));
        let c11 = self.texel(clamp_x(x0i + 1), clamp_y(y0i + 1));
        let mut out = [0.0f32; 4];
        for ch in 0..4 {
            let top = c00[ch] * (1.0 - fx) + c10[ch] * fx;
            let bottom = c01[ch] * (1.0 - fx) + c11[ch] * fx;
            out[ch] = top * (1.0 - fy) + bottom * fy;
        }
        out
    }

    /// Overwrite every texel with a sample of `source`. Sizes may differ,
    /// the source is stretched over the full target. Destructive: previous
    /// content is lost, nothing is blended.
    pub fn blit_from(&mut self, source: &Texture) {
        let w = self.width();
        let h = self.height();
        for y in 0..h {
            for x in 0..w {
                let u = (x as f32 + 0.5) / w as f32;
                let v = 1.0 - (y as f32 + 0.5) / h as f32;
                let sample = source.sample_bilinear(u, v);
                self.put_texel(x, y, sample);
            }
        }
    }

    /// Standard alpha-over composite of `stamp` on top of `self`.
    /// Texels with zero stamp alpha are left untouched and a fully opaque
    /// stamp texel replaces the accumulation texel exactly.
    pub(crate) fn composite_over(&mut self, stamp: &Texture) {
        debug_assert_eq!(self.width(), stamp.width());
        debug_assert_eq!(self.height(), stamp.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                let src = stamp.texel(x, y);
                let sa = src[3];
                if sa <= 0.0 {
                    continue;
                }
                if sa >= 1.0 {
                    self.put_texel(x, y, src);
                    continue;
                }
                let dst = self.texel(x, y);
                let da = dst[3];
                let out_a = sa + da * (1.0 - sa);
                if out_a <= 0.0 {
                    self.put_texel(x, y, super::COLOR_TRANSPARENT);
                    continue;
                }
                let mut out = [0.0f32; 4];
                for ch in 0..3 {
                    out[ch] = (src[ch] * sa + dst[ch] * da * (1.0 - sa)) / out_a;
                }
                out[3] = out_a;
                self.put_texel(x, y, out);
            }
        }
    }

    /// How many texels differ from `other`. Used by the paint coverage report.
    pub fn count_differing(&self, other: &Texture) -> u64 {
        debug_assert_eq!(self.width(), other.width());
        debug_assert_eq!(self.height(), other.height());
        let mut count = 0u64;
        for (a, b) in self.image.pixels().zip(other.image.pixels()) {
            if a != b {
                count += 1;
            }
        }
        count
    }

    pub fn texel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painting::{COLOR_TRANSPARENT, COLOR_WHITE};

    #[test]
    fn test_filled_is_uniform() {
        let texture = Texture::filled(8, [1.0, 0.0, 0.0, 1.0]);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(texture.texel(x, y), [1.0, 0.0, 0.0, 1.0]);
            }
        }
    }

    #[test]
    fn test_blit_overwrites_previous_content() {
        let mut target = Texture::filled(16, [0.0, 1.0, 0.0, 1.0]);
        let source = Texture::filled(4, [0.0, 0.0, 1.0, 1.0]);
        target.blit_from(&source);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(target.texel(x, y), [0.0, 0.0, 1.0, 1.0]);
            }
        }
    }

    #[test]
    fn test_composite_zero_alpha_is_identity() {
        let mut target = Texture::filled(4, COLOR_WHITE);
        let stamp = Texture::filled(4, COLOR_TRANSPARENT);
        target.composite_over(&stamp);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(target.texel(x, y), COLOR_WHITE);
            }
        }
    }

    #[test]
    fn test_composite_opaque_replaces() {
        let mut target = Texture::filled(4, COLOR_WHITE);
        let stamp = Texture::filled(4, [0.25, 0.5, 0.75, 1.0]);
        target.composite_over(&stamp);
        let got = target.texel(2, 2);
        let want = [0.25, 0.5, 0.75, 1.0];
        for ch in 0..4 {
            assert!((got[ch] - want[ch]).abs() < 1.0 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_sample_bilinear_of_uniform_image() {
        let texture = Texture::filled(8, [0.5, 0.5, 0.5, 1.0]);
        let sample = texture.sample_bilinear(0.3, 0.8);
        for ch in 0..3 {
            assert!((sample[ch] - 0.5).abs() < 1.0 / 255.0 + 1e-6);
        }
        assert!((sample[3] - 1.0).abs() < 1e-6);
    }
}
