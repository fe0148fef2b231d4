use super::brush::BrushStamp;
use super::mesh::TriangleMesh;
use super::raster;
use super::texture::Texture;
use super::{Color, PaintError, COLOR_TRANSPARENT, COLOR_WHITE};
use log::warn;
use nalgebra::{Point3, Vector3};
use std::sync::Arc;

/// Transient stamping pass state, recomputed for every paint call and never
/// cached. Normal and tangent are normalized here so callers can pass raw
/// physics vectors.
pub struct ProjectionParameters {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub radius: f32,
    pub color: Color,
}

impl ProjectionParameters {
    /// Returns `None` for inputs that cannot form a stable stamp frame:
    /// zero-length normal or tangent, tangent parallel to the normal, or a
    /// non positive radius.
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        tangent: Vector3<f32>,
        scale: Vector3<f32>,
        radius: f32,
        color: Color,
    ) -> Option<ProjectionParameters> {
        if radius <= 0.0 {
            return None;
        }
        let normal = normal.try_normalize(1e-6)?;
        let tangent = tangent.try_normalize(1e-6)?;
        let bitangent = normal.cross(&tangent).try_normalize(1e-6)?;
        Some(ProjectionParameters {
            position,
            normal,
            tangent,
            bitangent,
            scale,
            radius,
            color,
        })
    }
}

/// Bakes brush stamps into a persistent accumulation texture owned by one
/// mesh. The painter is the sole owner of the texture and of its private
/// mesh copy; it is bound 1:1 to a paintable surface and never shared.
pub struct DecalPainter {
    mesh: TriangleMesh,
    /// Accumulation texture. `None` once torn down.
    texture: Option<Texture>,
    /// Texture state right after initialization, used to measure coverage.
    initial: Texture,
    brush: Option<Arc<BrushStamp>>,
}

impl DecalPainter {
    /// Allocate the accumulation texture, fully opaque white, and bind it to
    /// `mesh`. When `base_texture` is given it is baked in immediately so
    /// the surface keeps its previous appearance until paint arrives.
    pub fn new(
        mesh: TriangleMesh,
        texture_size: u32,
        base_texture: Option<&Texture>,
    ) -> Result<DecalPainter, PaintError> {
        mesh.validate()?;
        if texture_size == 0 {
            return Err(PaintError::ResourceInitialization(
                "accumulation texture size must be positive".to_string(),
            ));
        }
        let mut texture = Texture::filled(texture_size, COLOR_WHITE);
        if let Some(base) = base_texture {
            texture.blit_from(base);
        }
        let initial = texture.clone();
        Ok(DecalPainter {
            mesh,
            texture: Some(texture),
            initial,
            brush: None,
        })
    }

    /// Overwrite the whole accumulation texture with `source`. Destructive,
    /// never blends; meant to seed the texture once at initialization.
    pub fn bake_base_texture(&mut self, source: &Texture) {
        let Some(texture) = self.texture.as_mut() else {
            warn!("bake_base_texture called on a disposed painter");
            return;
        };
        texture.blit_from(source);
        self.initial = texture.clone();
    }

    /// Bind the brush stamp used by subsequent paint calls. Configuration
    /// only, nothing is rendered until [`DecalPainter::paint`].
    pub fn set_decal_texture(&mut self, brush: Arc<BrushStamp>) {
        self.brush = Some(brush);
    }

    /// Stamp the brush onto the mesh at `position` (object space) and bake
    /// the result into the accumulation texture.
    ///
    /// `normal` and `tangent` give the stamp orientation and need not be
    /// normalized. `scale` is the owning transform's scale, applied to
    /// object-space offsets so `radius` is measured in world units.
    /// Degenerate inputs and unbound brushes are logged no-ops: painting
    /// never fails the caller.
    pub fn paint(
        &mut self,
        position: Point3<f32>,
        normal: Vector3<f32>,
        tangent: Vector3<f32>,
        scale: Vector3<f32>,
        radius: f32,
        color: Color,
    ) {
        let Some(texture) = self.texture.as_mut() else {
            return;
        };
        let Some(brush) = self.brush.as_ref() else {
            warn!("paint skipped, no decal texture bound");
            return;
        };
        let Some(params) = ProjectionParameters::new(position, normal, tangent, scale, radius, color)
        else {
            warn!("paint skipped, degenerate stamp frame or radius");
            return;
        };
        // Scratch target of the stamping pass, held only for this call.
        let mut scratch = Texture::filled(texture.width(), COLOR_TRANSPARENT);
        raster::stamp_pass(&self.mesh, &params, brush, &mut scratch);
        texture.composite_over(&scratch);
    }

    /// Accumulation texture, `None` after teardown.
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Texels changed since initialization. Drives the paint report.
    pub fn painted_texels(&self) -> u64 {
        match &self.texture {
            Some(texture) => texture.count_differing(&self.initial),
            None => 0,
        }
    }

    /// Release the accumulation texture and brush binding. Idempotent: a
    /// second call is a no-op.
    pub fn teardown(&mut self) {
        self.texture = None;
        self.brush = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_brush() -> Arc<BrushStamp> {
        Arc::new(BrushStamp::from_texture(Texture::filled(8, COLOR_WHITE)))
    }

    fn painter_with_brush(size: u32) -> DecalPainter {
        let mut painter = DecalPainter::new(TriangleMesh::quad(0.5, 0.5), size, None)
            .expect("valid painter");
        painter.set_decal_texture(opaque_brush());
        painter
    }

    fn unit_scale() -> Vector3<f32> {
        Vector3::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_initial_texture_is_opaque_white() {
        let painter = DecalPainter::new(TriangleMesh::quad(0.5, 0.5), 32, None)
            .expect("valid painter");
        let texture = painter.texture().expect("texture allocated");
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(texture.texel(x, y), COLOR_WHITE);
            }
        }
    }

    #[test]
    fn test_bake_base_texture_overwrites() {
        let mut painter = DecalPainter::new(TriangleMesh::quad(0.5, 0.5), 16, None)
            .expect("valid painter");
        let base_x = Texture::filled(16, [1.0, 0.0, 0.0, 1.0]);
        let base_y = Texture::filled(16, [0.0, 0.0, 1.0, 1.0]);
        painter.bake_base_texture(&base_x);
        painter.bake_base_texture(&base_y);
        // Baking X then Y equals a direct bake of Y.
        let texture = painter.texture().expect("texture allocated");
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(texture.texel(x, y), [0.0, 0.0, 1.0, 1.0]);
            }
        }
    }

    #[test]
    fn test_zero_alpha_stamp_changes_nothing() {
        let mut painter = DecalPainter::new(TriangleMesh::quad(0.5, 0.5), 64, None)
            .expect("valid painter");
        painter.set_decal_texture(Arc::new(BrushStamp::from_texture(Texture::filled(
            8,
            COLOR_TRANSPARENT,
        ))));
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
        let texture = painter.texture().expect("texture allocated");
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(texture.texel(x, y), COLOR_WHITE);
            }
        }
        assert_eq!(painter.painted_texels(), 0);
    }

    #[test]
    fn test_opaque_stamp_replaces_region() {
        let mut painter = painter_with_brush(128);
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
        let texture = painter.texture().expect("texture allocated");
        // Center of the footprint is exactly the stamp color.
        assert_eq!(texture.texel(64, 64), [1.0, 0.0, 0.0, 1.0]);
        // Well outside the footprint the texture is still white.
        assert_eq!(texture.texel(4, 4), COLOR_WHITE);
        assert!(painter.painted_texels() > 0);
    }

    #[test]
    fn test_unnormalized_inputs_are_accepted() {
        let mut painter = painter_with_brush(64);
        painter.paint(
            Point3::origin(),
            Vector3::z() * 12.5,
            Vector3::x() * 0.2,
            unit_scale(),
            0.2,
            [0.0, 1.0, 0.0, 1.0],
        );
        let texture = painter.texture().expect("texture allocated");
        assert_eq!(texture.texel(32, 32), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_last_paint_wins_in_overlap() {
        let mut painter = painter_with_brush(128);
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [0.0, 0.0, 1.0, 1.0],
        );
        let texture = painter.texture().expect("texture allocated");
        // The overlap region shows only the last color, not a blend.
        assert_eq!(texture.texel(64, 64), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_paint_without_brush_is_noop() {
        let mut painter = DecalPainter::new(TriangleMesh::quad(0.5, 0.5), 32, None)
            .expect("valid painter");
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(painter.painted_texels(), 0);
    }

    #[test]
    fn test_degenerate_frame_is_noop() {
        let mut painter = painter_with_brush(32);
        // Tangent parallel to the normal cannot form a stamp frame.
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::z(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
        // Non positive radius.
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.0,
            [1.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(painter.painted_texels(), 0);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut painter = painter_with_brush(32);
        painter.teardown();
        painter.teardown();
        assert!(painter.texture().is_none());
        // Painting after teardown is the caller's contract violation but
        // must not crash.
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
    }

    #[test]
    fn test_paint_end_to_end_changes_texture() {
        let mut painter = painter_with_brush(512);
        painter.paint(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            unit_scale(),
            0.2,
            [1.0, 0.0, 0.0, 1.0],
        );
        assert!(painter.painted_texels() > 0);
        let texture = painter.texture().expect("texture allocated");
        let center = texture.texel(256, 256);
        assert!(center[0] > 0.0, "painted texel must have a red component");
        assert_ne!(center, COLOR_WHITE);
    }

    #[test]
    fn test_zero_texture_size_rejected() {
        let result = DecalPainter::new(TriangleMesh::quad(0.5, 0.5), 0, None);
        assert!(matches!(
            result,
            Err(PaintError::ResourceInitialization(_))
        ));
    }
}
