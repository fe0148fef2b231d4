use crate::painting::{BrushStamp, Color, DecalPainter, Texture, TriangleMesh};
use log::warn;
use rapier3d::prelude::*;
use std::sync::Arc;

/// A mesh in the arena that receives paint.
///
/// Owns its [`DecalPainter`] exclusively: two surfaces never share an
/// accumulation texture, so painting one can never affect another. The
/// surface converts world-space paint events into the mesh object space
/// before handing them to the painter.
pub struct PaintableSurface {
    pub name: String,
    mesh: TriangleMesh,
    position: Isometry<Real>,
    scale: Vector<Real>,
    pub(super) collider_handle: ColliderHandle,
    painter: Option<DecalPainter>,
    initialized: bool,
    paint_ops: u32,
}

impl PaintableSurface {
    pub(super) fn new(
        name: String,
        mesh: TriangleMesh,
        position: Isometry<Real>,
        scale: Vector<Real>,
        collider_handle: ColliderHandle,
    ) -> PaintableSurface {
        PaintableSurface {
            name,
            mesh,
            position,
            scale,
            collider_handle,
            painter: None,
            initialized: false,
            paint_ops: 0,
        }
    }

    /// Create the accumulation texture and bind the shared brush stamp.
    /// Called once when the surface enters the arena.
    ///
    /// When the brush resources were not acquired (`brush` is `None`) or the
    /// painter cannot be created, the failure is logged once and the surface
    /// stays unpaintable for its whole lifetime: later paint calls are
    /// silent no-ops, never errors.
    pub(super) fn initialize(
        &mut self,
        brush: Option<&Arc<BrushStamp>>,
        texture_size: u32,
        base_texture: Option<&Texture>,
    ) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let Some(brush) = brush else {
            warn!(
                "paint resources unavailable, surface {} will stay unpainted",
                self.name
            );
            return;
        };
        match DecalPainter::new(self.mesh.clone(), texture_size, base_texture) {
            Ok(mut painter) => {
                painter.set_decal_texture(brush.clone());
                self.painter = Some(painter);
            }
            Err(err) => {
                warn!(
                    "failed to create decal painter for surface {}: {}",
                    self.name, err
                );
            }
        }
    }

    /// Stamp a decal at a world-space hit point.
    ///
    /// `radius` is in world meters. Normal and tangent need not be
    /// normalized. A call before [`PaintableSurface::initialize`] is logged
    /// and ignored.
    pub fn paint(
        &mut self,
        world_position: Point<Real>,
        world_normal: Vector<Real>,
        world_tangent: Vector<Real>,
        radius: f32,
        color: Color,
    ) {
        if !self.initialized {
            warn!("surface {} not initialized", self.name);
            return;
        }
        let Some(painter) = self.painter.as_mut() else {
            // Initialization failed earlier; already reported.
            return;
        };
        let inverse = self.position.inverse();
        let local = inverse * world_position;
        // Mesh vertices are unscaled, the world placement applies the scale.
        let local_position = Point::new(
            local.x / self.scale.x,
            local.y / self.scale.y,
            local.z / self.scale.z,
        );
        let local_normal = inverse * world_normal;
        let local_tangent = inverse * world_tangent;
        painter.paint(
            local_position,
            local_normal,
            local_tangent,
            self.scale,
            radius,
            color,
        );
        self.paint_ops += 1;
    }

    /// Release the painter and its texture. Idempotent.
    pub(super) fn teardown(&mut self) {
        if let Some(painter) = self.painter.as_mut() {
            painter.teardown();
        }
        self.painter = None;
    }

    #[inline]
    pub fn texture(&self) -> Option<&Texture> {
        self.painter.as_ref().and_then(|painter| painter.texture())
    }

    #[inline]
    pub fn paint_ops(&self) -> u32 {
        self.paint_ops
    }

    pub fn painted_texels(&self) -> u64 {
        self.painter
            .as_ref()
            .map(|painter| painter.painted_texels())
            .unwrap_or(0)
    }

    pub fn texture_size(&self) -> u32 {
        self.texture().map(|texture| texture.width()).unwrap_or(0)
    }

    #[inline]
    pub fn position(&self) -> Isometry<Real> {
        self.position
    }

    #[inline]
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }
}
