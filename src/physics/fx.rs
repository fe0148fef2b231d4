use super::util::tangent_from_normal;
use crate::painting::Color;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

/// Transient impact effect marker.
///
/// Spawned where a bullet hits, oriented by the hit normal, and pruned once
/// its lifetime runs out. The simulation core does not render anything; a
/// front end reads these markers and plays whatever effect it likes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpactFx {
    pub position: Point<Real>,
    /// Hit normal, the effect's up direction.
    pub up: Vector<Real>,
    pub forward: Vector<Real>,
    pub color: Color,
    pub(super) ticks_left: u32,
}

impl ImpactFx {
    pub(super) fn play(
        position: Point<Real>,
        upward: Vector<Real>,
        color: Color,
        duration_ticks: u32,
    ) -> ImpactFx {
        // Same frame construction as the paint stamp: a tangent synthesized
        // from the normal, stable even for straight-up impacts.
        let forward = tangent_from_normal(&upward);
        ImpactFx {
            position,
            up: upward,
            forward,
            color,
            ticks_left: duration_ticks,
        }
    }

    #[inline]
    pub fn ticks_left(&self) -> u32 {
        self.ticks_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_frame_is_orthogonal() {
        let fx = ImpactFx::play(
            Point::origin(),
            Vector::y(),
            [1.0, 0.0, 0.0, 1.0],
            30,
        );
        assert!(fx.forward.norm() > 0.99);
        assert!(fx.forward.dot(&fx.up).abs() < 1.0e-5);
        assert_eq!(fx.ticks_left(), 30);
    }
}
