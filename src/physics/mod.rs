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

mod fx;
mod report;
mod surface;
mod tank;
mod util;
pub use self::fx::ImpactFx;
pub use self::surface::PaintableSurface;
pub use self::tank::{Bullet, ObjUID, Tank};
pub use self::util::{angle_wrapping, tangent_from_normal};
use crate::conf::*;
use crate::painting::{BrushStamp, Color, PaintError, Texture, TriangleMesh};
use crate::{signal_exit, Opts};
use indexmap::IndexMap;
use log::{debug, error, info};
pub use rapier3d::na::{vector, Isometry3, Point3, Vector3};
use rapier3d::prelude::*;
pub use rapier3d::prelude::{Real, RigidBodyHandle};
use std::path::Path;
use std::sync::Arc;

/// Simulation steps per second.
pub const TICKS_PER_SECOND: f32 = 60.0;

/**
Tank body collision group used in colliders.
*/
const TANK_GROUP: InteractionGroups = InteractionGroups::new(
    Group::GROUP_1,
    Group::GROUP_1.union(Group::GROUP_3).union(Group::GROUP_4),
);
const TURRET_GROUP: InteractionGroups = InteractionGroups::new(
    Group::GROUP_2,
    Group::GROUP_2.union(Group::GROUP_3).union(Group::GROUP_4),
);
const BULLET_GROUP: InteractionGroups = InteractionGroups::new(
    Group::GROUP_3,
    Group::GROUP_1.union(Group::GROUP_2).union(Group::GROUP_4),
);
const SURFACE_GROUP: InteractionGroups = InteractionGroups::new(
    Group::GROUP_4,
    Group::GROUP_1
        .union(Group::GROUP_2)
        .union(Group::GROUP_3)
        .union(Group::GROUP_4),
);

/// Collider user data of paintable surfaces. Never equal to a tank index,
/// so the owner filter below always lets bullets hit surfaces.
const SURFACE_USER_DATA: u128 = u128::MAX;

/// Suppress contacts between colliders sharing the same user data: a bullet
/// carries the index of the tank that fired it, so it flies through its own
/// tank and turret at the muzzle.
struct OwnerHitFilter;

impl PhysicsHooks for OwnerHitFilter {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let user_data1 = context.colliders[context.collider1].user_data;
        let user_data2 = context.colliders[context.collider2].user_data;
        if user_data1 != user_data2 {
            debug!("Detect hit");
            Some(SolverFlags::COMPUTE_IMPULSES)
        } else {
            debug!("skip hit");
            None
        }
    }
}

/// A paint event extracted from a bullet contact, applied to the target
/// surface after the contact scan.
struct PaintHit {
    surface: ColliderHandle,
    position: Point<Real>,
    normal: Vector<Real>,
    tangent: Vector<Real>,
    radius: f32,
    color: Color,
}

pub struct PhysicsEngine {
    /// Maximum numbers of tick allowed. If `max_ticks` == 0 the simulation
    /// runs until the exit signal is raised.
    max_ticks: u32,
    /// All tanks in the game
    tanks: Vec<Tank>,
    /// All bullets in the simulation
    bullets: Vec<Bullet>,
    /// Paintable surfaces indexed by their collider
    surfaces: IndexMap<ColliderHandle, PaintableSurface>,
    /// Live impact effects
    fx: Vec<ImpactFx>,
    /// Shared brush stamp. None when acquisition failed at startup: every
    /// surface initialized afterwards stays unpaintable.
    brush: Option<Arc<BrushStamp>>,
    /// Present number of ticks
    tick: u32,
    /// Simulation configuration
    conf: Conf,
    // Parameters required by Rapier3D
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    joint_set: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    physics_hooks: OwnerHitFilter,
    event_handler: (),
    gravity_vector: Vector3<Real>,
}

impl PhysicsEngine {
    pub fn new(conf: Conf, opts: &Opts) -> PhysicsEngine {
        let brush = match Self::acquire_brush(&conf) {
            Ok(brush) => Some(Arc::new(brush)),
            Err(err) => {
                error!(
                    "paint stamping resources unavailable: {}. Surfaces will stay unpainted",
                    err
                );
                None
            }
        };
        let gravity_vector = vector![0.0, conf.gravity_y, 0.0];
        PhysicsEngine {
            max_ticks: opts.max_steps,
            tanks: vec![],
            bullets: vec![],
            surfaces: IndexMap::new(),
            fx: vec![],
            brush,
            tick: 0,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            joint_set: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            physics_hooks: OwnerHitFilter,
            event_handler: (),
            gravity_vector,
            conf,
        }
    }

    /// Resolve the brush stamp used by every stamping pass. The one
    /// external resource of the paint pipeline, resolved once at startup.
    fn acquire_brush(conf: &Conf) -> Result<BrushStamp, PaintError> {
        match &conf.brush_texture_path {
            Some(path) => BrushStamp::from_file(path),
            None => Ok(BrushStamp::soft_circle(
                conf.brush_stamp_size,
                conf.brush_hardness,
            )),
        }
    }

    /**
    Add tank to simulation.
    This can be used only before calling  `step` function.
    # Arguments
    * `tank_position` - Initial position of tank
    * `name` - Tank name
    * `paint_color` - Tint of the paint this tank fires

    # Return
    * Tank index
    */
    pub fn add_tank(
        &mut self,
        tank_position: Isometry3<Real>,
        name: String,
        paint_color: Color,
    ) -> usize {
        //This tank index is used to set userdata of all collider to skip detection.
        let tank_index = self.tanks.len();
        let tank = Tank::new(self, tank_position, tank_index, name, paint_color);
        self.tanks.push(tank);
        tank_index
    }

    /**
     * Add tank in a circle at distance as specified in the conf
     *
     * # Arguments
     * `name` - Tank name
     * `paint_color` - Tint of the paint this tank fires
     * `max_num_tanks` - Maximum number of expected tanks
     */
    pub fn add_tank_in_circle(
        &mut self,
        name: String,
        paint_color: Color,
        max_num_tanks: usize,
    ) -> usize {
        let angle = (2.0 * std::f32::consts::PI / max_num_tanks as f32)
            * (self.tanks.len() + 1) as f32;
        let position = Isometry3::rotation(Vector3::y() * angle)
            * Isometry3::translation(
                self.conf.start_distance,
                self.conf.tank_height_m / 2.0 + 0.1,
                0.0,
            );
        self.add_tank(position, name, paint_color)
    }

    /**
    Add a paintable surface to the arena.

    The mesh is inserted as a fixed trimesh collider placed at `position`
    with the given per axis `scale`, and its decal painter is initialized
    right away: the surface starts all white unless `base_texture` seeds it.

    # Return
    * Collider handle identifying the surface
    */
    pub fn add_paintable_surface(
        &mut self,
        name: &str,
        mesh: TriangleMesh,
        position: Isometry3<Real>,
        scale: Vector3<Real>,
        base_texture: Option<&Texture>,
    ) -> ColliderHandle {
        let vertices: Vec<Point<Real>> = mesh
            .positions()
            .iter()
            .map(|p| Point::new(p.x * scale.x, p.y * scale.y, p.z * scale.z))
            .collect();
        let indices: Vec<[u32; 3]> = mesh.indices().to_vec();
        let collider = ColliderBuilder::trimesh(vertices, indices)
            .position(position)
            .collision_groups(SURFACE_GROUP)
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS)
            .user_data(SURFACE_USER_DATA)
            .build();
        let collider_handle = self.collider_set.insert(collider);
        let mut surface =
            PaintableSurface::new(name.to_string(), mesh, position, scale, collider_handle);
        surface.initialize(
            self.brush.as_ref(),
            self.conf.paint_texture_size,
            base_texture,
        );
        self.surfaces.insert(collider_handle, surface);
        collider_handle
    }

    /// Execute one simulation step
    pub fn step(&mut self) {
        //Execute all command
        for (tank_index, tank) in self.tanks.iter_mut().enumerate() {
            let tank_rigid_body = &mut self.rigid_body_set[tank.phy_body_handle];
            /* In new version of Rapier forces are not reset after simulation step.
            So I have to reset them
             */
            tank_rigid_body.reset_forces(false);
            tank_rigid_body.reset_torques(false);

            tank.turret.update_reload();

            // Power = F . v. Here we consider the speed along the direction of tank
            Self::apply_engine_power(tank_rigid_body, tank);
            tank_rigid_body.apply_torque_impulse(
                Vector::y() * (tank.turning_power / (tank.angular_velocity().abs() + 1.0)),
                true,
            );
            tank.limit_velocities(tank_rigid_body);
            tank.set_cannon_position_physics(&mut self.joint_set, &self.conf);
            let turret = &mut tank.turret;
            if turret.fire {
                let cannon_body = &self.rigid_body_set[turret.phy_body_handle];
                let muzzle_offset =
                    self.conf.turret_width_m / 2.0 + self.conf.bullet_radius_m * 3.0;
                let muzzle_position = *cannon_body.position()
                    * Isometry3::translation(muzzle_offset, 0.0, 0.0);
                //Compute bullet speed and sum cannon edge speed (world speed)
                let velocity = (cannon_body.position() * vector![self.conf.bullet_speed, 0.0, 0.0])
                    + util::get_velocity_at_point(muzzle_offset, 0.0, 0.0, cannon_body);
                Self::spawn_bullet(
                    &self.conf,
                    &mut self.rigid_body_set,
                    &mut self.collider_set,
                    &mut self.bullets,
                    muzzle_position,
                    velocity,
                    tank.paint_color,
                    tank.paint_radius,
                    tank_index as u128,
                );
                turret.fire = false;
                turret.mark_fired();
            }
        }
        self.physics_pipeline.step(
            &self.gravity_vector,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.joint_set,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &self.physics_hooks,
            &self.event_handler,
        );
        self.tick += 1;
        //Read back present status
        for tank in &mut self.tanks {
            //Tank body
            let tank_rigid_body = &self.rigid_body_set[tank.phy_body_handle];
            tank.position = *tank_rigid_body.position();
            tank.linvel = *tank_rigid_body.linvel();
            tank.angvel = *tank_rigid_body.angvel();

            //Update turret
            let turret = &mut tank.turret;
            let turret_rigid_body = &self.rigid_body_set[turret.phy_body_handle];
            turret.angle = turret_rigid_body.position().rotation.euler_angles().1;
        }

        // Scan bullet contacts and collect paint events. They are applied
        // after the scan, one by one, in the order they were found.
        let mut paint_hits: Vec<PaintHit> = Vec::new();
        for bullet in &mut self.bullets {
            bullet.age_ticks += 1;
            if bullet.armed() {
                for contact_pair in self.narrow_phase.contact_pairs_with(bullet.collider_handle) {
                    /*Skip if no contact. This should be false for bullet in contact
                    with the tank that has fired the same bullet. See physics hook.
                    */
                    if !contact_pair.has_any_active_contact {
                        continue;
                    }
                    let Some((manifold, contact)) = contact_pair.find_deepest_contact() else {
                        continue;
                    };
                    let bullet_is_first = contact_pair.collider1 == bullet.collider_handle;
                    let other_handle = if bullet_is_first {
                        contact_pair.collider2
                    } else {
                        contact_pair.collider1
                    };
                    let other_collider = &self.collider_set[other_handle];
                    let local_point = if bullet_is_first {
                        contact.local_p2
                    } else {
                        contact.local_p1
                    };
                    let hit_point = other_collider.position() * local_point;
                    // Manifold normal points out of the first shape; flip it
                    // so it always points away from the hit surface.
                    let hit_normal = if bullet_is_first {
                        -manifold.data.normal
                    } else {
                        manifold.data.normal
                    };
                    let tangent = tangent_from_normal(&hit_normal);
                    self.fx.push(ImpactFx::play(
                        hit_point,
                        hit_normal,
                        bullet.paint_color,
                        self.conf.fx_duration_ticks,
                    ));
                    if self.surfaces.contains_key(&other_handle) {
                        debug!("Bullet hit paintable surface");
                        paint_hits.push(PaintHit {
                            surface: other_handle,
                            position: hit_point,
                            normal: hit_normal,
                            tangent,
                            radius: bullet.paint_radius,
                            color: bullet.paint_color,
                        });
                    }
                    // The bullet is spent on its first armed contact.
                    bullet.tick_counter = 1;
                }
            }
            bullet.tick_counter = bullet.tick_counter.saturating_sub(1);
            bullet.position = *self.rigid_body_set[bullet.phy_body_handle].position();
            if bullet.tick_counter == 0 {
                //If expired remove from physics engine
                self.rigid_body_set.remove(
                    bullet.phy_body_handle,
                    &mut self.island_manager,
                    &mut self.collider_set,
                    &mut self.joint_set,
                    &mut self.multibody_joints,
                    true,
                );
            }
        }
        //Remove expired bullet from bullets vector.
        self.bullets.retain(|bullet| {
            if bullet.tick_counter == 0 {
                debug!("Bullet destroyed");
                false
            } else {
                true
            }
        });

        // Apply collected paint events. A failing paint never disturbs the
        // simulation, the surface logs and moves on.
        for hit in paint_hits {
            if let Some(surface) = self.surfaces.get_mut(&hit.surface) {
                surface.paint(hit.position, hit.normal, hit.tangent, hit.radius, hit.color);
            }
        }

        // Age out impact effects.
        self.fx.retain_mut(|fx| {
            fx.ticks_left = fx.ticks_left.saturating_sub(1);
            fx.ticks_left > 0
        });

        // If reached max number of simulation steps exit from simulation
        if self.max_ticks != 0 && self.tick >= self.max_ticks {
            info!("Reached max number of ticks .. exiting");
            signal_exit();
        }
    }

    /**
    Create one bullet already flying. Used by the turret fire path and by
    direct spawning in the paint tester.
     */
    #[allow(clippy::too_many_arguments)]
    fn spawn_bullet(
        conf: &Conf,
        rigid_body_set: &mut RigidBodySet,
        collider_set: &mut ColliderSet,
        bullets: &mut Vec<Bullet>,
        position: Isometry3<Real>,
        velocity: Vector3<Real>,
        paint_color: Color,
        paint_radius: f32,
        owner: u128,
    ) {
        let bullet_body = RigidBodyBuilder::dynamic()
            .position(position)
            .linvel(velocity)
            .ccd_enabled(true)
            .linear_damping(0.0)
            .angular_damping(0.0)
            .build();
        let bullet_position = *bullet_body.position();
        let rigid_body_handle = rigid_body_set.insert(bullet_body);
        let bullet_collider = ColliderBuilder::ball(conf.bullet_radius_m)
            .density(conf.bullet_density)
            .collision_groups(BULLET_GROUP)
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS)
            .user_data(owner) //Will be used by physics hook to avoid collision with tank that fired bullet
            .build();
        let collider_handle =
            collider_set.insert_with_parent(bullet_collider, rigid_body_handle, rigid_body_set);
        let bullet = Bullet {
            collider_handle,
            phy_body_handle: rigid_body_handle,
            tick_counter: std::cmp::max(
                1,
                (conf.bullet_max_range / conf.bullet_speed * TICKS_PER_SECOND).ceil() as u32 + 1, //+1 because later all bullet will be evaluated and tick will be decreased.
            ),
            age_ticks: 0,
            arming_ticks: conf.bullet_arming_ticks,
            position: bullet_position,
            paint_color,
            paint_radius,
        };
        bullets.push(bullet);
    }

    /// Fire a free bullet that belongs to no tank. Used by tests and by the
    /// paint tester binary.
    pub fn spawn_free_bullet(
        &mut self,
        position: Isometry3<Real>,
        velocity: Vector3<Real>,
        paint_color: Color,
    ) {
        Self::spawn_bullet(
            &self.conf,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.bullets,
            position,
            velocity,
            paint_color,
            self.conf.paint_radius_m,
            u128::MAX - 1,
        );
    }

    /// Get how many simulation steps are executed
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    #[inline]
    pub fn conf(&self) -> &Conf {
        &self.conf
    }

    #[inline]
    pub fn tank(&self, tank_id: usize) -> &Tank {
        &self.tanks[tank_id]
    }

    #[inline]
    pub fn tank_mut(&mut self, tank_id: usize) -> &mut Tank {
        &mut self.tanks[tank_id]
    }

    #[inline]
    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    #[inline]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    #[inline]
    pub fn fx(&self) -> &[ImpactFx] {
        &self.fx
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &PaintableSurface> {
        self.surfaces.values()
    }

    pub fn surface(&self, handle: ColliderHandle) -> Option<&PaintableSurface> {
        self.surfaces.get(&handle)
    }

    #[inline]
    fn apply_engine_power(tank_rigid_body: &mut RigidBody, tank: &Tank) {
        //We don't have infinite force at 0 speed.
        let force = tank.engine_power / (tank.forward_velocity().abs() + 0.5);
        let force_forward_vector = tank_rigid_body.position() * vector![force, 0.0, 0.0];
        tank_rigid_body.add_force(force_forward_vector, true);
    }

    /**
    Save the painted textures and the paint coverage report, then raise the
    exit signal. Called once when the simulation is over.
    */
    pub fn exit_simulation(&mut self, output_dir: &Path) {
        info!(
            "Exiting simulation and saving paint results to {}",
            output_dir.display()
        );
        if let Err(err) = std::fs::create_dir_all(output_dir) {
            error!("Unable to create output directory: {}", err);
        }
        let report_path = output_dir.join("paint_report.csv");
        if let Err(err) = report::save_paint_report(&report_path, self.surfaces.values()) {
            error!("Unable to save paint report: {}", err);
        }
        for surface in self.surfaces.values() {
            if let Some(texture) = surface.texture() {
                let texture_path = output_dir.join(format!("{}.png", surface.name));
                if let Err(err) = texture.save(&texture_path) {
                    error!("Unable to save texture {}: {}", texture_path.display(), err);
                }
            }
        }
        // Release every painter explicitly; surfaces stay registered but
        // unpaintable, matching the disposed state of their owner.
        for surface in self.surfaces.values_mut() {
            surface.teardown();
        }
        signal_exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::Conf;
    use clap::Parser;
    use float_eq::assert_float_eq;

    fn test_opts() -> crate::Opts {
        crate::Opts::try_parse_from(["ptanks_sim"]).expect("Failed parse string")
    }

    fn setup_engine(num_tanks: u32, with_ground: bool) -> PhysicsEngine {
        let conf = Conf::default();
        let mut engine = PhysicsEngine::new(conf, &test_opts());
        if with_ground {
            let half = engine.conf.arena_half_extent_m;
            engine.add_paintable_surface(
                "ground",
                TriangleMesh::quad(half, half),
                Isometry3::new(
                    Vector3::zeros(),
                    Vector3::x() * -std::f32::consts::FRAC_PI_2,
                ),
                Vector3::new(1.0, 1.0, 1.0),
                None,
            );
        }
        for x in 0..num_tanks {
            engine.add_tank_in_circle(
                format!("tank{}", x),
                [1.0, 0.0, 0.0, 1.0],
                num_tanks.max(1) as usize,
            );
        }
        engine
    }

    /*
    Test initialization values.
     */
    #[test]
    fn test_setup_initialization_values() {
        let engine = setup_engine(2, false);
        let tank0 = &engine.tanks[0];
        let tank1 = &engine.tanks[1];
        // Tanks are deployed on a circle of start_distance radius.
        let distance0 = tank0.position().translation.vector.xz().norm();
        let distance1 = tank1.position().translation.vector.xz().norm();
        assert_float_eq!(distance0, engine.conf.start_distance, abs <= 1.0e-3);
        assert_float_eq!(distance1, engine.conf.start_distance, abs <= 1.0e-3);
        // Check velocity
        assert_eq!(tank0.linvel().norm(), 0.0);
        assert_eq!(tank0.angular_velocity(), 0.0);
        assert_eq!(tank1.linvel().norm(), 0.0);
    }

    #[test]
    fn test_get_tick() {
        let mut engine = setup_engine(1, false);
        assert!(engine.tick() == 0);
        engine.step();
        assert!(engine.tick() == 1);
    }

    #[test]
    fn test_engine_and_turning_power_wrapping() {
        let mut engine = setup_engine(1, false);
        let tank0 = engine.tank_mut(0);
        tank0.set_engine_power(2.0);
        assert_eq!(tank0.engine_power_fraction(), 1.0);
        tank0.set_engine_power(-2.0);
        assert_eq!(tank0.engine_power_fraction(), -1.0);
        tank0.set_turning_power(0.5);
        assert_eq!(tank0.turning_power_fraction(), 0.5);
        tank0.set_turning_power(7.0);
        assert_eq!(tank0.turning_power_fraction(), 1.0);
    }

    #[test]
    fn test_fire_creates_bullet_with_tank_paint() {
        let mut engine = setup_engine(2, true);
        engine.step();
        let tank0 = engine.tank_mut(0);
        assert!(tank0.turret_mut().fire());
        engine.step();
        assert_eq!(engine.bullets().len(), 1);
        let bullet = &engine.bullets()[0];
        assert_eq!(bullet.paint_color(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(bullet.paint_radius(), engine.conf.paint_radius_m);
        // Cannon is reloading, firing again is refused.
        let tank0 = engine.tank_mut(0);
        assert!(!tank0.turret_mut().fire());
    }

    #[test]
    fn test_bullets_expire() {
        let mut engine = setup_engine(1, true);
        engine.step();
        engine.tank_mut(0).turret_mut().fire();
        engine.step();
        assert_eq!(engine.bullets().len(), 1);
        let max_flight_ticks =
            (engine.conf.bullet_max_range / engine.conf.bullet_speed * TICKS_PER_SECOND) as u32 + 10;
        for _ in 0..max_flight_ticks {
            engine.step();
            if engine.bullets().is_empty() {
                break;
            }
        }
        assert!(engine.bullets().is_empty());
    }

    #[test]
    fn test_bullet_paints_ground() {
        let mut engine = setup_engine(0, true);
        let ground_handle = *engine.surfaces.keys().next().expect("ground registered");
        // Drop a bullet straight down onto the arena center, slow enough
        // that the arming delay is over before the impact.
        engine.spawn_free_bullet(
            Isometry3::translation(0.0, 2.0, 0.0),
            vector![0.0, -5.0, 0.0],
            [0.0, 1.0, 0.0, 1.0],
        );
        for _ in 0..600 {
            engine.step();
            if engine.bullets().is_empty() {
                break;
            }
        }
        assert!(engine.bullets().is_empty());
        let surface = engine.surface(ground_handle).expect("surface exists");
        assert!(surface.paint_ops() > 0, "impact must trigger a paint event");
        assert!(
            surface.painted_texels() > 0,
            "paint must change the accumulation texture"
        );
        // An impact effect was spawned as well.
        assert!(!engine.fx().is_empty() || engine.tick() > engine.conf.fx_duration_ticks);
    }

    #[test]
    fn test_impact_fx_expires() {
        let mut engine = setup_engine(0, true);
        engine.spawn_free_bullet(
            Isometry3::translation(0.0, 2.0, 0.0),
            vector![0.0, -5.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
        );
        for _ in 0..600 {
            engine.step();
            if engine.bullets().is_empty() {
                break;
            }
        }
        let lifetime = engine.conf.fx_duration_ticks + 2;
        for _ in 0..lifetime {
            engine.step();
        }
        assert!(engine.fx().is_empty());
    }

    #[test]
    fn test_missing_brush_file_fails_soft() {
        let mut conf = Conf::default();
        conf.brush_texture_path = Some("no/such/brush.png".into());
        let mut engine = PhysicsEngine::new(conf, &test_opts());
        let handle = engine.add_paintable_surface(
            "ground",
            TriangleMesh::quad(5.0, 5.0),
            Isometry3::new(
                Vector3::zeros(),
                Vector3::x() * -std::f32::consts::FRAC_PI_2,
            ),
            Vector3::new(1.0, 1.0, 1.0),
            None,
        );
        // Surface exists but is permanently unpaintable.
        let surface = engine.surface(handle).expect("surface registered");
        assert!(surface.texture().is_none());
        engine.spawn_free_bullet(
            Isometry3::translation(0.0, 2.0, 0.0),
            vector![0.0, -5.0, 0.0],
            [1.0, 0.0, 0.0, 1.0],
        );
        for _ in 0..600 {
            engine.step();
            if engine.bullets().is_empty() {
                break;
            }
        }
        // The failed paint path never crashes the simulation.
        let surface = engine.surface(handle).expect("surface registered");
        assert_eq!(surface.painted_texels(), 0);
    }

    #[test]
    fn test_turret_motor_moves_cannon() {
        let mut engine = setup_engine(1, true);
        engine.step();
        let tank0 = engine.tank_mut(0);
        tank0.turret_mut().set_cannon_position(1.0);
        for _ in 0..600 {
            engine.step();
        }
        let tank0 = engine.tank(0);
        let relative = angle_wrapping(
            tank0.turret().angle() - tank0.position().rotation.euler_angles().1,
        );
        assert!(
            relative.abs() > 0.3,
            "turret must rotate away from the hull axis, got {}",
            relative
        );
    }
}
