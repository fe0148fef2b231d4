use super::PhysicsEngine;
use crate::conf::*;
use crate::painting::Color;
use rapier3d::na::Isometry3;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(Hash, Eq, PartialEq, Clone, Copy, Default)]
pub struct ObjUID(u64);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turret {
    pub(super) phy_body_handle: RigidBodyHandle,
    pub(super) collider_handle: ColliderHandle,
    pub(super) angle: f32, //Yaw in world coordinates. Updated during step
    pub(super) fire: bool,
    pub(super) new_angle: Option<f32>, // New position. None if there is no command change
    pub(super) reload_ticks_left: u32,
    reload_ticks: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bullet {
    pub(super) phy_body_handle: RigidBodyHandle,
    pub(super) collider_handle: ColliderHandle,
    pub(super) tick_counter: u32, //tick count down when zero the bullet will be destroyed
    pub(super) age_ticks: u32,
    pub(super) arming_ticks: u32,
    pub(super) position: Isometry3<Real>,
    pub(super) paint_color: Color,
    pub(super) paint_radius: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tank {
    pub(super) phy_body_handle: RigidBodyHandle,
    pub(super) collider_handle: ColliderHandle,
    pub(super) cannon_joint_handle: ImpulseJointHandle,
    pub name: String,
    pub(super) turret: Turret,
    pub(super) engine_power: f32,
    pub(super) max_engine_power: f32,
    pub(super) turning_power_max: f32,
    pub(super) turning_power: f32,
    pub(super) max_linear_velocity: f32,
    pub(super) max_angular_velocity: f32,
    pub(super) position: Isometry<Real>,
    pub(super) linvel: Vector<Real>,
    pub(super) angvel: Vector<Real>,
    pub(super) paint_color: Color,
    pub(super) paint_radius: f32,
}

impl Tank {
    pub fn new(
        p_engine: &mut PhysicsEngine,
        tank_position: Isometry<Real>,
        tank_index: usize,
        name: String,
        paint_color: Color,
    ) -> Tank {
        let conf = &p_engine.conf;
        let body = RigidBodyBuilder::dynamic()
            .position(tank_position)
            .linear_damping(conf.linear_damping)
            .angular_damping(conf.angular_damping)
            .build();

        let rigid_body_handle = p_engine.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(
            p_engine.conf.tank_width_m / 2.0,
            p_engine.conf.tank_height_m / 2.0,
            p_engine.conf.tank_depth_m / 2.0,
        )
        .restitution(0.7)
        .density(p_engine.conf.tank_collider_density)
        .collision_groups(super::TANK_GROUP)
        .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS)
        .user_data(tank_index as u128)
        .build();
        let collider_handle = p_engine.collider_set.insert_with_parent(
            collider,
            rigid_body_handle,
            &mut p_engine.rigid_body_set,
        );

        /*
        Setup turret
        */
        let turret_altitude =
            p_engine.conf.tank_height_m / 2.0 + p_engine.conf.turret_height_m / 2.0;
        let turret_body = RigidBodyBuilder::dynamic()
            .translation(
                tank_position.translation.vector + Vector::y() * turret_altitude,
            )
            .build();
        let rigid_body_turret_handle = p_engine.rigid_body_set.insert(turret_body);

        let turret_collider = ColliderBuilder::cuboid(
            p_engine.conf.turret_width_m / 2.0,
            p_engine.conf.turret_height_m / 2.0,
            p_engine.conf.turret_depth_m / 2.0,
        )
        .density(p_engine.conf.turret_collider_density)
        .collision_groups(super::TURRET_GROUP)
        .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS)
        .user_data(tank_index as u128)
        .build();

        let collider_turret_handle = p_engine.collider_set.insert_with_parent(
            turret_collider,
            rigid_body_turret_handle,
            &mut p_engine.rigid_body_set,
        );
        // Create joint to move turret together with tank.
        // The turret rotates about the vertical axis and is anchored at its
        // rear so the cannon extends forward of the pivot.
        let joint = RevoluteJointBuilder::new(Vector::y_axis())
            .local_anchor1(point![0.0, turret_altitude, 0.0])
            .local_anchor2(point![-p_engine.conf.turret_width_m / 2.0, 0.0, 0.0])
            .motor_model(MotorModel::AccelerationBased)
            .motor_position(
                0.0,
                p_engine.conf.turret_stiffness,
                p_engine.conf.turret_damping,
            )
            .build();
        let cannon_joint_handle =
            p_engine
                .joint_set
                .insert(rigid_body_handle, rigid_body_turret_handle, joint, true);

        let rigid_body = &p_engine.rigid_body_set[rigid_body_handle];
        Tank {
            name,
            phy_body_handle: rigid_body_handle,
            collider_handle,
            cannon_joint_handle,
            turret: Turret {
                phy_body_handle: rigid_body_turret_handle,
                collider_handle: collider_turret_handle,
                angle: 0.0,
                fire: false,
                new_angle: None,
                reload_ticks_left: 0,
                reload_ticks: p_engine.conf.cannon_reload_ticks,
            },
            engine_power: 0.0,
            max_engine_power: p_engine.conf.tank_engine_power_max,
            turning_power: 0.0,
            turning_power_max: p_engine.conf.turning_power_max,
            max_linear_velocity: p_engine.conf.tank_max_linear_velocity,
            max_angular_velocity: p_engine.conf.tank_max_angular_velocity,
            position: *rigid_body.position(),
            linvel: *rigid_body.linvel(),
            angvel: *rigid_body.angvel(),
            paint_color,
            paint_radius: p_engine.conf.paint_radius_m,
        }
    }

    #[inline]
    /// Get unique id of Tank
    /// It is derived from RigidBodyHandle
    pub fn get_id(&self) -> ObjUID {
        let (a, b) = self.phy_body_handle.into_raw_parts();
        ObjUID((a as u64) << 32 | b as u64)
    }

    #[inline]
    pub fn linear_velocity(&self) -> Real {
        self.linvel.norm()
    }

    #[inline]
    /// Get the velocity along the tank driving direction
    pub fn forward_velocity(&self) -> Real {
        let direction_vector = self.position * Vector::x();
        direction_vector.dot(&self.linvel)
    }

    #[inline]
    pub fn turret(&self) -> &Turret {
        &self.turret
    }

    #[inline]
    pub fn turret_mut(&mut self) -> &mut Turret {
        &mut self.turret
    }

    #[inline]
    pub fn linvel(&self) -> Vector<Real> {
        self.linvel
    }

    #[inline]
    pub fn engine_power(&self) -> f32 {
        self.engine_power
    }

    #[inline]
    pub fn position(&self) -> Isometry<Real> {
        self.position
    }

    #[inline]
    pub fn angular_velocity(&self) -> Real {
        self.angvel.y
    }

    #[inline]
    pub fn turning_power(&self) -> f32 {
        self.turning_power
    }

    #[inline]
    pub fn paint_color(&self) -> Color {
        self.paint_color
    }

    #[inline]
    pub fn paint_radius(&self) -> f32 {
        self.paint_radius
    }

    /// Get engine power normalized
    /// Result range [-1.0,1.0]
    #[inline]
    pub fn engine_power_fraction(&self) -> f32 {
        self.engine_power / self.max_engine_power
    }

    /// Get turning power.
    #[inline]
    pub fn turning_power_fraction(&self) -> f32 {
        self.turning_power / self.turning_power_max
    }

    /// Set engine power fraction
    /// power_fraction: range [-1.0,1.0]
    pub fn set_engine_power(&mut self, power_fraction: f32) {
        let fraction = power_fraction.clamp(-1.0, 1.0);
        self.engine_power = fraction * self.max_engine_power;
    }

    pub fn set_turning_power(&mut self, power_fraction: f32) {
        let power_fraction_wrapped = power_fraction.clamp(-1.0, 1.0);
        self.turning_power = self.turning_power_max * power_fraction_wrapped;
    }

    /**
     * Set cannon position
     */
    pub(super) fn set_cannon_position_physics(
        &mut self,
        joint_set: &mut ImpulseJointSet,
        conf: &Conf,
    ) {
        if let Some(angle) = self.turret.new_angle {
            let joint = joint_set
                .get_mut(self.cannon_joint_handle)
                .expect("Unable to get cannon joint");
            let revolute_joint = joint
                .data
                .as_revolute_mut()
                .expect("Unable to convert joint to revolute joint");
            revolute_joint.set_motor_position(angle, conf.turret_stiffness, conf.turret_damping);

            self.turret.new_angle = None;
        };
    }

    /*
    Clamp hull velocities to the configured maxima. The engine force model
    has no upper bound on its own.
    */
    pub(super) fn limit_velocities(&self, rigid_body: &mut RigidBody) {
        let linvel = *rigid_body.linvel();
        if linvel.norm() > self.max_linear_velocity {
            rigid_body.set_linvel(linvel.normalize() * self.max_linear_velocity, false);
        }
        let angvel = *rigid_body.angvel();
        if angvel.norm() > self.max_angular_velocity {
            rigid_body.set_angvel(angvel.normalize() * self.max_angular_velocity, false);
        }
    }
}

impl Turret {
    /// Count down the cannon reload.
    /// executed at every simulation step
    #[inline]
    pub(super) fn update_reload(&mut self) {
        self.reload_ticks_left = self.reload_ticks_left.saturating_sub(1);
    }

    /// Restart the reload countdown after a shot left the cannon.
    #[inline]
    pub(super) fn mark_fired(&mut self) {
        self.reload_ticks_left = self.reload_ticks;
    }

    #[inline]
    /// Get turret yaw in world coordinates
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    /// Command a new cannon angle relative to the hull.
    pub fn set_cannon_position(&mut self, angle: f32) {
        self.new_angle = Some(super::util::angle_wrapping(angle));
    }

    pub fn ready_to_fire(&self) -> bool {
        self.reload_ticks_left == 0
    }

    pub fn fire(&mut self) -> bool {
        if self.ready_to_fire() {
            self.fire = true;
            true
        } else {
            false
        }
    }
}

impl Bullet {
    #[inline]
    pub fn position(&self) -> Isometry3<Real> {
        self.position
    }
    #[inline]
    pub fn paint_color(&self) -> Color {
        self.paint_color
    }
    #[inline]
    pub fn paint_radius(&self) -> f32 {
        self.paint_radius
    }
    #[inline]
    /// True once the bullet has flown long enough for impacts to register.
    pub fn armed(&self) -> bool {
        self.age_ticks > self.arming_ticks
    }
    #[inline]
    /// Get unique id of Bullet
    /// It is derived from RigidBodyHandle so it is unique globally
    pub fn get_id(&self) -> ObjUID {
        let (a, b) = self.phy_body_handle.into_raw_parts();
        ObjUID((a as u64) << 32 | b as u64)
    }
}
