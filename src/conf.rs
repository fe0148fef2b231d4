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

use confy;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize)]
pub struct Conf {
    pub tank_width_m: f32,  //Hull size along the driving direction
    pub tank_height_m: f32,
    pub tank_depth_m: f32,
    pub turret_width_m: f32,
    pub turret_height_m: f32,
    pub turret_depth_m: f32,
    pub turret_stiffness: f32,
    pub turret_damping: f32,
    pub turret_collider_density: f32,
    pub tank_collider_density: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub tank_engine_power_max: f32, //Max power
    pub turning_power_max: f32,     //Maximum torque for turning
    /// Hull linear speed is clamped to this value every step.
    pub tank_max_linear_velocity: f32,
    /// Hull angular speed is clamped to this value every step.
    pub tank_max_angular_velocity: f32,
    pub bullet_radius_m: f32,
    pub bullet_speed: f32, //  m/sec
    pub bullet_max_range: f32,
    pub bullet_density: f32,
    /// Steps a bullet must fly before an impact is processed.
    /// Prevents painting the firing tank at the muzzle.
    pub bullet_arming_ticks: u32,
    /// Steps between two shots of the same cannon.
    pub cannon_reload_ticks: u32,
    /// Stamp radius in world meters of the paint splat left by a bullet.
    pub paint_radius_m: f32,
    /// Side of the square accumulation texture allocated for each paintable surface.
    pub paint_texture_size: u32,
    /// Brush stamp image. When not set a procedural soft disc is used.
    pub brush_texture_path: Option<PathBuf>,
    /// Side of the procedurally generated brush stamp.
    pub brush_stamp_size: u32,
    /// Edge hardness of the procedural brush in range [0.0,1.0].
    pub brush_hardness: f32,
    /// Lifetime of an impact effect marker.
    pub fx_duration_ticks: u32,
    pub arena_half_extent_m: f32,
    pub wall_height_m: f32,
    pub gravity_y: f32,
    pub start_distance: f32, //Distance from arena center used to deploy tanks at game start
}

impl Conf {
    pub fn load_configuration(path: &str) -> Result<Conf, confy::ConfyError> {
        let path_full = Path::new(path);
        debug!(
            "Writing or reading configuration from path {}",
            path_full.display()
        );
        let conf: Conf = confy::load_path(path_full)?;
        Ok(conf)
    }
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            tank_width_m: 2.4,
            tank_height_m: 0.8,
            tank_depth_m: 1.6,
            turret_width_m: 1.6,
            turret_height_m: 0.2,
            turret_depth_m: 0.2,
            turret_stiffness: 100.0,
            turret_damping: 40.0,
            turret_collider_density: 5.0,
            tank_collider_density: 7.0,
            linear_damping: 1.0,
            angular_damping: 1.0,
            tank_engine_power_max: 20000.0, //Max power
            turning_power_max: 250.0,
            tank_max_linear_velocity: 8.0,
            tank_max_angular_velocity: 2.0,
            bullet_radius_m: 0.12,
            bullet_speed: 30.0, //  m/sec
            bullet_max_range: 60.0,
            bullet_density: 0.8,
            // 0.1 simulation seconds at 60 steps x sec
            bullet_arming_ticks: 6,
            cannon_reload_ticks: 45,
            paint_radius_m: 0.5,
            paint_texture_size: 1024,
            brush_texture_path: None,
            brush_stamp_size: 256,
            brush_hardness: 0.7,
            fx_duration_ticks: 45,
            arena_half_extent_m: 20.0,
            wall_height_m: 3.0,
            gravity_y: -9.81,
            start_distance: 12.0,
        }
    }
}
