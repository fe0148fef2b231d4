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
use anyhow::Context;
use clap::Parser;
use log::{debug, warn};
use ptanks::painting::TriangleMesh;
use ptanks::physics::{angle_wrapping, Isometry3, PhysicsEngine, Vector3};
use ptanks::{conf, enable_human_panic, is_exit_application, signal_exit, Opts};
use std::f32::consts::{FRAC_PI_2, PI};
use std::time;

/// Paint palette cycled over the deployed tanks.
const TANK_COLORS: [[f32; 4]; 4] = [
    [0.9, 0.15, 0.1, 1.0],
    [0.1, 0.4, 0.9, 1.0],
    [0.95, 0.8, 0.1, 1.0],
    [0.2, 0.8, 0.3, 1.0],
];

fn main() -> anyhow::Result<()> {
    enable_human_panic();
    let opts: Opts = Opts::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("ptanks=".to_string() + &opts.log_level),
    )
    .init();
    let conf = match opts.configuration_file.as_ref() {
        None => conf::Conf {
            ..Default::default()
        },
        Some(path) => conf::Conf::load_configuration(path)
            .with_context(|| format!("loading configuration file {}", path))?,
    };
    ctrlc::set_handler(signal_exit).context("setting ctrl-c handler")?;

    let mut engine = PhysicsEngine::new(conf, &opts);
    build_arena(&mut engine, opts.num_tanks);

    let simulation_rate = opts.sim_step_rate;
    let now = time::Instant::now();
    // show some fps measurements every 5 seconds
    let mut fps_counter = ticktock::Timer::apply(|delta_t, prev_tick| (delta_t, *prev_tick), 0)
        .every(time::Duration::from_secs(5))
        .start(now);
    for (tick, now) in ticktock::Clock::framerate(simulation_rate).iter() {
        drive_tanks(&mut engine, tick as u64);
        engine.step();

        // Compute fps and show message if it is too low.
        if let Some((delta_t, prev_tick)) = fps_counter.update(now) {
            fps_counter.set_value(tick);
            let fps = (tick - prev_tick) as f64 / delta_t.as_secs_f64();
            debug!("FPS: {}", fps);
            if fps < (simulation_rate - 1.0) {
                warn!(
                    "Simulation framerate is low {} expected {}",
                    fps, simulation_rate
                )
            }
        }
        if is_exit_application() {
            debug!("Exiting simulation loop");
            break;
        }
    }
    engine.exit_simulation(&opts.output_dir);
    Ok(())
}

/// Ground plane and four walls, all paintable, plus the requested tanks.
fn build_arena(engine: &mut PhysicsEngine, num_tanks: usize) {
    let half = engine.conf().arena_half_extent_m;
    let wall_half_height = engine.conf().wall_height_m / 2.0;
    let unit_scale = Vector3::new(1.0, 1.0, 1.0);
    engine.add_paintable_surface(
        "ground",
        TriangleMesh::quad(half, half),
        Isometry3::new(Vector3::zeros(), Vector3::x() * -FRAC_PI_2),
        unit_scale,
        None,
    );
    // Walls face the arena center.
    let walls = [
        ("wall_east", Vector3::new(half, wall_half_height, 0.0), -FRAC_PI_2),
        ("wall_west", Vector3::new(-half, wall_half_height, 0.0), FRAC_PI_2),
        ("wall_north", Vector3::new(0.0, wall_half_height, -half), 0.0),
        ("wall_south", Vector3::new(0.0, wall_half_height, half), PI),
    ];
    for (name, center, yaw) in walls {
        engine.add_paintable_surface(
            name,
            TriangleMesh::quad(half, wall_half_height),
            Isometry3::new(center, Vector3::y() * yaw),
            unit_scale,
            None,
        );
    }
    for index in 0..num_tanks {
        engine.add_tank_in_circle(
            format!("tank{}", index),
            TANK_COLORS[index % TANK_COLORS.len()],
            num_tanks.max(1),
        );
    }
}

/// Scripted behavior: every tank drives a slow curve, sweeps its cannon and
/// fires as soon as the reload allows.
fn drive_tanks(engine: &mut PhysicsEngine, tick: u64) {
    let num_tanks = engine.tanks().len();
    for index in 0..num_tanks {
        let phase = index as f32 * 2.0 * PI / num_tanks.max(1) as f32;
        let t = tick as f32 / 60.0;
        let tank = engine.tank_mut(index);
        tank.set_engine_power(0.4);
        tank.set_turning_power(0.3 * (0.2 * t + phase).sin());
        let turret = tank.turret_mut();
        turret.set_cannon_position(angle_wrapping(0.7 * t + phase));
        if tick % 30 == (index as u64 * 7) % 30 {
            turret.fire();
        }
    }
}
