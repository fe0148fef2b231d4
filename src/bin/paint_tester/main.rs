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

//! Exercises the decal painter directly, without tanks or physics: stamps a
//! ring of decals onto a mesh and saves the accumulation texture.

use anyhow::Context;
use clap::Parser;
use nalgebra::{Point3, Vector3};
use ptanks::enable_human_panic;
use ptanks::painting::{BrushStamp, DecalPainter, Texture, TriangleMesh};
use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::Arc;

const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Stamp decals on a mesh and save the baked texture
#[derive(Parser)]
#[clap(version = VERSION, author = "Oreste Bernardi")]
struct TesterOpts {
    //Log level to be used if environmental variable RUST_LOG is not set.
    #[clap(short, long, default_value = "info",value_parser=["error","warn","info","debug","trace"])]
    log_level: String,
    /// Side of the accumulation texture.
    #[clap(short, long, default_value = "1024")]
    texture_size: u32,
    /// Mesh receiving the decals.
    #[clap(short, long, default_value = "quad", value_parser=["quad","cuboid"])]
    mesh: String,
    /// Stamp radius in mesh units.
    #[clap(short, long, default_value = "0.08")]
    radius: f32,
    /// How many stamps are applied in a ring around the mesh center.
    #[clap(short, long, default_value = "12")]
    count: u32,
    /// Brush stamp image. When not set a procedural soft disc is used.
    #[clap(short, long)]
    brush: Option<PathBuf>,
    /// Optional base texture baked in before painting.
    #[clap(long)]
    base: Option<PathBuf>,
    /// Where the baked texture is written.
    #[clap(short, long, default_value = "paint_tester.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    enable_human_panic();
    let opts = TesterOpts::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("paint_tester=".to_string() + &opts.log_level),
    )
    .init();

    let mesh = match opts.mesh.as_str() {
        "cuboid" => TriangleMesh::cuboid(0.5, 0.5, 0.5),
        _ => TriangleMesh::quad(0.5, 0.5),
    };
    let base = match opts.base.as_ref() {
        Some(path) => Some(
            Texture::load(path).with_context(|| format!("loading base {}", path.display()))?,
        ),
        None => None,
    };
    let brush = match opts.brush.as_ref() {
        Some(path) => BrushStamp::from_file(path)
            .with_context(|| format!("loading brush {}", path.display()))?,
        None => BrushStamp::soft_circle(256, 0.7),
    };

    let mut painter = DecalPainter::new(mesh, opts.texture_size, base.as_ref())
        .context("creating decal painter")?;
    painter.set_decal_texture(Arc::new(brush));

    // Ring of stamps on the +z face, colors cycling over a small palette.
    let palette: [[f32; 4]; 3] = [
        [0.9, 0.15, 0.1, 1.0],
        [0.1, 0.4, 0.9, 1.0],
        [0.95, 0.8, 0.1, 1.0],
    ];
    let scale = Vector3::new(1.0, 1.0, 1.0);
    // The quad lives in the z=0 plane, the cuboid's +z face at z=0.5.
    let face_z = if opts.mesh == "cuboid" { 0.5 } else { 0.0 };
    for index in 0..opts.count {
        let angle = 2.0 * PI * index as f32 / opts.count.max(1) as f32;
        let ring_radius = 0.3;
        let position = Point3::new(
            ring_radius * angle.cos(),
            ring_radius * angle.sin(),
            face_z,
        );
        painter.paint(
            position,
            Vector3::z(),
            Vector3::x(),
            scale,
            opts.radius,
            palette[index as usize % palette.len()],
        );
    }

    painter
        .texture()
        .context("painter torn down")?
        .save(&opts.output)
        .with_context(|| format!("saving {}", opts.output.display()))?;
    log::info!("Baked {} stamps into {}", opts.count, opts.output.display());
    Ok(())
}
