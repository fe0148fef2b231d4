//! Software realization of the projection stamping pass.
//!
//! The mesh is rendered in UV space instead of through a camera: every
//! triangle covers the texels of its UV footprint, and each covered texel is
//! mapped back to its object-space position by barycentric interpolation.
//! The position's offset from the stamp point, projected onto the
//! tangent/bitangent frame, decides where the brush image is sampled. Points
//! outside the projected unit square receive nothing, so the stamp follows
//! the real surface geometry, including foreshortening on angled faces.

use super::brush::BrushStamp;
use super::mesh::TriangleMesh;
use super::painter::ProjectionParameters;
use super::texture::Texture;
use nalgebra::{Point2, Point3};

/// Render one stamp into `target`. Writes replace previous target content
/// (the pass renders into a cleared scratch texture), so triangles sharing
/// an edge cannot composite the same texel twice.
pub(crate) fn stamp_pass(
    mesh: &TriangleMesh,
    params: &ProjectionParameters,
    brush: &BrushStamp,
    target: &mut Texture,
) {
    let width = target.width();
    let height = target.height();
    let uvs = mesh.uvs();
    let positions = mesh.positions();
    for triangle in mesh.indices() {
        let a2 = uv_to_texel_space(&uvs[triangle[0] as usize], width, height);
        let b2 = uv_to_texel_space(&uvs[triangle[1] as usize], width, height);
        let c2 = uv_to_texel_space(&uvs[triangle[2] as usize], width, height);
        let area = edge(&a2, &b2, &c2);
        if area.abs() < 1e-12 {
            continue;
        }
        let a3 = &positions[triangle[0] as usize];
        let b3 = &positions[triangle[1] as usize];
        let c3 = &positions[triangle[2] as usize];

        let min_x = a2.x.min(b2.x).min(c2.x).floor().max(0.0) as u32;
        let min_y = a2.y.min(b2.y).min(c2.y).floor().max(0.0) as u32;
        let max_x = (a2.x.max(b2.x).max(c2.x).ceil()).min(width as f32 - 1.0) as u32;
        let max_y = (a2.y.max(b2.y).max(c2.y).ceil()).min(height as f32 - 1.0) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f32, y as f32);
                let w0 = edge(&b2, &c2, &p);
                let w1 = edge(&c2, &a2, &p);
                let w2 = edge(&a2, &b2, &p);
                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };
                if !inside {
                    continue;
                }
                let l0 = w0 / area;
                let l1 = w1 / area;
                let l2 = w2 / area;
                let position = Point3::from(
                    a3.coords * l0 + b3.coords * l1 + c3.coords * l2,
                );
                let sample = sample_projected(params, brush, &position);
                if sample[3] > 0.0 {
                    target.put_texel(x, y, sample);
                }
            }
        }
    }
}

/// Project an object-space position into stamp space and sample the brush
/// there, tinted by the stamp color.
#[inline]
fn sample_projected(
    params: &ProjectionParameters,
    brush: &BrushStamp,
    position: &Point3<f32>,
) -> [f32; 4] {
    let offset = (position - params.position).component_mul(&params.scale);
    let diameter = 2.0 * params.radius;
    let u = offset.dot(&params.tangent) / diameter + 0.5;
    let v = offset.dot(&params.bitangent) / diameter + 0.5;
    let mut sample = brush.sample(u, v);
    for ch in 0..4 {
        sample[ch] *= params.color[ch];
    }
    sample
}

/// Texel-space coordinates of a UV point: texel `(x,y)` is centered at
/// `(x,y)` in this space, UV v grows upward while texel rows grow downward.
#[inline]
fn uv_to_texel_space(uv: &Point2<f32>, width: u32, height: u32) -> Point2<f32> {
    Point2::new(
        uv.x * width as f32 - 0.5,
        (1.0 - uv.y) * height as f32 - 0.5,
    )
}

#[inline]
fn edge(a: &Point2<f32>, b: &Point2<f32>, p: &Point2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painting::{BrushStamp, Texture, TriangleMesh, COLOR_TRANSPARENT, COLOR_WHITE};
    use nalgebra::{Point3, Vector3};

    fn opaque_brush() -> BrushStamp {
        BrushStamp::from_texture(Texture::filled(16, COLOR_WHITE))
    }

    fn params_at(
        position: Point3<f32>,
        radius: f32,
        color: [f32; 4],
    ) -> crate::painting::ProjectionParameters {
        crate::painting::ProjectionParameters::new(
            position,
            Vector3::z(),
            Vector3::x(),
            Vector3::new(1.0, 1.0, 1.0),
            radius,
            color,
        )
        .expect("non degenerate parameters")
    }

    #[test]
    fn test_stamp_covers_center_footprint() {
        let mesh = TriangleMesh::quad(0.5, 0.5);
        let params = params_at(Point3::origin(), 0.2, [1.0, 0.0, 0.0, 1.0]);
        let brush = opaque_brush();
        let mut target = Texture::filled(128, COLOR_TRANSPARENT);
        stamp_pass(&mesh, &params, &brush, &mut target);
        // Texel at the middle of the quad maps to the stamp center.
        let center = target.texel(64, 64);
        assert_eq!(center, [1.0, 0.0, 0.0, 1.0]);
        // Texels outside the projected footprint stay untouched.
        let corner = target.texel(2, 2);
        assert_eq!(corner, COLOR_TRANSPARENT);
    }

    #[test]
    fn test_stamp_footprint_matches_radius() {
        let mesh = TriangleMesh::quad(0.5, 0.5);
        let params = params_at(Point3::origin(), 0.1, COLOR_WHITE);
        let brush = opaque_brush();
        let mut target = Texture::filled(100, COLOR_TRANSPARENT);
        stamp_pass(&mesh, &params, &brush, &mut target);
        // The quad spans one unit, so a 0.1 radius footprint is 20 texels
        // wide centered on the texture. 15 texels off center is outside.
        assert!(target.texel(50, 50)[3] > 0.0);
        assert_eq!(target.texel(50 + 15, 50)[3], 0.0);
        assert_eq!(target.texel(50, 50 - 15)[3], 0.0);
    }

    #[test]
    fn test_stamp_off_center_moves_footprint() {
        let mesh = TriangleMesh::quad(0.5, 0.5);
        let params = params_at(Point3::new(0.3, 0.0, 0.0), 0.1, COLOR_WHITE);
        let brush = opaque_brush();
        let mut target = Texture::filled(100, COLOR_TRANSPARENT);
        stamp_pass(&mesh, &params, &brush, &mut target);
        // Stamp center sits at uv x 0.8.
        assert!(target.texel(80, 50)[3] > 0.0);
        assert_eq!(target.texel(50, 50)[3], 0.0);
    }

    #[test]
    fn test_scale_shrinks_footprint() {
        let mesh = TriangleMesh::quad(0.5, 0.5);
        // Doubling the object scale doubles world offsets, halving the
        // stamp footprint measured in object units.
        let params = crate::painting::ProjectionParameters::new(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            Vector3::new(2.0, 2.0, 2.0),
            0.1,
            COLOR_WHITE,
        )
        .expect("non degenerate parameters");
        let brush = opaque_brush();
        let mut target = Texture::filled(100, COLOR_TRANSPARENT);
        stamp_pass(&mesh, &params, &brush, &mut target);
        assert!(target.texel(50, 50)[3] > 0.0);
        // 8 texels off center is 0.08 object units, 0.16 world units > radius.
        assert_eq!(target.texel(58, 50)[3], 0.0);
    }
}
