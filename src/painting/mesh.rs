use super::PaintError;
use nalgebra::{Point2, Point3};

/// Triangle mesh with a UV parameterization, in object space.
///
/// The UV layout decides where paint lands in the accumulation texture:
/// every point of the surface must map to its own texel region. Overlapping
/// UV islands produce overlapping paint; that is a caller responsibility and
/// is not validated here.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    positions: Vec<Point3<f32>>,
    uvs: Vec<Point2<f32>>,
    indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(
        positions: Vec<Point3<f32>>,
        uvs: Vec<Point2<f32>>,
        indices: Vec<[u32; 3]>,
    ) -> Result<TriangleMesh, PaintError> {
        let mesh = TriangleMesh {
            positions,
            uvs,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub(crate) fn validate(&self) -> Result<(), PaintError> {
        if self.positions.is_empty() {
            return Err(PaintError::InvalidMesh("mesh has no vertices"));
        }
        if self.uvs.len() != self.positions.len() {
            return Err(PaintError::InvalidMesh(
                "uv count does not match vertex count",
            ));
        }
        if self.indices.is_empty() {
            return Err(PaintError::InvalidMesh("mesh has no triangles"));
        }
        let vertex_count = self.positions.len() as u32;
        let mut uv_area = 0.0f32;
        for triangle in &self.indices {
            for index in triangle {
                if *index >= vertex_count {
                    return Err(PaintError::InvalidMesh("triangle index out of range"));
                }
            }
            let a = self.uvs[triangle[0] as usize];
            let b = self.uvs[triangle[1] as usize];
            let c = self.uvs[triangle[2] as usize];
            uv_area += ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs();
        }
        if uv_area <= f32::EPSILON {
            return Err(PaintError::InvalidMesh(
                "degenerate uv parameterization",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    #[inline]
    pub fn uvs(&self) -> &[Point2<f32>] {
        &self.uvs
    }

    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Axis aligned quad in the xy plane, normal +z, UVs spanning the full
    /// unit square. `half_width` along x, `half_height` along y.
    pub fn quad(half_width: f32, half_height: f32) -> TriangleMesh {
        let positions = vec![
            Point3::new(-half_width, -half_height, 0.0),
            Point3::new(half_width, -half_height, 0.0),
            Point3::new(half_width, half_height, 0.0),
            Point3::new(-half_width, half_height, 0.0),
        ];
        let uvs = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let indices = vec![[0, 1, 2], [0, 2, 3]];
        TriangleMesh {
            positions,
            uvs,
            indices,
        }
    }

    /// Axis aligned cuboid with the six faces laid out in a 3x2 UV atlas,
    /// one island per face so every face owns its own texels.
    pub fn cuboid(half_x: f32, half_y: f32, half_z: f32) -> TriangleMesh {
        let mut mesh = TriangleMesh {
            positions: Vec::with_capacity(24),
            uvs: Vec::with_capacity(24),
            indices: Vec::with_capacity(12),
        };
        let x = nalgebra::Vector3::new(half_x, 0.0, 0.0);
        let y = nalgebra::Vector3::new(0.0, half_y, 0.0);
        let z = nalgebra::Vector3::new(0.0, 0.0, half_z);
        // (face center, u axis, v axis, atlas cell)
        let faces = [
            (x, -z, y, (0, 0)),  // +x
            (-x, z, y, (1, 0)),  // -x
            (y, x, -z, (2, 0)),  // +y
            (-y, x, z, (0, 1)),  // -y
            (z, x, y, (1, 1)),   // +z
            (-z, -x, y, (2, 1)), // -z
        ];
        for (center, u_axis, v_axis, cell) in faces {
            mesh.push_face(center, u_axis, v_axis, cell);
        }
        mesh
    }

    fn push_face(
        &mut self,
        center: nalgebra::Vector3<f32>,
        u_axis: nalgebra::Vector3<f32>,
        v_axis: nalgebra::Vector3<f32>,
        cell: (u32, u32),
    ) {
        // Small inset keeps the islands from bleeding into each other when
        // the texture is sampled with filtering.
        const INSET: f32 = 0.01;
        let cell_w = 1.0 / 3.0;
        let cell_h = 1.0 / 2.0;
        let u0 = cell.0 as f32 * cell_w + INSET;
        let u1 = (cell.0 + 1) as f32 * cell_w - INSET;
        // Atlas rows are counted from the top, UV v grows upward.
        let v1 = 1.0 - (cell.1 as f32 * cell_h + INSET);
        let v0 = 1.0 - ((cell.1 + 1) as f32 * cell_h - INSET);
        let base = self.positions.len() as u32;
        let corners = [
            (center - u_axis - v_axis, Point2::new(u0, v0)),
            (center + u_axis - v_axis, Point2::new(u1, v0)),
            (center + u_axis + v_axis, Point2::new(u1, v1)),
            (center - u_axis + v_axis, Point2::new(u0, v1)),
        ];
        for (position, uv) in corners {
            self.positions.push(Point3::from(position));
            self.uvs.push(uv);
        }
        self.indices.push([base, base + 1, base + 2]);
        self.indices.push([base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painting::PaintError;

    #[test]
    fn test_quad_is_valid() {
        let mesh = TriangleMesh::quad(0.5, 0.5);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_cuboid_is_valid_with_disjoint_islands() {
        let mesh = TriangleMesh::cuboid(1.0, 0.5, 0.75);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 12);
        for uv in mesh.uvs() {
            assert!(uv.x >= 0.0 && uv.x <= 1.0);
            assert!(uv.y >= 0.0 && uv.y <= 1.0);
        }
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let result = TriangleMesh::new(vec![], vec![], vec![]);
        assert!(matches!(result, Err(PaintError::InvalidMesh(_))));
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let result = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 7]],
        );
        assert!(matches!(result, Err(PaintError::InvalidMesh(_))));
    }

    #[test]
    fn test_degenerate_uvs_rejected() {
        let result = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![
                Point2::new(0.5, 0.5),
                Point2::new(0.5, 0.5),
                Point2::new(0.5, 0.5),
            ],
            vec![[0, 1, 2]],
        );
        assert!(matches!(result, Err(PaintError::InvalidMesh(_))));
    }

    #[test]
    fn test_uv_count_mismatch_rejected() {
        let result = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Point2::new(0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        assert!(matches!(result, Err(PaintError::InvalidMesh(_))));
    }
}
