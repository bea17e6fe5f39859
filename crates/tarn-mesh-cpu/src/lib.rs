//! CPU geometry for sprite voxels: the reusable onion-skin shell mesh.
#![forbid(unsafe_code)]

use tarn_geom::Vec3;

/// Interleaved floats per vertex: position xyz + normal xyz.
pub const VERTEX_STRIDE: usize = 6;

/// Vertices emitted per shell face (two triangles).
pub const VERTICES_PER_FACE: usize = 6;

/// Shell depths from outermost to innermost, interleaved so that early
/// prefixes cover both cube faces before filling the interior. The order
/// balances fill rate against z-fighting and must not be reordered.
pub const SHELL_DEPTH_ORDER: [u32; 17] = [0, 16, 2, 14, 4, 12, 6, 10, 8, 1, 15, 9, 3, 13, 5, 11, 7];

/// One reusable shell mesh for a voxel sprite footprint.
///
/// Built once at startup and drawn for every sprite with a per-draw model
/// transform. A draw of `k` shells consumes the first
/// `k * VERTICES_PER_FACE * 3` vertices, so fewer shells means a cheaper
/// draw (used for distant or special-case renders).
#[derive(Clone, Debug, Default)]
pub struct ShellMesh {
    /// Interleaved (position, normal) floats, `VERTEX_STRIDE` per vertex.
    pub vertices: Vec<f32>,
    pub vertex_count: usize,
}

impl ShellMesh {
    /// Vertex count of the prefix that draws `shells` shells.
    #[inline]
    pub fn prefix_vertex_count(&self, shells: usize) -> usize {
        (shells * VERTICES_PER_FACE * 3).min(self.vertex_count)
    }

    /// Number of shells that covers the whole mesh.
    #[inline]
    pub fn full_shell_count(&self) -> usize {
        SHELL_DEPTH_ORDER.len()
    }

    fn push_face(&mut self, corners: [Vec3; 6], n: Vec3) {
        for c in corners {
            self.vertices
                .extend_from_slice(&[c.x, c.y, c.z, n.x, n.y, n.z]);
        }
        self.vertex_count += VERTICES_PER_FACE;
    }
}

/// Builds the concentric shell geometry for a sprite of `(sx, sy, sz)`
/// voxels. Each step emits one axis-aligned face plane; the three axes
/// alternate per step (z, x, y) while the plane depth walks
/// `SHELL_DEPTH_ORDER`. Shell indices past a smaller axis extent are
/// skipped, so non-cubic footprints cost fewer vertices.
pub fn build_onion_skin(sx: u32, sy: u32, sz: u32) -> ShellMesh {
    const Z_DIRECTION: u32 = 0;
    const X_DIRECTION: u32 = 1;

    let mut mesh = ShellMesh::default();
    let layer_count = sx.max(sy).max(sz) + 1;

    for a in 0..layer_count * 3 {
        let direction = a % 3;
        let shell_index = a / 3;
        let Some(&depth) = SHELL_DEPTH_ORDER.get(shell_index as usize) else {
            continue;
        };
        let depth = depth as f32;
        let (fx, fy, fz) = (sx as f32, sy as f32, sz as f32);

        // (x1,y1,z1)..(x2,y2,z2) span the face; z3 tilts y-planes upright.
        let (x1, x2, y1, y2, z1, z2, z3, n);
        if direction == Z_DIRECTION {
            if shell_index > sz + 1 {
                continue;
            }
            (x1, x2, y1, y2) = (0.0, fx, 0.0, fy);
            (z1, z2, z3) = (depth, depth, 0.0);
            n = Vec3::new(0.0, 0.0, 1.0);
        } else if direction == X_DIRECTION {
            if shell_index > sx + 1 {
                continue;
            }
            (x1, x2, y1, y2) = (depth, depth, fy, 0.0);
            (z1, z2, z3) = (0.0, fz, 0.0);
            n = Vec3::new(1.0, 0.0, 0.0);
        } else {
            if shell_index > sy + 1 {
                continue;
            }
            (x1, x2, y1, y2) = (0.0, fx, depth, depth);
            (z1, z2, z3) = (0.0, 0.0, fz);
            n = Vec3::new(0.0, -1.0, 0.0);
        }

        mesh.push_face(
            [
                Vec3::new(x1, y1, z1),
                Vec3::new(x2, y1, z2),
                Vec3::new(x1, y2, z1 + z3),
                Vec3::new(x2, y1, z2),
                Vec3::new(x2, y2, z2 + z3),
                Vec3::new(x1, y2, z1 + z3),
            ],
            n,
        );
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_sprite_emits_six_vertices_per_shell_face() {
        let mesh = build_onion_skin(16, 16, 16);
        // layer_count * 3 face steps, none skipped for the full cube.
        let faces = (16 + 1) * 3;
        assert_eq!(mesh.vertex_count, faces * VERTICES_PER_FACE);
        assert_eq!(
            mesh.vertices.len(),
            mesh.vertex_count * VERTEX_STRIDE,
            "interleaved stride must hold"
        );
    }

    #[test]
    fn flat_sprite_skips_out_of_range_shells() {
        let mesh = build_onion_skin(16, 16, 8);
        // Shell indices 10..=16 exceed sz + 1 = 9 and drop their z faces.
        let skipped = 17 - (8 + 2);
        let faces = 17 * 3 - skipped;
        assert_eq!(mesh.vertex_count, faces * VERTICES_PER_FACE);
    }

    #[test]
    fn build_is_deterministic() {
        let a = build_onion_skin(16, 16, 16);
        let b = build_onion_skin(16, 16, 16);
        assert_eq!(a.vertices, b.vertices);
    }

    #[test]
    fn prefix_counts_match_draw_contract() {
        let mesh = build_onion_skin(16, 16, 16);
        assert_eq!(mesh.prefix_vertex_count(1), 18);
        assert_eq!(mesh.prefix_vertex_count(17), mesh.vertex_count);
        // Requesting more shells than exist clamps to the whole mesh.
        assert_eq!(mesh.prefix_vertex_count(99), mesh.vertex_count);
    }

    #[test]
    fn outermost_shells_come_first() {
        let mesh = build_onion_skin(16, 16, 16);
        // First face plane sits at depth 0, second step's z plane at 16.
        assert_eq!(mesh.vertices[2], 0.0);
        let second_z_face = 3 * VERTICES_PER_FACE * VERTEX_STRIDE;
        assert_eq!(mesh.vertices[second_z_face + 2], 16.0);
    }
}
