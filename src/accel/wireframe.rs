// src/accel/wireframe.rs
// Debug wireframe generation: box edges for every BVH node down to a
// caller-supplied depth, colored by depth in the red channel.
// RELEVANT FILES:src/accel/sah.rs,src/path_tracing/overlay.rs,src/shaders/wireframe.wgsl

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::accel::sah::BvhTree;
use crate::accel::types::Aabb;

/// Line-list vertex consumed by the overlay pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WireVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Boxes are inflated about their minimum corner so edges do not z-fight
/// with the contained geometry.
const INFLATE: f32 = 1.01;

/// Edge endpoints as corner-index pairs; corner bit k selects min/max on
/// axis k.
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Enumerate nodes depth-first down to `max_depth` (inclusive) and emit
/// 24 endpoints (12 edges) per visited box. The red channel encodes
/// `node.depth / tree_max_depth`.
pub fn wireframe_vertices(tree: &BvhTree, max_depth: u32) -> Vec<WireVertex> {
    let depth_scale = tree.stats.max_depth.max(1) as f32;
    let mut out = Vec::new();
    visit(tree, tree.root, max_depth, depth_scale, &mut out);
    out
}

fn visit(tree: &BvhTree, node_idx: usize, max_depth: u32, depth_scale: f32, out: &mut Vec<WireVertex>) {
    let node = &tree.nodes[node_idx];
    if node.depth > max_depth {
        return;
    }

    let color = [node.depth as f32 / depth_scale, 0.25, 0.25];
    emit_box(&node.aabb, color, out);

    if let (Some(l), Some(r)) = (node.left, node.right) {
        visit(tree, l, max_depth, depth_scale, out);
        visit(tree, r, max_depth, depth_scale, out);
    }
}

fn emit_box(aabb: &Aabb, color: [f32; 3], out: &mut Vec<WireVertex>) {
    let min = aabb.min;
    let size = (aabb.max - aabb.min) * INFLATE;

    let corner = |bits: usize| -> Vec3 {
        Vec3::new(
            min.x + if bits & 1 != 0 { size.x } else { 0.0 },
            min.y + if bits & 2 != 0 { size.y } else { 0.0 },
            min.z + if bits & 4 != 0 { size.z } else { 0.0 },
        )
    };

    for &(a, b) in &EDGES {
        out.push(WireVertex {
            position: corner(a).to_array(),
            color,
        });
        out.push(WireVertex {
            position: corner(b).to_array(),
            color,
        });
    }
}
