// tests/test_wireframe.rs
// Debug wireframe generation: edge counts, depth-limited enumeration,
// depth-coded red channel and the z-fighting inflation.
// RELEVANT FILES:src/accel/wireframe.rs,src/path_tracing/overlay.rs

use glam::Vec3;
use lumen3d::accel::{build_bvh, wireframe_vertices, BuildOptions};
use lumen3d::scene::{Material, Triangle};

fn tri(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Triangle {
    Triangle {
        v0: Vec3::from_array(v0),
        v1: Vec3::from_array(v1),
        v2: Vec3::from_array(v2),
        material: Material::default(),
    }
}

fn two_leaf_tree() -> lumen3d::accel::BvhTree {
    build_bvh(
        &[
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]),
            tri([50.0, 0.0, 0.0], [51.0, 0.0, 0.0], [50.5, 1.0, 0.0]),
        ],
        &BuildOptions::default(),
    )
}

#[test]
fn each_visited_box_emits_twelve_edges() {
    let tree = two_leaf_tree();
    assert_eq!(tree.stats.total_nodes, 3);

    // Depth 0: root only.
    assert_eq!(wireframe_vertices(&tree, 0).len(), 24);
    // Depth 1: root plus both leaves.
    assert_eq!(wireframe_vertices(&tree, 1).len(), 72);
    // Beyond the tree depth the full tree is returned.
    assert_eq!(wireframe_vertices(&tree, 100).len(), 72);
}

#[test]
fn red_channel_encodes_relative_depth() {
    let tree = two_leaf_tree();
    let vertices = wireframe_vertices(&tree, 100);

    // Root box comes first with depth 0.
    assert_eq!(vertices[0].color[0], 0.0);
    // Leaf boxes sit at depth 1 of a depth-1 tree: red = 1.0.
    let leaf_red = vertices[24].color[0];
    assert_eq!(leaf_red, 1.0);
}

#[test]
fn boxes_are_inflated_about_the_minimum_corner() {
    let tree = build_bvh(
        &[tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 1.0])],
        &BuildOptions::default(),
    );
    let vertices = wireframe_vertices(&tree, 0);

    let mut max_corner = Vec3::splat(f32::NEG_INFINITY);
    let mut min_corner = Vec3::splat(f32::INFINITY);
    for v in &vertices {
        let p = Vec3::from_array(v.position);
        max_corner = max_corner.max(p);
        min_corner = min_corner.min(p);
    }

    // Min corner is the anchor; the opposite corner scales by 1.01.
    assert_eq!(min_corner, Vec3::ZERO);
    assert!((max_corner - Vec3::splat(1.01)).abs().max_element() < 1e-6);
}

#[test]
fn edges_connect_adjacent_corners_only() {
    // Every emitted segment must span exactly one axis of the box.
    let tree = build_bvh(
        &[tri([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 4.0])],
        &BuildOptions::default(),
    );
    let vertices = wireframe_vertices(&tree, 0);
    assert_eq!(vertices.len(), 24);

    for pair in vertices.chunks_exact(2) {
        let a = Vec3::from_array(pair[0].position);
        let b = Vec3::from_array(pair[1].position);
        let diff = (a - b).abs();
        let changed_axes = [diff.x, diff.y, diff.z]
            .iter()
            .filter(|&&d| d > 1e-6)
            .count();
        assert_eq!(changed_axes, 1, "edge {a:?} -> {b:?} is not axis-aligned");
    }
}
