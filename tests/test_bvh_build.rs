// tests/test_bvh_build.rs
// BVH construction invariants: coverage, conservation, stats bounds and
// the median fallback on identical centroids.
// RELEVANT FILES:src/accel/sah.rs,src/accel/types.rs

use glam::Vec3;
use lumen3d::accel::{build_bvh, BuildOptions, BvhTree};
use lumen3d::scene::{Material, Triangle};

fn tri(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Triangle {
    Triangle {
        v0: Vec3::from_array(v0),
        v1: Vec3::from_array(v1),
        v2: Vec3::from_array(v2),
        material: Material::default(),
    }
}

/// Small deterministic LCG so the random scene is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as f32) / (u32::MAX >> 1) as f32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_f32() * (hi - lo)
    }
}

fn random_triangles(count: usize, seed: u64) -> Vec<Triangle> {
    let mut rng = Lcg(seed);
    (0..count)
        .map(|_| {
            let c = Vec3::new(
                rng.range(-10.0, 10.0),
                rng.range(-10.0, 10.0),
                rng.range(-10.0, 10.0),
            );
            let offset = |rng: &mut Lcg| {
                Vec3::new(
                    rng.range(-0.5, 0.5),
                    rng.range(-0.5, 0.5),
                    rng.range(-0.5, 0.5),
                )
            };
            Triangle {
                v0: c + offset(&mut rng),
                v1: c + offset(&mut rng),
                v2: c + offset(&mut rng),
                material: Material::default(),
            }
        })
        .collect()
}

/// Every leaf box contains all vertices of its triangles; every internal
/// box contains both child boxes.
fn assert_coverage(tree: &BvhTree, triangles: &[Triangle]) {
    for node in &tree.nodes {
        if node.is_leaf() {
            for &i in &node.triangle_indices {
                let t = &triangles[i as usize];
                for v in [t.v0, t.v1, t.v2] {
                    assert!(
                        node.aabb.contains_point(v),
                        "leaf box {:?} does not contain vertex {v:?}",
                        node.aabb
                    );
                }
            }
        } else {
            let left = &tree.nodes[node.left.unwrap()];
            let right = &tree.nodes[node.right.unwrap()];
            assert!(node.aabb.contains_aabb(&left.aabb));
            assert!(node.aabb.contains_aabb(&right.aabb));
            assert!(node.triangle_indices.is_empty());
            assert_eq!(left.depth, node.depth + 1);
            assert_eq!(right.depth, node.depth + 1);
        }
    }
}

/// The multiset of leaf triangle indices is exactly {0, .., n-1}.
fn assert_conservation(tree: &BvhTree, n: usize) {
    let mut seen = vec![0u32; n];
    for node in &tree.nodes {
        if node.is_leaf() {
            for &i in &node.triangle_indices {
                seen[i as usize] += 1;
            }
        }
    }
    assert!(
        seen.iter().all(|&c| c == 1),
        "each triangle must appear in exactly one leaf"
    );
}

#[test]
fn single_triangle_is_a_leaf_root() {
    let tris = vec![tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0])];
    let tree = build_bvh(&tris, &BuildOptions::default());

    let root = &tree.nodes[tree.root];
    assert!(root.is_leaf());
    assert_eq!(root.triangle_indices, vec![0]);
    assert_eq!(root.depth, 0);
    assert_eq!(tree.stats.total_nodes, 1);
    assert_eq!(tree.stats.leaf_nodes, 1);
    assert_eq!(tree.stats.max_depth, 0);
}

#[test]
fn empty_input_yields_degenerate_leaf() {
    let tree = build_bvh(&[], &BuildOptions::default());
    let root = &tree.nodes[tree.root];
    assert!(root.is_leaf());
    assert!(root.triangle_indices.is_empty());
    assert_eq!(root.aabb.min, Vec3::ZERO);
    assert_eq!(root.aabb.max, Vec3::ZERO);
}

#[test]
fn two_separated_triangles_split() {
    let tris = vec![
        tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]),
        tri([100.0, 0.0, 0.0], [101.0, 0.0, 0.0], [100.5, 1.0, 0.0]),
    ];
    let tree = build_bvh(&tris, &BuildOptions::default());
    assert_eq!(tree.stats.total_nodes, 3);
    assert_eq!(tree.stats.leaf_nodes, 2);
    assert_eq!(tree.stats.max_depth, 1);
    assert_coverage(&tree, &tris);
    assert_conservation(&tree, tris.len());
}

#[test]
fn random_thousand_triangle_scene() {
    let tris = random_triangles(1000, 0x5eed);
    let tree = build_bvh(&tris, &BuildOptions::default());
    let stats = &tree.stats;

    assert_eq!(stats.total_triangles, 1000);
    assert!(stats.total_nodes <= 2 * stats.leaf_nodes - 1);
    // ceil(log2(1000)) + 8 = 18; SAH on a uniform scene sits well below.
    assert!(
        stats.max_depth <= 18,
        "max depth {} exceeds bound",
        stats.max_depth
    );

    assert_coverage(&tree, &tris);
    assert_conservation(&tree, tris.len());
}

#[test]
fn identical_centroids_take_the_median_fallback() {
    // Concentric triangles: every centroid is exactly the origin, so any
    // chosen split position degenerates and the builder must fall back to
    // a median split instead of stacking everything in one child.
    let tris: Vec<Triangle> = (1..=64)
        .map(|k| {
            let s = k as f32;
            tri([-s, 0.0, 0.0], [s, -s, 0.0], [0.0, s, 0.0])
        })
        .collect();
    for t in &tris {
        assert!(t.centroid().length() < 1e-4);
    }

    let tree = build_bvh(&tris, &BuildOptions::default());
    assert!(
        tree.stats.total_nodes > 1,
        "identical centroids must still produce a split via the median fallback"
    );
    assert_coverage(&tree, &tris);
    assert_conservation(&tree, tris.len());
}

#[test]
fn build_is_deterministic() {
    let tris = random_triangles(200, 42);
    let a = build_bvh(&tris, &BuildOptions::default());
    let b = build_bvh(&tris, &BuildOptions::default());
    assert_eq!(a.stats.total_nodes, b.stats.total_nodes);
    assert_eq!(a.stats.max_depth, b.stats.max_depth);
    for (na, nb) in a.nodes.iter().zip(&b.nodes) {
        assert_eq!(na.aabb, nb.aabb);
        assert_eq!(na.triangle_indices, nb.triangle_indices);
    }
}
