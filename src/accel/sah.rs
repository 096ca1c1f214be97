// src/accel/sah.rs
// Sweep Surface Area Heuristic BVH builder over world-space triangles.
// Evaluates every adjacent-centroid split on all three axes with prefix/suffix
// box sweeps and terminates on the leaf-cost cutoff.
// RELEVANT FILES:src/accel/types.rs,src/accel/flatten.rs,src/scene/mod.rs

use std::time::Instant;

use glam::Vec3;
use log::info;

use crate::accel::types::{Aabb, BuildNode, BuildOptions, BuildStats};
use crate::scene::Triangle;

/// Arena-stored BVH. Node 0 of `nodes` is not special; `root` names the
/// root explicitly (flattening re-orders so the flat root lands at 0).
#[derive(Debug, Clone)]
pub struct BvhTree {
    pub nodes: Vec<BuildNode>,
    pub root: usize,
    pub stats: BuildStats,
}

struct SplitInfo {
    axis: usize,
    position: f32,
    cost: f32,
}

struct Builder {
    tri_aabbs: Vec<Aabb>,
    centroids: Vec<Vec3>,
    options: BuildOptions,
    nodes: Vec<BuildNode>,
    stats: BuildStats,
}

/// Build a SAH BVH over the triangle list. An empty list yields a single
/// leaf with the degenerate zero box, so downstream GPU buffers stay valid.
pub fn build_bvh(triangles: &[Triangle], options: &BuildOptions) -> BvhTree {
    let start = Instant::now();

    let tri_aabbs: Vec<Aabb> = triangles
        .iter()
        .map(|t| {
            let mut b = Aabb::empty();
            b.expand_point(t.v0);
            b.expand_point(t.v1);
            b.expand_point(t.v2);
            b
        })
        .collect();
    let centroids: Vec<Vec3> = triangles.iter().map(|t| t.centroid()).collect();

    let mut builder = Builder {
        tri_aabbs,
        centroids,
        options: options.clone(),
        nodes: Vec::new(),
        stats: BuildStats::default(),
    };

    let indices: Vec<u32> = (0..triangles.len() as u32).collect();
    let root = builder.build_node(indices, 0);

    let mut stats = builder.stats;
    stats.total_nodes = builder.nodes.len() as u32;
    stats.build_time_ms = start.elapsed().as_secs_f32() * 1000.0;

    info!(
        "BVH built: {} triangles, {} nodes ({} leaves), max depth {}, {:.2} ms",
        triangles.len(),
        stats.total_nodes,
        stats.leaf_nodes,
        stats.max_depth,
        stats.build_time_ms
    );

    BvhTree {
        nodes: builder.nodes,
        root,
        stats,
    }
}

impl Builder {
    fn bounds_of(&self, indices: &[u32]) -> Aabb {
        if indices.is_empty() {
            return Aabb::zero();
        }
        let mut aabb = Aabb::empty();
        for &i in indices {
            aabb.expand_aabb(&self.tri_aabbs[i as usize]);
        }
        aabb
    }

    fn push_leaf(&mut self, aabb: Aabb, indices: Vec<u32>, depth: u32) -> usize {
        self.stats.leaf_nodes += 1;
        self.stats.total_triangles += indices.len() as u32;
        self.nodes.push(BuildNode {
            aabb,
            triangle_indices: indices,
            left: None,
            right: None,
            depth,
        });
        self.nodes.len() - 1
    }

    fn build_node(&mut self, mut indices: Vec<u32>, depth: u32) -> usize {
        self.stats.max_depth = self.stats.max_depth.max(depth);
        let aabb = self.bounds_of(&indices);

        if indices.len() <= 1 {
            return self.push_leaf(aabb, indices, depth);
        }

        let split = match self.find_best_split(&indices, &aabb) {
            Some(s) => s,
            None => return self.push_leaf(aabb, indices, depth),
        };

        // Partition by centroid against the chosen position; identical
        // centroids can put everything on one side, in which case fall back
        // to a median split on the same axis.
        let mut left: Vec<u32> = Vec::with_capacity(indices.len() / 2);
        let mut right: Vec<u32> = Vec::with_capacity(indices.len() / 2);
        for &i in &indices {
            if self.centroids[i as usize][split.axis] < split.position {
                left.push(i);
            } else {
                right.push(i);
            }
        }

        if left.is_empty() || right.is_empty() {
            self.sort_by_centroid(&mut indices, split.axis);
            let mid = indices.len() / 2;
            right = indices.split_off(mid);
            left = indices;
        }

        let left_idx = self.build_node(left, depth + 1);
        let right_idx = self.build_node(right, depth + 1);

        self.nodes.push(BuildNode {
            aabb,
            triangle_indices: Vec::new(),
            left: Some(left_idx),
            right: Some(right_idx),
            depth,
        });
        self.nodes.len() - 1
    }

    fn sort_by_centroid(&self, indices: &mut [u32], axis: usize) {
        indices.sort_by(|&a, &b| {
            let ca = self.centroids[a as usize][axis];
            let cb = self.centroids[b as usize][axis];
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Sweep all three axes; candidate positions are midpoints between
    /// adjacent sorted centroids. Returns None when every split costs at
    /// least as much as the leaf.
    fn find_best_split(&self, indices: &[u32], parent_aabb: &Aabb) -> Option<SplitInfo> {
        let n = indices.len();
        let parent_sa = parent_aabb.surface_area();
        if parent_sa <= 0.0 {
            return None;
        }

        let mut best: Option<SplitInfo> = None;
        let mut best_cost = f32::INFINITY;
        let mut sorted = indices.to_vec();
        let mut suffix_sa = vec![0.0f32; n];

        for axis in 0..3 {
            self.sort_by_centroid(&mut sorted, axis);

            // Suffix sweep: surface area of the tight box over sorted[i..].
            let mut aabb = Aabb::empty();
            for i in (0..n).rev() {
                aabb.expand_aabb(&self.tri_aabbs[sorted[i] as usize]);
                suffix_sa[i] = aabb.surface_area();
            }

            // Prefix sweep scores each split between positions i-1 and i.
            let mut prefix = Aabb::empty();
            for i in 1..n {
                prefix.expand_aabb(&self.tri_aabbs[sorted[i - 1] as usize]);

                let c_prev = self.centroids[sorted[i - 1] as usize][axis];
                let c_here = self.centroids[sorted[i] as usize][axis];

                let cost = self.options.traversal_cost
                    + self.options.intersection_cost
                        * ((prefix.surface_area() / parent_sa) * i as f32
                            + (suffix_sa[i] / parent_sa) * (n - i) as f32);
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(SplitInfo {
                        axis,
                        position: (c_prev + c_here) * 0.5,
                        cost,
                    });
                }
            }
        }

        let leaf_cost = self.options.intersection_cost * n as f32;
        match best {
            Some(s) if s.cost < leaf_cost => Some(s),
            _ => None,
        }
    }
}
