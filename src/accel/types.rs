// src/accel/types.rs
// Core types for the BVH: AABB, build-time arena nodes, flat GPU nodes and build stats.
// This file exists to keep the GPU-contractual node layout next to the host-side tree.
// RELEVANT FILES:src/accel/sah.rs,src/accel/flatten.rs,src/shaders/pt_kernel.wgsl

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty AABB (inverted bounds for union operations).
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Degenerate zero box used for empty triangle sets.
    pub fn zero() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn expand_aabb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }

    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Surface area for SAH scoring: 2 * (wh + wd + hd).
    pub fn surface_area(&self) -> f32 {
        let e = self.extent();
        if e.x < 0.0 || e.y < 0.0 || e.z < 0.0 {
            return 0.0;
        }
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build-time BVH node stored in an arena (`BvhTree::nodes`).
///
/// A leaf has a non-empty index list and no children; an internal node has
/// two children and an empty index list.
#[derive(Debug, Clone)]
pub struct BuildNode {
    pub aabb: Aabb,
    /// Indices into the scene triangle list. Non-empty only for leaves.
    pub triangle_indices: Vec<u32>,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub depth: u32,
}

impl BuildNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// GPU-facing BVH node, 48 bytes, matching the WGSL struct.
///
/// Internal node: slot0/slot1 = left/right child index, is_leaf = 0.
/// Leaf node: slot0/slot1 = triangle start/count, is_leaf = 1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FlatNode {
    pub min: [f32; 3],
    pub _pad0: f32,
    pub max: [f32; 3],
    pub slot0: u32,
    pub slot1: u32,
    pub is_leaf: u32,
    pub _pad1: [u32; 2],
}

impl FlatNode {
    pub fn internal(aabb: Aabb, left: u32, right: u32) -> Self {
        Self {
            min: aabb.min.to_array(),
            _pad0: 0.0,
            max: aabb.max.to_array(),
            slot0: left,
            slot1: right,
            is_leaf: 0,
            _pad1: [0; 2],
        }
    }

    pub fn leaf(aabb: Aabb, triangle_start: u32, triangle_count: u32) -> Self {
        Self {
            min: aabb.min.to_array(),
            _pad0: 0.0,
            max: aabb.max.to_array(),
            slot0: triangle_start,
            slot1: triangle_count,
            is_leaf: 1,
            _pad1: [0; 2],
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(Vec3::from_array(self.min), Vec3::from_array(self.max))
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf == 1
    }

    /// (left, right) for internal nodes.
    pub fn children(&self) -> Option<(u32, u32)> {
        (!self.is_leaf()).then_some((self.slot0, self.slot1))
    }

    /// (start, count) for leaf nodes.
    pub fn triangles(&self) -> Option<(u32, u32)> {
        self.is_leaf().then_some((self.slot0, self.slot1))
    }
}

/// SAH cost parameters.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub traversal_cost: f32,
    pub intersection_cost: f32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            traversal_cost: 1.0,
            intersection_cost: 1.0,
        }
    }
}

/// Statistics from BVH construction.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub total_nodes: u32,
    pub leaf_nodes: u32,
    /// Sum of leaf triangle counts; equals the input triangle count.
    pub total_triangles: u32,
    pub max_depth: u32,
    pub build_time_ms: f32,
}
