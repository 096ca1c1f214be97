// src/accel/flatten.rs
// Depth-first flattening of the build-time BVH into the linear arrays the
// GPU traverses: a FlatNode array (root at index 0) plus a triangle index
// array where each leaf owns a contiguous slice.
// RELEVANT FILES:src/accel/sah.rs,src/accel/types.rs,src/shaders/pt_kernel.wgsl

use crate::accel::sah::BvhTree;
use crate::accel::types::FlatNode;

#[derive(Debug, Clone)]
pub struct FlatBvh {
    pub nodes: Vec<FlatNode>,
    pub triangle_indices: Vec<u32>,
}

/// Flatten the arena tree. The parent claims its slot before either
/// subtree is emitted, so the root always lands at index 0; child indices
/// are patched in once both subtrees are laid out.
pub fn flatten(tree: &BvhTree) -> FlatBvh {
    let mut out = FlatBvh {
        nodes: Vec::with_capacity(tree.nodes.len()),
        triangle_indices: Vec::with_capacity(tree.stats.total_triangles as usize),
    };
    emit(tree, tree.root, &mut out);
    out
}

fn emit(tree: &BvhTree, node_idx: usize, out: &mut FlatBvh) -> u32 {
    let node = &tree.nodes[node_idx];
    let flat_idx = out.nodes.len() as u32;
    out.nodes.push(FlatNode::leaf(node.aabb, 0, 0));

    if node.is_leaf() {
        let start = out.triangle_indices.len() as u32;
        out.triangle_indices.extend_from_slice(&node.triangle_indices);
        out.nodes[flat_idx as usize] =
            FlatNode::leaf(node.aabb, start, node.triangle_indices.len() as u32);
    } else {
        let left = emit(tree, node.left.expect("internal node has left child"), out);
        let right = emit(tree, node.right.expect("internal node has right child"), out);
        out.nodes[flat_idx as usize] = FlatNode::internal(node.aabb, left, right);
    }
    flat_idx
}
