// src/accel/mod.rs
// BVH acceleration structure: sweep-SAH build, flattening and debug wireframe.
// RELEVANT FILES:src/accel/sah.rs,src/accel/flatten.rs,src/accel/wireframe.rs

pub mod flatten;
pub mod sah;
pub mod types;
pub mod wireframe;

pub use flatten::{flatten, FlatBvh};
pub use sah::{build_bvh, BvhTree};
pub use types::{Aabb, BuildNode, BuildOptions, BuildStats, FlatNode};
pub use wireframe::{wireframe_vertices, WireVertex};
