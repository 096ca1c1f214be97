//! lumen3d: a progressive, unbiased GPU path tracer for scenes of spheres
//! and triangle meshes. wgpu 0.19 compute kernel, sweep-SAH BVH, MIS
//! next-event estimation, running-average accumulation.
//!
//! The WGSL kernel in `src/shaders/pt_kernel.wgsl` is the production
//! path; `path_tracing::cpu` is a draw-for-draw CPU mirror of it used by
//! the test suite and as a device-free reference.

pub mod accel;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod io;
pub mod path_tracing;
pub mod scene;
pub mod util;
pub mod viewer;

pub use error::{RenderError, RenderResult};
