// src/path_tracing/intersect.rs
// Ray-primitive intersection and flat-BVH traversal. This is the CPU
// mirror of the kernel's intersection stage; both sides use the same
// epsilons and the same 64-entry traversal stack with silent clamping.
// RELEVANT FILES:src/shaders/pt_kernel.wgsl,src/path_tracing/cpu.rs,src/accel/flatten.rs

use glam::Vec3;

use crate::accel::FlatBvh;
use crate::scene::{Material, Scene, Sphere, Triangle};

/// Minimum ray parameter for triangle hits.
pub const T_MIN: f32 = 0.001;
/// Minimum ray parameter for sphere hits.
pub const SPHERE_T_MIN: f32 = 0.01;
/// Möller–Trumbore determinant cutoff.
pub const DET_EPSILON: f32 = 1e-4;
/// Scatter-origin offset along the shading normal.
pub const SELF_INTERSECT_OFFSET: f32 = 0.01;
/// Traversal stack capacity; pushes beyond this are silently dropped.
pub const TRAVERSAL_STACK_SIZE: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Closest-hit record.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub material: Material,
}

/// Per-traversal work counters, mirrored by the kernel's atomic slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceCounters {
    pub triangle_tests: u32,
    pub sphere_tests: u32,
    pub stack_clamps: u32,
}

/// Möller–Trumbore with back-face culling. Returns the ray parameter for
/// hits with `t > T_MIN`.
pub fn intersect_triangle(ray: &Ray, tri: &Triangle) -> Option<f32> {
    let e1 = tri.v1 - tri.v0;
    let e2 = tri.v2 - tri.v0;

    if e1.cross(e2).dot(ray.dir) > 0.0 {
        return None;
    }

    let p = ray.dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < DET_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = ray.origin - tri.v0;
    let u = tvec.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = tvec.cross(e1);
    let v = ray.dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > T_MIN).then_some(t)
}

/// Both roots are tested; the smaller root above SPHERE_T_MIN wins.
pub fn intersect_sphere(ray: &Ray, sphere: &Sphere) -> Option<f32> {
    let oc = ray.origin - sphere.center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t1 = -b - sq;
    let t2 = -b + sq;
    if t1 > SPHERE_T_MIN {
        Some(t1)
    } else if t2 > SPHERE_T_MIN {
        Some(t2)
    } else {
        None
    }
}

/// Slab test with the near plane clamped to the ray origin. `t_max` culls
/// nodes behind the current closest hit.
pub fn intersect_aabb(ray: &Ray, inv_dir: Vec3, min: Vec3, max: Vec3, t_max: f32) -> bool {
    let t0 = (min - ray.origin) * inv_dir;
    let t1 = (max - ray.origin) * inv_dir;
    let lo = t0.min(t1);
    let hi = t0.max(t1);
    let t_near = lo.max_element().max(0.0);
    let t_far = hi.min_element();
    t_near <= t_far && t_near < t_max
}

/// Walk the flat BVH for the closest triangle hit. Returns (t, triangle
/// index into the scene list).
pub fn intersect_bvh(
    ray: &Ray,
    bvh: &FlatBvh,
    triangles: &[Triangle],
    counters: &mut TraceCounters,
) -> Option<(f32, u32)> {
    if bvh.nodes.is_empty() || triangles.is_empty() {
        return None;
    }

    let inv_dir = ray.dir.recip();
    let mut stack = [0u32; TRAVERSAL_STACK_SIZE];
    let mut sp = 1usize;
    stack[0] = 0;

    let mut best: Option<(f32, u32)> = None;
    let mut best_t = f32::INFINITY;

    while sp > 0 {
        sp -= 1;
        let node = &bvh.nodes[stack[sp] as usize];

        if !intersect_aabb(
            ray,
            inv_dir,
            Vec3::from_array(node.min),
            Vec3::from_array(node.max),
            best_t,
        ) {
            continue;
        }

        if let Some((start, count)) = node.triangles() {
            for i in start..start + count {
                let tri_idx = bvh.triangle_indices[i as usize];
                counters.triangle_tests += 1;
                if let Some(t) = intersect_triangle(ray, &triangles[tri_idx as usize]) {
                    if t < best_t {
                        best_t = t;
                        best = Some((t, tri_idx));
                    }
                }
            }
        } else if let Some((left, right)) = node.children() {
            // Push right below left so the left subtree pops first.
            for child in [right, left] {
                if sp < TRAVERSAL_STACK_SIZE {
                    stack[sp] = child;
                    sp += 1;
                } else {
                    counters.stack_clamps += 1;
                }
            }
        }
    }

    best
}

/// Closest hit over the whole scene: triangles through the BVH, spheres by
/// linear scan, nearest of the two.
pub fn intersect_scene(
    ray: &Ray,
    scene: &Scene,
    bvh: &FlatBvh,
    counters: &mut TraceCounters,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    let mut best_t = f32::INFINITY;

    if let Some((t, tri_idx)) = intersect_bvh(ray, bvh, &scene.triangles, counters) {
        let tri = &scene.triangles[tri_idx as usize];
        best_t = t;
        best = Some(Hit {
            t,
            point: ray.at(t),
            normal: tri.normal(),
            material: tri.material,
        });
    }

    for sphere in &scene.spheres {
        counters.sphere_tests += 1;
        if let Some(t) = intersect_sphere(ray, sphere) {
            if t < best_t {
                best_t = t;
                best = Some(Hit {
                    t,
                    point: ray.at(t),
                    normal: (ray.at(t) - sphere.center) / sphere.radius,
                    material: sphere.material,
                });
            }
        }
    }

    best
}
