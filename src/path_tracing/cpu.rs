// src/path_tracing/cpu.rs
// CPU reference implementation of the path-tracing kernel. Mirrors
// src/shaders/pt_kernel.wgsl bounce for bounce and draw for draw, so the
// sampling contract is testable without a device.
// RELEVANT FILES:src/shaders/pt_kernel.wgsl,src/path_tracing/rng.rs,src/path_tracing/intersect.rs

use glam::Vec3;

use crate::accel::FlatBvh;
use crate::camera::Camera;
use crate::path_tracing::intersect::{
    intersect_scene, Hit, Ray, TraceCounters, SELF_INTERSECT_OFFSET,
};
use crate::path_tracing::rng::Rng;
use crate::scene::Scene;

use std::f32::consts::PI;

/// Scatter events per path.
pub const MAX_BOUNCES: u32 = 6;
/// Flat sky radiance returned on miss.
pub const SKY_COLOR: Vec3 = Vec3::new(0.4, 0.4, 0.4);
/// Fixed light-pdf stand-in for BRDF-sampled emissive hits. Deliberately
/// not the true light-sampling pdf; see DESIGN.md.
pub const PDF_LIGHT_ESTIMATE: f32 = 0.001;
/// Throughput-sum cutoff for color extinction.
pub const EXTINCTION_THRESHOLD: f32 = 0.01;
/// Shadow rays count as occluded when a hit lands this far inside the
/// light distance.
pub const SHADOW_MARGIN: f32 = 0.1;
/// First bounce index where Russian roulette may terminate a path.
pub const RR_START_BOUNCE: u32 = 3;

/// CPU tracer configuration.
#[derive(Clone, Debug)]
pub struct TracerParams {
    pub samples_per_pixel: u32,
    pub max_bounces: u32,
    pub russian_roulette: bool,
}

impl Default for TracerParams {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_bounces: MAX_BOUNCES,
            russian_roulette: true,
        }
    }
}

pub fn luminance(c: Vec3) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

/// Balance between two estimators; summing both orderings gives 1.
pub fn power_heuristic(a: f32, b: f32) -> f32 {
    let a2 = a * a;
    let b2 = b * b;
    a2 / (a2 + b2)
}

pub fn reflect(dir: Vec3, normal: Vec3) -> Vec3 {
    dir - 2.0 * dir.dot(normal) * normal
}

/// Cosine-weighted hemisphere direction about `normal` from two uniform
/// draws. The tangent-frame branch matches the WGSL kernel.
pub fn cosine_hemisphere(normal: Vec3, r1: f32, r2: f32) -> Vec3 {
    let phi = 2.0 * PI * r1;
    let sin_theta = r2.sqrt();
    let x = phi.cos() * sin_theta;
    let y = phi.sin() * sin_theta;
    let z = (1.0 - r2).sqrt();

    let helper = if normal.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    let tangent = normal.cross(helper).normalize();
    let bitangent = normal.cross(tangent);
    tangent * x + bitangent * y + normal * z
}

/// Running-average blend used by the accumulator pass. `frame_index = 0`
/// drops the stored history; output is saturated to [0, 1].
pub fn accumulate(stored: Vec3, estimate: Vec3, frame_index: u32) -> Vec3 {
    let w = 1.0 / (frame_index as f32 + 1.0);
    let s = if frame_index >= 1 { stored } else { Vec3::ZERO };
    (s * (1.0 - w) + estimate * w).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Emissive power of triangle `i` for light sampling; zero for
/// non-emissive surfaces.
fn triangle_power(scene: &Scene, i: usize) -> f32 {
    let tri = &scene.triangles[i];
    let m = &tri.material;
    m.emission_strength * tri.area() * luminance(m.emission_color)
}

/// Next-event estimation: sample one emissive triangle proportional to its
/// power and return the weighted direct-light contribution for `hit`.
///
/// Always draws (pick, u, v) so the per-bounce draw count stays fixed.
fn sample_direct_light(
    scene: &Scene,
    bvh: &FlatBvh,
    hit: &Hit,
    rng: &mut Rng,
    counters: &mut TraceCounters,
) -> Vec3 {
    let pick = rng.next_f32();
    let u = rng.next_f32();
    let v = rng.next_f32();

    let mut total_power = 0.0;
    for i in 0..scene.triangles.len() {
        total_power += triangle_power(scene, i);
    }
    if total_power <= 0.0 {
        return Vec3::ZERO;
    }

    let target = pick * total_power;
    let mut acc = 0.0;
    let mut chosen = None;
    for i in 0..scene.triangles.len() {
        let p = triangle_power(scene, i);
        if p <= 0.0 {
            continue;
        }
        acc += p;
        if acc >= target {
            chosen = Some((i, p));
            break;
        }
    }
    let Some((light_idx, power)) = chosen else {
        return Vec3::ZERO;
    };

    let tri = &scene.triangles[light_idx];
    let su = u.sqrt();
    let b0 = 1.0 - su;
    let b1 = su * (1.0 - v);
    let b2 = su * v;
    let light_point = tri.v0 * b0 + tri.v1 * b1 + tri.v2 * b2;

    let to_light = light_point - hit.point;
    let dist = to_light.length();
    if dist <= 0.0 {
        return Vec3::ZERO;
    }
    let dir = to_light / dist;

    let cos_light = tri.normal().dot(-dir);
    if cos_light <= 0.0 {
        return Vec3::ZERO;
    }
    let cos_theta = hit.normal.dot(dir).max(0.0);
    if cos_theta <= 0.0 {
        return Vec3::ZERO;
    }

    let shadow = Ray::new(hit.point + hit.normal * SELF_INTERSECT_OFFSET, dir);
    if let Some(blocker) = intersect_scene(&shadow, scene, bvh, counters) {
        if blocker.t < dist - SHADOW_MARGIN {
            return Vec3::ZERO;
        }
    }

    let pdf_light = dist * dist / (tri.area() * cos_light) * (power / total_power);
    let pdf_brdf = cos_theta / PI;
    let weight = power_heuristic(pdf_light, pdf_brdf);

    tri.material.emission() * (cos_theta / PI) * weight / pdf_light
}

/// Trace one path and return its radiance estimate.
pub fn trace_path(
    scene: &Scene,
    bvh: &FlatBvh,
    mut ray: Ray,
    rng: &mut Rng,
    params: &TracerParams,
    counters: &mut TraceCounters,
) -> Vec3 {
    let mut radiance = Vec3::ZERO;
    let mut beta = Vec3::ONE;
    let mut prev_specular = false;
    let mut prev_pdf_brdf = 0.0f32;

    for bounce in 0..=params.max_bounces {
        let Some(hit) = intersect_scene(&ray, scene, bvh, counters) else {
            radiance += beta * SKY_COLOR;
            break;
        };

        radiance += beta * sample_direct_light(scene, bvh, &hit, rng, counters);

        // BRDF-sampled emission: counted on the primary ray and after
        // specular bounces; diffuse bounces are covered by NEE above.
        let emission = hit.material.emission();
        if emission.max_element() > 0.0 {
            if bounce == 0 {
                radiance += beta * emission;
            } else if prev_specular {
                radiance += beta * emission * power_heuristic(prev_pdf_brdf, PDF_LIGHT_ESTIMATE);
            }
        }

        beta *= hit.material.color;

        if beta.x + beta.y + beta.z < EXTINCTION_THRESHOLD {
            break;
        }

        if params.russian_roulette && bounce >= RR_START_BOUNCE {
            let p = luminance(beta).clamp(0.05, 0.95);
            if rng.next_f32() > p {
                break;
            }
            beta /= p;
        }

        if bounce == params.max_bounces {
            break;
        }

        let r_spec = rng.next_f32();
        let is_specular = r_spec <= hit.material.specular_probability;
        let r1 = rng.next_f32();
        let r2 = rng.next_f32();
        let diffuse_dir = cosine_hemisphere(hit.normal, r1, r2);
        let specular_dir = reflect(ray.dir, hit.normal);
        let mix = if is_specular { hit.material.smoothness } else { 0.0 };
        let dir = diffuse_dir.lerp(specular_dir, mix).normalize();

        ray = Ray::new(hit.point + hit.normal * SELF_INTERSECT_OFFSET, dir);
        prev_specular = is_specular;
        prev_pdf_brdf = hit.normal.dot(dir).max(0.0) / PI;
    }

    radiance
}

/// Render one pixel: seed from the pixel/frame, jitter each sample, and
/// average `samples_per_pixel` paths.
pub fn render_pixel(
    scene: &Scene,
    bvh: &FlatBvh,
    camera: &Camera,
    width: u32,
    height: u32,
    px: u32,
    py: u32,
    frame_index: u32,
    params: &TracerParams,
    counters: &mut TraceCounters,
) -> Vec3 {
    let mut rng = Rng::from_pixel(px, py, width, frame_index);
    let mut total = Vec3::ZERO;
    let spp = params.samples_per_pixel.max(1);

    for _ in 0..spp {
        let jx = rng.next_f32() - 0.5;
        let jy = rng.next_f32() - 0.5;
        let dir = camera.ray_direction(px, py, width, height, (jx, jy));
        let ray = Ray::new(camera.position, dir);
        total += trace_path(scene, bvh, ray, &mut rng, params, counters);
    }

    total / spp as f32
}

/// Render a full image into a row-major Vec (tests only; the GPU kernel
/// is the production path).
pub fn render_image(
    scene: &Scene,
    bvh: &FlatBvh,
    width: u32,
    height: u32,
    frame_index: u32,
    params: &TracerParams,
) -> Vec<Vec3> {
    let mut counters = TraceCounters::default();
    let mut out = Vec::with_capacity((width * height) as usize);
    for py in 0..height {
        for px in 0..width {
            out.push(render_pixel(
                scene,
                bvh,
                &scene.camera,
                width,
                height,
                px,
                py,
                frame_index,
                params,
                &mut counters,
            ));
        }
    }
    out
}
