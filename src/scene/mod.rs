//! Scene model: materials, primitives and the world the tracer consumes.
//!
//! Geometry is stored in world space. Sphere and triangle order is
//! observable through deterministic light-sampling indices and is
//! preserved through loading.

pub mod loader;
pub mod manifest;

use glam::Vec3;

use crate::camera::Camera;

/// Surface description embedded in every primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Albedo, each channel in [0, 1].
    pub color: Vec3,
    pub emission_color: Vec3,
    pub emission_strength: f32,
    /// 0 = fully diffuse, 1 = perfect mirror for specular bounces.
    pub smoothness: f32,
    /// Probability a bounce is treated as specular.
    pub specular_probability: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::splat(0.8),
            emission_color: Vec3::ZERO,
            emission_strength: 0.0,
            smoothness: 0.0,
            specular_probability: 0.0,
        }
    }
}

impl Material {
    /// Radiance emitted by this surface.
    pub fn emission(&self) -> Vec3 {
        self.emission_color * self.emission_strength
    }

    pub fn is_emissive(&self) -> bool {
        self.emission_strength > 0.0 && self.emission_color.max_element() > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    /// Strictly positive.
    pub radius: f32,
    pub material: Material,
}

/// World-space triangle with counter-clockwise winding; the outward normal
/// is `normalize((v1-v0) x (v2-v0))` and back-faces are culled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub material: Material,
}

impl Triangle {
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize()
    }

    pub fn area(&self) -> f32 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).length() * 0.5
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub spheres: Vec<Sphere>,
    pub triangles: Vec<Triangle>,
}

impl Scene {
    pub fn empty(camera: Camera) -> Self {
        Self {
            camera,
            spheres: Vec::new(),
            triangles: Vec::new(),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty(Camera::default())
    }
}
