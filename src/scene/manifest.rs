//! Scene manifest schema (JSON).
//!
//! Mirrors the on-disk format: a camera, explicit spheres and triangles,
//! and model references that pull in OBJ meshes with an affine transform.
//! Material fields sit flat on each entry.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;

use crate::camera::Camera;
use crate::scene::Material;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneManifest {
    pub camera: CameraDesc,
    #[serde(default)]
    pub spheres: Vec<SphereDesc>,
    #[serde(default)]
    pub triangles: Vec<TriangleDesc>,
    #[serde(default)]
    pub models: Vec<ModelDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDesc {
    pub position: [f32; 3],
    /// Degrees; yaw = y, pitch = x.
    pub rotation: [f32; 3],
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDesc {
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default)]
    pub emission_color: [f32; 3],
    #[serde(default)]
    pub emission_strength: f32,
    #[serde(default)]
    pub smoothness: f32,
    #[serde(default)]
    pub specular_probability: f32,
}

fn default_color() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SphereDesc {
    pub center: [f32; 3],
    pub radius: f32,
    #[serde(flatten)]
    pub material: MaterialDesc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleDesc {
    pub v0: [f32; 3],
    pub v1: [f32; 3],
    pub v2: [f32; 3],
    #[serde(flatten)]
    pub material: MaterialDesc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDesc {
    /// Mesh path, resolved relative to the manifest's directory.
    pub path: String,
    pub position: [f32; 3],
    /// Degrees, applied as rotate-x then rotate-y then rotate-z.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    #[serde(flatten)]
    pub material: MaterialDesc,
}

impl SceneManifest {
    pub fn from_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing scene manifest JSON")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scene manifest {}", path.display()))?;
        Self::from_str(&text)
            .with_context(|| format!("in scene manifest {}", path.display()))
    }
}

impl CameraDesc {
    pub fn to_camera(&self) -> Camera {
        Camera {
            position: Vec3::from_array(self.position),
            rotation: Vec3::from_array(self.rotation),
            fov: self.fov,
            near_plane: self.near_plane,
            far_plane: self.far_plane,
        }
    }
}

impl MaterialDesc {
    pub fn to_material(&self) -> Material {
        Material {
            color: Vec3::from_array(self.color),
            emission_color: Vec3::from_array(self.emission_color),
            emission_strength: self.emission_strength,
            smoothness: self.smoothness,
            specular_probability: self.specular_probability,
        }
    }
}
