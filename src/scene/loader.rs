//! Manifest loading: assembles a world-space `Scene` from a JSON manifest
//! plus referenced OBJ meshes.
//!
//! Model transforms are baked here; the rest of the pipeline only ever
//! sees world-space geometry.

use std::path::Path;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use log::{info, warn};

use crate::io::obj_read;
use crate::scene::manifest::{ModelDesc, SceneManifest};
use crate::scene::{Scene, Sphere, Triangle};

/// Model matrix: translate * rotate-x * rotate-y * rotate-z * scale,
/// applied to a column vector.
pub fn model_matrix(position: Vec3, rotation_deg: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation_deg.x.to_radians())
        * Mat4::from_rotation_y(rotation_deg.y.to_radians())
        * Mat4::from_rotation_z(rotation_deg.z.to_radians())
        * Mat4::from_scale(scale)
}

/// Load a manifest from disk and assemble the scene. Model mesh paths are
/// resolved relative to the manifest's directory.
pub fn load_scene<P: AsRef<Path>>(manifest_path: P) -> Result<Scene> {
    let manifest_path = manifest_path.as_ref();
    let manifest = SceneManifest::from_path(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    scene_from_manifest(&manifest, base_dir)
        .with_context(|| format!("loading scene {}", manifest_path.display()))
}

/// Assemble a scene from an already-parsed manifest.
pub fn scene_from_manifest(manifest: &SceneManifest, base_dir: &Path) -> Result<Scene> {
    let mut scene = Scene::empty(manifest.camera.to_camera());

    for (i, desc) in manifest.spheres.iter().enumerate() {
        if desc.radius <= 0.0 {
            warn!("sphere {i} has non-positive radius {}, skipped", desc.radius);
            continue;
        }
        scene.spheres.push(Sphere {
            center: Vec3::from_array(desc.center),
            radius: desc.radius,
            material: desc.material.to_material(),
        });
    }

    for desc in &manifest.triangles {
        scene.triangles.push(Triangle {
            v0: Vec3::from_array(desc.v0),
            v1: Vec3::from_array(desc.v1),
            v2: Vec3::from_array(desc.v2),
            material: desc.material.to_material(),
        });
    }

    for model in &manifest.models {
        append_model(&mut scene, model, base_dir)
            .with_context(|| format!("loading model mesh {}", model.path))?;
    }

    info!(
        "scene loaded: {} spheres, {} triangles ({} models)",
        scene.spheres.len(),
        scene.triangles.len(),
        manifest.models.len()
    );
    Ok(scene)
}

fn append_model(scene: &mut Scene, model: &ModelDesc, base_dir: &Path) -> Result<()> {
    let mesh_path = base_dir.join(&model.path);
    let mesh = obj_read::read_obj(&mesh_path)?;
    let matrix = model_matrix(
        Vec3::from_array(model.position),
        Vec3::from_array(model.rotation),
        Vec3::from_array(model.scale),
    );
    let material = model.material.to_material();

    for i in 0..mesh.triangle_count() {
        let (v0, v1, v2) = mesh.triangle(i).expect("face index in range");
        scene.triangles.push(Triangle {
            v0: matrix.transform_point3(v0),
            v1: matrix.transform_point3(v1),
            v2: matrix.transform_point3(v2),
            material,
        });
    }
    Ok(())
}
