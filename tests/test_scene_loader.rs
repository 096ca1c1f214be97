// tests/test_scene_loader.rs
// Manifest and mesh loading: JSON schema, transform baking order,
// identity-transform bit equality, material inheritance and failure modes.
// RELEVANT FILES:src/scene/loader.rs,src/scene/manifest.rs,src/io/obj_read.rs

use std::fs;
use std::path::PathBuf;

use glam::Vec3;
use lumen3d::scene::loader::{load_scene, model_matrix, scene_from_manifest};
use lumen3d::scene::manifest::SceneManifest;

const MINIMAL_CAMERA: &str = r#""camera": {
    "position": [0, 1, 5],
    "rotation": [-10, 30, 0],
    "fov": 60,
    "nearPlane": 0.1,
    "farPlane": 100
}"#;

/// Unique scratch directory per test to keep file fixtures isolated.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lumen3d-test-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("creating scratch dir");
    dir
}

#[test]
fn manifest_parses_camera_and_primitives() {
    let json = format!(
        r#"{{
            {MINIMAL_CAMERA},
            "spheres": [
                {{"center": [1, 2, 3], "radius": 0.5, "color": [0.9, 0.1, 0.1],
                  "emissionColor": [1, 1, 1], "emissionStrength": 2,
                  "smoothness": 0.3, "specularProbability": 0.1}}
            ],
            "triangles": [
                {{"v0": [0, 0, 0], "v1": [1, 0, 0], "v2": [0, 1, 0], "color": [0.2, 0.4, 0.6]}}
            ]
        }}"#
    );
    let manifest = SceneManifest::from_str(&json).expect("valid manifest");
    let scene = scene_from_manifest(&manifest, std::path::Path::new(".")).expect("scene");

    assert_eq!(scene.camera.position, Vec3::new(0.0, 1.0, 5.0));
    assert_eq!(scene.camera.rotation, Vec3::new(-10.0, 30.0, 0.0));
    assert_eq!(scene.camera.fov, 60.0);

    assert_eq!(scene.spheres.len(), 1);
    let s = &scene.spheres[0];
    assert_eq!(s.center, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(s.radius, 0.5);
    assert_eq!(s.material.emission_strength, 2.0);
    assert_eq!(s.material.specular_probability, 0.1);

    assert_eq!(scene.triangles.len(), 1);
    assert_eq!(scene.triangles[0].material.color, Vec3::new(0.2, 0.4, 0.6));
    // Omitted material fields default.
    assert_eq!(scene.triangles[0].material.emission_strength, 0.0);
}

#[test]
fn non_positive_radius_spheres_are_skipped() {
    let json = format!(
        r#"{{
            {MINIMAL_CAMERA},
            "spheres": [
                {{"center": [0, 0, 0], "radius": 0.0, "color": [1, 1, 1]}},
                {{"center": [0, 0, 0], "radius": -2.0, "color": [1, 1, 1]}},
                {{"center": [0, 0, 0], "radius": 1.0, "color": [1, 1, 1]}}
            ]
        }}"#
    );
    let manifest = SceneManifest::from_str(&json).expect("valid manifest");
    let scene = scene_from_manifest(&manifest, std::path::Path::new(".")).expect("scene");
    assert_eq!(scene.spheres.len(), 1);
    assert_eq!(scene.spheres[0].radius, 1.0);
}

#[test]
fn model_matrix_applies_translate_rotations_scale_in_order()  {
    let m = model_matrix(
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(0.0, 90.0, 0.0),
        Vec3::new(2.0, 2.0, 2.0),
    );
    // (1,0,0) scales to (2,0,0), yaws to (0,0,-2), then translates.
    let p = m.transform_point3(Vec3::X);
    assert!((p - Vec3::new(1.0, 2.0, 1.0)).abs().max_element() < 1e-5);
}

#[test]
fn identity_transform_emits_mesh_vertices_bit_identical() {
    let dir = scratch_dir("identity");
    fs::write(
        dir.join("tri.obj"),
        "v 0.125 0.25 -0.375\nv 1.625 0.5 0.75\nv -0.875 1.125 0.0625\nf 1 2 3\n",
    )
    .unwrap();
    fs::write(
        dir.join("scene.json"),
        format!(
            r#"{{
                {MINIMAL_CAMERA},
                "models": [
                    {{"path": "tri.obj", "position": [0, 0, 0], "rotation": [0, 0, 0],
                      "scale": [1, 1, 1], "color": [0.5, 0.5, 0.5]}}
                ]
            }}"#
        ),
    )
    .unwrap();

    let scene = load_scene(dir.join("scene.json")).expect("scene loads");
    assert_eq!(scene.triangles.len(), 1);
    let t = &scene.triangles[0];
    assert_eq!(t.v0, Vec3::new(0.125, 0.25, -0.375));
    assert_eq!(t.v1, Vec3::new(1.625, 0.5, 0.75));
    assert_eq!(t.v2, Vec3::new(-0.875, 1.125, 0.0625));
}

#[test]
fn model_triangles_inherit_the_model_material() {
    let dir = scratch_dir("material");
    fs::write(
        dir.join("quad.obj"),
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
    )
    .unwrap();
    fs::write(
        dir.join("scene.json"),
        format!(
            r#"{{
                {MINIMAL_CAMERA},
                "models": [
                    {{"path": "quad.obj", "position": [0, 0, 0], "rotation": [0, 0, 0],
                      "scale": [1, 1, 1], "color": [0.9, 0.8, 0.7],
                      "emissionColor": [1, 0, 0], "emissionStrength": 3,
                      "smoothness": 0.4, "specularProbability": 0.2}}
                ]
            }}"#
        ),
    )
    .unwrap();

    let scene = load_scene(dir.join("scene.json")).expect("scene loads");
    // Fan triangulation of the quad.
    assert_eq!(scene.triangles.len(), 2);
    for t in &scene.triangles {
        assert_eq!(t.material.color, Vec3::new(0.9, 0.8, 0.7));
        assert_eq!(t.material.emission_color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(t.material.emission_strength, 3.0);
        assert_eq!(t.material.smoothness, 0.4);
        assert_eq!(t.material.specular_probability, 0.2);
    }
}

#[test]
fn faces_with_invalid_indices_are_skipped_not_fatal() {
    let dir = scratch_dir("badface");
    fs::write(
        dir.join("mesh.obj"),
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\nf 1 2 nonsense\nf 1 2 3\n",
    )
    .unwrap();
    fs::write(
        dir.join("scene.json"),
        format!(
            r#"{{
                {MINIMAL_CAMERA},
                "models": [
                    {{"path": "mesh.obj", "position": [0, 0, 0], "rotation": [0, 0, 0],
                      "scale": [1, 1, 1], "color": [0.5, 0.5, 0.5]}}
                ]
            }}"#
        ),
    )
    .unwrap();

    let scene = load_scene(dir.join("scene.json")).expect("per-face anomalies are not fatal");
    assert_eq!(scene.triangles.len(), 1);
}

#[test]
fn missing_mesh_fails_with_the_offending_path_in_context() {
    let dir = scratch_dir("missing");
    fs::write(
        dir.join("scene.json"),
        format!(
            r#"{{
                {MINIMAL_CAMERA},
                "models": [
                    {{"path": "nope.obj", "position": [0, 0, 0], "rotation": [0, 0, 0],
                      "scale": [1, 1, 1], "color": [0.5, 0.5, 0.5]}}
                ]
            }}"#
        ),
    )
    .unwrap();

    let err = load_scene(dir.join("scene.json")).expect_err("missing mesh must fail");
    let chain = format!("{err:#}");
    assert!(
        chain.contains("nope.obj"),
        "error chain should name the mesh: {chain}"
    );
}

#[test]
fn malformed_json_fails_with_manifest_path_in_context() {
    let dir = scratch_dir("badjson");
    fs::write(dir.join("scene.json"), "{ not json").unwrap();
    let err = load_scene(dir.join("scene.json")).expect_err("parse must fail");
    let chain = format!("{err:#}");
    assert!(chain.contains("scene.json"), "chain: {chain}");
}

#[test]
fn scene_order_is_preserved() {
    // Light sampling depends on triangle order, so loading must keep
    // manifest order: explicit triangles first, then model triangles.
    let dir = scratch_dir("order");
    fs::write(dir.join("tri.obj"), "v 5 0 0\nv 6 0 0\nv 5 1 0\nf 1 2 3\n").unwrap();
    fs::write(
        dir.join("scene.json"),
        format!(
            r#"{{
                {MINIMAL_CAMERA},
                "triangles": [
                    {{"v0": [0, 0, 0], "v1": [1, 0, 0], "v2": [0, 1, 0], "color": [1, 0, 0]}},
                    {{"v0": [2, 0, 0], "v1": [3, 0, 0], "v2": [2, 1, 0], "color": [0, 1, 0]}}
                ],
                "models": [
                    {{"path": "tri.obj", "position": [0, 0, 0], "rotation": [0, 0, 0],
                      "scale": [1, 1, 1], "color": [0, 0, 1]}}
                ]
            }}"#
        ),
    )
    .unwrap();

    let scene = load_scene(dir.join("scene.json")).expect("scene loads");
    assert_eq!(scene.triangles.len(), 3);
    assert_eq!(scene.triangles[0].material.color, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(scene.triangles[1].material.color, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(scene.triangles[2].material.color, Vec3::new(0.0, 0.0, 1.0));
}
