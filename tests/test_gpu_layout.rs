// tests/test_gpu_layout.rs
// GPU byte-layout assertions. These sizes are contractual: the WGSL kernel
// reads the buffers with exactly these strides and offsets.
// RELEVANT FILES:src/path_tracing/gpu_types.rs,src/accel/types.rs,src/shaders/pt_kernel.wgsl

use std::mem;

use glam::Vec3;
use lumen3d::accel::{Aabb, FlatNode, WireVertex};
use lumen3d::path_tracing::gpu_types::{OverlayUniforms, SphereGpu, TriangleGpu, Uniforms};
use lumen3d::path_tracing::pack::{pack_sphere, pack_triangle};
use lumen3d::scene::{Material, Sphere, Triangle};

#[test]
fn slot_sizes_match_the_contract() {
    assert_eq!(mem::size_of::<SphereGpu>(), 64);
    assert_eq!(mem::size_of::<TriangleGpu>(), 96);
    assert_eq!(mem::size_of::<FlatNode>(), 48);
    assert_eq!(mem::size_of::<Uniforms>(), 80);
    assert_eq!(mem::size_of::<OverlayUniforms>(), 64);
    assert_eq!(mem::size_of::<WireVertex>(), 24);
}

#[test]
fn slot_alignment_is_scalar() {
    // repr(C) scalar fields only, so vec slots pack without hidden gaps.
    assert_eq!(mem::align_of::<SphereGpu>(), 4);
    assert_eq!(mem::align_of::<TriangleGpu>(), 4);
    assert_eq!(mem::align_of::<FlatNode>(), 4);
    assert_eq!(mem::align_of::<Uniforms>(), 4);
}

#[test]
fn sphere_field_offsets() {
    let sphere = Sphere {
        center: Vec3::new(1.0, 2.0, 3.0),
        radius: 4.0,
        material: Material {
            color: Vec3::new(0.1, 0.2, 0.3),
            emission_color: Vec3::new(0.4, 0.5, 0.6),
            emission_strength: 7.0,
            smoothness: 0.5,
            specular_probability: 0.25,
        },
    };
    let gpu = pack_sphere(&sphere);
    let words: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&gpu));

    assert_eq!(&words[0..3], &[1.0, 2.0, 3.0]); // center
    assert_eq!(words[3], 4.0); // radius
    assert_eq!(&words[4..7], &[0.1, 0.2, 0.3]); // color
    assert_eq!(words[7], 0.5); // smoothness
    assert_eq!(&words[8..11], &[0.4, 0.5, 0.6]); // emission color
    assert_eq!(words[11], 7.0); // emission strength
    assert_eq!(words[12], 0.25); // specular probability
}

#[test]
fn triangle_field_offsets() {
    let tri = Triangle {
        v0: Vec3::new(1.0, 2.0, 3.0),
        v1: Vec3::new(4.0, 5.0, 6.0),
        v2: Vec3::new(7.0, 8.0, 9.0),
        material: Material {
            color: Vec3::new(0.1, 0.2, 0.3),
            emission_color: Vec3::new(0.4, 0.5, 0.6),
            emission_strength: 2.0,
            smoothness: 0.7,
            specular_probability: 0.3,
        },
    };
    let gpu = pack_triangle(&tri);
    let words: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&gpu));

    assert_eq!(&words[0..3], &[1.0, 2.0, 3.0]); // v0 at byte 0
    assert_eq!(&words[4..7], &[4.0, 5.0, 6.0]); // v1 at byte 16
    assert_eq!(&words[8..11], &[7.0, 8.0, 9.0]); // v2 at byte 32
    assert_eq!(&words[12..15], &[0.1, 0.2, 0.3]); // color at byte 48
    assert_eq!(&words[16..19], &[0.4, 0.5, 0.6]); // emission color at byte 64
    assert_eq!(words[19], 2.0); // emission strength at byte 76
    assert_eq!(words[20], 0.7); // smoothness at byte 80
    assert_eq!(words[21], 0.3); // specular probability at byte 84
}

#[test]
fn flat_node_slots_discriminate_on_leaf_flag() {
    let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));

    let internal = FlatNode::internal(aabb, 10, 20);
    assert!(!internal.is_leaf());
    assert_eq!(internal.children(), Some((10, 20)));
    assert_eq!(internal.triangles(), None);

    let leaf = FlatNode::leaf(aabb, 5, 3);
    assert!(leaf.is_leaf());
    assert_eq!(leaf.triangles(), Some((5, 3)));
    assert_eq!(leaf.children(), None);
    assert_eq!(leaf.aabb().min, aabb.min);
    assert_eq!(leaf.aabb().max, aabb.max);

    // Byte positions: min at 0, max at 16, slots at 28/32, flag at 36.
    let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&leaf));
    assert_eq!(words[7], 5); // slot0
    assert_eq!(words[8], 3); // slot1
    assert_eq!(words[9], 1); // is_leaf
}

#[test]
fn uniforms_field_offsets() {
    let u = Uniforms {
        cam_pos: [1.0, 2.0, 3.0],
        _pad0: 0.0,
        cam_rot: [4.0, 5.0, 6.0],
        _pad1: 0.0,
        fov: 60.0,
        near_plane: 0.1,
        far_plane: 100.0,
        _pad2: [0.0; 2],
        frame_index: 9,
        _pad3: 0,
        res_w: 640,
        res_h: 360,
        samples_per_pixel: 4,
        debug_enabled: 1,
        _pad4: 0,
    };
    let bytes = bytemuck::bytes_of(&u);
    let read_u32 = |off: usize| u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap());
    let read_f32 = |off: usize| f32::from_le_bytes(bytes[off..off + 4].try_into().unwrap());

    assert_eq!(read_f32(0), 1.0); // cam_pos.x
    assert_eq!(read_f32(16), 4.0); // cam_rot.x
    assert_eq!(read_f32(32), 60.0); // fov
    assert_eq!(read_f32(36), 0.1); // near
    assert_eq!(read_f32(40), 100.0); // far
    assert_eq!(read_u32(52), 9); // frame_index
    assert_eq!(read_u32(60), 640); // res_w
    assert_eq!(read_u32(64), 360); // res_h
    assert_eq!(read_u32(68), 4); // samples
    assert_eq!(read_u32(72), 1); // debug
}
