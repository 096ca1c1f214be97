// tests/test_accumulation.rs
// Running-average accumulator laws: idempotence under constant input,
// reset semantics and convergence to the mean of the estimates.
// RELEVANT FILES:src/path_tracing/cpu.rs,src/shaders/accumulate.wgsl

use glam::Vec3;
use lumen3d::path_tracing::cpu::accumulate;

#[test]
fn first_frame_replaces_stored_history() {
    let garbage = Vec3::new(123.0, -7.0, 0.5);
    let estimate = Vec3::new(0.25, 0.5, 0.75);
    assert_eq!(accumulate(garbage, estimate, 0), estimate);
}

#[test]
fn constant_input_is_a_fixed_point() {
    let c = Vec3::new(0.2, 0.6, 0.9);
    let mut stored = Vec3::ZERO;
    for frame in 0..64 {
        stored = accumulate(stored, c, frame);
        assert!(
            (stored - c).abs().max_element() < 1e-5,
            "frame {frame}: stored {stored:?} drifted from {c:?}"
        );
    }
}

#[test]
fn saturation_clamps_each_channel() {
    let hot = Vec3::new(5.0, 0.5, -1.0);
    let out = accumulate(Vec3::ZERO, hot, 0);
    assert_eq!(out, Vec3::new(1.0, 0.5, 0.0));
}

#[test]
fn reset_discards_prior_frames() {
    let mut stored = Vec3::ZERO;
    for frame in 0..50 {
        stored = accumulate(stored, Vec3::splat(0.9), frame);
    }
    // Reset: the next frame runs with frame_index 0 again and the stored
    // value must not leak through.
    let after_reset = accumulate(stored, Vec3::splat(0.1), 0);
    assert!((after_reset - Vec3::splat(0.1)).abs().max_element() < 1e-6);
}

#[test]
fn converges_to_the_mean_of_estimates() {
    // Alternating estimates: the running average must approach their mean.
    let a = Vec3::new(0.1, 0.3, 0.5);
    let b = Vec3::new(0.5, 0.1, 0.3);
    let mut stored = Vec3::ZERO;
    let frames = 1000;
    for frame in 0..frames {
        let estimate = if frame % 2 == 0 { a } else { b };
        stored = accumulate(stored, estimate, frame);
    }
    let mean = (a + b) * 0.5;
    assert!(
        (stored - mean).abs().max_element() < 1e-3,
        "stored {stored:?} vs mean {mean:?}"
    );
}

#[test]
fn weight_declines_with_frame_index() {
    // At frame n the newest estimate contributes 1/(n+1).
    let stored = Vec3::splat(0.5);
    let spike = Vec3::splat(1.0);
    let out = accumulate(stored, spike, 99);
    let expected = 0.5 * (1.0 - 0.01) + 1.0 * 0.01;
    assert!((out.x - expected).abs() < 1e-6);
}
