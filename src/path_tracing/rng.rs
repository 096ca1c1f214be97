// src/path_tracing/rng.rs
// Deterministic per-pixel RNG shared as a contract between the WGSL kernel
// and the CPU reference tracer. The seed formula and the draw order fix
// the sample sequences, so tests can replay any pixel exactly.
// RELEVANT FILES:src/shaders/pt_kernel.wgsl,src/path_tracing/cpu.rs

/// Wang hash used to whiten the per-pixel seed.
pub fn wang_hash(mut seed: u32) -> u32 {
    seed = (seed ^ 61) ^ (seed >> 16);
    seed = seed.wrapping_mul(9);
    seed ^= seed >> 4;
    seed = seed.wrapping_mul(0x27d4_eb2d);
    seed ^ (seed >> 15)
}

/// Per-pixel random stream: LCG state advance with an xor-shift output mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rng {
    pub state: u32,
}

impl Rng {
    pub fn from_seed(seed: u32) -> Self {
        Self {
            state: wang_hash(seed),
        }
    }

    /// Seed formula for pixel (px, py): `py * width + px + frame_index * 12345`.
    pub fn from_pixel(px: u32, py: u32, width: u32, frame_index: u32) -> Self {
        Self::from_seed(
            py.wrapping_mul(width)
                .wrapping_add(px)
                .wrapping_add(frame_index.wrapping_mul(12345)),
        )
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
        let s = self.state;
        let word = ((s >> ((s >> 28) + 4)) ^ s).wrapping_mul(277_803_737);
        (word >> 22) ^ word
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / 4_294_967_296.0
    }
}
