// src/path_tracing/counters.rs
// Performance counter buffer: a small array of u32 the kernel bumps with
// atomicAdd. The host copies it out, zeroes it and reports rates roughly
// once per second.
// RELEVANT FILES:src/path_tracing/gpu_types.rs,src/shaders/pt_kernel.wgsl,src/path_tracing/mod.rs

use crate::error::{RenderError, RenderResult};
use crate::path_tracing::gpu_types::COUNTER_SLOTS;

const BUFFER_SIZE: u64 = (COUNTER_SLOTS * std::mem::size_of::<u32>()) as u64;

pub struct PerfCounters {
    buffer: wgpu::Buffer,
    readback: wgpu::Buffer,
}

impl PerfCounters {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("perf-counters"),
            size: BUFFER_SIZE,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("perf-counters-read"),
            size: BUFFER_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self { buffer, readback }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Copy the counters to the host, zero the device copy and return the
    /// snapshot. Blocks on the copy; call at most ~once per second.
    pub fn read_and_reset(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> RenderResult<[u32; COUNTER_SLOTS]> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("counter-read-encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &self.readback, 0, BUFFER_SIZE);
        queue.submit([encoder.finish()]);

        let slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| RenderError::readback("counter map_async channel closed"))?
            .map_err(|e| RenderError::readback(format!("counter MapAsync failed: {e:?}")))?;

        let mut out = [0u32; COUNTER_SLOTS];
        {
            let data = slice.get_mapped_range();
            out.copy_from_slice(bytemuck::cast_slice(&data[..]));
        }
        self.readback.unmap();

        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[0u32; COUNTER_SLOTS]));
        Ok(out)
    }
}
