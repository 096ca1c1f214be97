// src/path_tracing/offscreen.rs
// Headless rendering: runs the normal frame sequence against an offscreen
// rgba16float target for a fixed number of accumulation frames, then reads
// the result back through a row-padded copy buffer and converts to RGBA8.
// RELEVANT FILES:src/path_tracing/mod.rs,src/gpu.rs,src/bin/render.rs

use half::f16;

use crate::error::{RenderError, RenderResult};
use crate::gpu::{align_copy_bpr, try_ctx};
use crate::path_tracing::{RenderSettings, Renderer};
use crate::scene::Scene;

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Render `frames` accumulation frames of `scene` and return tightly
/// packed RGBA8 pixels (row-major, width * height * 4 bytes).
pub fn render_offscreen(
    scene: &Scene,
    width: u32,
    height: u32,
    frames: u32,
    settings: RenderSettings,
) -> RenderResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(RenderError::render("offscreen target must be non-empty"));
    }
    let g = try_ctx().ok_or_else(|| RenderError::device("no suitable GPU adapter"))?;

    let mut renderer = Renderer::new(
        g.device.clone(),
        g.queue.clone(),
        width,
        height,
        OFFSCREEN_FORMAT,
    )?;
    renderer.settings = settings;
    renderer.load_scene(scene)?;

    let target = g.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen-target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    for _ in 0..frames.max(1) {
        renderer.render_frame(&target_view)?;
    }

    // Copy out with padded rows, then decode f16 to RGBA8.
    let row_bytes = width * 8;
    let padded_bpr = align_copy_bpr(row_bytes);
    let read_size = (padded_bpr as u64) * (height as u64);
    let read_buf = g.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("offscreen-read"),
        size: read_size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut enc = g
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("offscreen-read-encoder"),
        });
    enc.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &read_buf,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    g.queue.submit([enc.finish()]);
    g.device.poll(wgpu::Maintain::Wait);

    let slice = read_buf.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    g.device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .map_err(|_| RenderError::readback("map_async channel closed"))?
        .map_err(|e| RenderError::readback(format!("MapAsync failed: {e:?}")))?;
    let data = slice.get_mapped_range();

    let mut out = vec![0u8; (width as usize) * (height as usize) * 4];
    let src_stride = padded_bpr as usize;
    let dst_stride = (width as usize) * 4;
    for y in 0..(height as usize) {
        let row = &data[y * src_stride..y * src_stride + (width as usize) * 8];
        for x in 0..(width as usize) {
            let o = x * 8;
            let r = f16::from_bits(u16::from_le_bytes([row[o], row[o + 1]])).to_f32();
            let g_ch = f16::from_bits(u16::from_le_bytes([row[o + 2], row[o + 3]])).to_f32();
            let b = f16::from_bits(u16::from_le_bytes([row[o + 4], row[o + 5]])).to_f32();
            // The accumulator already saturates; clamp only guards NaN.
            let ix = y * dst_stride + x * 4;
            out[ix] = (r.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            out[ix + 1] = (g_ch.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            out[ix + 2] = (b.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            out[ix + 3] = 255u8;
        }
    }

    drop(data);
    read_buf.unmap();
    Ok(out)
}
