//! PNG encoding for tightly packed RGBA buffers.
//!
//! Centralizes output validation for GPU readback pipelines.

use anyhow::{ensure, Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Number of channels in RGBA8 format.
const RGBA8_CHANNELS: usize = 4;

/// Write PNG with fast compression.
pub fn write_png_rgba8(path: &Path, data: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(RGBA8_CHANNELS))
        .context("image dimensions overflow")?;
    ensure!(
        data.len() == expected,
        "PNG writer requires tight RGBA8 buffer: expected {} bytes, got {}",
        expected,
        data.len()
    );

    let file = File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Fast, FilterType::NoFilter);
    encoder
        .write_image(data, width, height, ExtendedColorType::Rgba8)
        .with_context(|| format!("encoding PNG {}", path.display()))?;
    Ok(())
}
