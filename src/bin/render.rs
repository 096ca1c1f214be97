// src/bin/render.rs
// Headless renderer: accumulate a fixed number of frames of a scene
// manifest and write the result as PNG.
//
// Usage: render --scene <manifest.json> [--out out.png] [--width N]
//        [--height N] [--frames N] [--spp N]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::info;

use lumen3d::path_tracing::{offscreen, RenderSettings};
use lumen3d::scene::loader;
use lumen3d::util::image_write::write_png_rgba8;

struct RenderArgs {
    scene: PathBuf,
    out: PathBuf,
    width: u32,
    height: u32,
    frames: u32,
    spp: u32,
}

fn parse_args() -> Result<RenderArgs, String> {
    let mut scene: Option<PathBuf> = None;
    let mut out = PathBuf::from("out.png");
    let mut width = 960u32;
    let mut height = 540u32;
    let mut frames = 64u32;
    let mut spp = 4u32;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or(format!("{name} requires a value"));
        match arg.as_str() {
            "--scene" => scene = Some(PathBuf::from(value("--scene")?)),
            "--out" => out = PathBuf::from(value("--out")?),
            "--width" => width = value("--width")?.parse().map_err(|_| "bad --width")?,
            "--height" => height = value("--height")?.parse().map_err(|_| "bad --height")?,
            "--frames" => frames = value("--frames")?.parse().map_err(|_| "bad --frames")?,
            "--spp" => spp = value("--spp")?.parse().map_err(|_| "bad --spp")?,
            "--help" | "-h" => {
                println!(
                    "usage: render --scene <manifest.json> [--out out.png] \
                     [--width N] [--height N] [--frames N] [--spp N]"
                );
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }

    Ok(RenderArgs {
        scene: scene.ok_or("--scene is required")?,
        out,
        width,
        height,
        frames,
        spp,
    })
}

fn render(args: &RenderArgs) -> Result<()> {
    let scene = loader::load_scene(&args.scene)?;

    let mut settings = RenderSettings::default();
    settings.samples_per_pixel = args.spp;

    let pixels = offscreen::render_offscreen(&scene, args.width, args.height, args.frames, settings)
        .context("offscreen render")?;
    write_png_rgba8(&args.out, &pixels, args.width, args.height)?;
    info!(
        "wrote {} ({}x{}, {} frames)",
        args.out.display(),
        args.width,
        args.height,
        args.frames
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match render(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
