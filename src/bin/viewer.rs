// src/bin/viewer.rs
// Interactive viewer entry point.
//
// Usage: viewer [--scene <manifest.json>]... [--width N] [--height N]
// Keys: 1-9/0 samples per pixel, B debug overlay, [ ] BVH depth,
// R reset accumulation, Tab cycle scenes.

use std::path::PathBuf;
use std::process::ExitCode;

use lumen3d::viewer::{run, ViewerConfig};

fn parse_args() -> Result<ViewerConfig, String> {
    let mut config = ViewerConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scene" => {
                let v = args.next().ok_or("--scene requires a path")?;
                config.scene_paths.push(PathBuf::from(v));
            }
            "--width" => {
                let v = args.next().ok_or("--width requires a value")?;
                config.width = v.parse().map_err(|_| format!("bad --width {v:?}"))?;
            }
            "--height" => {
                let v = args.next().ok_or("--height requires a value")?;
                config.height = v.parse().map_err(|_| format!("bad --height {v:?}"))?;
            }
            "--help" | "-h" => {
                println!(
                    "usage: viewer [--scene <manifest.json>]... [--width N] [--height N]"
                );
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
