//! hdrpipe CLI - HDR Photo Process-Pipe Engine
//!
//! This is a demonstration CLI for the hdrpipe library.

use anyhow::{Context, Result};
use hdrpipe::prelude::*;
use std::path::Path;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        return;
    }

    let result = match args[1].as_str() {
        "info" => {
            if args.len() < 3 {
                eprintln!("Error: Please specify an image path");
                return;
            }
            image_info(Path::new(&args[2]))
        }
        "process" => {
            if args.len() < 4 {
                eprintln!("Error: Please specify input and output paths");
                eprintln!("Usage: {} process <input> <output> [--ev <stops>] [--contrast <amt>] [--saturation <amt>] [--tiles <WxH>]", args[0]);
                return;
            }
            process_image(&args[2..])
        }
        "gallery" => {
            if args.len() < 3 {
                eprintln!("Error: Please specify a directory");
                return;
            }
            gallery(Path::new(&args[2]))
        }
        "help" | "--help" | "-h" => {
            print_usage(&args[0]);
            return;
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(&args[0]);
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("hdrpipe v{}", hdrpipe::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  info <image>               Show image and persisted edit info");
    println!("  process <in> <out> [opts]  Run the editing pipe and export");
    println!("  gallery <dir>              Scan a directory and build thumbnails");
    println!("  help                       Show this help message");
    println!();
    println!("Process options:");
    println!("  --ev <stops>        Exposure in stops (default: 0)");
    println!("  --contrast <amt>    Contrast -100 to 100 (default: 0)");
    println!("  --saturation <amt>  Saturation -100 to 100 (default: 0)");
    println!("  --tiles <WxH>       Export tile grid (default: 3x2)");
}

fn image_info(path: &Path) -> Result<()> {
    let image = Image::read(path).with_context(|| format!("reading {}", path.display()))?;
    println!("Image: {}", path.display());
    println!("  size: {}x{}", image.width(), image.height());
    println!("  color space: {} (linear: {})", image.color_space, image.linear);

    match ImageMetadata::load(path)? {
        Some(meta) => {
            println!("  sidecar: {} exif entries", meta.exif.len());
            match &meta.processpipe {
                Some(state) => {
                    println!("  persisted pipe ({} nodes):", state.nodes.len());
                    for node in &state.nodes {
                        println!("    • {}", node.name);
                    }
                }
                None => println!("  persisted pipe: none"),
            }
        }
        None => println!("  sidecar: none"),
    }
    Ok(())
}

fn process_image(args: &[String]) -> Result<()> {
    let input = Path::new(&args[0]);
    let output = Path::new(&args[1]);

    let mut ev = 0.0f64;
    let mut contrast = 0.0f64;
    let mut saturation = 0.0f64;
    let mut tiles = (3usize, 2usize);

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--ev" if i + 1 < args.len() => {
                ev = args[i + 1].parse().unwrap_or(0.0);
                i += 2;
            }
            "--contrast" if i + 1 < args.len() => {
                contrast = args[i + 1].parse().unwrap_or(0.0);
                i += 2;
            }
            "--saturation" if i + 1 < args.len() => {
                saturation = args[i + 1].parse().unwrap_or(0.0);
                i += 2;
            }
            "--tiles" if i + 1 < args.len() => {
                if let Some((w, h)) = args[i + 1].split_once('x') {
                    tiles = (
                        w.parse().unwrap_or(3).max(1),
                        h.parse().unwrap_or(2).max(1),
                    );
                }
                i += 2;
            }
            other => {
                eprintln!("Ignoring unknown option: {}", other);
                i += 1;
            }
        }
    }

    let config = AppConfig::default();
    let image = Image::read(input).with_context(|| format!("reading {}", input.display()))?;
    let mut pipe = pipe_for_image(image);

    // restore persisted edits when a sidecar exists, then apply overrides
    if let Some(meta) = ImageMetadata::load(input)? {
        if let Some(state) = &meta.processpipe {
            let registry = TransformRegistry::builtin();
            let mut restored = ProcessPipe::from_state(&registry, state)?;
            restored.set_image(Image::read(input)?);
            pipe = restored;
        }
    }

    if ev != 0.0 {
        let id = pipe.node_index_by_name("exposure")?;
        pipe.set_parameters(id, params_from([("EV", ev)]))?;
    }
    if contrast != 0.0 {
        let id = pipe.node_index_by_name("contrast")?;
        pipe.set_parameters(id, params_from([("contrast", contrast)]))?;
    }
    if saturation != 0.0 {
        let id = pipe.node_index_by_name("saturation")?;
        pipe.set_parameters(
            id,
            params_from([
                ("saturation", ParamValue::Float(saturation)),
                ("method", "gamma".into()),
            ]),
        )?;
    }

    println!(
        "Exporting {} -> {} ({}x{} tiles)...",
        input.display(),
        output.display(),
        tiles.0,
        tiles.1
    );
    let written = hdrpipe::exec::export(&pipe, &config, output, tiles.0, tiles.1, &|pct| {
        print!("\r  {}%", pct);
    })
    .with_context(|| format!("exporting {}", output.display()))?;
    println!("\nWrote {}", written.display());
    Ok(())
}

fn gallery(dir: &Path) -> Result<()> {
    let paths = hdrpipe::exec::scan_directory(dir)?;
    println!("Found {} images in {}", paths.len(), dir.display());

    let items = hdrpipe::exec::load_page(&paths);
    for (path, item) in paths.iter().zip(items) {
        match item {
            Ok(item) => {
                let thumb = item.pipe.get_image(true)?;
                println!(
                    "  • {} ({}x{} thumbnail{})",
                    path.file_name().unwrap_or_default().to_string_lossy(),
                    thumb.width(),
                    thumb.height(),
                    if item.metadata.processpipe.is_some() {
                        ", edited"
                    } else {
                        ""
                    }
                );
            }
            Err(e) => println!(
                "  ✗ {} failed: {}",
                path.file_name().unwrap_or_default().to_string_lossy(),
                e
            ),
        }
    }
    Ok(())
}
