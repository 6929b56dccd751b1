//! Terrain generator binary: builds a terrain, optionally sculpts it and
//! exports the color texture plus a chunk manifest.
//!
//! Usage: cargo run --release --bin generate_terrain -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON terrain config (default: built-in defaults)
//!   --seed <SEED>     Override the generator seed
//!   --name <NAME>     Output directory name (default: "terrain")
//!   --strokes <N>     Brush frames to replay across the terrain (default: 0)
//!
//! Output structure:
//!   output/<name>/
//!     colors.png        # Color map texture
//!     manifest.json     # Config, grid size and per-chunk vertex counts

use std::path::PathBuf;
use std::time::Instant;

use glam::Vec2;
use serde_json::json;

use terrasculpt::core::Result;
use terrasculpt::edit::{BrushInput, TerrainSystem};
use terrasculpt::terrain::TerrainConfig;

fn main() {
    terrasculpt::core::logging::init();

    if let Err(e) = run() {
        log::error!("Terrain generation failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig::default(),
    };
    if let Some(seed) = parse_i32_arg(&args, "--seed") {
        config.generator.seed = seed;
    }
    let name = parse_str_arg(&args, "--name").unwrap_or_else(|| "terrain".to_string());
    let strokes = parse_usize_arg(&args, "--strokes").unwrap_or(0);

    let output_dir = PathBuf::from(format!("output/{}", name));
    std::fs::create_dir_all(&output_dir)?;

    println!("=== Terrain Generator ===");
    println!("Grid:   {}x{}", config.resolution.width, config.resolution.height);
    println!("Size:   {} x {}", config.world_size.x, config.world_size.y);
    println!("Seed:   {}", config.generator.seed);
    println!("Output: {}", output_dir.display());
    println!();

    let start = Instant::now();
    let mut system = TerrainSystem::initialize(config)?;
    system.generate()?;
    println!("Generated in {:.1} ms", start.elapsed().as_secs_f64() * 1000.0);

    if strokes > 0 {
        replay_strokes(&mut system, strokes);
    }

    let Some(texture) = system.texture() else {
        return Ok(());
    };
    texture.save(output_dir.join("colors.png"))?;

    let chunks: Vec<_> = system
        .mesh()
        .map(|mesh| {
            mesh.chunks()
                .iter()
                .map(|c| json!({ "id": c.id, "vertices": c.vertex_count() }))
                .collect()
        })
        .unwrap_or_default();
    let heights = system.store().map(|s| s.heights()).unwrap_or_default();
    let (min, max) = heights
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));

    let manifest = json!({
        "config": system.config(),
        "cells": heights.len(),
        "height_range": [min, max],
        "chunk_count": chunks.len(),
        "chunks": chunks,
    });
    std::fs::write(
        output_dir.join("manifest.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    println!();
    println!("=== Generation Complete ===");
    println!("Chunks: {}", chunks.len());
    println!("Height: {:.2} .. {:.2}", min, max);
    println!("Output: {}", output_dir.display());
    Ok(())
}

/// Drag the configured brush diagonally across the terrain at 100Hz.
fn replay_strokes(system: &mut TerrainSystem, frames: usize) {
    let brush = system.config().brush.clone();
    let half = system.config().world_size / 2.0;
    let start = Instant::now();
    let mut cells = 0;
    let mut chunks = 0;
    for frame in 0..frames {
        let t = frame as f32 / frames.max(2).saturating_sub(1) as f32;
        let position = Vec2::new(-half.x, -half.y).lerp(half, t);
        let report = system.tick(&BrushInput::pressed_at(position), &brush, 0.01);
        cells += report.cells_modified;
        chunks += report.chunks_rebuilt.len();
    }
    system.tick(&BrushInput::released(), &brush, 0.01);
    println!(
        "Sculpted {} frames with {:?}: {} cell edits, {} chunk rebuilds in {:.1} ms",
        frames,
        brush.tool,
        cells,
        chunks,
        start.elapsed().as_secs_f64() * 1000.0
    );
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
