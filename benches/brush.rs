use criterion::{criterion_group, criterion_main, Criterion, black_box};

use terrasculpt::edit::{TerrainSystem, ToolKind};
use terrasculpt::mesh::MeshBuilder;
use terrasculpt::terrain::{Grid, GridDimensions, TerrainConfig, WorldExtent};
use terrasculpt::core::Rgba;

use glam::Vec2;

fn default_system() -> TerrainSystem {
    TerrainSystem::initialize(TerrainConfig::default()).expect("Failed to initialize terrain")
}

fn bench_mesh_build_100(c: &mut Criterion) {
    let grid = Grid::new(GridDimensions::new(100, 100), WorldExtent::new(500.0, 500.0));
    let builder = MeshBuilder::new(6000);

    c.bench_function("mesh_build_100x100", |b| {
        b.iter(|| {
            let n = grid.cell_count();
            builder.build(black_box(&grid), vec![0.0; n], vec![Rgba::GREY; n])
        });
    });
}

fn bench_height_brush(c: &mut Criterion) {
    let mut system = default_system();

    c.bench_function("height_brush_normal_r25", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let pos = Vec2::new(
                (frame as f32 * 0.1).sin() * 200.0,
                (frame as f32 * 0.1).cos() * 200.0,
            );
            system.apply_height_tool(black_box(pos), 25.0, 2.5, ToolKind::Normal)
        });
    });
}

fn bench_smooth_brush(c: &mut Criterion) {
    let mut system = default_system();
    system.generate().expect("Failed to generate terrain");

    c.bench_function("height_brush_smooth_r25", |b| {
        b.iter(|| system.apply_height_tool(black_box(Vec2::ZERO), 25.0, 2.5, ToolKind::Smooth));
    });
}

fn bench_color_brush(c: &mut Criterion) {
    let mut system = default_system();

    c.bench_function("color_brush_r25", |b| {
        b.iter(|| system.apply_color_tool(black_box(Vec2::ZERO), 25.0, 2.5, Rgba::WHITE));
    });
}

fn bench_generate(c: &mut Criterion) {
    let mut system = default_system();

    c.bench_function("generate_100x100", |b| {
        b.iter(|| system.generate());
    });
}

criterion_group!(
    benches,
    bench_mesh_build_100,
    bench_height_brush,
    bench_smooth_brush,
    bench_color_brush,
    bench_generate,
);
criterion_main!(benches);
