use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, black_box};

use voxterra::core::config::DEFAULT_CAPACITY_FACTORS;
use voxterra::core::{Vec3, VoxelCoord};
use voxterra::generation::{ChunkGenerator, GenerationRequest};
use voxterra::physics::CollisionProbe;
use voxterra::terrain::{NoiseField, TerrainParams, VoxelType};
use voxterra::voxel::{ChunkCoord, OverrideLog};

fn request(view_distance: i32, overrides: OverrideLog) -> GenerationRequest {
    GenerationRequest {
        version: 1,
        view_distance,
        chunk_size: 24,
        center: ChunkCoord::new(0, 0),
        field: NoiseField::new(0.4242, TerrainParams::default()),
        overrides: Arc::new(overrides),
        capacity_factors: DEFAULT_CAPACITY_FACTORS,
        capacity_headroom: 500,
    }
}

fn bench_generate_window_d1(c: &mut Criterion) {
    let req = request(1, OverrideLog::new());
    c.bench_function("generate_window_d1", |b| {
        b.iter(|| ChunkGenerator::generate(black_box(&req)));
    });
}

fn bench_generate_window_d3(c: &mut Criterion) {
    let req = request(3, OverrideLog::new());
    c.bench_function("generate_window_d3", |b| {
        b.iter(|| ChunkGenerator::generate(black_box(&req)));
    });
}

fn bench_generate_with_edits(c: &mut Criterion) {
    let mut log = OverrideLog::new();
    for i in 0..2000 {
        let coord = VoxelCoord::new(i % 60 - 30, 45 + i % 7, i / 60 - 16);
        log.record_placement(coord, VoxelType::ALL[i as usize % VoxelType::COUNT]);
    }
    let req = request(1, log);
    c.bench_function("generate_window_d1_2000_edits", |b| {
        b.iter(|| ChunkGenerator::generate(black_box(&req)));
    });
}

fn bench_probe_all(c: &mut Criterion) {
    let field = NoiseField::new(0.4242, TerrainParams::default());
    let log = OverrideLog::new();
    let mut probe = CollisionProbe::new(0.5, 1.2);
    let s = field.surface_height(5, 5) as f32;

    c.bench_function("collision_probe_all", |b| {
        b.iter(|| {
            probe.probe_all(black_box(Vec3::new(5.0, s + 2.3, 5.0)), 1.8, false, &field, &log)
        });
    });
}

criterion_group!(
    benches,
    bench_generate_window_d1,
    bench_generate_window_d3,
    bench_generate_with_edits,
    bench_probe_all,
);
criterion_main!(benches);
