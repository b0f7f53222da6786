//! Benchmarks for the placement math and scene building.
#![allow(missing_docs)] // criterion_group! generates an undocumented fn

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec2;
use inspectet::alignment::{
    Alignment, AlignmentFormat, SectionParams, VolumeDimension, IMOD_CONVENTION,
};
use inspectet::io::LoadedAlignment;
use inspectet::options::AppearanceOptions;
use inspectet::scene::{build_scene, MemoryScene};
use inspectet::transform::{
    depth_offset, image_transform, volume_transform, ImageBasis,
};

fn dim() -> VolumeDimension {
    VolumeDimension::new(10000.0, 10000.0, 4000.0)
        .unwrap_or_else(|e| panic!("{e}"))
}

fn sections(count: usize) -> Vec<SectionParams> {
    (0..count)
        .map(|z| SectionParams {
            z_index: z,
            tilt_angle: -60.0 + 3.0 * z as f64,
            tilt_axis_rotation: -85.3,
            x_offset: 1.5,
            y_offset: -2.0,
            volume_x_rotation: None,
        })
        .collect()
}

fn transform_benchmark(c: &mut Criterion) {
    let section = sections(1)[0];
    let _ = c.bench_function("volume_transform", |b| {
        b.iter(|| {
            black_box(volume_transform(
                dim(),
                &IMOD_CONVENTION,
                black_box(12.0),
            ))
        });
    });

    let basis = ImageBasis::TiltSeries {
        width_px: 4096,
        height_px: 4096,
        step: DVec2::splat(1.35),
    };
    let z_offset = depth_offset(dim());
    let _ = c.bench_function("image_transform", |b| {
        b.iter(|| {
            black_box(image_transform(&basis, z_offset, black_box(&section)))
        });
    });
}

fn build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_scene");

    for count in [41, 61, 121] {
        let format = AlignmentFormat::Imod;
        let loaded = LoadedAlignment {
            format,
            alignment: Alignment::new(dim(), sections(count))
                .unwrap_or_else(|e| panic!("{e}")),
            convention: format.convention(),
            volume_file: None,
            tilt_series: None,
        };
        let appearance = AppearanceOptions::default();

        let _ = group.bench_function(format!("{count}_sections"), |b| {
            b.iter(|| {
                let mut host = MemoryScene::new();
                black_box(build_scene(&mut host, &loaded, &appearance).is_ok())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, transform_benchmark, build_benchmark);
criterion_main!(benches);
