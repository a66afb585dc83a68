//! # Fire Detection Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use image::{Rgb, RgbImage};
use nalgebra::Point2;
use seek_lib::fire_detect::{FireDetect, Params};

fn fire_detect_benchmark(c: &mut Criterion) {
    // ---- Build a representative frame ----

    // Plain background with a 20x20 fire region off to one side
    let mut image = RgbImage::from_pixel(640, 480, Rgb([40u8, 60, 90]));

    for y in 100..120 {
        for x in 400..420 {
            image.put_pixel(x, y, Rgb([230u8, 120, 30]));
        }
    }

    let detect = FireDetect::new(Params::default()).unwrap();
    let centre = Point2::new(320.0, 240.0);

    c.bench_function("fire_detect 640x480", |b| {
        b.iter(|| detect.detect(black_box(&image), black_box(&centre)))
    });
}

criterion_group!(benches, fire_detect_benchmark);
criterion_main!(benches);
