use criterion::{criterion_group, criterion_main, Criterion};
use sietch::sav::{SaveFile, MAP_AREA_COUNT};

fn criterion_benchmark(c: &mut Criterion) {
    let buffer = SaveFile::default().write_to_buffer().unwrap();
    c.bench_function("sav decode", |b| {
        b.iter(|| SaveFile::from_existing(&buffer).unwrap())
    });

    let save = SaveFile::from_existing(&buffer).unwrap();
    c.bench_function("sav encode", |b| b.iter(|| save.write_to_buffer().unwrap()));

    c.bench_function("map flag sweep", |b| {
        b.iter(|| {
            let mut save = save.clone();
            for area in 0..MAP_AREA_COUNT {
                save.map_flags.set(area, (area % 4) as u8).unwrap();
            }
            save.map_flags.values()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
