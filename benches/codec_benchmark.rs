use binfloat::{fp_add, from_ieee754, to_ieee754, Precision};

fn encode_normals() {
    let mut value = 1.0f64;
    for _ in 0..1000 {
        value *= 1.001;
        for precision in Precision::ALL {
            black_box(to_ieee754(value, precision));
        }
    }
}

fn encode_subnormals() {
    // Starts below the smallest normal single and decays toward zero.
    let mut value = 2f64.powi(-130);
    for _ in 0..1000 {
        value *= 0.999;
        black_box(to_ieee754(value, Precision::Single));
        black_box(to_ieee754(value, Precision::Half));
    }
}

fn decode_patterns() {
    let mut state = 0x243F_6A88_85A3_08D3u64;
    for _ in 0..1000 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        black_box(from_ieee754(state, Precision::Double).unwrap());
        black_box(from_ieee754(state as u32, Precision::Single).unwrap());
        black_box(from_ieee754(state as u16, Precision::Half).unwrap());
    }
}

fn add_round_trip() {
    let a = to_ieee754(1.5, Precision::Single).bits();
    let b = to_ieee754(2.5, Precision::Single).bits();
    for _ in 0..1000 {
        black_box(fp_add(a, b, Precision::Single).unwrap());
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("encode_normals", |b| b.iter(encode_normals));
    c.bench_function("encode_subnormals", |b| b.iter(encode_subnormals));
    c.bench_function("decode_patterns", |b| b.iter(decode_patterns));
    c.bench_function("add_round_trip", |b| b.iter(add_round_trip));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
