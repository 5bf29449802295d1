use criterion::{black_box, criterion_group, criterion_main, Criterion};

use velella_motif::{fimo, tomtom, FimoOptions, Motif, Pwm, TomtomOptions};

fn random_sequence(n: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            b"ACGT"[(state >> 33) as usize % 4]
        })
        .collect()
}

fn random_motif(name: &str, width: usize, seed: u64) -> Motif {
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let matrix = (0..width)
        .map(|_| {
            let raw = [next() + 0.05, next() + 0.05, next() + 0.05, next() + 0.05];
            let total: f64 = raw.iter().sum();
            [
                raw[0] / total,
                raw[1] / total,
                raw[2] / total,
                raw[3] / total,
            ]
        })
        .collect();
    Motif::new(name, Pwm::new(matrix).unwrap())
}

fn bench_fimo(c: &mut Criterion) {
    let mut group = c.benchmark_group("fimo");

    let seq = random_sequence(100_000, 42);
    let motifs = [random_motif("bench", 12, 7)];
    let options = FimoOptions {
        threshold: 1e-3,
        ..FimoOptions::default()
    };

    group.bench_function("100kb_w12", |b| {
        b.iter(|| fimo(black_box(&motifs), &[seq.as_slice()], &options))
    });

    group.finish();
}

fn bench_tomtom(c: &mut Criterion) {
    let mut group = c.benchmark_group("tomtom");

    let queries: Vec<Motif> = (0..10)
        .map(|i| random_motif(&format!("q{}", i), 10, 100 + i))
        .collect();
    let targets: Vec<Motif> = (0..10)
        .map(|i| random_motif(&format!("t{}", i), 14, 200 + i))
        .collect();
    let options = TomtomOptions::default();

    group.bench_function("10x10_motifs", |b| {
        b.iter(|| tomtom(black_box(&queries), black_box(&targets), &options))
    });

    group.finish();
}

criterion_group!(benches, bench_fimo, bench_tomtom);
criterion_main!(benches);
