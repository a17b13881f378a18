use criterion::{criterion_group, criterion_main, Criterion};

use rand_montecarlo::*;

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut mt = MersenneTwister::new(5489);
    c.bench_function("MersenneTwister::next_raw", move |b| b.iter(|| mt.next_raw()));
    let mut xs = Xorshift32::new(1);
    c.bench_function("Xorshift32::next_raw", move |b| b.iter(|| xs.next_raw()));
    let mut lfsr = UniformGenerator::create(Algorithm::Lfsr, Some(0x7fff_ffff), &Params::new()).unwrap();
    c.bench_function("UniformGenerator::next (lfsr)", move |b| b.iter(|| lfsr.next()));

    let uniform = generate_numbers(10_000, "mersenne", Some(1), &Params::new()).unwrap();
    let poisson = TransformParams::Poisson { lambda: 4.0 };
    c.bench_function("poisson 10k", |b| b.iter(|| poisson.apply(&uniform)));
    let normal = TransformParams::Normal { mean: 0.0, std_dev: 1.0 };
    c.bench_function("box-muller 10k", |b| b.iter(|| normal.apply(&uniform)));

    let f = Polynomial::new(vec![1.0, 0.0, 3.0]);
    let mut handle = GeneratorHandle::create(Algorithm::Mersenne, Some(1), &Params::new()).unwrap();
    c.bench_function("integrate 10k cached", move |b| b.iter(|| integrate(&f, 0.0, 1.0, 10_000, &mut handle, "1+3x^2")));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
