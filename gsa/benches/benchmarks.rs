use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gsa::index::alphabet::Alphabet;
use gsa::index::{sa, BuildOptions, FmTables, IndexMethod, OccLayout};
use gsa::search::{approx_hits, exact_hits};

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'a', b'c', b'g', b't'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

fn bench_build_sa(c: &mut Criterion) {
    let reference = make_reference(100_000);
    let (text, alpha) = Alphabet::mapped_with_sentinel(&reference).unwrap();

    c.bench_function("build_sa_100k", |b| {
        b.iter(|| {
            black_box(sa::build_sa(black_box(&text), alpha.sigma()));
        })
    });
}

fn bench_exact_search(c: &mut Criterion) {
    let reference = make_reference(10_000);
    let dense = FmTables::build(&reference, &BuildOptions::new(IndexMethod::ExactBwt)).unwrap();
    let sampled = FmTables::build(
        &reference,
        &BuildOptions { method: IndexMethod::ExactBwt, occ: OccLayout::Sampled { block: 64 } },
    )
    .unwrap();
    let pattern = &reference[100..120];

    c.bench_function("exact_search_20bp_dense", |b| {
        b.iter(|| black_box(exact_hits(&dense, black_box(pattern)).count()))
    });
    c.bench_function("exact_search_20bp_sampled64", |b| {
        b.iter(|| black_box(exact_hits(&sampled, black_box(pattern)).count()))
    });
}

fn bench_approx_search(c: &mut Criterion) {
    let reference = make_reference(10_000);
    let tables = FmTables::build(&reference, &BuildOptions::new(IndexMethod::ApproxBwt)).unwrap();
    let mut read = reference[500..550].to_vec();
    read[25] = if read[25] == b'a' { b'c' } else { b'a' };

    c.bench_function("approx_search_50bp_2edits", |b| {
        b.iter(|| black_box(approx_hits(&tables, black_box(&read), 2).count()))
    });
}

criterion_group!(benches, bench_build_sa, bench_exact_search, bench_approx_search);
criterion_main!(benches);
