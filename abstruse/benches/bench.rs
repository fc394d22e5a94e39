use criterion::{Criterion, black_box, criterion_group, criterion_main};

use abstruse::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_term(budget: usize, rng: &mut impl Rng) -> Term {
    if budget == 0 || rng.random_bool(0.3) {
        // Leaves: a few constants, the variable marker and the empty compound
        return match rng.random_range(0..=9) {
            0 => Term::var(),
            1 => Term::compound([]),
            n => Term::atom(format!("c{n}")),
        };
    }

    let arity = rng.random_range(1..=4);
    Term::compound((0..arity).map(|_| random_term(budget - 1, rng)))
}

fn corpus(seed: u64, size: usize) -> Vec<Term> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..size).map(|_| random_term(5, &mut rng)).collect()
}

fn bench_insert(c: &mut Criterion) {
    let terms = corpus(0x42, 2_000);
    c.bench_function("insert_2000", |b| {
        b.iter(|| {
            let mut index = AbstruseIndex::new();
            for t in &terms {
                index.insert(black_box(t.clone())).unwrap();
            }
            index
        })
    });
}

fn bench_retrieve(c: &mut Criterion) {
    let terms = corpus(0x42, 10_000);
    let queries = corpus(0x43, 100);
    let mut index = AbstruseIndex::new();
    for t in &terms {
        index.insert(t.clone()).unwrap();
    }

    c.bench_function("retrieve_exact_100", |b| {
        b.iter(|| {
            queries
                .iter()
                .map(|q| index.retrieve(black_box(q), RetrieveMode::Exact).count())
                .sum::<usize>()
        })
    });

    c.bench_function("retrieve_wildcard_100", |b| {
        b.iter(|| {
            queries
                .iter()
                .map(|q| index.retrieve(black_box(q), RetrieveMode::Wildcard).count())
                .sum::<usize>()
        })
    });
}

criterion_group!(benches, bench_insert, bench_retrieve);
criterion_main!(benches);
