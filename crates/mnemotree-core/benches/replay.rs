use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mnemotree_core::ledger::Ledger;
use mnemotree_core::model::{Rating, DAY_MS};
use mnemotree_core::replay::{apply_review, replay};

const T0: i64 = 1_700_000_000_000;

fn make_ledger(len: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for i in 0..len {
        let rating = Rating::ALL[i % 4];
        // Append in reverse so the sort has work to do.
        ledger.append(rating, T0 + (len - i) as i64 * 3 * DAY_MS);
    }
    ledger
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for len in [10, 100, 1000] {
        let ledger = make_ledger(len);
        group.bench_function(format!("entries={len}"), |b| {
            b.iter(|| replay(black_box(&ledger).sorted(), black_box(T0)))
        });
    }

    group.finish();
}

fn bench_fast_path(c: &mut Criterion) {
    let ledger = make_ledger(100);
    let state = replay(ledger.sorted(), T0);
    let now = T0 + 400 * DAY_MS;

    c.bench_function("apply_review", |b| {
        b.iter(|| apply_review(black_box(&state), black_box(Rating::Good), black_box(now)))
    });
}

criterion_group!(benches, bench_replay, bench_fast_path);
criterion_main!(benches);
