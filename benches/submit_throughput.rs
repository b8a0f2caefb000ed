use clob_engine::{OrderBook, Side};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn submit_throughput_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("orderbook_operations");

    group.bench_function("submit_limit_resting", |b| {
        let mut book = OrderBook::new();
        let mut id = 0u64;

        b.iter(|| {
            id += 1;
            let price = 100 + (id % 50) as i64;
            black_box(book.submit_limit(id, Side::Bid, price, 10).unwrap());
        });
    });

    group.bench_function("submit_limit_crossing", |b| {
        let mut book = OrderBook::new();
        for i in 0..10_000 {
            book.submit_limit(i, Side::Ask, 100, 10).unwrap();
        }
        let mut id = 10_000u64;

        b.iter(|| {
            id += 1;
            black_box(book.submit_limit(id, Side::Bid, 100, 10).unwrap());
            book.submit_limit(id + 1_000_000, Side::Ask, 100, 10).unwrap();
        });
    });

    group.bench_function("cancel", |b| {
        let mut book = OrderBook::new();
        let mut next_id = 0u64;

        b.iter(|| {
            next_id += 1;
            book.submit_limit(next_id, Side::Bid, 100, 10).unwrap();
            black_box(book.cancel(next_id).unwrap());
        });
    });

    group.bench_function("best_bid_ask", |b| {
        let mut book = OrderBook::new();
        for i in 0..200 {
            book.submit_limit(i, Side::Bid, 100 - i as i64, 10).unwrap();
            book.submit_limit(i + 1000, Side::Ask, 200 + i as i64, 10).unwrap();
        }

        b.iter(|| {
            black_box(book.best_bid());
            black_box(book.best_ask());
        });
    });

    group.finish();
}

criterion_group!(benches, submit_throughput_benchmark);
criterion_main!(benches);
