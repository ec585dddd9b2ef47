use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parley::core::conversation::{Conversation, ConversationId};
use parley::core::router::CommandRouter;

fn make_conversations(n: usize) -> Vec<Conversation> {
    (0..n)
        .map(|i| {
            Conversation::new(
                ConversationId::new(format!("{}", 1_700_000_000_000u64 + i as u64)),
                format!("Debugging borrow checker errors in module {i}..."),
            )
        })
        .collect()
}

fn bench_router_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("router_filter");
    for &n in &[10usize, 100, 1000] {
        let conversations = make_conversations(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("build", n), &conversations, |b, list| {
            b.iter(|| CommandRouter::for_conversations(list))
        });

        group.bench_with_input(BenchmarkId::new("type_query", n), &conversations, |b, list| {
            let mut router = CommandRouter::for_conversations(list);
            b.iter(|| {
                router.set_query("");
                for c in "module 99".chars() {
                    router.push_char(c);
                }
                router.len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_router_filter);
criterion_main!(benches);
