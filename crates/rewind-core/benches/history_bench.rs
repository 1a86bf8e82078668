use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use rewind_core::{HistoryConfig, HistoryManager};
use rewind_harness::{SampleData, Story, tracked};

fn commit_bench(c: &mut Criterion) {
    c.bench_function("commit_20_objects", |b| {
        b.iter_batched(
            || {
                let mut data = SampleData::new();
                let mut manager = HistoryManager::new(HistoryConfig::unlimited());
                let mut cells = Vec::new();
                for _ in 0..20 {
                    let (cell, handle) = tracked(data.story());
                    manager.add(handle);
                    cells.push(cell);
                }
                (manager, cells)
            },
            |(mut manager, cells)| {
                for (i, cell) in cells.iter().enumerate() {
                    cell.borrow_mut().estimate = i as i64 + 1000;
                }
                manager.commit("bench").unwrap();
                (manager, cells)
            },
            BatchSize::SmallInput,
        );
    });
}

fn revert_remake_bench(c: &mut Criterion) {
    c.bench_function("revert_remake_cycle_depth_50", |b| {
        b.iter_batched(
            || {
                let mut manager = HistoryManager::new(HistoryConfig::unlimited());
                let (cell, handle) = tracked(Story::new("bench", -1));
                manager.add(handle);
                for i in 0..50 {
                    cell.borrow_mut().estimate = i;
                    manager.commit("step").unwrap();
                }
                (manager, cell)
            },
            |(mut manager, cell)| {
                manager.revert_to(0).unwrap();
                manager.remake_to(49).unwrap();
                (manager, cell)
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, commit_bench, revert_remake_bench);
criterion_main!(benches);
