use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vista::loader::{LoadQueue, Priority};
use vista::visibility::{Rect, VisibilityOptions, VisibilityTracker};

/// Enqueue a gallery, then drain it one admission tick at a time
fn benchmark_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");

    for size in [50usize, 500, 5000] {
        let ids: Vec<String> = (0..size).map(|i| format!("img{i}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &ids, |b, ids| {
            b.iter(|| {
                let mut queue = LoadQueue::new(4);
                for (index, id) in ids.iter().enumerate().rev() {
                    queue.enqueue(id, id, Priority::for_index(index));
                }
                while !queue.is_settled() {
                    for request in queue.admit() {
                        queue.complete(&request.id, true);
                    }
                }
                black_box(queue.stats())
            })
        });
    }

    group.finish();
}

/// One scroll frame over a long single-column grid
fn benchmark_visibility(c: &mut Criterion) {
    let viewport = Rect::new(0.0, 4000.0, 1280.0, 720.0);
    let cells: Vec<(String, Rect)> = (0..1000)
        .map(|i| (format!("img{i}"), Rect::new(0.0, i as f32 * 248.0, 240.0, 240.0)))
        .collect();

    c.bench_function("visibility_frame_1000", |b| {
        b.iter(|| {
            let mut tracker = VisibilityTracker::new(VisibilityOptions::default());
            for (id, _) in &cells {
                tracker.observe(id);
            }
            let hits = cells
                .iter()
                .filter(|(id, cell)| tracker.update(id, *cell, Some(viewport)))
                .count();
            black_box(hits)
        })
    });

    c.bench_function("priority_for_index", |b| {
        b.iter(|| (0..1000).map(|i| Priority::for_index(black_box(i)).value()).sum::<u32>())
    });
}

criterion_group!(benches, benchmark_admission, benchmark_visibility);
criterion_main!(benches);
