//! Benchmarks for the hit path and the eviction path.

use clockpool::storage::{MemFile, PageFile};
use clockpool::{BufferManager, PageId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FRAMES: usize = 64;

fn setup(pages: u32) -> (BufferManager, clockpool::FileId) {
    let mut mem = MemFile::new();
    for _ in 0..pages {
        mem.allocate_page().unwrap();
    }
    let mut bm = BufferManager::new(FRAMES);
    let f = bm.register_file(mem);
    (bm, f)
}

fn bench_hits(c: &mut Criterion) {
    let (mut bm, f) = setup(FRAMES as u32);
    for p in 0..FRAMES as u32 {
        bm.fetch_page(f, PageId::new(p)).unwrap();
        bm.release_page(f, PageId::new(p), false).unwrap();
    }

    let mut next = 0u32;
    c.bench_function("fetch_release_hit", |b| {
        b.iter(|| {
            let pid = PageId::new(next % FRAMES as u32);
            next = next.wrapping_add(1);
            black_box(bm.fetch_page(f, pid).unwrap().as_slice()[0]);
            bm.release_page(f, pid, false).unwrap();
        })
    });
}

fn bench_evictions(c: &mut Criterion) {
    // Cyclic scan over 4x the pool: every fetch misses and evicts
    let pages = FRAMES as u32 * 4;
    let (mut bm, f) = setup(pages);

    let mut next = 0u32;
    c.bench_function("fetch_release_evict", |b| {
        b.iter(|| {
            let pid = PageId::new(next % pages);
            next = next.wrapping_add(1);
            bm.fetch_page(f, pid).unwrap().as_mut_slice()[0] = 1;
            bm.release_page(f, pid, true).unwrap();
        })
    });
}

criterion_group!(benches, bench_hits, bench_evictions);
criterion_main!(benches);
