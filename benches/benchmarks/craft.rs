use std::hint::black_box;

use criterion::{criterion_group, Criterion};

use segcraft::prelude::*;

// ---------------------------------------------------------------------------------------------

fn create_library() -> ContentLibrary {
    ContentLibrary::from_json(include_str!("../../demos/library.json")).unwrap()
}

fn create_chain(store: &mut MemorySegmentStore) -> ChainId {
    let mut chain = Chain::new(AccountId::from(1), "Bench").with_times(0, None);
    chain.set_state(ChainState::Ready).unwrap();
    chain.set_state(ChainState::Fabricate).unwrap();
    let chain_id = chain.id;
    store.put_chain(chain).unwrap();
    chain_id
}

// ---------------------------------------------------------------------------------------------

pub fn load(c: &mut Criterion) {
    let mut group = c.benchmark_group("Craft");
    group.bench_function("Load Library", |b| b.iter(|| black_box(create_library())));
    group.finish();
}

pub fn fabricate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Craft");
    let library = create_library();
    let reports = NullReportSink;
    group.bench_function("Fabricate 16 Segments", |b| {
        b.iter(|| {
            let mut store = MemorySegmentStore::new();
            let chain_id = create_chain(&mut store);
            let config = CraftConfig::default().with_seed(0x1234);
            let mut fabricator = Fabricator::new(&library, config, &reports);
            for _ in 0..16 {
                let segment_id = fabricator
                    .plan_next_segment(&mut store, chain_id)
                    .unwrap()
                    .unwrap();
                black_box(fabricator.fabricate(&mut store, segment_id).unwrap());
            }
        })
    });
    group.finish();
}

// ---------------------------------------------------------------------------------------------

criterion_group! {
    name = craft;
    config = Criterion::default();
    targets = load, fabricate
}
