use std::hint::black_box;

use criterion::{criterion_group, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use segcraft::prelude::*;

// ---------------------------------------------------------------------------------------------

const MEMES: [&str; 6] = ["Dark", "Deep", "Tropical", "Cold", "Wet", "!Bright"];

pub fn isometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Selection");
    let isometry = Isometry::of_memes(MEMES);
    let candidates = [
        vec!["Darkness", "Cold"],
        vec!["Bright", "Happy"],
        vec!["Deeply", "Wetter", "Tropics"],
    ];
    group.bench_function("Meme Score", |b| {
        b.iter(|| {
            for memes in &candidates {
                black_box(isometry.score(memes));
                black_box(isometry.is_allowed(memes));
            }
        })
    });
    let event = Isometry::of_event("KICK_LONG");
    group.bench_function("Event Score", |b| {
        b.iter(|| {
            for name in ["KICK", "Kick Long", "SNARE", "HIHAT_OPEN"] {
                black_box(event.score_event(name));
            }
        })
    });
    group.finish();
}

pub fn marble_bag(c: &mut Criterion) {
    let mut group = c.benchmark_group("Selection");
    let mut bag = MarbleBag::new();
    for id in 0..64_u32 {
        bag.add(id % 3, id, id + 1);
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    group.bench_function("Marble Bag", |b| {
        b.iter(|| black_box(bag.pick(&mut rng).ok()))
    });
    group.finish();
}

pub fn conform(c: &mut Criterion) {
    let mut group = c.benchmark_group("Selection");
    let chords = ["C", "Am7", "F#m", "G7/B", "Ebmaj7"]
        .into_iter()
        .filter_map(|name| Chord::try_from(name).ok())
        .collect::<Vec<_>>();
    let notes = (36..84)
        .map(Note::from_midi)
        .collect::<Vec<_>>();
    group.bench_function("Chord Conform", |b| {
        b.iter(|| {
            for chord in &chords {
                for note in &notes {
                    black_box(chord.conform(note));
                }
            }
        })
    });
    group.finish();
}

// ---------------------------------------------------------------------------------------------

criterion_group! {
    name = selection;
    config = Criterion::default();
    targets = isometry, marble_bag, conform
}
