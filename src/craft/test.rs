use pretty_assertions::assert_eq;

use crate::{
    config::CraftConfig,
    craft::{CraftKind, ATONAL},
    fabricator::Fabricator,
    key::Key,
    model::{
        AccountId, Chain, ChainId, ChainState, ContentRef, ContentState, Instrument,
        InstrumentAudio, InstrumentAudioId, InstrumentId, InstrumentType, Program, ProgramId,
        ProgramSequence,
        ProgramSequenceBinding, ProgramSequenceBindingId, ProgramSequenceChord,
        ProgramSequenceChordId, ProgramSequenceId, ProgramSequencePattern,
        ProgramSequencePatternEvent, ProgramSequencePatternEventId, ProgramSequencePatternId,
        ProgramType, ProgramVoice, ProgramVoiceId, SegmentChoice, SegmentChoiceArrangement,
        SegmentId, SegmentState, SegmentType,
    },
    report::MemoryReportSink,
    source::ContentLibrary,
    store::{MemorySegmentStore, SegmentStore},
};

// -------------------------------------------------------------------------------------------------

const MACRO: u64 = 1;
const MAIN: u64 = 2;
const RHYTHM: u64 = 3;
const OTHER_MAIN: u64 = 4;
const DETAIL: u64 = 5;

fn program(id: u64, program_type: ProgramType, key: &str) -> Program {
    Program {
        id: ProgramId::from(id),
        name: format!("{} {}", program_type, id),
        program_type,
        state: ContentState::Published,
        key: key.to_string(),
        tempo: 120.0,
        density: 0.5,
    }
}

fn sequence(id: u64, program_id: u64, key: &str, density: f64) -> ProgramSequence {
    ProgramSequence {
        id: ProgramSequenceId::from(id),
        program_id: ProgramId::from(program_id),
        name: format!("Sequence {}", id),
        key: key.to_string(),
        total: 16,
        density,
    }
}

fn bind(library: &mut ContentLibrary, id: u64, program_id: u64, sequence_id: u64, offset: u32) {
    library.add_binding(ProgramSequenceBinding {
        id: ProgramSequenceBindingId::from(id),
        program_id: ProgramId::from(program_id),
        program_sequence_id: ProgramSequenceId::from(sequence_id),
        offset,
    });
}

fn event(
    id: u64,
    pattern_id: u64,
    name: &str,
    position: f64,
    tones: &str,
) -> ProgramSequencePatternEvent {
    ProgramSequencePatternEvent {
        id: ProgramSequencePatternEventId::from(id),
        program_sequence_pattern_id: ProgramSequencePatternId::from(pattern_id),
        name: name.to_string(),
        position,
        duration: 0.5,
        velocity: 1.0,
        tones: tones.to_string(),
    }
}

fn audio(id: u64, instrument_id: u64, event: &str, tones: &str) -> InstrumentAudio {
    InstrumentAudio {
        id: InstrumentAudioId::from(id),
        instrument_id: InstrumentId::from(instrument_id),
        name: format!("{} {}", event, id),
        event: event.to_string(),
        tones: tones.to_string(),
        volume: 1.0,
    }
}

/// A drum kit with a kick and a snare audio with the given tones.
fn add_drum_kit(library: &mut ContentLibrary, id: u64, name: &str, tones: [&str; 2]) {
    library.add_instrument(Instrument {
        id: InstrumentId::from(id),
        name: name.to_string(),
        instrument_type: InstrumentType::Percussion,
        state: ContentState::Published,
        volume: 0.8,
    });
    library.add_audio(audio(id * 10, id, "KICK", tones[0]));
    library.add_audio(audio(id * 10 + 1, id, "SNARE", tones[1]));
}

/// A library with a macro program, a main program with one bass voice bound at the given
/// number of offsets, and a rhythm program with a drum voice playing a 4 beat pattern.
fn library_with(main_bindings: u32, drums: bool) -> ContentLibrary {
    let mut library = ContentLibrary::new();

    library.add_program(program(MACRO, ProgramType::Macro, "C"));
    library.add_sequence(sequence(10, MACRO, "C", 0.4));
    bind(&mut library, 100, MACRO, 10, 0);
    bind(&mut library, 101, MACRO, 10, 1);
    library.add_meme(ContentRef::Program(ProgramId::from(MACRO)), "Bright");

    library.add_program(program(MAIN, ProgramType::Main, "C"));
    library.add_sequence(sequence(20, MAIN, "C", 0.6));
    for offset in 0..main_bindings {
        bind(&mut library, 200 + offset as u64, MAIN, 20, offset);
    }
    library.add_meme(ContentRef::Program(ProgramId::from(MAIN)), "Deep");
    for (id, position, name) in [(1, 0.0, "C"), (2, 8.0, "G")] {
        library.add_chord(ProgramSequenceChord {
            id: ProgramSequenceChordId::from(id),
            program_sequence_id: ProgramSequenceId::from(20),
            position,
            name: name.to_string(),
        });
    }
    library.add_voice(ProgramVoice {
        id: ProgramVoiceId::from(20),
        program_id: ProgramId::from(MAIN),
        name: "Bass".to_string(),
        instrument_type: InstrumentType::Bass,
    });
    library.add_pattern(ProgramSequencePattern {
        id: ProgramSequencePatternId::from(20),
        program_id: ProgramId::from(MAIN),
        program_sequence_id: ProgramSequenceId::from(20),
        program_voice_id: ProgramVoiceId::from(20),
        name: "Root".to_string(),
        total: 16,
    });
    library.add_event(event(200, 20, "BASS", 0.0, "C"));
    library.add_instrument(Instrument {
        id: InstrumentId::from(20),
        name: "Sub".to_string(),
        instrument_type: InstrumentType::Bass,
        state: ContentState::Published,
        volume: 1.0,
    });
    library.add_audio(audio(200, 20, "BASS", "C2"));

    library.add_program(program(RHYTHM, ProgramType::Rhythm, ""));
    library.add_sequence(sequence(30, RHYTHM, "", 0.5));
    library.add_voice(ProgramVoice {
        id: ProgramVoiceId::from(30),
        program_id: ProgramId::from(RHYTHM),
        name: "Drums".to_string(),
        instrument_type: InstrumentType::Percussion,
    });
    library.add_pattern(ProgramSequencePattern {
        id: ProgramSequencePatternId::from(30),
        program_id: ProgramId::from(RHYTHM),
        program_sequence_id: ProgramSequenceId::from(30),
        program_voice_id: ProgramVoiceId::from(30),
        name: "Four".to_string(),
        total: 4,
    });
    for (index, name) in ["KICK", "SNARE", "KICK", "SNARE"].iter().enumerate() {
        library.add_event(event(300 + index as u64, 30, name, index as f64, ATONAL));
    }
    if drums {
        add_drum_kit(&mut library, 1, "Kit", [ATONAL, ATONAL]);
    }
    library
}

/// Add a detail program in D with a lead voice, and a stab instrument which plays from C3 to C4.
fn add_detail(library: &mut ContentLibrary, events: &[(f64, &str)]) {
    library.add_program(program(DETAIL, ProgramType::Detail, "D"));
    library.add_sequence(sequence(50, DETAIL, "", 0.5));
    library.add_voice(ProgramVoice {
        id: ProgramVoiceId::from(50),
        program_id: ProgramId::from(DETAIL),
        name: "Lead".to_string(),
        instrument_type: InstrumentType::Stab,
    });
    library.add_pattern(ProgramSequencePattern {
        id: ProgramSequencePatternId::from(50),
        program_id: ProgramId::from(DETAIL),
        program_sequence_id: ProgramSequenceId::from(50),
        program_voice_id: ProgramVoiceId::from(50),
        name: "Lead".to_string(),
        total: 16,
    });
    for (index, (position, tones)) in events.iter().enumerate() {
        library.add_event(event(500 + index as u64, 50, "LEAD", *position, tones));
    }
    library.add_instrument(Instrument {
        id: InstrumentId::from(50),
        name: "Stab".to_string(),
        instrument_type: InstrumentType::Stab,
        state: ContentState::Published,
        volume: 1.0,
    });
    library.add_audio(audio(500, 50, "LEAD", "C3"));
    library.add_audio(audio(501, 50, "LEAD", "C4"));
}

fn library() -> ContentLibrary {
    library_with(8, true)
}

fn fabricating_chain(store: &mut MemorySegmentStore) -> ChainId {
    let mut chain = Chain::new(AccountId::from(1), "Test").with_times(0, None);
    chain.set_state(ChainState::Ready).unwrap();
    chain.set_state(ChainState::Fabricate).unwrap();
    let id = chain.id;
    store.put_chain(chain).unwrap();
    id
}

fn fabricate(
    library: &ContentLibrary,
    store: &mut MemorySegmentStore,
    chain_id: ChainId,
    config: CraftConfig,
    reports: &MemoryReportSink,
    count: usize,
) -> Vec<SegmentId> {
    let mut fabricator = Fabricator::new(library, config, reports);
    let mut segments = Vec::new();
    for _ in 0..count {
        let segment_id = fabricator
            .plan_next_segment(store, chain_id)
            .unwrap()
            .unwrap();
        let state = fabricator.fabricate(store, segment_id).unwrap();
        assert_eq!(state, SegmentState::Crafted);
        segments.push(segment_id);
    }
    segments
}

fn choice_of(
    store: &MemorySegmentStore,
    segment_id: SegmentId,
    program_type: ProgramType,
) -> Option<SegmentChoice> {
    store
        .choices_of(segment_id)
        .into_iter()
        .find(|choice| choice.program_type == program_type)
}

fn arrangement_of(store: &MemorySegmentStore, choice: &SegmentChoice) -> SegmentChoiceArrangement {
    let arrangements = store.arrangements_of(choice.id);
    assert_eq!(arrangements.len(), 1);
    arrangements[0].clone()
}

// -------------------------------------------------------------------------------------------------

#[test]
fn initial_segment() {
    let library = library();
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(1);
    let segments = fabricate(&library, &mut store, chain_id, config, &reports, 1);

    let segment = store.segment(segments[0]).unwrap();
    assert_eq!(segment.segment_type, SegmentType::Initial);
    assert_eq!(segment.key, Key::try_from("C").ok());
    assert_eq!(segment.total, 16);
    assert_eq!(segment.tempo, 120.0);
    assert_eq!(segment.end_at, Some(8_000_000));
    assert!((segment.density - 0.5).abs() < 1e-9);
    assert_eq!(segment.storage_key, format!("chain-{}-0", chain_id));

    let memes = store
        .memes_of(segment.id)
        .into_iter()
        .map(|meme| meme.name)
        .collect::<Vec<_>>();
    assert_eq!(memes, vec!["Bright", "Deep"]);
    let chords = store
        .chords_of(segment.id)
        .into_iter()
        .map(|chord| (chord.position, chord.name))
        .collect::<Vec<_>>();
    assert_eq!(chords, vec![(0.0, "C".to_string()), (8.0, "G".to_string())]);

    // macro, main and rhythm got chosen. there are no detail programs
    assert_eq!(store.choices_of(segment.id).len(), 3);
    assert!(choice_of(&store, segment.id, ProgramType::Detail).is_none());
    let main = choice_of(&store, segment.id, ProgramType::Main).unwrap();
    assert_eq!(main.delta_in, Some(0));
    assert_eq!(main.transpose, 0);
    let missing = reports.reports_of("missing_content");
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["kind"], "Detail");
}

#[test]
fn pattern_repeats_fill_segment() {
    let library = library();
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(2);
    let segments = fabricate(&library, &mut store, chain_id, config, &reports, 1);

    let rhythm = choice_of(&store, segments[0], ProgramType::Rhythm).unwrap();
    let arrangement = arrangement_of(&store, &rhythm);
    let picks = store.picks_of(arrangement.id);
    assert_eq!(picks.len(), 16);
    for (index, pick) in picks.iter().enumerate() {
        assert!((pick.start - index as f64 * 0.5).abs() < 1e-9);
        assert!((pick.length - 0.25).abs() < 1e-9);
        assert!((pick.amplitude - 0.8).abs() < 1e-9);
        assert_eq!(pick.tones, ATONAL);
        assert_eq!(pick.pitch, 0.0);
        // events play the audio with the matching event name
        let expected = if index % 2 == 0 { 10 } else { 11 };
        assert_eq!(pick.instrument_audio_id, InstrumentAudioId::from(expected));
    }

    let main = choice_of(&store, segments[0], ProgramType::Main).unwrap();
    let bass = arrangement_of(&store, &main);
    let picks = store.picks_of(bass.id);
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].tones, "C2");
    assert!(picks[0].pitch > 65.0 && picks[0].pitch < 66.0);
}

#[test]
fn continue_keeps_programs_and_instruments() {
    let library = library();
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(3).without_entropy();
    let segments = fabricate(&library, &mut store, chain_id, config.clone(), &reports, 3);
    let previous_rhythm = choice_of(&store, segments[2], ProgramType::Rhythm).unwrap();
    let previous_kit = arrangement_of(&store, &previous_rhythm).instrument_id;
    assert_eq!(previous_kit, InstrumentId::from(1));

    // a new kit which matches the segment's memes better than the one which played before
    let mut richer = library.clone();
    add_drum_kit(&mut richer, 2, "Bright Kit", [ATONAL, ATONAL]);
    richer.add_meme(ContentRef::Instrument(InstrumentId::from(2)), "Bright");

    let next = fabricate(&richer, &mut store, chain_id, config.clone(), &reports, 1)[0];
    let segment = store.segment(next).unwrap();
    assert_eq!(segment.offset, 3);
    assert_eq!(segment.segment_type, SegmentType::Continue);

    let main = choice_of(&store, next, ProgramType::Main).unwrap();
    assert_eq!(main.program_id, ProgramId::from(MAIN));
    assert_eq!(main.delta_in, None);
    let rhythm = choice_of(&store, next, ProgramType::Rhythm).unwrap();
    assert_eq!(rhythm.program_id, previous_rhythm.program_id);
    assert_eq!(rhythm.program_sequence_id, previous_rhythm.program_sequence_id);
    assert_eq!(rhythm.delta_in, None);
    assert_eq!(arrangement_of(&store, &rhythm).instrument_id, previous_kit);

    // without a previous segment, the better matching kit wins
    let mut other_store = MemorySegmentStore::new();
    let other_chain_id = fabricating_chain(&mut other_store);
    let fresh = fabricate(&richer, &mut other_store, other_chain_id, config, &reports, 1)[0];
    let rhythm = choice_of(&other_store, fresh, ProgramType::Rhythm).unwrap();
    assert_eq!(
        arrangement_of(&other_store, &rhythm).instrument_id,
        InstrumentId::from(2)
    );
}

#[test]
fn next_main_pivots() {
    let mut library = library_with(2, true);
    library.add_program(program(OTHER_MAIN, ProgramType::Main, "D"));
    library.add_sequence(sequence(40, OTHER_MAIN, "D", 0.6));
    bind(&mut library, 400, OTHER_MAIN, 40, 0);

    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(4).without_entropy();
    let segments = fabricate(&library, &mut store, chain_id, config, &reports, 3);

    let types = segments
        .iter()
        .map(|id| store.segment(*id).unwrap().segment_type)
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            SegmentType::Initial,
            SegmentType::Continue,
            SegmentType::NextMain
        ]
    );

    let first_main = choice_of(&store, segments[0], ProgramType::Main).unwrap();
    assert_eq!(first_main.program_id, ProgramId::from(MAIN));
    let pivot_main = choice_of(&store, segments[2], ProgramType::Main).unwrap();
    assert_eq!(pivot_main.program_id, ProgramId::from(OTHER_MAIN));
    assert_eq!(pivot_main.delta_in, Some(0));
    // the D main sequence is moved into the macro's key
    let segment = store.segment(segments[2]).unwrap();
    assert_eq!(segment.key, Key::try_from("C").ok());
    let pivot_macro = choice_of(&store, segments[2], ProgramType::Macro).unwrap();
    assert_eq!(
        pivot_macro.program_sequence_binding_id,
        Some(ProgramSequenceBindingId::from(101))
    );
}

#[test]
fn missing_optional_instruments() {
    let library = library_with(8, false);
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(5);
    let segments = fabricate(&library, &mut store, chain_id, config, &reports, 1);

    let rhythm = choice_of(&store, segments[0], ProgramType::Rhythm).unwrap();
    assert!(store.arrangements_of(rhythm.id).is_empty());
    let missing = reports.reports_of("missing_content");
    assert!(missing
        .iter()
        .any(|report| report["kind"] == "Rhythm" && report["voice"] == "Drums"));
}

#[test]
fn missing_mandatory_instruments() {
    let library = library_with(8, false);
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let mut config = CraftConfig::default().with_seed(6);
    config.mandatory.push(CraftKind::Rhythm);

    let mut fabricator = Fabricator::new(&library, config, &reports);
    let segment_id = fabricator
        .plan_next_segment(&mut store, chain_id)
        .unwrap()
        .unwrap();
    let state = fabricator.fabricate(&mut store, segment_id).unwrap();
    assert_eq!(state, SegmentState::Failed);
    assert_eq!(store.segment(segment_id).unwrap().state(), SegmentState::Failed);
    // nothing of a failed craft gets committed
    assert!(store.choices_of(segment_id).is_empty());
    assert!(store.memes_of(segment_id).is_empty());
    assert_eq!(reports.reports_of("segment_failed").len(), 1);
}

#[test]
fn concurrent_chains() {
    let library = library();
    let reports = MemoryReportSink::new();
    let results = std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|seed| {
                let library = &library;
                let reports = &reports;
                scope.spawn(move || {
                    let mut store = MemorySegmentStore::new();
                    let chain_id = fabricating_chain(&mut store);
                    let config = CraftConfig::default().with_seed(seed);
                    let segments = fabricate(library, &mut store, chain_id, config, reports, 3);
                    segments
                        .iter()
                        .map(|id| store.picks_of_segment(*id).len())
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });
    for picks in results {
        // 16 drum hits and one bass note per segment
        assert_eq!(picks, vec![17, 17, 17]);
    }
}

#[test]
fn percussive_audio_follows_chords() {
    let mut library = library_with(8, false);
    add_drum_kit(&mut library, 1, "Tuned Kit", ["D2", "F2"]);
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(7);
    let segments = fabricate(&library, &mut store, chain_id, config, &reports, 1);

    let rhythm = choice_of(&store, segments[0], ProgramType::Rhythm).unwrap();
    let picks = store.picks_of(arrangement_of(&store, &rhythm).id);
    let tones = picks
        .iter()
        .map(|pick| pick.tones.as_str())
        .collect::<Vec<_>>();
    // C chord up to beat 8: D2 moves down to C2, F2 down to E2.
    // G chord from beat 8 on: D2 is a chord tone, F2 moves up to G2.
    let mut expected = Vec::new();
    for beat in 0..16 {
        expected.push(match (beat < 8, beat % 2 == 0) {
            (true, true) => "C2",
            (true, false) => "E2",
            (false, true) => "D2",
            (false, false) => "G2",
        });
    }
    assert_eq!(tones, expected);
    assert!(picks.iter().all(|pick| pick.pitch > 0.0));
}

#[test]
fn pitched_events_transpose_conform_and_fit_range() {
    let mut library = library();
    // G#5 becomes F#5 in C, which moves up to G5 on the C chord and into range as G3.
    // C#5 becomes B4 in C, a tone of the G chord, and moves into range as B3.
    add_detail(&mut library, &[(0.0, "G#5"), (8.0, "C#5")]);
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(8);
    let segments = fabricate(&library, &mut store, chain_id, config, &reports, 1);

    let detail = choice_of(&store, segments[0], ProgramType::Detail).unwrap();
    assert_eq!(detail.program_id, ProgramId::from(DETAIL));
    assert_eq!(detail.transpose, -2);
    let picks = store.picks_of(arrangement_of(&store, &detail).id);
    let tones = picks
        .iter()
        .map(|pick| (pick.start, pick.tones.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(tones, vec![(0.0, "G3"), (4.0, "B3")]);
    assert!(reports.reports_of("missing_content").is_empty());
}

#[test]
fn pivot_keeps_previous_rhythm_program_and_kit() {
    // the main program is bound at offset 0 only, so the second segment pivots
    let library = library_with(1, true);
    let mut store = MemorySegmentStore::new();
    let chain_id = fabricating_chain(&mut store);
    let reports = MemoryReportSink::new();
    let config = CraftConfig::default().with_seed(9).without_entropy();
    let first = fabricate(&library, &mut store, chain_id, config.clone(), &reports, 1)[0];
    let previous_rhythm = choice_of(&store, first, ProgramType::Rhythm).unwrap();
    assert_eq!(previous_rhythm.program_id, ProgramId::from(RHYTHM));

    // a rhythm program and a kit which match the segment's memes better
    let mut richer = library.clone();
    richer.add_program(program(99, ProgramType::Rhythm, ""));
    richer.add_sequence(sequence(90, 99, "", 0.5));
    richer.add_meme(ContentRef::Program(ProgramId::from(99)), "Bright");
    add_drum_kit(&mut richer, 2, "Bright Kit", [ATONAL, ATONAL]);
    richer.add_meme(ContentRef::Instrument(InstrumentId::from(2)), "Bright");

    let pivot = fabricate(&richer, &mut store, chain_id, config.clone(), &reports, 1)[0];
    let segment = store.segment(pivot).unwrap();
    assert_eq!(segment.segment_type, SegmentType::NextMain);
    let rhythm = choice_of(&store, pivot, ProgramType::Rhythm).unwrap();
    assert_eq!(rhythm.program_id, ProgramId::from(RHYTHM));
    assert_eq!(
        arrangement_of(&store, &rhythm).instrument_id,
        InstrumentId::from(1)
    );

    // without a previous segment, the better matching program wins
    let mut other_store = MemorySegmentStore::new();
    let other_chain_id = fabricating_chain(&mut other_store);
    let fresh = fabricate(&richer, &mut other_store, other_chain_id, config, &reports, 1)[0];
    let rhythm = choice_of(&other_store, fresh, ProgramType::Rhythm).unwrap();
    assert_eq!(rhythm.program_id, ProgramId::from(99));
}
