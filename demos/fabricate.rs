use anyhow::Context;
use simplelog::*;

use segcraft::prelude::*;

// -------------------------------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // init logging
    TermLogger::init(
        LevelFilter::Info,
        ConfigBuilder::default().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap_or_else(|err| {
        log::error!("init_logger error: {:?}", err);
    });

    // usage: fabricate [SEGMENT_COUNT] [SEED]
    let mut args = std::env::args().skip(1);
    let segment_count = args
        .next()
        .map(|arg| arg.parse::<usize>())
        .transpose()
        .context("Invalid segment count")?
        .unwrap_or(8);
    let seed = args
        .next()
        .map(|arg| arg.parse::<u64>())
        .transpose()
        .context("Invalid seed")?;

    // load content
    let library = ContentLibrary::from_json(include_str!("library.json"))?;
    let mut config = CraftConfig::default();
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    // create a fabricating chain
    let mut store = MemorySegmentStore::new();
    let mut chain = Chain::new(AccountId::from(1), "Demo").with_times(0, None);
    chain.set_state(ChainState::Ready)?;
    chain.set_state(ChainState::Fabricate)?;
    let chain_id = chain.id;
    store.put_chain(chain)?;

    // fabricate and dump segments
    let reports = MemoryReportSink::new();
    let mut fabricator = Fabricator::new(&library, config, &reports);
    for _ in 0..segment_count {
        let Some(segment_id) = fabricator.plan_next_segment(&mut store, chain_id)? else {
            break;
        };
        if fabricator.fabricate(&mut store, segment_id)? != SegmentState::Crafted {
            break;
        }
        let segment = store
            .segment(segment_id)
            .context("Crafted segment vanished")?;
        let memes = store
            .memes_of(segment_id)
            .into_iter()
            .map(|meme| meme.name)
            .collect::<Vec<_>>();
        println!(
            "#{} {} key: {} tempo: {} beats: {} density: {:.2} memes: [{}]",
            segment.offset,
            segment.segment_type,
            segment.key.map_or_else(|| "-".to_string(), |key| key.to_string()),
            segment.tempo,
            segment.total,
            segment.density,
            memes.join(", ")
        );
        for choice in store.choices_of(segment_id) {
            let program = library
                .program(choice.program_id)
                .map_or("?", |program| program.name.as_str());
            println!("  {:<6} {} transpose: {}", choice.program_type, program, choice.transpose);
            for arrangement in store.arrangements_of(choice.id) {
                let instrument = library
                    .instrument(arrangement.instrument_id)
                    .map_or("?", |instrument| instrument.name.as_str());
                let picks = store.picks_of(arrangement.id);
                println!("    {} -> {} picks", instrument, picks.len());
                for pick in picks.iter().take(4) {
                    println!(
                        "      {:>6.3}s {:<6} {:<4} amp: {:.2}",
                        pick.start, pick.event, pick.tones, pick.amplitude
                    );
                }
            }
        }
    }

    for (key, data) in reports.reports() {
        println!("report {}: {}", key, data);
    }
    Ok(())
}
