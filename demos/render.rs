// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! The `render` example compiles a two-voice groove and writes it to a
//! Standard MIDI File.

use clap::Parser;
use std::{fs::File, io::BufWriter, path::PathBuf};
use tactus::{prelude::*, rhythm::Rng};

#[derive(Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Where to write the .mid file
    output: PathBuf,

    /// JSON compile settings (ticks-per-beat, default-velocity, default-channel)
    #[clap(short = 's', long, value_parser)]
    settings: Option<PathBuf>,

    /// Write one track per voice instead of a single merged track
    #[clap(short = 'm', long, value_parser)]
    multitrack: bool,

    /// Seed for the hi-hat pattern
    #[clap(long, value_parser, default_value_t = 1)]
    seed: u128,
}

fn bass_line() -> anyhow::Result<Part> {
    let mut measure = Measure::new_with_subdivisions(&[1, 1, 2, 1])?;
    measure.beats_mut()[0].set_state(&[1])?;
    measure.beats_mut()[2].set_state(&[1, 1])?;
    measure.beats_mut()[3].set_state(&[0])?;
    measure.sustain_beats(&[1]);

    let mut part = Part::default();
    part.append_measure(measure.clone()).append_measure(measure);
    Ok(part)
}

fn hi_hats(seed: u128) -> anyhow::Result<Part> {
    let mut rng = Rng::new_with_seed(seed);
    let mut part = Part::default();
    for _ in 0..2 {
        let mut measure = Measure::new_with_subdivisions(&[4, 4, 3, 4])?;
        for beat in measure.beats_mut() {
            beat.activate_random(0.6, &mut rng);
        }
        part.append_measure(measure);
    }
    Ok(part)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => CompileSettings::load(path)?,
        None => CompileSettings::default(),
    };

    let bass = bass_line()?;
    let hats = hi_hats(args.seed)?;
    let bass_melody = Melody::new_with(
        ["C1", "G1", "Bb1", "C2", "G1", "Bb1"]
            .iter()
            .map(|n| n.parse())
            .collect::<Result<Vec<Pitch>, _>>()?,
        settings.default_velocity(),
    )?;
    log::info!(
        "bass has {} attacks, hi-hats have {}",
        bass.n_note_on(),
        hats.n_note_on()
    );

    let compiler = TrackCompilerBuilder::default()
        .part(bass)
        .part(hats)
        .melody(bass_melody)
        .melody(Pitch::new_raw(42)?)
        .channels(vec![MidiChannel::new(0), MidiChannel::new(9)])
        .settings(settings)
        .build()?;

    let writer = BufWriter::new(File::create(&args.output)?);
    if args.multitrack {
        compiler.write_multitrack_smf(writer)?;
    } else {
        compiler.write_smf(writer)?;
    }
    eprintln!("Wrote {}", args.output.display());
    Ok(())
}
