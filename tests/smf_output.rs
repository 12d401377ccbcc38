// Copyright (c) 2024 Mike Tsao. All rights reserved.

use midly::{num::u15, Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tactus::{composition::TrackCompiler, prelude::*};

fn bass_and_melody() -> TrackCompiler {
    let mut bass = Measure::new_with_subdivisions(&[1, 1, 1, 1]).unwrap();
    bass.beats_mut()[0].set_state(&[1]).unwrap();
    bass.beats_mut()[2].set_state(&[1]).unwrap();
    bass.sustain_beats(&[1, 3]);

    let lead = Measure::new_with_beats(vec![
        Beat::new_with_states(&[1, 1]).unwrap(),
        Beat::new_with_states(&[1, 2]).unwrap(),
        Beat::new_with_states(&[0, 1]).unwrap(),
        Beat::new_with_states(&[1, 0]).unwrap(),
    ]);

    let mut settings: CompileSettings =
        serde_json::from_str(r#"{"ticks-per-beat": 96, "default-velocity": 100}"#).unwrap();
    settings.set_default_channel(MidiChannel::new(4)).unwrap();

    TrackCompilerBuilder::default()
        .part(Part::new_with_measures(vec![bass]))
        .part(Part::new_with_measures(vec![lead]))
        .melody("C1".parse::<Pitch>().unwrap())
        .melody(
            Melody::new_with(
                ["C3", "D3", "E3", "G3", "C4"]
                    .iter()
                    .map(|n| n.parse().unwrap())
                    .collect(),
                80,
            )
            .unwrap(),
        )
        .settings(settings)
        .build()
        .unwrap()
}

#[test]
fn multitrack_file_has_one_track_per_voice() {
    let compiler = bass_and_melody();
    assert_eq!(compiler.voice_count(), 2);

    let mut bytes = Vec::new();
    compiler.write_multitrack_smf(&mut bytes).unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.header.format, Format::Parallel);
    assert_eq!(smf.header.timing, Timing::Metrical(u15::new(96)));
    assert_eq!(smf.tracks.len(), 2);

    for (i, track) in smf.tracks.iter().enumerate() {
        let total: u32 = track.iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(total, 4 * 96, "track {i} should last one measure");
        assert_eq!(
            track.last().map(|e| e.kind),
            Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))
        );
    }

    let bass_keys: Vec<(u8, u8)> = smf.tracks[0]
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, .. },
            } => Some((channel.as_int(), key.as_int())),
            _ => None,
        })
        .collect();
    assert_eq!(bass_keys, vec![(4, 36), (4, 36)], "C1 is key 36, twice");
}

#[test]
fn merged_file_interleaves_voices() {
    let compiler = bass_and_melody();
    let messages = compiler.compile().unwrap();

    let lead_keys: Vec<u8> = messages
        .iter()
        .filter(|m| m.kind == WireKind::NoteOn && m.channel == MidiChannel::new(5))
        .map(|m| m.key.as_int())
        .collect();
    assert_eq!(lead_keys, vec![60, 62, 64, 67, 72]);
    assert!(messages
        .iter()
        .filter(|m| m.channel == MidiChannel::new(5) && m.kind == WireKind::NoteOn)
        .all(|m| m.velocity.as_int() == 80));
    assert!(messages
        .iter()
        .filter(|m| m.channel == MidiChannel::new(4) && m.kind == WireKind::NoteOn)
        .all(|m| m.velocity.as_int() == 100));

    let mut bytes = Vec::new();
    compiler.write_smf(&mut bytes).unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.header.format, Format::SingleTrack);
    assert_eq!(smf.tracks[0].len(), messages.len() + 1);
}
