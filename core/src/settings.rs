// Copyright (c) 2024 Mike Tsao. All rights reserved.

//! Defaults that apply to a whole compile. Intended to be serialized.

use crate::{
    error::{CompileError, Result},
    midi::MidiChannel,
    time::TicksPerBeat,
};
use anyhow::Context;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contains persistent compile settings.
#[derive(Clone, Debug, Derivative, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct CompileSettings {
    ticks_per_beat: TicksPerBeat,
    #[derivative(Default(value = "64"))]
    default_velocity: u8,
    default_channel: MidiChannel,
}
impl CompileSettings {
    /// The resolution every voice is derived at.
    pub fn ticks_per_beat(&self) -> TicksPerBeat {
        self.ticks_per_beat
    }

    /// The velocity used when a melody doesn't name one.
    pub fn default_velocity(&self) -> u8 {
        self.default_velocity
    }

    /// The channel of the first voice when channels aren't assigned. Later
    /// voices count up from here.
    pub fn default_channel(&self) -> MidiChannel {
        self.default_channel
    }

    #[allow(missing_docs)]
    pub fn set_ticks_per_beat(&mut self, ticks_per_beat: TicksPerBeat) {
        self.ticks_per_beat = ticks_per_beat;
    }

    #[allow(missing_docs)]
    pub fn set_default_velocity(&mut self, velocity: u8) -> Result<()> {
        if velocity > 127 {
            return Err(CompileError::InvalidVelocity(velocity as u32));
        }
        self.default_velocity = velocity;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn set_default_channel(&mut self, channel: MidiChannel) -> Result<()> {
        self.default_channel = MidiChannel::try_new(channel.0 as u32)?;
        Ok(())
    }

    /// Checks values that arrived through deserialization, which bypasses
    /// the setters.
    pub fn validate(&self) -> Result<()> {
        if self.default_velocity > 127 {
            return Err(CompileError::InvalidVelocity(self.default_velocity as u32));
        }
        MidiChannel::try_new(self.default_channel.0 as u32)?;
        Ok(())
    }

    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Couldn't read {path:?}"))?;
        let settings: Self =
            serde_json::from_str(&json).with_context(|| format!("Couldn't parse {path:?}"))?;
        settings.validate()?;
        log::debug!("loaded compile settings from {path:?}");
        Ok(settings)
    }

    /// Writes settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|_| anyhow::format_err!("Unable to serialize settings JSON"))?;
        std::fs::write(path, json).with_context(|| format!("Unable to write {path:?}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = CompileSettings::default();
        assert_eq!(s.ticks_per_beat().value(), 480);
        assert_eq!(s.default_velocity(), 64);
        assert_eq!(s.default_channel(), MidiChannel(0));
    }

    #[test]
    fn json_uses_kebab_case_and_fills_gaps() {
        let s: CompileSettings = serde_json::from_str(r#"{"ticks-per-beat": 96}"#).unwrap();
        assert_eq!(s.ticks_per_beat().value(), 96);
        assert_eq!(s.default_velocity(), 64, "missing fields take defaults");

        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"default-velocity\":64"), "got {json}");

        assert!(
            serde_json::from_str::<CompileSettings>(r#"{"ticks-per-beat": 0}"#).is_err(),
            "zero ticks per beat should be refused while parsing"
        );
    }

    #[test]
    fn out_of_range_values_are_caught() {
        let s: CompileSettings = serde_json::from_str(r#"{"default-velocity": 200}"#).unwrap();
        assert_eq!(s.validate(), Err(CompileError::InvalidVelocity(200)));

        let mut s = CompileSettings::default();
        assert!(s.set_default_channel(MidiChannel(16)).is_err());
        assert!(s.set_default_velocity(127).is_ok());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "tactus-settings-{}.json",
            std::process::id()
        ));
        let mut s = CompileSettings::default();
        s.set_ticks_per_beat(TicksPerBeat::new(960).unwrap());
        s.save(&path).unwrap();
        let loaded = CompileSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, s);
    }
}
