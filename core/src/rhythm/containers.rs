// Copyright (c) 2024 Mike Tsao. All rights reserved.

use super::state::{Activation, StateToken};
use crate::{
    error::{CompileError, Result},
    rng::Rng,
};
use serde::{Deserialize, Serialize};

/// An ordered run of time units that together last one beat. The number of
/// units is the beat's subdivision, fixed when the beat is made (or replaced
/// wholesale with [Beat::set_state()]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Beat {
    units: Vec<Activation>,
}
impl Default for Beat {
    fn default() -> Self {
        Self {
            units: vec![Activation::Release],
        }
    }
}
impl Beat {
    /// A silent beat of `subdivision` time units.
    pub fn new_with_subdivision(subdivision: usize) -> Result<Self> {
        Self::new_with_units(vec![Activation::Release; subdivision])
    }

    /// A beat holding exactly these time units.
    pub fn new_with_units(units: Vec<Activation>) -> Result<Self> {
        if units.is_empty() {
            return Err(CompileError::InvalidSubdivision { index: 0, value: 0 });
        }
        Ok(Self { units })
    }

    /// A beat built from raw state values, e.g. `[1, 2, 0, 1]`.
    pub fn new_with_states(states: &[i32]) -> Result<Self> {
        let units = states
            .iter()
            .enumerate()
            .map(|(i, &v)| Activation::from_state_value(v, i))
            .collect::<Result<Vec<_>>>()?;
        Self::new_with_units(units)
    }

    /// Replaces every time unit. The subdivision follows the new length.
    pub fn set_state(&mut self, states: &[i32]) -> Result<()> {
        *self = Self::new_with_states(states)?;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn subdivision(&self) -> usize {
        self.units.len()
    }

    #[allow(missing_docs)]
    pub fn units(&self) -> &[Activation] {
        &self.units
    }

    /// True if any unit attacks or sustains.
    pub fn is_active(&self) -> bool {
        self.units.iter().any(|&u| u != Activation::Release)
    }

    /// The number of attacks, which is how many pitches a melody needs to
    /// cover this beat.
    pub fn n_note_on(&self) -> usize {
        self.units
            .iter()
            .filter(|&&u| u == Activation::Attack)
            .count()
    }

    /// Turns every release into a sustain, so each attack rings until the
    /// next one.
    pub fn sustain_all(&mut self) {
        self.replace(Activation::Release, Activation::Sustain);
    }

    /// Turns every sustain into a release, so each attack lasts one unit.
    pub fn shorten_all(&mut self) {
        self.replace(Activation::Sustain, Activation::Release);
    }

    /// Rewrites the beat as attacks and releases, each unit attacking with
    /// probability `density`.
    pub fn activate_random(&mut self, density: f64, rng: &mut Rng) {
        self.units.iter_mut().for_each(|u| {
            *u = if rng.rand_float() < density {
                Activation::Attack
            } else {
                Activation::Release
            };
        });
    }

    /// This beat's slice of a state array: header, subdivision, units.
    pub fn tokens(&self) -> impl Iterator<Item = StateToken> + '_ {
        std::iter::once(StateToken::BeatHeader {
            subdivision: self.subdivision(),
        })
        .chain(self.units.iter().map(|&u| StateToken::Unit(u)))
    }

    /// `[-3, N, s_1..s_N]`
    pub fn state(&self) -> Vec<i32> {
        super::state::encode(&self.tokens().collect::<Vec<_>>())
    }

    fn replace(&mut self, from: Activation, to: Activation) {
        self.units
            .iter_mut()
            .filter(|u| **u == from)
            .for_each(|u| *u = to);
    }
}

/// An ordered run of beats. Beats may have different subdivisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Measure {
    beats: Vec<Beat>,
}
impl Measure {
    #[allow(missing_docs)]
    pub fn new_with_beats(beats: Vec<Beat>) -> Self {
        Self { beats }
    }

    /// One silent beat per entry, each with the given subdivision.
    pub fn new_with_subdivisions(subdivisions: &[usize]) -> Result<Self> {
        Ok(Self {
            beats: subdivisions
                .iter()
                .map(|&s| Beat::new_with_subdivision(s))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    #[allow(missing_docs)]
    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    #[allow(missing_docs)]
    pub fn beats_mut(&mut self) -> &mut [Beat] {
        &mut self.beats
    }

    #[allow(missing_docs)]
    pub fn n_beats(&self) -> usize {
        self.beats.len()
    }

    #[allow(missing_docs)]
    pub fn n_note_on(&self) -> usize {
        self.beats.iter().map(Beat::n_note_on).sum()
    }

    #[allow(missing_docs)]
    pub fn sustain_all(&mut self) {
        self.beats.iter_mut().for_each(Beat::sustain_all);
    }

    /// Like [Measure::sustain_all()], but only for the beats at `indexes`.
    /// Out-of-range indexes are ignored.
    pub fn sustain_beats(&mut self, indexes: &[usize]) {
        for &i in indexes {
            if let Some(beat) = self.beats.get_mut(i) {
                beat.sustain_all();
            }
        }
    }

    #[allow(missing_docs)]
    pub fn shorten_all(&mut self) {
        self.beats.iter_mut().for_each(Beat::shorten_all);
    }

    /// A measure marker followed by each beat.
    pub fn tokens(&self) -> impl Iterator<Item = StateToken> + '_ {
        std::iter::once(StateToken::MeasureBoundary).chain(self.beats.iter().flat_map(Beat::tokens))
    }

    /// `[-2, beat, beat, ...]`
    pub fn state(&self) -> Vec<i32> {
        super::state::encode(&self.tokens().collect::<Vec<_>>())
    }
}

/// One voice's worth of measures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Part {
    measures: Vec<Measure>,
}
impl Part {
    #[allow(missing_docs)]
    pub fn new_with_measures(measures: Vec<Measure>) -> Self {
        Self { measures }
    }

    #[allow(missing_docs)]
    pub fn append_measure(&mut self, measure: Measure) -> &mut Self {
        self.measures.push(measure);
        self
    }

    #[allow(missing_docs)]
    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    #[allow(missing_docs)]
    pub fn measures_mut(&mut self) -> &mut [Measure] {
        &mut self.measures
    }

    #[allow(missing_docs)]
    pub fn n_measures(&self) -> usize {
        self.measures.len()
    }

    #[allow(missing_docs)]
    pub fn n_beats(&self) -> usize {
        self.measures.iter().map(Measure::n_beats).sum()
    }

    /// The number of pitches a melody must supply for this part.
    pub fn n_note_on(&self) -> usize {
        self.measures.iter().map(Measure::n_note_on).sum()
    }

    /// Part markers around every measure.
    pub fn tokens(&self) -> impl Iterator<Item = StateToken> + '_ {
        std::iter::once(StateToken::PartBoundary)
            .chain(self.measures.iter().flat_map(Measure::tokens))
            .chain(std::iter::once(StateToken::PartBoundary))
    }

    /// `[-1, measure, measure, ..., -1]`
    pub fn state(&self) -> Vec<i32> {
        super::state::encode(&self.tokens().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_state_encoding() {
        let b = Beat::new_with_states(&[1, 0, 1, 2]).unwrap();
        assert_eq!(b.subdivision(), 4);
        assert_eq!(b.state(), vec![-3, 4, 1, 0, 1, 2]);
        assert_eq!(b.n_note_on(), 2);
        assert!(b.is_active());
        assert!(!Beat::new_with_subdivision(3).unwrap().is_active());
    }

    #[test]
    fn beat_rejects_bad_input() {
        assert!(Beat::new_with_subdivision(0).is_err());
        assert_eq!(
            Beat::new_with_states(&[1, 4]),
            Err(CompileError::InvalidActivation { index: 1, value: 4 })
        );
    }

    #[test]
    fn beat_set_state_changes_subdivision() {
        let mut b = Beat::new_with_states(&[1, 2, 1, 2]).unwrap();
        b.set_state(&[0, 1, 2, 2, 1]).unwrap();
        assert_eq!(b.state(), vec![-3, 5, 0, 1, 2, 2, 1]);
        assert!(b.set_state(&[]).is_err());
        assert_eq!(b.subdivision(), 5, "failed set_state leaves the beat alone");
    }

    #[test]
    fn sustain_and_shorten() {
        let mut b = Beat::new_with_states(&[1, 0, 1, 0, 0, 0]).unwrap();
        b.sustain_all();
        assert_eq!(b.state(), vec![-3, 6, 1, 2, 1, 2, 2, 2]);

        let mut b = Beat::new_with_states(&[1, 2, 2, 1, 2, 2, 1, 0]).unwrap();
        b.shorten_all();
        assert_eq!(b.state(), vec![-3, 8, 1, 0, 0, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn measure_sustains_selected_beats() {
        let mut m = Measure::new_with_beats(vec![
            Beat::new_with_states(&[1, 0, 0, 1]).unwrap(),
            Beat::new_with_states(&[0, 1, 0, 1, 0, 0]).unwrap(),
        ]);
        m.sustain_beats(&[1, 7]);
        assert_eq!(
            m.state(),
            vec![-2, -3, 4, 1, 0, 0, 1, -3, 6, 2, 1, 2, 1, 2, 2]
        );
        m.sustain_all();
        assert_eq!(
            m.state(),
            vec![-2, -3, 4, 1, 2, 2, 1, -3, 6, 2, 1, 2, 1, 2, 2]
        );
    }

    #[test]
    fn activate_random_is_reproducible() {
        let mut a = Beat::new_with_subdivision(8).unwrap();
        let mut b = Beat::new_with_subdivision(8).unwrap();
        a.activate_random(0.9, &mut Rng::new_with_seed(1));
        b.activate_random(0.9, &mut Rng::new_with_seed(1));
        assert_eq!(a, b);
        assert!(a
            .units()
            .iter()
            .all(|&u| u == Activation::Attack || u == Activation::Release));

        a.activate_random(1.0, &mut Rng::new_with_seed(2));
        assert_eq!(a.n_note_on(), 8, "density 1.0 attacks everywhere");
        a.activate_random(0.0, &mut Rng::new_with_seed(2));
        assert_eq!(a.n_note_on(), 0, "density 0.0 attacks nowhere");
    }

    #[test]
    fn part_counts_and_state() {
        let m1 = Measure::new_with_beats(vec![
            Beat::new_with_states(&[1, 0, 0, 0]).unwrap(),
            Beat::new_with_states(&[1, 2, 2, 2]).unwrap(),
        ]);
        let m2 = Measure::new_with_subdivisions(&[3, 1]).unwrap();
        let mut p = Part::default();
        p.append_measure(m1).append_measure(m2);

        assert_eq!(p.n_measures(), 2);
        assert_eq!(p.n_beats(), 4);
        assert_eq!(p.n_note_on(), 2);
        assert_eq!(
            p.state(),
            vec![
                -1, -2, -3, 4, 1, 0, 0, 0, -3, 4, 1, 2, 2, 2, -2, -3, 3, 0, 0, 0, -3, 1, 0, -1
            ]
        );
    }
}
