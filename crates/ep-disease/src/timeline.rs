//! `DiseaseTimeline` — the fixed list of state changes one exposure causes.
//!
//! Built once per exposure from three draws (contagious onset, symptom onset,
//! contagious period, in that order) and then consumed front to back.  The
//! steps live in a fixed array so a timeline is `Copy` and never allocates;
//! one exists for every currently infected agent.

use ep_core::{PlaceRng, Tick};

use crate::{Disease, DiseaseState};

const MAX_STEPS: usize = 3;

/// One scheduled state change.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ProgressStep {
    pub at:    Tick,
    pub state: DiseaseState,
}

impl ProgressStep {
    const fn new(at: Tick, state: DiseaseState) -> Self {
        Self { at, state }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct DiseaseTimeline {
    exposed_at:    Tick,
    contagious_at: Tick,
    recovered_at:  Tick,
    steps:         [ProgressStep; MAX_STEPS],
    len:           u8,
    cursor:        u8,
}

impl DiseaseTimeline {
    /// Draw the course of an infection that began at `exposed_at`.
    pub fn draw(exposed_at: Tick, disease: &dyn Disease, rng: &mut PlaceRng) -> Self {
        let contagious_at = disease.time_contagious(exposed_at, rng.uniform());
        let symptomatic_at = disease.time_symptomatic(exposed_at, rng.uniform());
        let period = disease.contagious_period(rng.uniform());
        Self::from_times(exposed_at, contagious_at, symptomatic_at, contagious_at + period)
    }

    /// Build the step list from already-drawn times.
    ///
    /// # Panics
    /// Panics if contagiousness never starts or recovery precedes it.
    pub fn from_times(
        exposed_at:     Tick,
        contagious_at:  Tick,
        symptomatic_at: Tick,
        recovered_at:   Tick,
    ) -> Self {
        assert!(contagious_at.occurs(), "a disease must make its host contagious");
        assert!(recovered_at >= contagious_at, "recovery before contagiousness");

        let placeholder = ProgressStep::new(Tick::NEVER, DiseaseState::Recovered);
        let mut steps = [placeholder; MAX_STEPS];
        let len;
        if !symptomatic_at.occurs() {
            steps[0] = ProgressStep::new(contagious_at, DiseaseState::ContagiousAsymptomatic);
            steps[1] = ProgressStep::new(recovered_at, DiseaseState::Recovered);
            len = 2;
        } else if symptomatic_at < contagious_at {
            steps[0] = ProgressStep::new(symptomatic_at, DiseaseState::NoncontagiousSymptomatic);
            steps[1] = ProgressStep::new(contagious_at, DiseaseState::ContagiousSymptomatic);
            steps[2] = ProgressStep::new(recovered_at, DiseaseState::Recovered);
            len = 3;
        } else {
            steps[0] = ProgressStep::new(contagious_at, DiseaseState::ContagiousAsymptomatic);
            steps[1] = ProgressStep::new(symptomatic_at, DiseaseState::ContagiousSymptomatic);
            steps[2] = ProgressStep::new(recovered_at, DiseaseState::Recovered);
            len = 3;
        }

        Self {
            exposed_at,
            contagious_at,
            recovered_at,
            steps,
            len,
            cursor: 0,
        }
    }

    #[inline]
    pub fn exposed_at(&self) -> Tick {
        self.exposed_at
    }

    /// Start of contagiousness; contact streams are first drawn from here.
    #[inline]
    pub fn contagious_at(&self) -> Tick {
        self.contagious_at
    }

    #[inline]
    pub fn recovered_at(&self) -> Tick {
        self.recovered_at
    }

    /// Time of the next pending step, or `NEVER` once recovery was consumed.
    #[inline]
    pub fn next_time(&self) -> Tick {
        self.peek().map_or(Tick::NEVER, |s| s.at)
    }

    #[inline]
    pub fn peek(&self) -> Option<ProgressStep> {
        (self.cursor < self.len).then(|| self.steps[self.cursor as usize])
    }

    /// Consume the next step.
    ///
    /// # Panics
    /// Panics when the timeline is already exhausted.
    pub fn pop(&mut self) -> ProgressStep {
        let step = match self.peek() {
            Some(s) => s,
            None => panic!("disease timeline exhausted (exposed at {})", self.exposed_at),
        };
        self.cursor += 1;
        step
    }

    /// Remaining steps, in order.
    pub fn remaining(&self) -> &[ProgressStep] {
        &self.steps[self.cursor as usize..self.len as usize]
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.len
    }
}
