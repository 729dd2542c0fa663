//! Behavior streams: stochastic generators of the gap until an agent's next
//! contact of one kind.
//!
//! Streams are stateless; the caller supplies the current time and the owning
//! place's RNG.  `ContactStream` is the closed set the engine dispatches over
//! without dynamic calls.

use ep_core::{ContactStreamsConfig, Duration, EpError, EpResult, PlaceRng, StreamSpec, TICKS_PER_DAY, Tick};

/// A generator of event times.
pub trait BehaviorStream {
    /// Time of the next event strictly after `now`.
    fn next_event(&self, now: Tick, rng: &mut PlaceRng) -> Tick;

    /// Mean number of events per simulated day.
    fn expected_per_day(&self) -> f64;
}

// ── PoissonStream ─────────────────────────────────────────────────────────────

/// Homogeneous Poisson process discretised onto the tick grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PoissonStream {
    prob_per_step: f64,
}

impl PoissonStream {
    /// # Errors
    /// Rejects non-positive rates and rates above one event per step.
    pub fn new(per_day: f64) -> EpResult<Self> {
        if !(per_day.is_finite() && per_day > 0.0) {
            return Err(EpError::config(format!(
                "a Poisson stream needs a positive rate, got {per_day} per day"
            )));
        }
        let prob_per_step = per_day / TICKS_PER_DAY as f64;
        if prob_per_step > 1.0 {
            return Err(EpError::config(format!(
                "{per_day} events per day needs more than one event per step"
            )));
        }
        Ok(Self { prob_per_step })
    }

    /// Geometric number of steps until the next event for draw `u` in (0, 1].
    /// Never less than one step.
    pub fn steps_for_draw(&self, u: f64) -> u64 {
        let k = (u.ln() / (1.0 - self.prob_per_step).ln()).ceil();
        if k.is_finite() && k >= 1.0 { k as u64 } else { 1 }
    }
}

impl BehaviorStream for PoissonStream {
    fn next_event(&self, now: Tick, rng: &mut PlaceRng) -> Tick {
        now + Duration::ticks(self.steps_for_draw(rng.uniform_open0()))
    }

    fn expected_per_day(&self) -> f64 {
        self.prob_per_step * TICKS_PER_DAY as f64
    }
}

// ── NonhomogeneousPoissonStream ───────────────────────────────────────────────

/// Poisson process whose per-step probability follows a daily profile.
#[derive(Clone, Debug, PartialEq)]
pub struct NonhomogeneousPoissonStream {
    prob_per_step: Vec<f64>,
}

impl NonhomogeneousPoissonStream {
    /// # Errors
    /// The profile must have one entry per step of the day, each in `[0, 1]`,
    /// at least one positive entry, and at least one entry below one.
    pub fn new(per_step: &[f64]) -> EpResult<Self> {
        if per_step.len() != TICKS_PER_DAY as usize {
            return Err(EpError::config(format!(
                "a daily profile needs {TICKS_PER_DAY} probabilities, got {}",
                per_step.len()
            )));
        }
        if let Some(p) = per_step.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(EpError::config(format!("profile probability {p} is outside [0, 1]")));
        }
        if !per_step.iter().any(|&p| p > 0.0) {
            return Err(EpError::config("a daily profile needs at least one positive probability"));
        }
        if per_step.iter().all(|&p| p >= 1.0) {
            return Err(EpError::config("a daily profile of all ones never yields an event"));
        }
        Ok(Self { prob_per_step: per_step.to_vec() })
    }
}

impl BehaviorStream for NonhomogeneousPoissonStream {
    /// Counts steps from one while draws land under the profile, wrapping
    /// around midnight.
    fn next_event(&self, now: Tick, rng: &mut PlaceRng) -> Tick {
        let mut index = now.step_of_day();
        let mut steps = 1u64;
        while rng.uniform() < self.prob_per_step[index] {
            steps += 1;
            index = (index + 1) % self.prob_per_step.len();
        }
        now + Duration::ticks(steps)
    }

    fn expected_per_day(&self) -> f64 {
        self.prob_per_step.iter().sum()
    }
}

// ── ContactStream ─────────────────────────────────────────────────────────────

/// The stream kinds a contact behavior can be driven by.
#[derive(Clone, Debug, PartialEq)]
pub enum ContactStream {
    /// Never fires.
    Off,
    Poisson(PoissonStream),
    Profile(NonhomogeneousPoissonStream),
}

impl ContactStream {
    pub fn from_spec(spec: &StreamSpec) -> EpResult<Self> {
        Ok(match spec {
            StreamSpec::Off => ContactStream::Off,
            StreamSpec::Poisson { per_day } => ContactStream::Poisson(PoissonStream::new(*per_day)?),
            StreamSpec::Profile { per_step } => {
                ContactStream::Profile(NonhomogeneousPoissonStream::new(per_step)?)
            }
        })
    }
}

impl BehaviorStream for ContactStream {
    #[inline]
    fn next_event(&self, now: Tick, rng: &mut PlaceRng) -> Tick {
        match self {
            ContactStream::Off        => Tick::NEVER,
            ContactStream::Poisson(s) => s.next_event(now, rng),
            ContactStream::Profile(s) => s.next_event(now, rng),
        }
    }

    fn expected_per_day(&self) -> f64 {
        match self {
            ContactStream::Off        => 0.0,
            ContactStream::Poisson(s) => s.expected_per_day(),
            ContactStream::Profile(s) => s.expected_per_day(),
        }
    }
}

// ── BehaviorStreams ───────────────────────────────────────────────────────────

/// The three contact streams every infected agent draws from.
#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorStreams {
    pub family:     ContactStream,
    pub random:     ContactStream,
    pub repeatable: ContactStream,
}

impl BehaviorStreams {
    pub fn from_config(cfg: &ContactStreamsConfig) -> EpResult<Self> {
        Ok(Self {
            family:     ContactStream::from_spec(&cfg.family)?,
            random:     ContactStream::from_spec(&cfg.random)?,
            repeatable: ContactStream::from_spec(&cfg.repeatable)?,
        })
    }

    pub fn off() -> Self {
        Self {
            family:     ContactStream::Off,
            random:     ContactStream::Off,
            repeatable: ContactStream::Off,
        }
    }
}

impl Default for BehaviorStreams {
    /// 5 family, 10 random and 5 repeatable contacts per day.
    fn default() -> Self {
        let poisson = |per_day| {
            ContactStream::Poisson(PoissonStream { prob_per_step: per_day / TICKS_PER_DAY as f64 })
        };
        Self {
            family:     poisson(5.0),
            random:     poisson(10.0),
            repeatable: poisson(5.0),
        }
    }
}
