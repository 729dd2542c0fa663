//! Run configuration.
//!
//! `SimConfig` is an immutable value: it is validated once, before any shard
//! is built, and then handed to every shard by shared reference.  There are no
//! process-wide toggles; school closure and social distancing are plain fields
//! here.
//!
//! With the `serde` feature every field has a default, so a JSON file only
//! needs to name the values it changes:
//!
//! ```json
//! { "run_number": 7, "num_threads": 4, "social_distance": 0.3,
//!   "contact_streams": { "random": { "kind": "poisson", "per_day": 8.0 } } }
//! ```

use crate::{Duration, EpError, EpResult};

// ── Contact stream description ────────────────────────────────────────────────

/// How often one kind of contact happens.  Turned into a live stream by
/// `ep-disease`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StreamSpec {
    /// The contact never happens.
    Off,
    /// Homogeneous Poisson process with the given mean rate.
    Poisson { per_day: f64 },
    /// One event probability per simulation step of the day.
    Profile { per_step: Vec<f64> },
}

/// Stream descriptions for the three contact behaviors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContactStreamsConfig {
    pub family:     StreamSpec,
    pub random:     StreamSpec,
    pub repeatable: StreamSpec,
}

impl Default for ContactStreamsConfig {
    fn default() -> Self {
        Self {
            family:     StreamSpec::Poisson { per_day: 5.0 },
            random:     StreamSpec::Poisson { per_day: 10.0 },
            repeatable: StreamSpec::Poisson { per_day: 5.0 },
        }
    }
}

impl ContactStreamsConfig {
    /// Every contact behavior switched off.  Infections then only progress
    /// through the disease timeline.
    pub fn all_off() -> Self {
        Self {
            family:     StreamSpec::Off,
            random:     StreamSpec::Off,
            repeatable: StreamSpec::Off,
        }
    }
}

// ── Vaccination ───────────────────────────────────────────────────────────────

/// One-shot mass vaccination of a place, triggered at a log update once the
/// place has seen `recovered_threshold` recoveries.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VaccinationPolicy {
    /// Fraction of the remaining susceptibles moved to recovered.
    pub fraction:            f64,
    pub recovered_threshold: u32,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Drives every place's RNG seed.  Same run number, same trajectory.
    pub run_number: u64,

    /// Number of worker shards (and rayon threads).
    pub num_threads: usize,

    /// Adults exposed in the most populous place at time zero.
    pub initial_cases: u32,

    /// Multiplier applied to every raw place population.
    pub scale: f64,

    /// Barrier cadence, in days.
    pub reconcile_period_days: f64,

    /// Cadence of per-place log entries, in days.
    pub log_period_days: f64,

    /// Fraction of random and repeatable contacts suppressed, in `[0, 1]`.
    pub social_distance: f64,

    /// Suppress random and repeatable contacts made by children.
    pub schools_closed: bool,

    pub contact_streams: ContactStreamsConfig,

    pub vaccination: Option<VaccinationPolicy>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            run_number:            0,
            num_threads:           std::thread::available_parallelism().map_or(1, |n| n.get()),
            initial_cases:         1,
            scale:                 1.0,
            reconcile_period_days: 1.0,
            log_period_days:       1.0,
            social_distance:       0.0,
            schools_closed:        false,
            contact_streams:       ContactStreamsConfig::default(),
            vaccination:           None,
        }
    }
}

impl SimConfig {
    /// Check every scalar field.  Stream contents are checked when the
    /// streams are built.
    pub fn validate(&self) -> EpResult<()> {
        if self.num_threads == 0 {
            return Err(EpError::config("num_threads must be at least 1"));
        }
        if self.num_threads > u16::MAX as usize {
            return Err(EpError::config(format!("num_threads {} is too large", self.num_threads)));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(EpError::config(format!("scale must be positive, got {}", self.scale)));
        }
        if self.reconcile_period().as_ticks() == 0 {
            return Err(EpError::config(format!(
                "reconcile_period_days {} is shorter than one step",
                self.reconcile_period_days
            )));
        }
        if self.log_period().as_ticks() == 0 {
            return Err(EpError::config(format!(
                "log_period_days {} is shorter than one step",
                self.log_period_days
            )));
        }
        if !(0.0..=1.0).contains(&self.social_distance) {
            return Err(EpError::config(format!(
                "social_distance must be in [0, 1], got {}",
                self.social_distance
            )));
        }
        if let Some(v) = self.vaccination {
            if !(0.0..=1.0).contains(&v.fraction) {
                return Err(EpError::config(format!(
                    "vaccination fraction must be in [0, 1], got {}",
                    v.fraction
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn reconcile_period(&self) -> Duration {
        Duration::from_days_f64(self.reconcile_period_days)
    }

    #[inline]
    pub fn log_period(&self) -> Duration {
        Duration::from_days_f64(self.log_period_days)
    }

    /// Probability that a random or repeatable contact actually happens.
    #[inline]
    pub fn contact_probability(&self) -> f64 {
        1.0 - self.social_distance
    }
}
