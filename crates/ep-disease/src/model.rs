//! The `Disease` trait — the pluggable natural history of an infection.

use ep_core::{Duration, Tick};

/// Pluggable disease model.
///
/// Each query receives exactly one uniform draw in `[0, 1)` from the caller,
/// which keeps the number of RNG draws per exposure fixed and therefore keeps
/// runs reproducible regardless of which model is plugged in.
///
/// # Thread safety
///
/// One instance is shared by every shard during the parallel run phase, so
/// implementations must be `Send + Sync` and hold no per-agent state.
///
/// # Example
///
/// ```rust,ignore
/// struct OneDayCold;
///
/// impl Disease for OneDayCold {
///     fn contagious_period(&self, _u: f64) -> Duration { Duration::days(1) }
///     fn time_contagious(&self, exposed: Tick, _u: f64) -> Tick { exposed + Duration::hours(12) }
///     fn time_symptomatic(&self, _exposed: Tick, _u: f64) -> Tick { Tick::NEVER }
///     fn base_infectiousness(&self) -> f64 { 0.01 }
/// }
/// ```
pub trait Disease: Send + Sync + 'static {
    /// How long an agent stays contagious once contagiousness starts.
    fn contagious_period(&self, u: f64) -> Duration;

    /// Absolute time at which an agent exposed at `exposed` becomes contagious.
    fn time_contagious(&self, exposed: Tick, u: f64) -> Tick;

    /// Absolute time of symptom onset, or [`Tick::NEVER`].
    fn time_symptomatic(&self, exposed: Tick, u: f64) -> Tick;

    /// Per-contact transmission probability before intimacy scaling.
    fn base_infectiousness(&self) -> f64;

    fn name(&self) -> &'static str {
        "disease"
    }
}

// ── SwineFlu ──────────────────────────────────────────────────────────────────

const SHOW_SYMPTOMS_PROB: f64 = 0.67;
const BASE_INFECTIOUSNESS: f64 = 0.0255;

/// An H1N1-like influenza.
#[derive(Copy, Clone, Debug, Default)]
pub struct SwineFlu;

impl SwineFlu {
    /// Shared 1/2/3-day onset table: 30% / 50% / 20%.
    fn onset_hours(u: f64) -> u64 {
        if u < 0.3 {
            24
        } else if u < 0.8 {
            48
        } else {
            72
        }
    }
}

impl Disease for SwineFlu {
    /// 1 day 30%, 2 days 40%, 3 days 20%, 4 days 10%.
    fn contagious_period(&self, u: f64) -> Duration {
        let hours = if u < 0.3 {
            24
        } else if u < 0.7 {
            48
        } else if u < 0.9 {
            72
        } else {
            96
        };
        Duration::hours(hours)
    }

    fn time_contagious(&self, exposed: Tick, u: f64) -> Tick {
        exposed + Duration::hours(Self::onset_hours(u))
    }

    /// Symptoms appear for 67% of cases.  The part of the draw below the cut
    /// is stretched back onto `[0, 1)` to pick the onset delay.
    fn time_symptomatic(&self, exposed: Tick, u: f64) -> Tick {
        if u < SHOW_SYMPTOMS_PROB {
            let rescaled = (SHOW_SYMPTOMS_PROB - u) / SHOW_SYMPTOMS_PROB;
            exposed + Duration::hours(Self::onset_hours(rescaled))
        } else {
            Tick::NEVER
        }
    }

    fn base_infectiousness(&self) -> f64 {
        BASE_INFECTIOUSNESS
    }

    fn name(&self) -> &'static str {
        "swine-flu"
    }
}
