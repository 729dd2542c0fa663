//! Simulation time model.
//!
//! # Design
//!
//! Time is an integer count of steps, `TICKS_PER_DAY` of them per simulated
//! day.  Integer ticks keep every schedule comparison exact, which the event
//! ordering contract depends on.
//!
//! `Tick::NEVER` is the "never occurs" sentinel.  It compares greater than
//! every real time, so the minimum of several sub-event times naturally
//! ignores the ones that will never happen, and arithmetic on it saturates
//! (`NEVER + d == NEVER`).

use std::fmt;

/// Number of simulation steps in one day.
pub const TICKS_PER_DAY: u64 = 100;

const MINUTES_PER_DAY: u64 = 24 * 60;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The time of an event that will never happen.
    pub const NEVER: Tick = Tick(u64::MAX);

    /// `false` only for [`Tick::NEVER`].
    #[inline]
    pub fn occurs(self) -> bool {
        self != Tick::NEVER
    }

    /// Position of this time inside its day, in `0..TICKS_PER_DAY`.
    #[inline]
    pub fn step_of_day(self) -> usize {
        (self.0 % TICKS_PER_DAY) as usize
    }

    /// Fractional day number, for reporting.
    pub fn as_days(self) -> f64 {
        self.0 as f64 / TICKS_PER_DAY as f64
    }
}

impl std::ops::Add<Duration> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: Duration) -> Tick {
        if !self.occurs() {
            return Tick::NEVER;
        }
        Tick(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Tick {
    type Output = Duration;

    /// # Panics
    /// Panics if `rhs` is later than `self` or either side is `NEVER`.
    #[inline]
    fn sub(self, rhs: Tick) -> Duration {
        assert!(self.occurs() && rhs.occurs(), "cannot measure time to or from NEVER");
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.occurs() {
            write!(f, "T{} (day {:.2})", self.0, self.as_days())
        } else {
            f.write_str("NEVER")
        }
    }
}

// ── Duration ─────────────────────────────────────────────────────────────────

/// A non-negative length of simulated time, in ticks.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Duration(pub u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    #[inline]
    pub fn ticks(n: u64) -> Self {
        Duration(n)
    }

    #[inline]
    pub fn days(days: u64) -> Self {
        Duration(days * TICKS_PER_DAY)
    }

    /// Hours are converted through whole minutes, so 24 h is exactly one day.
    pub fn hours(hours: u64) -> Self {
        Self::minutes(hours * 60)
    }

    /// Whole days contribute `TICKS_PER_DAY` each; the remaining minutes are
    /// floored onto the tick grid.
    pub fn minutes(minutes: u64) -> Self {
        let days = minutes / MINUTES_PER_DAY;
        let rest = minutes % MINUTES_PER_DAY;
        Duration(days * TICKS_PER_DAY + rest * TICKS_PER_DAY / MINUTES_PER_DAY)
    }

    /// Fractional days, truncated to whole minutes first (0.975 d → 97 ticks).
    ///
    /// Negative and non-finite inputs collapse to zero; validate them before
    /// calling if they can come from user input.
    pub fn from_days_f64(days: f64) -> Self {
        if !days.is_finite() || days <= 0.0 {
            return Duration::ZERO;
        }
        let whole = days.trunc() as u64;
        let minutes = (days.fract() * MINUTES_PER_DAY as f64) as u64;
        Duration(whole * TICKS_PER_DAY + minutes * TICKS_PER_DAY / MINUTES_PER_DAY)
    }

    #[inline]
    pub fn as_ticks(self) -> u64 {
        self.0
    }
}

impl std::ops::Add for Duration {
    type Output = Duration;
    #[inline]
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}
