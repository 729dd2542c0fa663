//! Household generation.
//!
//! Households are laid out contiguously inside an `AgentGroup`: the head
//! first, then the dependents.  A factory only decides the age cohorts; the
//! group turns each household into family offsets.

use ep_core::PlaceRng;
use ep_disease::AgeCohort;

/// No factory may produce a household larger than this.  Family offsets are
/// stored in one byte, so the bound also keeps them small.
pub const MAX_HOUSEHOLD_SIZE: usize = 7;

/// Source of household compositions.
pub trait HouseholdFactory {
    /// Clear `out` and fill it with the cohorts of one new household, head
    /// first.  Must produce between 1 and [`MAX_HOUSEHOLD_SIZE`] members.
    fn draw_household(&mut self, rng: &mut PlaceRng, out: &mut Vec<AgeCohort>);
}

// ── UsHouseholdMaker ──────────────────────────────────────────────────────────

/// Cumulative household-size distribution from the 2000 US census.
const SIZE_CUTOFFS: [f64; 6] = [0.26, 0.59, 0.75, 0.90, 0.97, 0.99];

/// Fraction of dependents who are children.  With a mean household of 2.42
/// people this puts 25.6% of the population under 18.
const CHILD_DEPENDENT_PROB: f64 = 0.436;

/// Households shaped like the US census: an adult head plus dependents.
#[derive(Copy, Clone, Debug, Default)]
pub struct UsHouseholdMaker;

impl UsHouseholdMaker {
    /// Household size for one uniform draw.
    pub fn size_for_draw(u: f64) -> usize {
        SIZE_CUTOFFS
            .iter()
            .position(|&cut| u < cut)
            .map_or(MAX_HOUSEHOLD_SIZE, |i| i + 1)
    }
}

impl HouseholdFactory for UsHouseholdMaker {
    fn draw_household(&mut self, rng: &mut PlaceRng, out: &mut Vec<AgeCohort>) {
        out.clear();
        let size = Self::size_for_draw(rng.uniform());
        out.push(AgeCohort::Adult);
        for _ in 1..size {
            let cohort = if rng.uniform() < CHILD_DEPENDENT_PROB {
                AgeCohort::Child
            } else {
                AgeCohort::Adult
            };
            out.push(cohort);
        }
    }
}
