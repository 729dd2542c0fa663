//! `DeployablePopulation` — the static inputs every shard is built from.
//!
//! # Gravity model
//!
//! Random contacts leave their home place according to a per-origin discrete
//! distribution derived from the symmetric interaction matrix
//!
//! ```text
//! w[i][j] = pop[i] * pop[j] / dist(i, j)^2
//! ```
//!
//! where `dist` is measured on the population grid (optionally wrapping in
//! x) and a zero distance counts as 1.  Each row is normalised into a
//! cumulative table, so sampling a destination is one binary search.
//! Because `dist(i, i)` is 1, most random contacts stay at home.
//!
//! Everything here is read-only once built and is shared by all shards.

use ep_core::{EpError, EpResult, PlaceId, ShardId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::MIN_PLACE_POPULATION;

/// Larger values keep random contacts closer to home.
const DISTANCE_EXPONENT: f64 = 2.0;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// One populated grid cell before scaling.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PlaceSeed {
    pub population: u32,
    /// Grid column.
    pub x:          f64,
    /// Grid row.
    pub y:          f64,
}

/// Physical size of the population grid.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Distance between adjacent columns.
    pub x_step: f64,
    /// Distance between adjacent rows.
    pub y_step: f64,
    /// Number of columns, used when `wraps` is set.
    pub width:  f64,
    /// Measure x distances around the map (e.g. a full band of longitude).
    pub wraps:  bool,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self { x_step: 1.0, y_step: 1.0, width: 0.0, wraps: false }
    }
}

impl GridGeometry {
    pub fn validate(&self) -> EpResult<()> {
        for (name, v) in [("x_step", self.x_step), ("y_step", self.y_step)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(EpError::config(format!("grid {name} must be positive, got {v}")));
            }
        }
        if self.wraps && !(self.width.is_finite() && self.width > 0.0) {
            return Err(EpError::config(format!(
                "a wrapping grid needs a positive width, got {}",
                self.width
            )));
        }
        Ok(())
    }

    /// `dist^DISTANCE_EXPONENT` between two cells; a zero distance counts as 1.
    pub fn distance_factor(&self, a: &PlaceSeed, b: &PlaceSeed) -> f64 {
        let mut dx = (a.x - b.x).abs();
        if self.wraps {
            dx = dx.min((self.width - dx).abs());
        }
        let dx = dx * self.x_step;
        let dy = (a.y - b.y).abs() * self.y_step;
        let d = (dx * dx + dy * dy).sqrt().powf(DISTANCE_EXPONENT);
        if d == 0.0 { 1.0 } else { d }
    }
}

// ── ContactDistribution ───────────────────────────────────────────────────────

/// Per-origin cumulative distribution over destination places.
#[derive(Clone, Debug)]
pub struct ContactDistribution {
    cumulative: Vec<Vec<f64>>,
}

impl ContactDistribution {
    /// Normalise a square matrix of non-negative weights row by row.
    ///
    /// # Errors
    /// Rejects non-square input, negative or non-finite weights, and rows
    /// with no positive weight.
    pub fn from_weights(rows: Vec<Vec<f64>>) -> EpResult<Self> {
        let n = rows.len();
        let mut cumulative = rows;
        for (i, row) in cumulative.iter_mut().enumerate() {
            if row.len() != n {
                return Err(EpError::config(format!(
                    "interaction row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            if let Some(w) = row.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
                return Err(EpError::config(format!("interaction weight {w} in row {i} is invalid")));
            }
            let total: f64 = row.iter().sum();
            if !(total > 0.0 && total.is_finite()) {
                return Err(EpError::config(format!("interaction row {i} has no usable weight")));
            }

            let last_positive = row.iter().rposition(|&w| w > 0.0).unwrap_or(n - 1);
            let mut running = 0.0;
            for w in row.iter_mut() {
                running += *w / total;
                *w = running;
            }
            // Pin the tail so rounding cannot leave a draw in [0, 1) unmatched.
            for c in &mut row[last_positive..] {
                *c = 1.0;
            }
        }
        Ok(Self { cumulative })
    }

    /// Gravity-model distribution for already-scaled places.
    pub fn gravity(seeds: &[PlaceSeed], geometry: &GridGeometry) -> EpResult<Self> {
        geometry.validate()?;
        let rows = seeds
            .iter()
            .map(|a| {
                seeds
                    .iter()
                    .map(|b| a.population as f64 * b.population as f64 / geometry.distance_factor(a, b))
                    .collect()
            })
            .collect();
        Self::from_weights(rows)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Destination for a draw `u` in `[0, 1)` from `origin`'s row.
    pub fn sample(&self, origin: PlaceId, u: f64) -> PlaceId {
        let row = &self.cumulative[origin.index()];
        let i = row.partition_point(|&c| c <= u).min(row.len() - 1);
        PlaceId(i as u32)
    }

    /// Probability that a contact from `origin` goes to `dest`.
    pub fn probability(&self, origin: PlaceId, dest: PlaceId) -> f64 {
        let row = &self.cumulative[origin.index()];
        let j = dest.index();
        if j == 0 { row[0] } else { row[j] - row[j - 1] }
    }
}

// ── DeployablePopulation ──────────────────────────────────────────────────────

/// Place list, populations, shard ownership and contact distribution.
#[derive(Clone, Debug)]
pub struct DeployablePopulation {
    populations:  Vec<u32>,
    owners:       Vec<ShardId>,
    num_shards:   usize,
    distribution: ContactDistribution,
}

impl DeployablePopulation {
    /// Scale the raw seeds, build the gravity distribution, and deal places
    /// out to `num_shards` shards round-robin.
    ///
    /// # Errors
    /// Fails when a scaled place is smaller than [`MIN_PLACE_POPULATION`],
    /// the grid is invalid, or there are no places or shards.
    pub fn from_seeds(
        seeds:      &[PlaceSeed],
        geometry:   &GridGeometry,
        scale:      f64,
        num_shards: usize,
    ) -> EpResult<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EpError::config(format!("scale must be positive, got {scale}")));
        }
        let scaled: Vec<PlaceSeed> = seeds
            .iter()
            .map(|s| PlaceSeed { population: (s.population as f64 * scale).floor() as u32, ..*s })
            .collect();
        let populations: Vec<u32> = scaled.iter().map(|s| s.population).collect();
        check_populations(&populations)?;
        let distribution = ContactDistribution::gravity(&scaled, geometry)?;
        Self::from_parts(populations, distribution, num_shards)
    }

    /// Assemble from explicit populations and a prebuilt distribution.
    pub fn from_parts(
        populations:  Vec<u32>,
        distribution: ContactDistribution,
        num_shards:   usize,
    ) -> EpResult<Self> {
        if populations.is_empty() {
            return Err(EpError::config("a population needs at least one place"));
        }
        if num_shards == 0 || num_shards > u16::MAX as usize {
            return Err(EpError::config(format!("cannot deal places to {num_shards} shards")));
        }
        if distribution.len() != populations.len() {
            return Err(EpError::config(format!(
                "distribution covers {} places but there are {}",
                distribution.len(),
                populations.len()
            )));
        }
        if PlaceId::try_from(populations.len()).is_err() {
            return Err(EpError::config(format!("too many places ({})", populations.len())));
        }
        check_populations(&populations)?;

        let owners = (0..populations.len())
            .map(|i| ShardId((i % num_shards) as u16))
            .collect();

        let pop = Self { populations, owners, num_shards, distribution };
        info!(
            places = pop.place_count(),
            agents = pop.total_population(),
            shards = num_shards,
            "population deployed"
        );
        debug!(coupling = ?pop.shard_coupling(), "shard coupling");
        Ok(pop)
    }

    #[inline]
    pub fn place_count(&self) -> usize {
        self.populations.len()
    }

    #[inline]
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }

    #[inline]
    pub fn population(&self, place: PlaceId) -> u32 {
        self.populations[place.index()]
    }

    #[inline]
    pub fn populations(&self) -> &[u32] {
        &self.populations
    }

    pub fn total_population(&self) -> u64 {
        self.populations.iter().map(|&p| p as u64).sum()
    }

    #[inline]
    pub fn owner(&self, place: PlaceId) -> ShardId {
        self.owners[place.index()]
    }

    /// Places owned by `shard`, in ascending order.
    pub fn places_of(&self, shard: ShardId) -> impl Iterator<Item = PlaceId> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(move |&(_, &o)| o == shard)
            .map(|(i, _)| PlaceId(i as u32))
    }

    /// Destination of a random contact leaving `origin`, for a draw in `[0, 1)`.
    #[inline]
    pub fn random_destination(&self, origin: PlaceId, u: f64) -> PlaceId {
        self.distribution.sample(origin, u)
    }

    #[inline]
    pub fn distribution(&self) -> &ContactDistribution {
        &self.distribution
    }

    /// The most populous place; the first one on ties.
    pub fn largest_place(&self) -> PlaceId {
        let mut best = 0;
        for (i, &p) in self.populations.iter().enumerate() {
            if p > self.populations[best] {
                best = i;
            }
        }
        PlaceId(best as u32)
    }

    /// Expected share of random contacts flowing from each shard to each
    /// shard, summed over origin places.
    pub fn shard_coupling(&self) -> Vec<Vec<f64>> {
        let n = self.place_count();
        let mut coupling = vec![vec![0.0; self.num_shards]; self.num_shards];
        for i in 0..n {
            let from = self.owners[i].index();
            for j in 0..n {
                let p = self.distribution.probability(PlaceId(i as u32), PlaceId(j as u32));
                coupling[from][self.owners[j].index()] += p;
            }
        }
        coupling
    }
}

fn check_populations(populations: &[u32]) -> EpResult<()> {
    match populations
        .iter()
        .enumerate()
        .find(|&(_, &p)| (p as usize) < MIN_PLACE_POPULATION)
    {
        Some((i, p)) => Err(EpError::config(format!(
            "place {i} has {p} agents after scaling; at least {MIN_PLACE_POPULATION} are required"
        ))),
        None => Ok(()),
    }
}
