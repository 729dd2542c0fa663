//! regional — a multi-place influenza outbreak on the epi_pdes engine.
//!
//! Usage:
//!
//! ```text
//! regional [CONFIG.json]
//! ```
//!
//! Without a `places_csv` entry in the config, a synthetic 12 x 8 grid of
//! towns is generated with a dense centre and a sparse rim.  Per-place
//! counters go to `place_log.csv` and per-round totals to `rounds.csv` in the
//! output directory.  Set `RUST_LOG=debug` to see every reconcile round.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ep_core::{SimConfig, Tick};
use ep_disease::SwineFlu;
use ep_engine::{EngineBuilder, LogEntry, RoundSummary, RunOutcome, SimObserver};
use ep_output::{CsvWriter, OutputWriter, SimOutputObserver};
use ep_population::{DeployablePopulation, GridGeometry, PlaceSeed, load_places_csv};

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_COLS:      usize = 12;
const GRID_ROWS:      usize = 8;
const RIM_POPULATION: f64   = 400.0;
const PEAK_EXTRA:     f64   = 9_600.0;
const REPORT_EVERY:   u64   = 10; // logical rounds between progress lines

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    sim:        SimConfig,
    grid:       GridGeometry,
    /// `population,x,y` rows; synthetic grid when absent.
    places_csv: Option<PathBuf>,
    output_dir: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sim:        SimConfig::default(),
            grid:       GridGeometry { width: GRID_COLS as f64, ..GridGeometry::default() },
            places_csv: None,
            output_dir: PathBuf::from("output/regional"),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Gaussian bump of population centred on the grid.
fn synthetic_grid() -> Vec<PlaceSeed> {
    let (cx, cy) = ((GRID_COLS - 1) as f64 / 2.0, (GRID_ROWS - 1) as f64 / 2.0);
    let mut seeds = Vec::with_capacity(GRID_COLS * GRID_ROWS);
    for y in 0..GRID_ROWS {
        for x in 0..GRID_COLS {
            let d2 = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
            let population = RIM_POPULATION + PEAK_EXTRA * (-d2 / 8.0).exp();
            seeds.push(PlaceSeed { population: population as u32, x: x as f64, y: y as f64 });
        }
    }
    seeds
}

// ── Observer wrapper ──────────────────────────────────────────────────────────

/// Forwards to the CSV observer and reports progress every few days.
struct ProgressObserver<W: OutputWriter> {
    inner:      SimOutputObserver<W>,
    log_rows:   usize,
    rounds:     usize,
    peak:       (u32, Tick),
    infections: u64,
}

impl<W: OutputWriter> ProgressObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, log_rows: 0, rounds: 0, peak: (0, Tick::ZERO), infections: 0 }
    }
}

impl<W: OutputWriter> SimObserver for ProgressObserver<W> {
    fn on_log_entries(&mut self, entries: &[LogEntry]) {
        self.log_rows += entries.len();
        self.inner.on_log_entries(entries);
    }

    fn on_round_end(&mut self, summary: &RoundSummary) {
        self.rounds += 1;
        self.infections += summary.new_infections as u64;
        if summary.infected() > self.peak.0 {
            self.peak = (summary.infected(), summary.time);
        }
        if summary.advanced() && summary.reconcile_number % REPORT_EVERY == 0 {
            info!(
                day = summary.time.as_days(),
                infected = summary.infected(),
                recovered = summary.totals.recovered,
                "progress"
            );
        }
        self.inner.on_round_end(summary);
    }

    fn on_sim_end(&mut self, final_time: Tick) {
        self.inner.on_sim_end(final_time);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() > 1 {
        bail!("usage: regional [CONFIG.json]");
    }
    let demo = load_config(args.first().map(Path::new))?;
    let config = demo.sim.clone();

    // 1. Places.
    let seeds = match &demo.places_csv {
        Some(path) => load_places_csv(path)
            .with_context(|| format!("loading places from {}", path.display()))?,
        None => synthetic_grid(),
    };
    let population =
        DeployablePopulation::from_seeds(&seeds, &demo.grid, config.scale, config.num_threads)?;
    info!(
        places = population.place_count(),
        agents = population.total_population(),
        largest = population.largest_place().0,
        "population ready"
    );

    // 2. Engine.
    let t0 = Instant::now();
    let mut engine = EngineBuilder::new(config, population, SwineFlu).build()?;
    info!(secs = t0.elapsed().as_secs_f64(), "engine built");

    // 3. Output.
    let writer = CsvWriter::new(&demo.output_dir)?;
    let mut obs = ProgressObserver::new(SimOutputObserver::new(writer));

    // 4. Run.
    let t0 = Instant::now();
    let outcome = engine.run(&mut obs);
    let elapsed = t0.elapsed();
    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }
    if outcome == RunOutcome::Paused {
        bail!("run paused before the epidemic ended");
    }

    // 5. Summary.
    let totals = engine.totals();
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  simulated days     : {:.2}", engine.now().as_days());
    println!("  engine rounds      : {} ({} logical)", engine.round(), engine.reconcile_number());
    println!("  infections         : {}", obs.infections);
    println!("  peak infected      : {} on day {:.2}", obs.peak.0, obs.peak.1.as_days());
    println!("  never infected     : {}", totals.susceptible);
    println!("  recovered/immune   : {}", totals.recovered);
    println!("  place_log.csv      : {} rows", obs.log_rows);
    println!("  rounds.csv         : {} rows", obs.rounds);
    println!();

    println!("{:<8} {:<8} {:>8} {:>10}", "Shard", "Places", "Exported", "Imported");
    println!("{}", "-".repeat(38));
    for shard in engine.shards() {
        let stats = shard.stats();
        println!(
            "{:<8} {:<8} {:>8} {:>10}",
            shard.id().0,
            shard.places().len(),
            stats.contacts_exported,
            stats.contacts_imported,
        );
    }

    Ok(())
}
