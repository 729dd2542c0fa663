//! Integration tests for ep-engine.

#[cfg(test)]
pub(crate) mod support {
    use ep_core::{ContactStreamsConfig, Duration, SimConfig, StreamSpec, Tick};
    use ep_disease::Disease;
    use ep_population::{ContactDistribution, DeployablePopulation, GridGeometry, PlaceSeed};

    use crate::{LogEntry, RoundSummary, SimObserver};

    pub fn config(threads: usize) -> SimConfig {
        SimConfig {
            run_number: 11,
            num_threads: threads,
            ..SimConfig::default()
        }
    }

    /// `places` equal places on a 4-wide grid.  Place 0 is the seed place.
    pub fn grid_population(places: usize, size: u32, shards: usize) -> DeployablePopulation {
        let seeds: Vec<PlaceSeed> = (0..places)
            .map(|i| PlaceSeed { population: size, x: (i % 4) as f64, y: (i / 4) as f64 })
            .collect();
        DeployablePopulation::from_seeds(&seeds, &GridGeometry::default(), 1.0, shards).unwrap()
    }

    /// Two places on two shards whose random contacts always go to the
    /// other place.
    pub fn crossing_pair(size: u32) -> DeployablePopulation {
        let dist = ContactDistribution::from_weights(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        DeployablePopulation::from_parts(vec![size, size], dist, 2).unwrap()
    }

    /// Only random contacts, one per step.
    pub fn random_every_step() -> ContactStreamsConfig {
        ContactStreamsConfig {
            family:     StreamSpec::Off,
            random:     StreamSpec::Poisson { per_day: 100.0 },
            repeatable: StreamSpec::Off,
        }
    }

    /// Contagious after `incubation` ticks for exactly `period` ticks; no
    /// symptoms.
    pub struct ShortCourse {
        pub incubation: u64,
        pub period:     u64,
        pub base:       f64,
    }

    impl Disease for ShortCourse {
        fn contagious_period(&self, _u: f64) -> Duration {
            Duration::ticks(self.period)
        }
        fn time_contagious(&self, exposed: Tick, _u: f64) -> Tick {
            exposed + Duration::ticks(self.incubation)
        }
        fn time_symptomatic(&self, _exposed: Tick, _u: f64) -> Tick {
            Tick::NEVER
        }
        fn base_infectiousness(&self) -> f64 {
            self.base
        }
    }

    /// One random contact at tick 11, recovery at tick 12; every contact
    /// that reaches a susceptible infects.
    pub fn one_contact_course() -> ShortCourse {
        ShortCourse { incubation: 10, period: 2, base: 1.0 }
    }

    #[derive(Default)]
    pub struct Recorder {
        pub summaries: Vec<RoundSummary>,
        pub logs:      Vec<LogEntry>,
        pub ended:     usize,
        pub end_time:  Option<Tick>,
    }

    impl Recorder {
        pub fn total_new_infections(&self) -> u32 {
            self.summaries.iter().map(|s| s.new_infections).sum()
        }
    }

    impl SimObserver for Recorder {
        fn on_log_entries(&mut self, entries: &[LogEntry]) {
            self.logs.extend_from_slice(entries);
        }
        fn on_round_end(&mut self, summary: &RoundSummary) {
            self.summaries.push(summary.clone());
        }
        fn on_sim_end(&mut self, final_time: Tick) {
            self.ended += 1;
            self.end_time = Some(final_time);
        }
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use ep_core::{AgentId, EventKey, PlaceId, Tick};
    use ep_population::AgentSchedule;

    use crate::{Event, EventQueue};

    #[test]
    fn pops_by_time_then_place_then_insertion() {
        let mut q = EventQueue::new();
        q.push(Tick(5), PlaceId(1), Event::LogUpdate);
        q.push(Tick(5), PlaceId(0), Event::Agent { agent: AgentId(1) });
        q.push(Tick(3), PlaceId(2), Event::LogUpdate);
        q.push(Tick(5), PlaceId(0), Event::Agent { agent: AgentId(2) });

        let order: Vec<(u64, u32, Event)> = std::iter::from_fn(|| q.pop())
            .map(|(k, e)| (k.time.0, k.place.0, e))
            .collect();
        assert_eq!(order, vec![
            (3, 2, Event::LogUpdate),
            (5, 0, Event::Agent { agent: AgentId(1) }),
            (5, 0, Event::Agent { agent: AgentId(2) }),
            (5, 1, Event::LogUpdate),
        ]);
    }

    #[test]
    #[should_panic(expected = "duplicate event key")]
    fn duplicate_key_is_fatal() {
        let mut q = EventQueue::new();
        let key = EventKey::new(Tick(1), PlaceId(0), 0);
        q.insert_keyed(key, Event::LogUpdate);
        q.insert_keyed(key, Event::Reconcile);
    }

    #[test]
    #[should_panic(expected = "at NEVER")]
    fn never_cannot_be_queued() {
        EventQueue::new().push(Tick::NEVER, PlaceId(0), Event::LogUpdate);
    }

    #[test]
    fn only_agent_and_remote_events_count_as_work() {
        let mut q = EventQueue::new();
        q.push(Tick(1), PlaceId(0), Event::LogUpdate);
        q.push(Tick(2), PlaceId(0), Event::Reconcile);
        assert_eq!(q.pending_work(), 0);

        let key = q.insert(PlaceId(0), AgentId(4), Tick(3));
        assert_eq!(q.pending_work(), 1);
        assert_eq!(q.len(), 3);

        q.remove(key);
        assert_eq!(q.pending_work(), 0);
        assert_eq!(q.len(), 2);

        q.insert(PlaceId(0), AgentId(4), Tick(1));
        let (_, first) = q.pop().unwrap();
        assert_eq!(first, Event::LogUpdate);
        let (_, second) = q.pop().unwrap();
        assert_eq!(second, Event::Agent { agent: AgentId(4) });
        assert_eq!(q.pending_work(), 0);
    }

    #[test]
    #[should_panic(expected = "not an agent event")]
    fn withdrawing_bookkeeping_events_is_fatal() {
        let mut q = EventQueue::new();
        let key = q.push(Tick(1), PlaceId(0), Event::LogUpdate);
        q.remove(key);
    }

    #[test]
    fn clock_may_move_backwards() {
        let mut q = EventQueue::new();
        q.set_now(Tick(100));
        q.set_now(Tick(11));
        assert_eq!(AgentSchedule::now(&q), Tick(11));
    }
}

// ── EngineBuilder validation ──────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use ep_core::{StreamSpec, Tick};
    use ep_disease::SwineFlu;

    use super::support::*;
    use crate::{EngineBuilder, EngineError};

    #[test]
    fn builds_one_shard_per_thread() {
        let engine = EngineBuilder::new(config(3), grid_population(7, 50, 3), SwineFlu)
            .build()
            .unwrap();
        assert_eq!(engine.shards().len(), 3);
        let owned: Vec<usize> = engine.shards().iter().map(|s| s.places().len()).collect();
        assert_eq!(owned, vec![3, 2, 2]);
        assert_eq!(engine.totals().susceptible + engine.totals().infected(), 350);
        assert_eq!(engine.totals().infected(), 1);
        assert_eq!(engine.now(), Tick::ZERO);
    }

    #[test]
    fn shard_count_must_match_population() {
        let err = EngineBuilder::new(config(2), grid_population(4, 50, 3), SwineFlu)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::ShapeMismatch { expected: 2, got: 3, .. }));
    }

    #[test]
    fn more_shards_than_places_is_rejected() {
        let err = EngineBuilder::new(config(3), grid_population(2, 50, 3), SwineFlu)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = config(1);
        cfg.social_distance = 1.5;
        let err = EngineBuilder::new(cfg, grid_population(2, 50, 1), SwineFlu)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Core(_)));
    }

    #[test]
    fn invalid_stream_is_rejected() {
        let mut cfg = config(1);
        cfg.contact_streams.random = StreamSpec::Poisson { per_day: -1.0 };
        let err = EngineBuilder::new(cfg, grid_population(2, 50, 1), SwineFlu)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Core(_)));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = EngineBuilder::new(config(1), grid_population(2, 50, 1), SwineFlu)
            .pool_threads(0)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn initial_cases_land_in_the_largest_place() {
        let mut cfg = config(2);
        cfg.initial_cases = 4;
        let pop = super::support::crossing_pair(60);
        let engine = EngineBuilder::new(cfg, pop, SwineFlu).build().unwrap();
        let seeded = engine.place(ep_core::PlaceId(0)).unwrap();
        assert_eq!(seeded.counts().infected(), 4);
        assert_eq!(seeded.group().active_events(), 4);
        assert_eq!(engine.place(ep_core::PlaceId(1)).unwrap().counts().infected(), 0);
        assert!(engine.place(ep_core::PlaceId(2)).is_none());
    }
}

// ── Shard internals ───────────────────────────────────────────────────────────

#[cfg(test)]
mod shard_tests {
    use ep_core::{ContactStreamsConfig, PlaceId, ShardId, Tick};
    use ep_disease::{AgeCohort, BehaviorStreams, ContactType, DiseaseState, SwineFlu};
    use ep_population::{ContactInfo, ContactTarget};

    use super::support::*;
    use crate::{Event, OffThreadContactRecord, Scenario, Shard};

    fn scenario() -> Scenario<SwineFlu> {
        let mut cfg = config(2);
        cfg.contact_streams = ContactStreamsConfig::all_off();
        Scenario {
            config:     cfg,
            population: crossing_pair(40),
            disease:    SwineFlu,
            streams:    BehaviorStreams::off(),
        }
    }

    fn record(round: u64) -> OffThreadContactRecord {
        OffThreadContactRecord {
            time:   Tick(40),
            place:  PlaceId(1),
            target: ContactTarget::Anyone,
            info:   ContactInfo::new(
                AgeCohort::Adult,
                DiseaseState::ContagiousSymptomatic,
                ContactType::Random,
            ),
            round,
        }
    }

    #[test]
    fn fresh_shard_queues_log_updates_and_a_barrier() {
        let sc = scenario();
        let shard = Shard::build(ShardId(1), &sc).unwrap();
        let events: Vec<(u64, Event)> = shard.queue().iter().map(|(k, e)| (k.time.0, *e)).collect();
        assert_eq!(events, vec![(97, Event::LogUpdate), (100, Event::Reconcile)]);
        assert_eq!(shard.pending_work(), 0);
    }

    #[test]
    fn imports_are_queued_at_their_original_time() {
        let sc = scenario();
        let mut shard = Shard::build(ShardId(1), &sc).unwrap();
        shard.import(vec![record(1)], 2);
        assert_eq!(shard.pending_work(), 1);
        let (key, event) = shard.queue().iter().next().map(|(k, e)| (*k, *e)).unwrap();
        assert_eq!(key.time, Tick(40));
        assert!(matches!(event, Event::OffThreadContact { round: 1, .. }));
        assert_eq!(shard.stats().contacts_imported, 1);
    }

    #[test]
    #[should_panic(expected = "delivered in round")]
    fn records_cannot_be_delivered_in_their_own_round() {
        let sc = scenario();
        let mut shard = Shard::build(ShardId(1), &sc).unwrap();
        shard.import(vec![record(2)], 2);
    }

    #[test]
    #[should_panic(expected = "foreign")]
    fn records_for_foreign_places_are_rejected() {
        let sc = scenario();
        let mut shard = Shard::build(ShardId(0), &sc).unwrap();
        shard.import(vec![record(1)], 2);
    }

    #[test]
    fn imported_contact_infects_and_rewinds_the_clock() {
        let sc = scenario();
        let mut shard = Shard::build(ShardId(1), &sc).unwrap();
        shard.run_to_barrier(1, &sc);
        assert_eq!(shard.now(), Tick(100));

        // A random contact transmits with probability 0.0255; send plenty.
        let records: Vec<_> = (0..400).map(|_| record(1)).collect();
        shard.import(records, 2);
        shard.arm_barrier(Tick(100));
        shard.run_to_barrier(2, &sc);

        let place = shard.place(PlaceId(1)).unwrap();
        let infected: Vec<_> = place.group().events().map(|(_, e)| e.exposed_at()).collect();
        assert!(!infected.is_empty());
        assert!(infected.iter().all(|&t| t == Tick(40)));
        assert_eq!(shard.stats().remote_contacts_dispatched, 400);
        assert_eq!(shard.now(), Tick(100));
    }
}

// ── Whole runs ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runs {
    use ep_core::{ContactStreamsConfig, PlaceId, Tick, VaccinationPolicy};
    use ep_disease::SwineFlu;

    use super::support::*;
    use crate::{EngineBuilder, Event, NoopObserver, RunOutcome};

    #[test]
    fn lone_case_recovers_without_contacts() {
        let mut cfg = config(2);
        cfg.contact_streams = ContactStreamsConfig::all_off();
        let mut engine = EngineBuilder::new(cfg, grid_population(3, 100, 2), SwineFlu)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        assert_eq!(engine.run(&mut rec), RunOutcome::Finished);

        let totals = engine.totals();
        assert_eq!(totals.recovered, 1);
        assert_eq!(totals.susceptible, 299);
        assert_eq!(totals.infected(), 0);

        // Longest course is 3 days to contagious plus 4 days contagious.
        assert!(rec.summaries.len() <= 7, "{} rounds", rec.summaries.len());
        assert!(rec.summaries.iter().all(|s| s.advanced()));
        let (last, earlier) = rec.summaries.split_last().unwrap();
        assert!(earlier.iter().all(|s| s.infected() == 1));
        assert_eq!(last.infected(), 0);
        assert_eq!(engine.reconcile_number(), engine.round());
        assert_eq!(rec.total_new_infections(), 1);
        assert_eq!(rec.ended, 1);
        assert_eq!(rec.end_time, Some(engine.now()));
    }

    #[test]
    fn places_log_from_day_one_every_period() {
        let mut cfg = config(1);
        cfg.contact_streams = ContactStreamsConfig::all_off();
        let mut engine = EngineBuilder::new(cfg, grid_population(2, 40, 1), SwineFlu)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        engine.run_rounds(3, &mut rec);

        for place in [PlaceId(0), PlaceId(1)] {
            let times: Vec<u64> = engine
                .place(place)
                .unwrap()
                .record()
                .samples
                .iter()
                .map(|s| s.time.0)
                .collect();
            assert_eq!(times, vec![97, 197, 297]);
        }
        let first: Vec<(u64, u32)> = rec.logs.iter().take(2).map(|e| (e.sample.time.0, e.place.0)).collect();
        assert_eq!(first, vec![(97, 0), (97, 1)]);
        assert!(rec.logs.iter().all(|e| e.sample.counts.by_contagiousness() == 40));
    }

    #[test]
    fn cross_shard_contact_is_delivered_at_the_barrier() {
        let mut cfg = config(2);
        cfg.contact_streams = random_every_step();
        let mut engine = EngineBuilder::new(cfg, crossing_pair(200), one_contact_course())
            .build()
            .unwrap();
        let mut rec = Recorder::default();

        engine.run_rounds(1, &mut rec);
        let round1 = &rec.summaries[0];
        assert_eq!(round1.transfers, 1);
        assert!(!round1.advanced());
        assert_eq!(engine.reconcile_number(), 0);

        let (src, dst) = (&engine.shards()[0], &engine.shards()[1]);
        assert_eq!(src.outbound(), 0);
        assert_eq!(src.stats().contacts_exported, 1);
        assert_eq!(dst.pending_work(), 1);
        let remote: Vec<_> = dst
            .queue()
            .iter()
            .filter(|(_, e)| matches!(e, Event::OffThreadContact { .. }))
            .map(|(k, _)| (k.time, k.place))
            .collect();
        assert_eq!(remote, vec![(Tick(11), PlaceId(1))]);

        engine.run_rounds(1, &mut rec);
        assert_eq!(rec.summaries[1].new_infections, 1);
        assert_eq!(engine.place(PlaceId(1)).unwrap().counts().recovered, 1);
        assert_eq!(engine.shards()[1].stats().remote_contacts_dispatched, 1);
    }

    #[test]
    fn every_exported_contact_is_dispatched_exactly_once() {
        let mut cfg = config(2);
        cfg.contact_streams = random_every_step();
        let mut engine = EngineBuilder::new(cfg, crossing_pair(200), one_contact_course())
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        assert_eq!(engine.run(&mut rec), RunOutcome::Finished);

        let stats: Vec<_> = engine.shards().iter().map(|s| s.stats()).collect();
        let exported: u64 = stats.iter().map(|s| s.contacts_exported).sum();
        let imported: u64 = stats.iter().map(|s| s.contacts_imported).sum();
        let dispatched: u64 = stats.iter().map(|s| s.remote_contacts_dispatched).sum();
        assert!(exported >= 1);
        assert_eq!(exported, imported);
        assert_eq!(imported, dispatched);

        // Nothing is lost: every infection ran to recovery.
        assert_eq!(rec.total_new_infections(), engine.totals().recovered);
        let transfers: usize = rec.summaries.iter().map(|s| s.transfers).sum();
        assert_eq!(transfers as u64, exported);
    }

    #[test]
    fn full_distancing_stops_all_spread() {
        let mut cfg = config(2);
        cfg.initial_cases = 3;
        cfg.social_distance = 1.0;
        cfg.contact_streams.family = ep_core::StreamSpec::Off;
        let mut engine = EngineBuilder::new(cfg, grid_population(4, 100, 2), SwineFlu)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let rounds = engine.run_rounds(1000, &mut rec);
        assert!(rounds < 1000);
        assert!(engine.is_finished());
        assert_eq!(engine.totals().recovered, 3);
        assert_eq!(rec.total_new_infections(), 3);
        assert!(rec.summaries.iter().all(|s| s.transfers == 0));
    }

    #[test]
    fn counters_partition_every_place_throughout() {
        let mut engine = EngineBuilder::new(config(2), grid_population(6, 150, 2), SwineFlu)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        engine.run_rounds(25, &mut rec);

        assert!(!rec.logs.is_empty());
        for entry in &rec.logs {
            let c = entry.sample.counts;
            assert_eq!(c.by_contagiousness(), 150, "{entry:?}");
            assert_eq!(c.by_symptoms(), 150, "{entry:?}");
        }
        for summary in &rec.summaries {
            assert_eq!(summary.totals.by_contagiousness(), 900);
            for shard in &summary.shards {
                assert_eq!(shard.counts.by_symptoms(), 450);
            }
        }
    }

    #[test]
    fn vaccination_fires_once_at_the_first_log_update() {
        let mut cfg = config(1);
        cfg.contact_streams = ContactStreamsConfig::all_off();
        cfg.vaccination = Some(VaccinationPolicy { fraction: 1.0, recovered_threshold: 0 });
        let mut engine = EngineBuilder::new(cfg, grid_population(2, 60, 1), SwineFlu)
            .build()
            .unwrap();
        engine.run(&mut NoopObserver);

        assert_eq!(engine.totals().susceptible, 0);
        assert_eq!(engine.totals().recovered, 120);
        let seeded = engine.place(PlaceId(0)).unwrap().record();
        assert_eq!(seeded.vaccinated_at, Some(Tick(97)));
        assert_eq!(seeded.vaccinated, 59);
        assert_eq!(engine.place(PlaceId(1)).unwrap().record().vaccinated, 60);
    }

    #[test]
    fn pause_stops_at_a_round_boundary_and_resumes() {
        let mut cfg = config(1);
        cfg.contact_streams = ContactStreamsConfig::all_off();
        let mut engine = EngineBuilder::new(cfg, grid_population(2, 40, 1), SwineFlu)
            .build()
            .unwrap();
        let handle = engine.pause_handle();
        handle.store(true, std::sync::atomic::Ordering::Relaxed);

        let mut rec = Recorder::default();
        assert_eq!(engine.run(&mut rec), RunOutcome::Paused);
        assert_eq!(engine.round(), 0);
        assert_eq!(rec.ended, 0);

        engine.resume();
        assert_eq!(engine.run(&mut rec), RunOutcome::Finished);
        assert_eq!(rec.ended, 1);

        // Already finished: no further rounds and no second end callback.
        assert_eq!(engine.run(&mut rec), RunOutcome::Finished);
        assert_eq!(engine.run_rounds(5, &mut rec), 0);
        assert_eq!(rec.ended, 1);
    }

    #[test]
    fn results_do_not_depend_on_the_worker_pool() {
        let run = |pool: usize| {
            let mut engine = EngineBuilder::new(config(4), grid_population(8, 150, 4), SwineFlu)
                .pool_threads(pool)
                .build()
                .unwrap();
            let mut rec = Recorder::default();
            engine.run_rounds(20, &mut rec);
            (rec.summaries, rec.logs, engine.totals())
        };
        let single = run(1);
        let wide = run(4);
        assert_eq!(single.0, wide.0);
        assert_eq!(single.1, wide.1);
        assert_eq!(single.2, wide.2);
        assert!(single.0.iter().any(|s| s.new_infections > 0));
    }

    #[test]
    fn same_run_number_same_epidemic() {
        let run = |run_number: u64| {
            let mut cfg = config(2);
            cfg.run_number = run_number;
            let mut engine = EngineBuilder::new(cfg, grid_population(4, 200, 2), SwineFlu)
                .build()
                .unwrap();
            let mut rec = Recorder::default();
            engine.run_rounds(15, &mut rec);
            rec.logs
        };
        assert_eq!(run(3), run(3));
    }
}

// ── Contact kinds and interventions ───────────────────────────────────────────

#[cfg(test)]
mod contact_kinds {
    use ep_core::{AgentId, ContactStreamsConfig, PlaceId, StreamSpec, Tick};
    use ep_disease::{AgeCohort, ContactType, Disease, DiseaseState};
    use ep_population::{ContactInfo, ContactTarget};

    use super::support::*;
    use crate::{EngineBuilder, OffThreadContactRecord, RunOutcome, ThreadManager};

    /// Contagious for one day after ten ticks; every contact infects.
    fn sure_thing() -> ShortCourse {
        ShortCourse { incubation: 10, period: 100, base: 1.0 }
    }

    fn only(kind: ContactType, per_day: f64) -> ContactStreamsConfig {
        let mut streams = ContactStreamsConfig::all_off();
        let spec = StreamSpec::Poisson { per_day };
        match kind {
            ContactType::Random => streams.random = spec,
            ContactType::Repeatable => streams.repeatable = spec,
            ContactType::Family => streams.family = spec,
        }
        streams
    }

    /// Agents of `cohort` in `place` that were ever infected.
    fn touched<D: Disease>(engine: &ThreadManager<D>, place: PlaceId, cohort: AgeCohort) -> usize {
        let group = engine.place(place).unwrap().group();
        (0..group.len())
            .map(|i| AgentId(i as u32))
            .filter(|&a| {
                group.age_cohort(a) == cohort && group.disease_state(a) != DiseaseState::Susceptible
            })
            .count()
    }

    /// One place on one shard with a seeded adult, plus a contagious child
    /// contact delivered at tick 5 so exactly one child starts infected.
    /// Returns `(children, adults)` ever infected once the run is over.
    fn single_place_run(kind: ContactType, schools_closed: bool) -> (usize, usize) {
        let mut cfg = config(1);
        cfg.contact_streams = only(kind, 20.0);
        cfg.schools_closed = schools_closed;
        let mut engine = EngineBuilder::new(cfg, grid_population(1, 400, 1), sure_thing())
            .build()
            .unwrap();

        let child_contact = OffThreadContactRecord {
            time:   Tick(5),
            place:  PlaceId(0),
            target: ContactTarget::Anyone,
            info:   ContactInfo::new(AgeCohort::Child, DiseaseState::ContagiousAsymptomatic, kind),
            round:  0,
        };
        engine.shards[0].import(vec![child_contact], 1);

        let mut rec = Recorder::default();
        assert_eq!(engine.run(&mut rec), RunOutcome::Finished);
        assert_eq!(engine.totals().infected(), 0);
        (
            touched(&engine, PlaceId(0), AgeCohort::Child),
            touched(&engine, PlaceId(0), AgeCohort::Adult),
        )
    }

    #[test]
    fn closed_schools_keep_children_from_random_contacts() {
        let (children, adults) = single_place_run(ContactType::Random, true);
        assert_eq!(children, 1);
        assert!(adults > 10, "only {adults} adults infected");

        let (children, _) = single_place_run(ContactType::Random, false);
        assert!(children > 1, "open schools spread to {children} children");
    }

    #[test]
    fn closed_schools_keep_children_from_repeatable_contacts() {
        let (children, adults) = single_place_run(ContactType::Repeatable, true);
        assert_eq!(children, 1);
        assert!(adults > 10, "only {adults} adults infected");

        let (children, _) = single_place_run(ContactType::Repeatable, false);
        assert!(children > 1, "open schools spread to {children} children");
    }

    #[test]
    fn repeatable_contacts_stay_in_the_home_place_and_cohort() {
        let mut cfg = config(2);
        cfg.contact_streams = only(ContactType::Repeatable, 20.0);
        let mut engine = EngineBuilder::new(cfg, grid_population(4, 200, 2), sure_thing())
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        assert_eq!(engine.run(&mut rec), RunOutcome::Finished);

        assert_eq!(touched(&engine, PlaceId(0), AgeCohort::Child), 0);
        let adults = touched(&engine, PlaceId(0), AgeCohort::Adult);
        assert!(adults > 10, "only {adults} adults infected");
        for place in [PlaceId(1), PlaceId(2), PlaceId(3)] {
            assert_eq!(engine.place(place).unwrap().counts().susceptible, 200, "{place}");
        }

        assert_eq!(rec.total_new_infections() as usize, adults);
        assert!(rec.summaries.iter().all(|s| s.transfers == 0));
        assert!(engine.shards().iter().all(|s| s.stats().contacts_exported == 0));
    }
}
