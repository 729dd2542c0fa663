//! `Shard` — one worker's places, event queue and outboxes.
//!
//! # Run phase
//!
//! [`Shard::run_to_barrier`] pops events in key order until it reaches its
//! own `Reconcile` event.  Everything it touches is owned by the shard apart
//! from the shared [`Scenario`], so shards run concurrently without locks.
//! Random contacts aimed at a place owned elsewhere are written to the
//! outbox of the owning shard instead of being applied.
//!
//! # Reconcile phase
//!
//! The manager drains every outbox with [`Shard::take_outboxes`] and hands
//! each shard its inbound records through [`Shard::import`].  Imported
//! records are queued at the time the contact was made, which can be earlier
//! than the shard's clock; dispatching them moves the clock back and may
//! correct exposures that were recorded too late.

use ep_core::{AgentId, Duration, EpResult, EventKey, PlaceId, PlaceRng, ShardId, Tick};
use ep_disease::{ContactType, Disease};
use ep_population::{
    AgentGroup, ContactCtx, ContactInfo, ContactTarget, GroupCounts, SubEvent, UsHouseholdMaker,
};
use tracing::{debug, trace};

use crate::{Event, EventQueue, LogEntry, OffThreadContactRecord, Place, PlaceSample, Scenario};

/// Every place writes its first log entry just before the end of day one.
const FIRST_LOG_DAYS: f64 = 0.975;

/// Running totals of what a shard has done.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ShardStats {
    pub events_dispatched:          u64,
    pub contacts_exported:          u64,
    pub contacts_imported:          u64,
    pub remote_contacts_dispatched: u64,
    pub vaccinated:                 u64,
}

pub struct Shard {
    id:       ShardId,
    /// Sorted by place id.
    places:   Vec<Place>,
    queue:    EventQueue,
    /// One buffer per destination shard.
    outboxes: Vec<Vec<OffThreadContactRecord>>,
    /// Exchange round of the current run phase.
    round:    u64,
    log:      Vec<LogEntry>,
    stats:    ShardStats,
}

impl Shard {
    /// Build the agent groups of every place `id` owns and queue their first
    /// log updates and the first barrier.
    pub(crate) fn build<D: Disease>(id: ShardId, scenario: &Scenario<D>) -> EpResult<Self> {
        let population = &scenario.population;
        let mut maker = UsHouseholdMaker;
        let mut places = Vec::new();
        for place in population.places_of(id) {
            let mut rng = PlaceRng::new(scenario.config.run_number, place);
            let size = population.population(place) as usize;
            let group = AgentGroup::new(place, size, &mut maker, &mut rng)?;
            places.push(Place::new(place, rng, group));
        }
        assert!(!places.is_empty(), "{id} owns no places");

        let mut queue = EventQueue::new();
        let first_log = Tick::ZERO + Duration::from_days_f64(FIRST_LOG_DAYS);
        for place in &places {
            queue.push(first_log, place.id, Event::LogUpdate);
        }
        queue.push(Tick::ZERO + scenario.config.reconcile_period(), places[0].id, Event::Reconcile);

        debug!(
            shard = id.0,
            places = places.len(),
            agents = places.iter().map(|p| p.group.len()).sum::<usize>(),
            "shard built"
        );
        Ok(Self {
            id,
            places,
            queue,
            outboxes: vec![Vec::new(); population.num_shards()],
            round: 0,
            log: Vec::new(),
            stats: ShardStats::default(),
        })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ShardId {
        self.id
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.queue.now()
    }

    #[inline]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.slot_of(id).map(|i| &self.places[i])
    }

    #[inline]
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    #[inline]
    pub fn stats(&self) -> ShardStats {
        self.stats
    }

    /// Agent and imported contact events still queued.
    #[inline]
    pub fn pending_work(&self) -> usize {
        self.queue.pending_work()
    }

    /// Records waiting in the outboxes.
    pub fn outbound(&self) -> usize {
        self.outboxes.iter().map(Vec::len).sum()
    }

    /// Sum of the counters of every owned place.
    pub fn counts(&self) -> GroupCounts {
        let mut total = GroupCounts::default();
        for place in &self.places {
            total.accumulate(&place.group.counts());
        }
        total
    }

    fn slot_of(&self, id: PlaceId) -> Option<usize> {
        self.places.binary_search_by_key(&id, |p| p.id).ok()
    }

    // ── Manager hooks ─────────────────────────────────────────────────────

    /// Expose up to `cases` random adults of `place`, which this shard must
    /// own.  Returns how many were exposed.
    pub(crate) fn seed_cases<D: Disease>(
        &mut self,
        place:    PlaceId,
        cases:    u32,
        scenario: &Scenario<D>,
    ) -> u32 {
        let slot = match self.slot_of(place) {
            Some(s) => s,
            None => panic!("{} asked to seed {place}, which it does not own", self.id),
        };
        let target = &mut self.places[slot];
        let mut ctx = ContactCtx::new(
            &mut target.rng,
            &scenario.disease,
            &scenario.streams,
            &mut self.queue,
        );
        let mut exposed = 0;
        for _ in 0..cases {
            if target.group.expose_random_adult(&mut ctx).is_none() {
                break;
            }
            exposed += 1;
        }
        exposed
    }

    /// Run phase: dispatch events until this shard's barrier is popped.
    ///
    /// # Panics
    /// Panics if the queue runs dry, which means the barrier was lost.
    pub fn run_to_barrier<D: Disease>(&mut self, round: u64, scenario: &Scenario<D>) {
        self.round = round;
        loop {
            let Some((key, event)) = self.queue.pop() else {
                panic!("{} ran out of events before its barrier", self.id);
            };
            self.queue.set_now(key.time);
            self.stats.events_dispatched += 1;

            let Some(slot) = self.slot_of(key.place) else {
                panic!("{} holds {event:?} for foreign {}", self.id, key.place);
            };
            match event {
                Event::Reconcile => {
                    trace!(shard = self.id.0, round, at = key.time.0, "reached barrier");
                    return;
                }
                Event::LogUpdate => self.log_update(slot, scenario),
                Event::Agent { agent } => self.dispatch_agent(slot, key, agent, scenario),
                Event::OffThreadContact { target, info, round: produced } => {
                    assert!(
                        produced < self.round,
                        "{} dispatched a contact from round {produced} during round {}",
                        self.id,
                        self.round
                    );
                    self.stats.remote_contacts_dispatched += 1;
                    self.apply_contact(slot, target, info, scenario);
                }
            }
        }
    }

    /// Queue the next barrier.
    pub(crate) fn arm_barrier(&mut self, at: Tick) {
        let anchor = self.places[0].id;
        self.queue.push(at, anchor, Event::Reconcile);
    }

    /// Hand over every outbox, leaving empty ones behind.  Index `i` of the
    /// result holds the records for shard `i`, in the order they were made.
    pub(crate) fn take_outboxes(&mut self) -> Vec<Vec<OffThreadContactRecord>> {
        let n = self.outboxes.len();
        std::mem::replace(&mut self.outboxes, vec![Vec::new(); n])
    }

    /// Queue contacts made on other shards.  `delivery_round` is the round in
    /// which they will be dispatched; every record must predate it.
    pub(crate) fn import(&mut self, records: Vec<OffThreadContactRecord>, delivery_round: u64) {
        for record in records {
            assert!(
                record.round < delivery_round,
                "record from round {} delivered in round {delivery_round}",
                record.round
            );
            assert!(
                self.slot_of(record.place).is_some(),
                "{} received a contact for foreign {}",
                self.id,
                record.place
            );
            self.queue.push(record.time, record.place, Event::OffThreadContact {
                target: record.target,
                info:   record.info,
                round:  record.round,
            });
            self.stats.contacts_imported += 1;
        }
    }

    /// Log entries written since the last call.
    pub(crate) fn take_log(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.log)
    }

    /// Infections across all places since the last call.
    pub(crate) fn take_new_infections(&mut self) -> u32 {
        self.places.iter_mut().map(|p| p.group.take_new_infections()).sum()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn dispatch_agent<D: Disease>(
        &mut self,
        slot:     usize,
        key:      EventKey,
        agent:    AgentId,
        scenario: &Scenario<D>,
    ) {
        let now = self.queue.now();
        let place_id = self.places[slot].id;
        let Some(mut event) = self.places[slot].group.event(agent) else {
            panic!("queued {agent} in {place_id} has no compound event");
        };
        debug_assert_eq!(event.key(), Some(key), "stale queue entry for {agent} in {place_id}");

        let which = event.due();
        match which {
            SubEvent::Disease => {
                let state = event.advance_disease();
                self.places[slot].group.set_disease_state(agent, state);
            }
            SubEvent::FamilyContact => {
                let place = &mut self.places[slot];
                let mut ctx = ContactCtx::new(
                    &mut place.rng,
                    &scenario.disease,
                    &scenario.streams,
                    &mut self.queue,
                );
                place.group.family_contact(agent, &mut ctx);
            }
            SubEvent::RandomContact => self.random_contact(slot, agent, scenario),
            SubEvent::RepeatableContact => {
                let place = &mut self.places[slot];
                let info = place.group.contact_info(agent, ContactType::Repeatable);
                let rng = &mut place.rng;
                if scenario.contact_allowed(info.age, || rng.uniform()) {
                    let mut ctx = ContactCtx::new(
                        &mut place.rng,
                        &scenario.disease,
                        &scenario.streams,
                        &mut self.queue,
                    );
                    place.group.contact(ContactTarget::AnyoneBut(agent), info, &mut ctx);
                }
            }
        }

        let place = &mut self.places[slot];
        if which != SubEvent::Disease {
            event.redraw_contact(which, now, &scenario.streams, &mut place.rng);
        }
        if !event.is_finished() {
            let key = self.queue.push(event.time(), place_id, Event::Agent { agent });
            event.set_key(Some(key));
            place.group.store_event(agent, event);
        }
    }

    fn random_contact<D: Disease>(&mut self, slot: usize, agent: AgentId, scenario: &Scenario<D>) {
        let origin = &mut self.places[slot];
        let info = origin.group.contact_info(agent, ContactType::Random);
        let rng = &mut origin.rng;
        if !scenario.contact_allowed(info.age, || rng.uniform()) {
            return;
        }

        let dest = scenario.population.random_destination(origin.id, origin.rng.uniform());
        if dest == origin.id {
            self.apply_contact(slot, ContactTarget::AnyoneBut(agent), info, scenario);
        } else if let Some(dest_slot) = self.slot_of(dest) {
            self.apply_contact(dest_slot, ContactTarget::Anyone, info, scenario);
        } else {
            let owner = scenario.population.owner(dest);
            trace!(shard = self.id.0, to = owner.0, place = dest.0, "contact leaves shard");
            self.outboxes[owner.index()].push(OffThreadContactRecord {
                time:   self.queue.now(),
                place:  dest,
                target: ContactTarget::Anyone,
                info,
                round:  self.round,
            });
            self.stats.contacts_exported += 1;
        }
    }

    /// Apply a contact to the group in `slot`, drawing from that place's RNG.
    fn apply_contact<D: Disease>(
        &mut self,
        slot:     usize,
        target:   ContactTarget,
        info:     ContactInfo,
        scenario: &Scenario<D>,
    ) {
        let place = &mut self.places[slot];
        let mut ctx = ContactCtx::new(
            &mut place.rng,
            &scenario.disease,
            &scenario.streams,
            &mut self.queue,
        );
        place.group.contact(target, info, &mut ctx);
    }

    fn log_update<D: Disease>(&mut self, slot: usize, scenario: &Scenario<D>) {
        let now = self.queue.now();
        let place = &mut self.places[slot];
        let counts = place.group.counts();
        let sample = PlaceSample { time: now, counts };
        place.record.samples.push(sample);
        self.log.push(LogEntry { place: place.id, shard: self.id, sample });

        if let Some(policy) = scenario.config.vaccination {
            if !place.group.is_vaccinated() && counts.recovered >= policy.recovered_threshold {
                let n = place.group.vaccinate(policy.fraction, &mut place.rng);
                place.record.vaccinated_at = Some(now);
                place.record.vaccinated = n;
                self.stats.vaccinated += n as u64;
                debug!(place = place.id.0, at = now.0, vaccinated = n, "place vaccinated");
            }
        }

        self.queue.push(now + scenario.config.log_period(), place.id, Event::LogUpdate);
    }
}
