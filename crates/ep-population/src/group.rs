//! `AgentGroup` — the population of one place.
//!
//! # Layout
//!
//! Per agent the group stores three bytes, structure-of-arrays style:
//!
//! ```text
//! age[i]            AgeCohort code
//! state[i]          DiseaseState code
//! family_offset[i]  distance back to the head of i's household
//! ```
//!
//! Households are contiguous, so `i - family_offset[i]` is the head and the
//! household runs until the next agent whose offset is zero.
//!
//! Infected agents additionally own an [`AgentEvent`] in a sparse map keyed
//! by `AgentId`.  The map holds exactly the agents that are infected: entries
//! are created on exposure and dropped the moment the agent recovers.
//!
//! # Counters
//!
//! Six running counters are kept in step with every state change and never
//! recomputed by scanning.  They form two orthogonal partitions of the group:
//!
//! ```text
//! susceptible + contagious  + non_contagious + recovered == len
//! susceptible + symptomatic + asymptomatic   + recovered == len
//! ```

use ep_core::{AgentId, EpError, EpResult, PlaceId, PlaceRng};
use ep_disease::{AgeCohort, ContactType, DiseaseState};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::agent_event::AgentEvent;
use crate::contact::{AgentSchedule, ContactCtx, ContactInfo, ContactOutcome, ContactTarget};
use crate::household::{HouseholdFactory, MAX_HOUSEHOLD_SIZE};

/// Smallest population a place may have.  Random-target draws need room to
/// find someone other than the contactor.
pub const MIN_PLACE_POPULATION: usize = 11;

// ── GroupCounts ───────────────────────────────────────────────────────────────

/// Running disease-state counters of one group.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct GroupCounts {
    pub susceptible:    u32,
    pub contagious:     u32,
    pub non_contagious: u32,
    pub symptomatic:    u32,
    pub asymptomatic:   u32,
    pub recovered:      u32,
}

impl GroupCounts {
    /// Agents currently carrying the disease.
    #[inline]
    pub fn infected(&self) -> u32 {
        self.contagious + self.non_contagious
    }

    /// Size of the group according to the contagiousness partition.
    #[inline]
    pub fn by_contagiousness(&self) -> u32 {
        self.susceptible + self.contagious + self.non_contagious + self.recovered
    }

    /// Size of the group according to the symptom partition.
    #[inline]
    pub fn by_symptoms(&self) -> u32 {
        self.susceptible + self.symptomatic + self.asymptomatic + self.recovered
    }

    /// Element-wise sum, used for shard and global totals.
    pub fn accumulate(&mut self, other: &GroupCounts) {
        self.susceptible    += other.susceptible;
        self.contagious     += other.contagious;
        self.non_contagious += other.non_contagious;
        self.symptomatic    += other.symptomatic;
        self.asymptomatic   += other.asymptomatic;
        self.recovered      += other.recovered;
    }

    fn enter(&mut self, state: DiseaseState) {
        self.shift(state, true);
    }

    fn leave(&mut self, state: DiseaseState) {
        self.shift(state, false);
    }

    fn shift(&mut self, state: DiseaseState, up: bool) {
        use DiseaseState::*;
        match state {
            Susceptible => step(&mut self.susceptible, up, "susceptible"),
            NoncontagiousAsymptomatic => {
                step(&mut self.non_contagious, up, "non_contagious");
                step(&mut self.asymptomatic, up, "asymptomatic");
            }
            NoncontagiousSymptomatic => {
                step(&mut self.non_contagious, up, "non_contagious");
                step(&mut self.symptomatic, up, "symptomatic");
            }
            ContagiousSymptomatic => {
                step(&mut self.contagious, up, "contagious");
                step(&mut self.symptomatic, up, "symptomatic");
            }
            ContagiousAsymptomatic => {
                step(&mut self.contagious, up, "contagious");
                step(&mut self.asymptomatic, up, "asymptomatic");
            }
            Recovered => step(&mut self.recovered, up, "recovered"),
            Dead => panic!("no counter tracks DEAD agents"),
        }
    }
}

#[inline]
fn step(counter: &mut u32, up: bool, name: &str) {
    if up {
        *counter += 1;
    } else {
        *counter = counter
            .checked_sub(1)
            .unwrap_or_else(|| panic!("{name} counter would go negative"));
    }
}

// ── AgentGroup ────────────────────────────────────────────────────────────────

pub struct AgentGroup {
    place:          PlaceId,
    age:            Vec<u8>,
    state:          Vec<u8>,
    family_offset:  Vec<u8>,
    /// Members of each cohort, indexed by `AgeCohort::code()`.
    by_cohort:      [Vec<AgentId>; 2],
    counts:         GroupCounts,
    new_infections: u32,
    vaccinated:     bool,
    events:         FxHashMap<AgentId, AgentEvent>,
}

impl AgentGroup {
    /// Build a fully susceptible group of exactly `size` agents, household by
    /// household.  A household that would overflow the group is redrawn.
    ///
    /// # Errors
    /// Fails when `size` is below [`MIN_PLACE_POPULATION`].
    pub fn new(
        place:   PlaceId,
        size:    usize,
        factory: &mut impl HouseholdFactory,
        rng:     &mut PlaceRng,
    ) -> EpResult<Self> {
        if size < MIN_PLACE_POPULATION {
            return Err(EpError::config(format!(
                "{place} has {size} agents; at least {MIN_PLACE_POPULATION} are required"
            )));
        }
        if u32::try_from(size).is_err() {
            return Err(EpError::config(format!("{place} has too many agents ({size})")));
        }

        let mut age = Vec::with_capacity(size);
        let mut family_offset = Vec::with_capacity(size);
        let mut household = Vec::with_capacity(MAX_HOUSEHOLD_SIZE);

        while age.len() < size {
            factory.draw_household(rng, &mut household);
            assert!(
                (1..=MAX_HOUSEHOLD_SIZE).contains(&household.len()),
                "household factory produced {} members",
                household.len()
            );
            if household.len() > size - age.len() {
                continue;
            }
            for (k, cohort) in household.iter().enumerate() {
                age.push(cohort.code());
                family_offset.push(k as u8);
            }
        }

        let mut by_cohort = [Vec::new(), Vec::new()];
        for (i, &code) in age.iter().enumerate() {
            by_cohort[code as usize].push(AgentId(i as u32));
        }

        Ok(Self {
            place,
            age,
            state: vec![DiseaseState::Susceptible.code(); size],
            family_offset,
            by_cohort,
            counts: GroupCounts { susceptible: size as u32, ..GroupCounts::default() },
            new_infections: 0,
            vaccinated: false,
            events: FxHashMap::default(),
        })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn place(&self) -> PlaceId {
        self.place
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.age.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }

    #[inline]
    pub fn counts(&self) -> GroupCounts {
        self.counts
    }

    #[inline]
    pub fn disease_state(&self, agent: AgentId) -> DiseaseState {
        DiseaseState::from_code(self.state[agent.index()])
    }

    #[inline]
    pub fn age_cohort(&self, agent: AgentId) -> AgeCohort {
        AgeCohort::from_code(self.age[agent.index()])
    }

    #[inline]
    pub fn family_offset(&self, agent: AgentId) -> usize {
        self.family_offset[agent.index()] as usize
    }

    /// Number of people in `agent`'s household, the agent included.
    pub fn family_size(&self, agent: AgentId) -> usize {
        let head = agent.index() - self.family_offset(agent);
        1 + self.family_offset[head + 1..]
            .iter()
            .take_while(|&&offset| offset > 0)
            .count()
    }

    #[inline]
    pub fn has_family(&self, agent: AgentId) -> bool {
        self.family_size(agent) > 1
    }

    /// All members of one cohort, in index order.
    #[inline]
    pub fn cohort_members(&self, cohort: AgeCohort) -> &[AgentId] {
        &self.by_cohort[cohort.code() as usize]
    }

    /// How `agent` presents itself when contacting someone.
    #[inline]
    pub fn contact_info(&self, agent: AgentId, kind: ContactType) -> ContactInfo {
        ContactInfo::new(self.age_cohort(agent), self.disease_state(agent), kind)
    }

    /// A uniformly random member of `cohort`, or `None` if it has none.
    pub fn random_person(&self, cohort: AgeCohort, rng: &mut PlaceRng) -> Option<AgentId> {
        let members = self.cohort_members(cohort);
        (!members.is_empty()).then(|| members[rng.index(members.len())])
    }

    /// A uniformly random member of `cohort` other than `except`.
    pub fn random_other(
        &self,
        cohort: AgeCohort,
        except: AgentId,
        rng:    &mut PlaceRng,
    ) -> Option<AgentId> {
        let members = self.cohort_members(cohort);
        let eligible = members.len() - members.binary_search(&except).map_or(0, |_| 1);
        if eligible == 0 {
            return None;
        }
        loop {
            let pick = members[rng.index(members.len())];
            if pick != except {
                return Some(pick);
            }
        }
    }

    // ── Event table ───────────────────────────────────────────────────────

    /// Copy of the compound event of an infected agent.
    #[inline]
    pub fn event(&self, agent: AgentId) -> Option<AgentEvent> {
        self.events.get(&agent).copied()
    }

    /// Write back an event after dispatch.
    ///
    /// # Panics
    /// Panics if `agent` is not infected.
    pub fn store_event(&mut self, agent: AgentId, event: AgentEvent) {
        let state = self.disease_state(agent);
        assert!(state.is_infected(), "{agent} in {} is {state:?} and cannot hold an event", self.place);
        self.events.insert(agent, event);
    }

    /// Number of agents holding a compound event.
    #[inline]
    pub fn active_events(&self) -> usize {
        self.events.len()
    }

    /// Infected agents and their events, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = (AgentId, &AgentEvent)> + '_ {
        self.events.iter().map(|(&a, e)| (a, e))
    }

    /// Infections since the last call.
    pub fn take_new_infections(&mut self) -> u32 {
        std::mem::take(&mut self.new_infections)
    }

    // ── State changes ─────────────────────────────────────────────────────

    /// Move `agent` to `new`, keeping the counters in step.  Recovery drops
    /// the agent's compound event from the table.
    ///
    /// # Panics
    /// Panics on a transition no disease course can produce: back to
    /// SUSCEPTIBLE, out of RECOVERED or DEAD, into DEAD, or to the state the
    /// agent is already in.
    pub fn set_disease_state(&mut self, agent: AgentId, new: DiseaseState) {
        let old = self.disease_state(agent);
        if old == new
            || new == DiseaseState::Susceptible
            || new == DiseaseState::Dead
            || matches!(old, DiseaseState::Recovered | DiseaseState::Dead)
        {
            panic!("illegal transition {old:?} -> {new:?} for {agent} in {}", self.place);
        }

        self.counts.leave(old);
        self.counts.enter(new);
        self.state[agent.index()] = new.code();

        if new == DiseaseState::Recovered {
            self.events.remove(&agent);
        }
        self.debug_check_counts();
    }

    /// Infect a susceptible agent at the current time and file its compound
    /// event.
    ///
    /// # Panics
    /// Panics unless `agent` is SUSCEPTIBLE.
    pub fn expose(&mut self, agent: AgentId, ctx: &mut ContactCtx<'_>) {
        let state = self.disease_state(agent);
        if state != DiseaseState::Susceptible {
            panic!("cannot expose {agent} in {}: already {state:?}", self.place);
        }
        self.set_disease_state(agent, DiseaseState::NoncontagiousAsymptomatic);
        self.new_infections += 1;

        let event = AgentEvent::draw(
            ctx.now(),
            self.has_family(agent),
            ctx.disease,
            ctx.streams,
            ctx.rng,
        );
        self.file(agent, event, ctx.schedule);
    }

    /// Expose a random susceptible adult.  Returns `None` when every adult is
    /// already infected or recovered.
    pub fn expose_random_adult(&mut self, ctx: &mut ContactCtx<'_>) -> Option<AgentId> {
        let adults = self.cohort_members(AgeCohort::Adult);
        let any_susceptible = adults
            .iter()
            .any(|&a| self.disease_state(a) == DiseaseState::Susceptible);
        if !any_susceptible {
            return None;
        }
        let adults = AgeCohort::Adult.code() as usize;
        loop {
            let n = self.by_cohort[adults].len();
            let pick = self.by_cohort[adults][ctx.rng.index(n)];
            if self.disease_state(pick) == DiseaseState::Susceptible {
                self.expose(pick, ctx);
                return Some(pick);
            }
        }
    }

    /// Contact a random household-mate of `agent` with family intimacy.
    ///
    /// # Panics
    /// Panics if `agent` lives alone.
    pub fn family_contact(&mut self, agent: AgentId, ctx: &mut ContactCtx<'_>) -> ContactOutcome {
        let size = self.family_size(agent);
        assert!(size > 1, "{agent} in {} has no household-mates", self.place);

        let head = agent.index() - self.family_offset(agent);
        let target = loop {
            let pick = AgentId((head + ctx.rng.index(size)) as u32);
            if pick != agent {
                break pick;
            }
        };
        let info = self.contact_info(agent, ContactType::Family);
        self.contact(ContactTarget::Agent(target), info, ctx)
    }

    /// Apply one contact from a contagious agent to a member of this group.
    ///
    /// A susceptible target is infected with probability
    /// `intimacy * base_infectiousness`.  An infected target whose recorded
    /// exposure is later than now has its exposure moved back to now.
    pub fn contact(
        &mut self,
        target: ContactTarget,
        info:   ContactInfo,
        ctx:    &mut ContactCtx<'_>,
    ) -> ContactOutcome {
        if !info.state.is_contagious() {
            return ContactOutcome::NotContagious;
        }

        let resolved = match target {
            ContactTarget::Agent(a) => Some(a),
            ContactTarget::AnyoneBut(me) => self.random_other(info.age, me, ctx.rng),
            ContactTarget::Anyone => self.random_person(info.age, ctx.rng),
        };
        let Some(target) = resolved else {
            return ContactOutcome::NoTarget;
        };

        let state = self.disease_state(target);
        if state == DiseaseState::Susceptible {
            if ctx.rng.uniform() < info.transmission_probability(ctx.disease) {
                self.expose(target, ctx);
                ContactOutcome::Infected(target)
            } else {
                ContactOutcome::Escaped(target)
            }
        } else if state.is_infected() && self.correct_exposure(target, ctx) {
            ContactOutcome::Corrected(target)
        } else {
            ContactOutcome::NoEffect(target)
        }
    }

    /// One-shot mass vaccination: each susceptible agent independently moves
    /// to RECOVERED with probability `fraction`.  Later calls do nothing.
    /// Returns the number of agents vaccinated.
    pub fn vaccinate(&mut self, fraction: f64, rng: &mut PlaceRng) -> u32 {
        if self.vaccinated {
            return 0;
        }
        self.vaccinated = true;

        let mut count = 0;
        for i in 0..self.len() {
            let agent = AgentId(i as u32);
            if self.disease_state(agent) == DiseaseState::Susceptible && rng.uniform() < fraction {
                self.set_disease_state(agent, DiseaseState::Recovered);
                count += 1;
            }
        }
        count
    }

    #[inline]
    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn file(&mut self, agent: AgentId, mut event: AgentEvent, schedule: &mut dyn AgentSchedule) {
        let key = schedule.insert(self.place, agent, event.time());
        event.set_key(Some(key));
        self.events.insert(agent, event);
    }

    /// Restart the infection of `agent` from now if now precedes its recorded
    /// exposure.  The old queue entry is withdrawn, the course is redrawn and
    /// the agent goes back to the first infected state.
    fn correct_exposure(&mut self, agent: AgentId, ctx: &mut ContactCtx<'_>) -> bool {
        let now = ctx.now();
        let current = match self.events.get(&agent) {
            Some(e) => *e,
            None => panic!("infected {agent} in {} has no compound event", self.place),
        };
        if now >= current.exposed_at() {
            return false;
        }

        if let Some(key) = current.key() {
            ctx.schedule.remove(key);
        }
        if self.disease_state(agent) != DiseaseState::NoncontagiousAsymptomatic {
            self.set_disease_state(agent, DiseaseState::NoncontagiousAsymptomatic);
        }
        let event = current.redraw_from(now, ctx.disease, ctx.streams, ctx.rng);
        self.file(agent, event, ctx.schedule);
        true
    }

    fn debug_check_counts(&self) {
        debug_assert_eq!(
            self.counts.by_contagiousness() as usize,
            self.len(),
            "contagiousness partition broken in {}",
            self.place
        );
        debug_assert_eq!(
            self.counts.by_symptoms() as usize,
            self.len(),
            "symptom partition broken in {}",
            self.place
        );
    }
}
