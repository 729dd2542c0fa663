//! Small closed enums stored as one byte per agent.

use serde::{Deserialize, Serialize};

// ── DiseaseState ──────────────────────────────────────────────────────────────

/// Where an agent is in the course of the disease.
///
/// The discriminants are the byte codes stored in `AgentGroup`; do not
/// renumber them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiseaseState {
    Susceptible               = 0,
    NoncontagiousAsymptomatic = 1,
    NoncontagiousSymptomatic  = 2,
    ContagiousSymptomatic     = 3,
    ContagiousAsymptomatic    = 4,
    Recovered                 = 5,
    /// Reserved: no transition reaches it.
    Dead                      = 6,
}

impl DiseaseState {
    pub const ALL: [DiseaseState; 7] = [
        DiseaseState::Susceptible,
        DiseaseState::NoncontagiousAsymptomatic,
        DiseaseState::NoncontagiousSymptomatic,
        DiseaseState::ContagiousSymptomatic,
        DiseaseState::ContagiousAsymptomatic,
        DiseaseState::Recovered,
        DiseaseState::Dead,
    ];

    /// Decode a stored byte.
    ///
    /// # Panics
    /// Panics on a byte no state was ever encoded as; that means the columnar
    /// store is corrupt.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match Self::ALL.get(code as usize) {
            Some(&s) => s,
            None => panic!("invalid disease state code {code}"),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_infected(self) -> bool {
        matches!(
            self,
            DiseaseState::NoncontagiousAsymptomatic
                | DiseaseState::NoncontagiousSymptomatic
                | DiseaseState::ContagiousSymptomatic
                | DiseaseState::ContagiousAsymptomatic
        )
    }

    #[inline]
    pub fn is_symptomatic(self) -> bool {
        matches!(
            self,
            DiseaseState::NoncontagiousSymptomatic | DiseaseState::ContagiousSymptomatic
        )
    }

    #[inline]
    pub fn is_contagious(self) -> bool {
        matches!(
            self,
            DiseaseState::ContagiousSymptomatic | DiseaseState::ContagiousAsymptomatic
        )
    }
}

// ── AgeCohort ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum AgeCohort {
    Child = 0,
    Adult = 1,
}

impl AgeCohort {
    pub const ALL: [AgeCohort; 2] = [AgeCohort::Child, AgeCohort::Adult];

    /// # Panics
    /// Panics on an unknown byte code.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match Self::ALL.get(code as usize) {
            Some(&c) => c,
            None => panic!("invalid age cohort code {code}"),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

// ── ContactType ───────────────────────────────────────────────────────────────

/// The three contact behaviors.  Intimacy scales the per-contact chance of
/// transmission.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ContactType {
    Family,
    Random,
    Repeatable,
}

impl ContactType {
    #[inline]
    pub fn intimacy(self) -> f64 {
        match self {
            ContactType::Family     => 8.0,
            ContactType::Random     => 1.0,
            ContactType::Repeatable => 3.0,
        }
    }
}
