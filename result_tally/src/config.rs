// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A contestant for a position, with the number of votes it received.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub votes: u64,
}

/// An electable office. The order of the candidates is the order in which
/// they are reported.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Position {
    pub id: String,
    pub title: String,
    pub candidates: Vec<Candidate>,
}

impl Position {
    /// The total number of votes for this position. It is always the sum of
    /// the votes of the candidates, capped at `u64::MAX`.
    pub fn total_votes(&self) -> u64 {
        self.candidates
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.votes))
    }
}

/// A read-only snapshot of the results of an election.
///
/// In most cases, it is easier to build it with the [`crate::builder::Builder`],
/// which checks the invariants.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub id: String,
    pub positions: Vec<Position>,
    pub registered_voters: u64,
    pub ballots_cast: u64,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct CandidateTally {
    pub id: String,
    pub name: String,
    pub votes: u64,
    pub percentage: f64,
    pub is_winner: bool,
}

/// How the top of a position was decided.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TiebreakOutcome {
    /// A single candidate had the highest count, or nobody voted.
    Clean,
    /// Several candidates shared the highest count and all of them won.
    Shared,
    /// Several candidates shared the highest count and the tiebreak picked one.
    Resolved,
    /// Several candidates shared the highest count and nobody won.
    Unresolved,
}

/// The tally of one position
#[derive(PartialEq, Debug, Clone)]
pub struct PositionTally {
    pub id: String,
    pub title: String,
    pub total_votes: u64,
    pub candidates: Vec<CandidateTally>,
    /// The identifiers of the winning candidates, in candidate order.
    pub winners: Vec<String>,
    pub tiebreak: TiebreakOutcome,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionTally {
    pub id: String,
    pub registered_voters: u64,
    pub ballots_cast: u64,
    pub turnout_percentage: f64,
    pub positions: Vec<PositionTally>,
}

/// Errors that prevent a snapshot from being built or tallied.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    EmptyIdentifier,
    MissingRegisteredVoters {
        election: String,
    },
    DuplicatePosition {
        position: String,
    },
    UnknownPosition {
        position: String,
    },
    DuplicateCandidate {
        position: String,
        candidate: String,
    },
    InconsistentTotal {
        position: String,
        declared: u64,
        counted: u64,
    },
    BallotsExceedRegistered {
        election: String,
        ballots_cast: u64,
        registered_voters: u64,
    },
    VoteCountOverflow {
        position: String,
    },
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyIdentifier => write!(f, "identifiers may not be empty"),
            TallyErrors::MissingRegisteredVoters { election } => write!(
                f,
                "election {}: the number of registered voters is missing",
                election
            ),
            TallyErrors::DuplicatePosition { position } => {
                write!(f, "position {} is defined more than once", position)
            }
            TallyErrors::UnknownPosition { position } => {
                write!(f, "position {} is not defined", position)
            }
            TallyErrors::DuplicateCandidate {
                position,
                candidate,
            } => write!(
                f,
                "candidate {} appears more than once in position {}",
                candidate, position
            ),
            TallyErrors::InconsistentTotal {
                position,
                declared,
                counted,
            } => write!(
                f,
                "position {}: declared total of {} votes but the candidates sum to {}",
                position, declared, counted
            ),
            TallyErrors::BallotsExceedRegistered {
                election,
                ballots_cast,
                registered_voters,
            } => write!(
                f,
                "election {}: {} ballots cast for only {} registered voters",
                election, ballots_cast, registered_voters
            ),
            TallyErrors::VoteCountOverflow { position } => write!(
                f,
                "position {}: the total number of votes does not fit in 64 bits",
                position
            ),
        }
    }
}

// ********* Configuration **********

/// What to do when several candidates share the highest vote count.
///
/// Winners are always decided on the vote counts, never on the rounded
/// percentages.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// All the tied candidates are winners.
    AllTied,
    /// The tied candidate listed first in the position wins.
    UseCandidateOrder,
    /// A deterministic draw between the tied candidates. It uses a
    /// cryptographic hash of the seed and the identifiers, so that the outcome
    /// is hard to guess in advance but can be reproduced by anyone.
    Random(u32),
    /// Nobody wins a tied position.
    NoWinner,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub tiebreak_mode: TieBreakMode,
    /// Number of decimals kept in the percentages.
    pub decimal_places: u32,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        tiebreak_mode: TieBreakMode::AllTied,
        decimal_places: 1,
    };
}

impl Default for TallyRules {
    fn default() -> Self {
        TallyRules::DEFAULT_RULES
    }
}
