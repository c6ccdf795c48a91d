pub use crate::config::*;

/// A builder for election result snapshots.
///
/// The builder checks the invariants of the snapshot: unique identifiers,
/// totals that match the candidates, and no more ballots than registered voters.
///
/// ```
/// pub use result_tally::builder::Builder;
/// # use result_tally::TallyErrors;
///
/// let mut builder = Builder::new("general-2024")?.registered_voters(2500);
///
/// builder.add_position("mayor", "Mayor")?;
/// builder.add_candidate("mayor", "anna", "Anna", 892)?;
/// builder.add_candidate("mayor", "bob", "Bob", 654)?;
/// builder.check_position_total("mayor", 1546)?;
///
/// let election = builder.ballots_cast(1600).build()?;
/// assert_eq!(election.positions[0].total_votes(), 1546);
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _id: String,
    pub(crate) _registered_voters: Option<u64>,
    pub(crate) _ballots_cast: Option<u64>,
    pub(crate) _positions: Vec<Position>,
}

impl Builder {
    pub fn new(election_id: &str) -> Result<Builder, TallyErrors> {
        if election_id.is_empty() {
            return Err(TallyErrors::EmptyIdentifier);
        }
        Ok(Builder {
            _id: election_id.to_string(),
            _registered_voters: None,
            _ballots_cast: None,
            _positions: Vec::new(),
        })
    }

    pub fn registered_voters(self, count: u64) -> Builder {
        Builder {
            _registered_voters: Some(count),
            ..self
        }
    }

    /// Sets the number of ballots cast.
    ///
    /// If it is never set, the largest position total is used instead: every
    /// ballot counts at most once in a position.
    pub fn ballots_cast(self, count: u64) -> Builder {
        Builder {
            _ballots_cast: Some(count),
            ..self
        }
    }

    pub fn add_position(&mut self, id: &str, title: &str) -> Result<(), TallyErrors> {
        if id.is_empty() {
            return Err(TallyErrors::EmptyIdentifier);
        }
        if self.has_position(id) {
            return Err(TallyErrors::DuplicatePosition {
                position: id.to_string(),
            });
        }
        self._positions.push(Position {
            id: id.to_string(),
            title: title.to_string(),
            candidates: Vec::new(),
        });
        Ok(())
    }

    pub fn has_position(&self, id: &str) -> bool {
        self._positions.iter().any(|p| p.id == id)
    }

    pub fn position_title(&self, id: &str) -> Option<&str> {
        self._positions
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.title.as_str())
    }

    /// Adds a candidate at the end of an existing position.
    pub fn add_candidate(
        &mut self,
        position_id: &str,
        candidate_id: &str,
        name: &str,
        votes: u64,
    ) -> Result<(), TallyErrors> {
        if candidate_id.is_empty() {
            return Err(TallyErrors::EmptyIdentifier);
        }
        let position = self.position_mut(position_id)?;
        if position.candidates.iter().any(|c| c.id == candidate_id) {
            return Err(TallyErrors::DuplicateCandidate {
                position: position_id.to_string(),
                candidate: candidate_id.to_string(),
            });
        }
        let counted: Option<u64> = position
            .candidates
            .iter()
            .try_fold(votes, |acc, c| acc.checked_add(c.votes));
        if counted.is_none() {
            return Err(TallyErrors::VoteCountOverflow {
                position: position_id.to_string(),
            });
        }
        position.candidates.push(Candidate {
            id: candidate_id.to_string(),
            name: name.to_string(),
            votes,
        });
        Ok(())
    }

    /// Checks a total reported by the source against the sum of the votes
    /// added so far for this position.
    pub fn check_position_total(&self, position_id: &str, declared: u64) -> Result<(), TallyErrors> {
        let position = self
            ._positions
            .iter()
            .find(|p| p.id == position_id)
            .ok_or_else(|| TallyErrors::UnknownPosition {
                position: position_id.to_string(),
            })?;
        let counted = position.total_votes();
        if counted != declared {
            return Err(TallyErrors::InconsistentTotal {
                position: position_id.to_string(),
                declared,
                counted,
            });
        }
        Ok(())
    }

    pub fn build(self) -> Result<ElectionResult, TallyErrors> {
        let registered_voters =
            self._registered_voters
                .ok_or_else(|| TallyErrors::MissingRegisteredVoters {
                    election: self._id.clone(),
                })?;
        let ballots_cast = match self._ballots_cast {
            Some(x) => x,
            None => self
                ._positions
                .iter()
                .map(|p| p.total_votes())
                .max()
                .unwrap_or(0),
        };
        if ballots_cast > registered_voters {
            return Err(TallyErrors::BallotsExceedRegistered {
                election: self._id,
                ballots_cast,
                registered_voters,
            });
        }
        Ok(ElectionResult {
            id: self._id,
            positions: self._positions,
            registered_voters,
            ballots_cast,
        })
    }

    fn position_mut(&mut self, position_id: &str) -> Result<&mut Position, TallyErrors> {
        self._positions
            .iter_mut()
            .find(|p| p.id == position_id)
            .ok_or_else(|| TallyErrors::UnknownPosition {
                position: position_id.to_string(),
            })
    }
}
