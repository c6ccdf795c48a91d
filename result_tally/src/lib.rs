pub mod builder;
mod config;
pub mod manual;

use log::{debug, info};

use std::ops::{Add, AddAssign};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

// Additions saturate: a snapshot built without the builder may hold totals
// beyond u64.
impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(VoteCount::EMPTY, |acc, vc| acc + vc)
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0.saturating_add(rhs.0))
    }
}

/// The share of `part` in `total`, in percent, rounded to the given number of
/// decimals. A zero total gives a zero share.
pub fn percentage(part: u64, total: u64, decimal_places: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let scale = 10f64.powi(decimal_places as i32);
    (part as f64 * 100.0 * scale / total as f64).round() / scale
}

/// The ratio of ballots cast to registered voters, in percent.
pub fn turnout_percentage(registered_voters: u64, ballots_cast: u64, decimal_places: u32) -> f64 {
    percentage(ballots_cast, registered_voters, decimal_places)
}

/// Computes the share and the winner flag of every candidate of a position.
///
/// The candidates are returned in the same order as in the position.
pub fn tally_position(position: &Position, rules: &TallyRules) -> PositionTally {
    let counts: Vec<VoteCount> = position
        .candidates
        .iter()
        .map(|c| VoteCount(c.votes))
        .collect();
    let total: VoteCount = counts.iter().cloned().sum();
    debug!(
        "tally_position: position {:?}: {} candidates, total {:?}",
        position.id,
        counts.len(),
        total
    );

    let (winner_idxs, tiebreak) = find_winners(position, &counts, total, rules.tiebreak_mode);

    let candidates: Vec<CandidateTally> = position
        .candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| CandidateTally {
            id: c.id.clone(),
            name: c.name.clone(),
            votes: c.votes,
            percentage: percentage(c.votes, total.0, rules.decimal_places),
            is_winner: winner_idxs.contains(&idx),
        })
        .collect();

    let winners: Vec<String> = candidates
        .iter()
        .filter(|c| c.is_winner)
        .map(|c| c.id.clone())
        .collect();

    PositionTally {
        id: position.id.clone(),
        title: position.title.clone(),
        total_votes: total.0,
        candidates,
        winners,
        tiebreak,
    }
}

/// Tallies all the positions of an election and computes its turnout.
///
/// Fails if the snapshot reports more ballots than registered voters.
pub fn tally_election(
    election: &ElectionResult,
    rules: &TallyRules,
) -> Result<ElectionTally, TallyErrors> {
    info!(
        "Tallying election {:?}: {} positions, rules: {:?}",
        election.id,
        election.positions.len(),
        rules
    );
    if election.ballots_cast > election.registered_voters {
        return Err(TallyErrors::BallotsExceedRegistered {
            election: election.id.clone(),
            ballots_cast: election.ballots_cast,
            registered_voters: election.registered_voters,
        });
    }

    let mut positions: Vec<PositionTally> = Vec::new();
    for position in election.positions.iter() {
        let pt = tally_position(position, rules);
        info!(
            "Position {}: {} votes, winners: {:?} ({:?})",
            pt.id, pt.total_votes, pt.winners, pt.tiebreak
        );
        for c in pt.candidates.iter() {
            info!(
                "      {} {} ({}%){}",
                c.votes,
                c.name,
                c.percentage,
                if c.is_winner { " -> elected" } else { "" }
            );
        }
        positions.push(pt);
    }

    let turnout = turnout_percentage(
        election.registered_voters,
        election.ballots_cast,
        rules.decimal_places,
    );
    info!(
        "Turnout: {} of {} registered voters ({}%)",
        election.ballots_cast, election.registered_voters, turnout
    );

    Ok(ElectionTally {
        id: election.id.clone(),
        registered_voters: election.registered_voters,
        ballots_cast: election.ballots_cast,
        turnout_percentage: turnout,
        positions,
    })
}

// Returns the indices of the winners in the position, in candidate order.
fn find_winners(
    position: &Position,
    counts: &[VoteCount],
    total: VoteCount,
    tiebreak: TieBreakMode,
) -> (Vec<usize>, TiebreakOutcome) {
    // Nobody voted: nobody wins.
    if total == VoteCount::EMPTY {
        return (vec![], TiebreakOutcome::Clean);
    }
    let max_count: VoteCount = match counts.iter().max() {
        Some(x) => *x,
        None => return (vec![], TiebreakOutcome::Clean),
    };

    let leaders: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter_map(|(idx, vc)| if *vc == max_count { Some(idx) } else { None })
        .collect();
    debug!("find_winners: leaders: {:?} with {:?}", leaders, max_count);

    // No tiebreak, the logic below is not relevant.
    if leaders.len() == 1 {
        return (leaders, TiebreakOutcome::Clean);
    }

    match tiebreak {
        TieBreakMode::AllTied => (leaders, TiebreakOutcome::Shared),
        TieBreakMode::UseCandidateOrder => {
            // Leaders are already in candidate order.
            (vec![leaders[0]], TiebreakOutcome::Resolved)
        }
        TieBreakMode::Random(seed) => {
            let ordered = candidate_permutation_crypto(position, &leaders, seed);
            debug!(
                "find_winners: candidates in draw order using tiebreak mode random: {:?}",
                ordered
            );
            (ordered.into_iter().take(1).collect(), TiebreakOutcome::Resolved)
        }
        TieBreakMode::NoWinner => (vec![], TiebreakOutcome::Unresolved),
    }
}

/// Generates a "random" permutation of the given candidates. Random in this
/// context means hard to guess in advance. The digest covers the seed, the
/// position and the candidate, so that two positions with the same candidates
/// do not always break ties the same way.
fn candidate_permutation_crypto(position: &Position, idxs: &[usize], seed: u32) -> Vec<usize> {
    let mut data: Vec<(usize, String)> = idxs
        .iter()
        .map(|&idx| {
            let key = format!(
                "{:08}{}{}",
                seed, position.id, position.candidates[idx].id
            );
            (idx, sha256::digest(key.as_str()))
        })
        .collect();
    data.sort_by(|a, b| a.1.cmp(&b.1));
    data.into_iter().map(|p| p.0).collect()
}
