use std::collections::HashMap;
use std::path::Path;

use result_tally::builder::Builder;

use crate::results::*;

/// The election-wide counts that a source may not contain.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ElectionCounts {
    pub registered_voters: Option<u64>,
    pub ballots_cast: Option<u64>,
}

/// One row of a tabular source: the votes of one candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRow {
    pub lineno: usize,
    pub election: String,
    pub position: String,
    pub position_title: String,
    pub candidate: String,
    pub candidate_name: String,
    pub votes: u64,
}

pub const NUM_COLUMNS: usize = 6;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn parse_votes(lineno: usize, value: &str) -> ResResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .context(InvalidVoteCountSnafu { lineno, value })
}

/// Builds a row out of the cells of a line. An empty election cell falls back to
/// the given default, an empty candidate name to the candidate identifier.
pub fn make_row(lineno: usize, cells: &[String], default_election: &str) -> ResResult<ParsedRow> {
    ensure!(cells.len() >= NUM_COLUMNS, LineTooShortSnafu { lineno });
    let cell = |idx: usize| cells[idx].trim().to_string();
    let election = match cell(0) {
        s if s.is_empty() => default_election.to_string(),
        s => s,
    };
    let candidate = cell(3);
    let candidate_name = match cell(4) {
        s if s.is_empty() => candidate.clone(),
        s => s,
    };
    Ok(ParsedRow {
        lineno,
        election,
        position: cell(1),
        position_title: cell(2),
        candidate,
        candidate_name,
        votes: parse_votes(lineno, &cells[5])?,
    })
}

/// Groups the rows into elections, in the order in which the elections,
/// positions and candidates first appear.
pub fn assemble_elections(
    rows: &[ParsedRow],
    counts: &ElectionCounts,
) -> ResResult<Vec<ElectionResult>> {
    let mut order: Vec<String> = Vec::new();
    let mut builders: HashMap<String, Builder> = HashMap::new();

    for row in rows.iter() {
        debug!("assemble_elections: {:?}", row);
        if !builders.contains_key(&row.election) {
            let b = new_builder(&row.election, counts)?;
            builders.insert(row.election.clone(), b);
            order.push(row.election.clone());
        }
        let builder = builders
            .get_mut(&row.election)
            .context(MissingElectionSnafu {
                election: row.election.clone(),
            })?;
        if !builder.has_position(&row.position) {
            builder
                .add_position(&row.position, &row.position_title)
                .context(InvalidResultsSnafu {
                    election: row.election.clone(),
                })?;
        } else if builder.position_title(&row.position) != Some(row.position_title.as_str()) {
            warn!(
                "line {}: position {} has a different title {:?}, keeping the first one",
                row.lineno, row.position, row.position_title
            );
        }
        builder
            .add_candidate(
                &row.position,
                &row.candidate,
                &row.candidate_name,
                row.votes,
            )
            .context(InvalidResultsSnafu {
                election: row.election.clone(),
            })?;
    }

    let mut res: Vec<ElectionResult> = Vec::new();
    for election in order {
        let builder = builders
            .remove(&election)
            .context(MissingElectionSnafu {
                election: election.clone(),
            })?;
        res.push(builder.build().context(InvalidResultsSnafu { election })?);
    }
    Ok(res)
}

pub fn new_builder(election: &str, counts: &ElectionCounts) -> ResResult<Builder> {
    let mut b = Builder::new(election).context(InvalidResultsSnafu { election })?;
    if let Some(x) = counts.registered_voters {
        b = b.registered_voters(x);
    }
    if let Some(x) = counts.ballots_cast {
        b = b.ballots_cast(x);
    }
    Ok(b)
}
