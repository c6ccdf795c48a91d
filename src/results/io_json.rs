// Election snapshots in JSON format.

use serde::{Deserialize, Serialize};

use crate::results::io_common::{new_builder, ElectionCounts};
use crate::results::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCandidate {
    pub id: String,
    pub name: String,
    pub votes: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPosition {
    pub id: String,
    pub title: String,
    #[serde(rename = "totalVotes")]
    pub total_votes: Option<u64>,
    pub candidates: Vec<SnapshotCandidate>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotElection {
    pub id: String,
    #[serde(rename = "registeredVoters")]
    pub registered_voters: Option<u64>,
    #[serde(rename = "ballotsCast")]
    pub ballots_cast: Option<u64>,
    pub positions: Vec<SnapshotPosition>,
}

// A file holds either one election or a list of them.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<SnapshotElection>),
    One(SnapshotElection),
}

pub fn read_json(path: &str, counts: &ElectionCounts) -> ResResult<Vec<ElectionResult>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let snapshots = parse_snapshots(contents.as_str())?;
    info!("read_json: {} elections in {}", snapshots.len(), path);
    let mut res: Vec<ElectionResult> = Vec::new();
    for snapshot in snapshots.iter() {
        res.push(snapshot_to_election(snapshot, counts)?);
    }
    Ok(res)
}

pub fn parse_snapshots(contents: &str) -> ResResult<Vec<SnapshotElection>> {
    let parsed: SnapshotFile = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    Ok(match parsed {
        SnapshotFile::Many(l) => l,
        SnapshotFile::One(e) => vec![e],
    })
}

/// The counts of the snapshot take precedence over the ones of the configuration.
pub fn snapshot_to_election(
    snapshot: &SnapshotElection,
    counts: &ElectionCounts,
) -> ResResult<ElectionResult> {
    let election = snapshot.id.clone();
    let merged = ElectionCounts {
        registered_voters: snapshot.registered_voters.or(counts.registered_voters),
        ballots_cast: snapshot.ballots_cast.or(counts.ballots_cast),
    };
    let mut builder = new_builder(&snapshot.id, &merged)?;
    for p in snapshot.positions.iter() {
        builder
            .add_position(&p.id, &p.title)
            .context(InvalidResultsSnafu {
                election: election.clone(),
            })?;
        for c in p.candidates.iter() {
            builder
                .add_candidate(&p.id, &c.id, &c.name, c.votes)
                .context(InvalidResultsSnafu {
                    election: election.clone(),
                })?;
        }
        if let Some(declared) = p.total_votes {
            builder
                .check_position_total(&p.id, declared)
                .context(InvalidResultsSnafu {
                    election: election.clone(),
                })?;
        }
    }
    builder.build().context(InvalidResultsSnafu { election })
}
