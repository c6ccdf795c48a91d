use std::collections::HashMap;
use std::path::Path;

use crate::results::io_common::{assemble_elections, ElectionCounts};
use crate::results::*;

/// The election snapshots read from the inputs, keyed by election identifier.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    elections: HashMap<String, ElectionResult>,
    // Identifiers in loading order.
    ids: Vec<String>,
}

impl ResultStore {
    pub fn new() -> ResultStore {
        ResultStore::default()
    }

    /// Reads all the file sources of the configuration. Relative paths are resolved
    /// against `root_path`.
    pub fn load(
        config: &TallyConfig,
        root_path: &Path,
        counts: &ElectionCounts,
    ) -> ResResult<ResultStore> {
        let mut store = ResultStore::new();
        for cfs in config.file_sources.iter() {
            for election in read_source(root_path, cfs, counts)? {
                store.insert(election)?;
            }
        }
        info!("Loaded {} elections: {:?}", store.len(), store.ids());
        Ok(store)
    }

    pub fn insert(&mut self, election: ElectionResult) -> ResResult<()> {
        ensure!(
            !self.elections.contains_key(&election.id),
            DuplicateElectionSnafu {
                election: election.id.clone()
            }
        );
        self.ids.push(election.id.clone());
        self.elections.insert(election.id.clone(), election);
        Ok(())
    }

    /// The snapshot of an election, or `None` if no result exists for it.
    pub fn get(&self, election_id: &str) -> Option<&ElectionResult> {
        self.elections.get(election_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Chooses the election to report: the requested one if any, otherwise the
    /// only election of the store.
    pub fn select(&self, requested: Option<&str>) -> ResResult<String> {
        if let Some(id) = requested {
            return Ok(id.to_string());
        }
        match self.ids.as_slice() {
            [id] => Ok(id.clone()),
            [] => {
                whatever!("No election found in the inputs")
            }
            l => AmbiguousElectionSnafu {
                elections: l.join(", "),
            }
            .fail(),
        }
    }
}

fn read_source(
    root_path: &Path,
    cfs: &FileSource,
    counts: &ElectionCounts,
) -> ResResult<Vec<ElectionResult>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read results file {:?}", p2);
    match cfs.provider.as_str() {
        "json" => io_json::read_json(&p2, counts),
        "csv" => {
            let rows = io_csv::read_csv_results(&p2, cfs)?;
            assemble_elections(&rows, counts)
        }
        "xlsx" => {
            let rows = io_excel::read_excel_results(&p2, cfs)?;
            assemble_elections(&rows, counts)
        }
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election(id: &str) -> ElectionResult {
        ElectionResult {
            id: id.to_string(),
            positions: vec![],
            registered_voters: 10,
            ballots_cast: 3,
        }
    }

    #[test]
    fn lookup() {
        let mut store = ResultStore::new();
        store.insert(election("e1")).unwrap();
        store.insert(election("e2")).unwrap();
        assert_eq!(store.get("e2").map(|e| e.ballots_cast), Some(3));
        assert!(store.get("e3").is_none());
        assert_eq!(store.ids(), &["e1".to_string(), "e2".to_string()]);
        assert!(matches!(
            store.insert(election("e1")),
            Err(ResultsError::DuplicateElection { .. })
        ));
    }

    #[test]
    fn selection() {
        let mut store = ResultStore::new();
        assert!(store.select(None).is_err());
        store.insert(election("e1")).unwrap();
        assert_eq!(store.select(None).unwrap(), "e1");
        assert_eq!(store.select(Some("other")).unwrap(), "other");
        store.insert(election("e2")).unwrap();
        assert!(matches!(
            store.select(None),
            Err(ResultsError::AmbiguousElection { .. })
        ));
        assert_eq!(store.select(Some("e2")).unwrap(), "e2");
    }

    #[test]
    fn unknown_provider() {
        let config = TallyConfig {
            file_sources: vec![FileSource::new("dominion", "x.json")],
            ..TallyConfig::default()
        };
        let res = ResultStore::load(&config, Path::new("."), &ElectionCounts::default());
        assert!(matches!(res, Err(ResultsError::UnknownProvider { .. })));
    }
}
