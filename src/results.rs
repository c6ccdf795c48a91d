use log::{debug, info, warn};

use result_tally::*;
use snafu::prelude::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::results::config_reader::*;
use crate::results::store::ResultStore;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod io_json;
pub mod store;

#[derive(Debug, Snafu)]
pub enum ResultsError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a non-negative integer for {field}"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line: {source}"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short: expected {} columns", io_common::NUM_COLUMNS))]
    LineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: could not read vote count {value:?}"))]
    InvalidVoteCount { lineno: usize, value: String },
    #[snafu(display("Invalid results for election {election}: {source}"))]
    InvalidResults {
        source: TallyErrors,
        election: String,
    },
    #[snafu(display("Election {election} is missing"))]
    MissingElection { election: String },
    #[snafu(display("Election {election} is defined more than once"))]
    DuplicateElection { election: String },
    #[snafu(display(
        "The inputs contain several elections ({elections}), select one with --election"
    ))]
    AmbiguousElection { elections: String },
    #[snafu(display("Provider not implemented {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ResResult<T> = Result<T, ResultsError>;

fn election_tally_to_json(et: &ElectionTally) -> JSValue {
    let mut positions: Vec<JSValue> = Vec::new();
    for pt in et.positions.iter() {
        let tally: Vec<JSValue> = pt
            .candidates
            .iter()
            .map(|c| {
                json!({
                    "candidate": c.id,
                    "name": c.name,
                    "votes": c.votes,
                    "percentage": c.percentage,
                    "isWinner": c.is_winner
                })
            })
            .collect();
        positions.push(json!({
            "position": pt.id,
            "title": pt.title,
            "totalVotes": pt.total_votes,
            "tiebreak": tiebreak_outcome_label(pt.tiebreak),
            "winners": pt.winners,
            "tally": tally
        }));
    }
    json!({
        "registeredVoters": et.registered_voters,
        "ballotsCast": et.ballots_cast,
        "turnoutPercentage": et.turnout_percentage,
        "positions": positions
    })
}

fn tiebreak_outcome_label(outcome: TiebreakOutcome) -> &'static str {
    match outcome {
        TiebreakOutcome::Clean => "clean",
        TiebreakOutcome::Shared => "shared",
        TiebreakOutcome::Resolved => "resolved",
        TiebreakOutcome::Unresolved => "unresolved",
    }
}

/// The summary of an election. An election without results has a null `results`.
fn build_summary_js(
    config: &TallyConfig,
    election_id: &str,
    rules: &TallyRules,
    et: Option<&ElectionTally>,
) -> JSValue {
    let c = OutputConfig {
        election: election_id.to_string(),
        title: config.output_settings.election_title.clone(),
        date: config.output_settings.election_date.clone(),
        jurisdiction: config.output_settings.jurisdiction.clone(),
        tiebreak_mode: tiebreak_mode_label(rules.tiebreak_mode).to_string(),
    };
    json!({
        "config": c,
        "results": et.map(election_tally_to_json)
    })
}

fn infer_input_type(path: &str) -> String {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("csv") => "csv".to_string(),
        Some("xlsx") => "xlsx".to_string(),
        _ => "json".to_string(),
    }
}

/// Reads the configuration, if any, and applies the command line flags on top of it.
/// Returns the configuration and the directory against which its paths are resolved.
fn load_config(args: &Args) -> ResResult<(TallyConfig, PathBuf)> {
    let (mut config, mut root_path) = match args.config.as_ref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (TallyConfig::default(), PathBuf::new()),
    };

    if let Some(input) = args.input.as_ref() {
        let provider = args
            .input_type
            .clone()
            .unwrap_or_else(|| infer_input_type(input));
        // Paths on the command line are relative to the working directory.
        config.file_sources = vec![FileSource::new(&provider, input)];
        root_path = PathBuf::new();
    } else if let Some(provider) = args.input_type.as_ref() {
        for cfs in config.file_sources.iter_mut() {
            cfs.provider = provider.clone();
        }
    }
    if let Some(name) = args.excel_worksheet_name.as_ref() {
        for cfs in config.file_sources.iter_mut() {
            cfs.worksheet_name = Some(name.clone());
        }
    }
    if let Some(election) = args.election.as_ref() {
        config.output_settings.election_id = Some(election.clone());
    }
    if let Some(mode) = args.tiebreak_mode.as_ref() {
        config.rules.tiebreak_mode = Some(mode.clone());
    }
    if let Some(seed) = args.random_seed.as_ref() {
        config.rules.random_seed = Some(seed.clone());
    }
    if let Some(dp) = args.decimal_places {
        config.rules.decimal_places = Some(json!(dp));
    }
    if let Some(x) = args.registered_voters {
        config.registered_voters = Some(json!(x));
    }
    if let Some(x) = args.ballots_cast {
        config.ballots_cast = Some(json!(x));
    }

    if config.file_sources.is_empty() {
        whatever!("No input: specify a file with --input or file sources with --config")
    }
    Ok((config, root_path))
}

// A relative output directory is resolved against the directory of the configuration.
fn write_summary(
    config: &TallyConfig,
    config_dir: &Path,
    election_id: &str,
    out: Option<&String>,
    pretty_js: &str,
) -> ResResult<()> {
    let out_path: Option<String> = match (out, config.output_settings.output_directory.as_ref()) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(dir)) => {
            let p: PathBuf = config_dir
                .join(dir)
                .join(format!("{}_summary.json", election_id));
            Some(p.display().to_string())
        }
        (None, None) => None,
    };
    match out_path.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            info!("Writing summary to {}", path);
            fs::write(path, pretty_js).context(WritingFileSnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(summary_path: &str, result_js: &JSValue, pretty_js: &str) -> ResResult<()> {
    let summary_ref = read_summary(summary_path)?;
    if summary_ref != *result_js {
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        warn!("Found differences with the reference summary {}", summary_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {}", summary_path);
    Ok(())
}

/// Runs a tally from the command line arguments.
///
/// Returns the tally of the selected election, or `None` when the inputs hold no
/// result for it.
pub fn run_tally(args: &Args) -> ResResult<Option<ElectionTally>> {
    let (config, root_path) = load_config(args)?;
    info!("config: {:?}", config);

    let rules = validate_rules(&config.rules)?;
    debug!("rules: {:?}", rules);
    let counts = config.election_counts()?;
    let store = ResultStore::load(&config, &root_path, &counts)?;

    let election_id = store.select(config.output_settings.election_id.as_deref())?;
    let tally = match store.get(&election_id) {
        Some(election) => Some(tally_election(election, &rules).context(InvalidResultsSnafu {
            election: election_id.clone(),
        })?),
        None => {
            warn!(
                "No results found for election {:?} (available: {:?})",
                election_id,
                store.ids()
            );
            None
        }
    };

    let result_js = build_summary_js(&config, &election_id, &rules, tally.as_ref());
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    let config_dir: PathBuf = args
        .config
        .as_ref()
        .and_then(|p| Path::new(p).parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    write_summary(
        &config,
        &config_dir,
        &election_id,
        args.out.as_ref(),
        &pretty_js,
    )?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_ref() {
        check_reference(summary_p, &result_js, &pretty_js)?;
    }

    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(name: &str) -> String {
        let test_dir =
            option_env!("ELTALLY_TEST_DIR").unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"));
        format!("{}/{}", test_dir, name)
    }

    fn test_wrapper(test_name: &str) -> ResResult<Option<ElectionTally>> {
        let _ = env_logger::builder().is_test(true).try_init();
        let args = Args {
            config: Some(test_path(&format!("{}/{}_config.json", test_name, test_name))),
            reference: Some(test_path(&format!(
                "{}/{}_expected_summary.json",
                test_name, test_name
            ))),
            ..Args::default()
        };
        run_tally(&args)
    }

    #[test]
    fn general_election() {
        let tally = test_wrapper("general_election").unwrap().unwrap();
        assert_eq!(tally.turnout_percentage, 73.4);
        assert_eq!(tally.positions[1].winners, vec!["eli".to_string()]);
    }

    #[test]
    fn city_council_csv() {
        let tally = test_wrapper("city_council_csv").unwrap().unwrap();
        assert_eq!(tally.id, "city-2024");
        assert_eq!(tally.positions[0].tiebreak, TiebreakOutcome::Resolved);
    }

    #[test]
    fn county_xlsx() {
        let tally = test_wrapper("county_xlsx").unwrap().unwrap();
        assert_eq!(tally.ballots_cast, 10000);
        assert_eq!(tally.positions[1].total_votes, 9820);
    }

    #[test]
    fn output_directory_next_to_config() {
        let config_dir = std::env::temp_dir().join("eltally_output_directory");
        fs::create_dir_all(config_dir.join("summaries")).unwrap();
        let mut config = TallyConfig::default();
        config.output_settings.output_directory = Some("summaries".to_string());
        write_summary(&config, &config_dir, "e1", None, "{}").unwrap();
        let written = fs::read_to_string(config_dir.join("summaries").join("e1_summary.json"));
        assert_eq!(written.unwrap(), "{}");
    }

    #[test]
    fn no_votes() {
        let tally = test_wrapper("no_votes").unwrap().unwrap();
        assert_eq!(tally.turnout_percentage, 0.0);
        assert!(tally.positions[0].winners.is_empty());
    }

    #[test]
    fn missing_election() {
        let args = Args {
            config: Some(test_path("general_election/general_election_config.json")),
            reference: Some(test_path("general_election/missing_expected_summary.json")),
            election: Some("by-election-2023".to_string()),
            ..Args::default()
        };
        assert!(run_tally(&args).unwrap().is_none());
    }

    #[test]
    fn reference_mismatch() {
        let args = Args {
            config: Some(test_path("general_election/general_election_config.json")),
            reference: Some(test_path(
                "city_council_csv/city_council_csv_expected_summary.json",
            )),
            ..Args::default()
        };
        assert!(matches!(
            run_tally(&args),
            Err(ResultsError::ReferenceMismatch {})
        ));
    }

    #[test]
    fn flags_override_config() {
        let args = Args {
            config: Some(test_path("city_council_csv/city_council_csv_config.json")),
            tiebreak_mode: Some("allTied".to_string()),
            decimal_places: Some(2),
            ..Args::default()
        };
        let tally = run_tally(&args).unwrap().unwrap();
        let ward_1 = &tally.positions[0];
        assert_eq!(ward_1.winners, vec!["ana".to_string(), "ben".to_string()]);
        assert_eq!(ward_1.candidates[2].percentage, 3.13);
        assert_eq!(tally.turnout_percentage, 53.33);
    }

    #[test]
    fn input_without_config() {
        let args = Args {
            input: Some(test_path("general_election/general_election_results.json")),
            ..Args::default()
        };
        let tally = run_tally(&args).unwrap().unwrap();
        assert_eq!(tally.id, "general-2024");
        assert_eq!(tally.positions[0].total_votes, 1834);
    }

    #[test]
    fn several_elections_need_a_selection() {
        let args = Args {
            input: Some(test_path("city_council_csv/city_council_csv_results.csv")),
            registered_voters: Some(1200),
            ..Args::default()
        };
        assert!(matches!(
            run_tally(&args),
            Err(ResultsError::AmbiguousElection { .. })
        ));

        let args = Args {
            election: Some("school-2024".to_string()),
            ..args
        };
        let tally = run_tally(&args).unwrap().unwrap();
        assert_eq!(tally.ballots_cast, 12);
        assert_eq!(tally.turnout_percentage, 1.0);
    }

    #[test]
    fn inconsistent_total() {
        let args = Args {
            input: Some(test_path("inconsistent_total/inconsistent_total_results.json")),
            ..Args::default()
        };
        assert!(matches!(
            run_tally(&args),
            Err(ResultsError::InvalidResults {
                source: TallyErrors::InconsistentTotal { .. },
                ..
            })
        ));
    }

    #[test]
    fn too_many_ballots() {
        let args = Args {
            input: Some(test_path("general_election/general_election_results.json")),
            input_type: Some("json".to_string()),
            ..Args::default()
        };
        assert!(run_tally(&args).is_ok());

        let args = Args {
            input: Some(test_path("city_council_csv/city_council_csv_results.csv")),
            election: Some("city-2024".to_string()),
            registered_voters: Some(500),
            ballots_cast: Some(640),
            ..Args::default()
        };
        assert!(matches!(
            run_tally(&args),
            Err(ResultsError::InvalidResults {
                source: TallyErrors::BallotsExceedRegistered { .. },
                ..
            })
        ));
    }

    #[test]
    fn unknown_input_type() {
        let args = Args {
            input: Some(test_path("general_election/general_election_results.json")),
            input_type: Some("xml".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            run_tally(&args),
            Err(ResultsError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn no_input() {
        assert!(run_tally(&Args::default()).is_err());
    }
}
