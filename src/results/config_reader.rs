use crate::results::io_common::ElectionCounts;
use crate::results::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The maximum number of decimals in percentages.
const MAX_DECIMAL_PLACES: u32 = 6;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "electionId")]
    pub election_id: Option<String>,
    #[serde(rename = "electionTitle")]
    pub election_title: Option<String>,
    #[serde(rename = "electionDate")]
    pub election_date: Option<String>,
    #[serde(rename = "jurisdiction")]
    pub jurisdiction: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

/// The configuration as it is written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub election: String,
    pub title: Option<String>,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    #[serde(rename = "firstDataRowIndex")]
    pub _first_data_row_index: Option<JSValue>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            worksheet_name: None,
            _first_data_row_index: None,
        }
    }

    /// The index (starting at 1) of the first row with results. Defaults to 2, the
    /// first row being a header.
    pub fn first_data_row_index(&self) -> ResResult<usize> {
        let x = read_js_int("firstDataRowIndex", &self._first_data_row_index)?.unwrap_or(2);
        ensure!(
            x >= 1,
            ParsingJsonNumberSnafu {
                field: "firstDataRowIndex"
            }
        );
        Ok(x as usize)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "decimalPlaces")]
    pub decimal_places: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "fileSources", default)]
    pub file_sources: Vec<FileSource>,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(rename = "registeredVoters")]
    pub registered_voters: Option<JSValue>,
    #[serde(rename = "ballotsCast")]
    pub ballots_cast: Option<JSValue>,
}

impl TallyConfig {
    pub fn election_counts(&self) -> ResResult<ElectionCounts> {
        Ok(ElectionCounts {
            registered_voters: read_js_int("registeredVoters", &self.registered_voters)?,
            ballots_cast: read_js_int("ballotsCast", &self.ballots_cast)?,
        })
    }
}

pub fn read_config(path: &str) -> ResResult<TallyConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: TallyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ResResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

pub fn validate_rules(rules: &RulesConfig) -> ResResult<TallyRules> {
    let tiebreak_mode = match rules.tiebreak_mode.as_deref() {
        None | Some("allTied") => TieBreakMode::AllTied,
        Some("useCandidateOrder") => TieBreakMode::UseCandidateOrder,
        Some("noWinner") => TieBreakMode::NoWinner,
        Some("random") => {
            let seed = match rules.random_seed.as_ref().map(|s| s.parse::<u32>()) {
                Some(Ok(x)) => x,
                x => {
                    whatever!("Cannot use tiebreak mode random with seed {:?}", x)
                }
            };
            TieBreakMode::Random(seed)
        }
        Some(x) => {
            whatever!("Cannot use tiebreak mode {:?}: not implemented", x)
        }
    };
    let decimal_places = match read_js_int("decimalPlaces", &rules.decimal_places)? {
        None => TallyRules::DEFAULT_RULES.decimal_places,
        Some(x) if x <= MAX_DECIMAL_PLACES as u64 => x as u32,
        Some(x) => {
            whatever!(
                "decimalPlaces may not be more than {}, but it was {}",
                MAX_DECIMAL_PLACES,
                x
            )
        }
    };
    Ok(TallyRules {
        tiebreak_mode,
        decimal_places,
    })
}

pub fn tiebreak_mode_label(mode: TieBreakMode) -> &'static str {
    match mode {
        TieBreakMode::AllTied => "allTied",
        TieBreakMode::UseCandidateOrder => "useCandidateOrder",
        TieBreakMode::Random(_) => "random",
        TieBreakMode::NoWinner => "noWinner",
    }
}

// Numbers may be written as JSON numbers or as strings.
fn read_js_int(field: &str, x: &Option<JSValue>) -> ResResult<Option<u64>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_rules() {
        let rules = validate_rules(&RulesConfig::default()).unwrap();
        assert_eq!(rules, TallyRules::DEFAULT_RULES);
    }

    #[test]
    fn random_rules() {
        let rc = RulesConfig {
            tiebreak_mode: Some("random".to_string()),
            random_seed: Some("17".to_string()),
            decimal_places: Some(json!("2")),
        };
        let rules = validate_rules(&rc).unwrap();
        assert_eq!(rules.tiebreak_mode, TieBreakMode::Random(17));
        assert_eq!(rules.decimal_places, 2);
    }

    #[test]
    fn invalid_rules() {
        let missing_seed = RulesConfig {
            tiebreak_mode: Some("random".to_string()),
            ..RulesConfig::default()
        };
        assert!(validate_rules(&missing_seed).is_err());

        let unknown = RulesConfig {
            tiebreak_mode: Some("stopCountingAndAsk".to_string()),
            ..RulesConfig::default()
        };
        assert!(validate_rules(&unknown).is_err());

        let too_precise = RulesConfig {
            decimal_places: Some(json!(9)),
            ..RulesConfig::default()
        };
        assert!(validate_rules(&too_precise).is_err());

        let negative = RulesConfig {
            decimal_places: Some(json!(-1)),
            ..RulesConfig::default()
        };
        assert!(matches!(
            validate_rules(&negative),
            Err(ResultsError::ParsingJsonNumber { .. })
        ));
    }

    #[test]
    fn parse_config() {
        let js = r#"{
            "outputSettings": {"electionId": "e1"},
            "fileSources": [{"provider": "csv", "filePath": "a.csv", "firstDataRowIndex": "3"}],
            "registeredVoters": "2500"
        }"#;
        let config: TallyConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.election_id, Some("e1".to_string()));
        assert_eq!(config.file_sources[0].first_data_row_index().unwrap(), 3);
        assert_eq!(config.rules, RulesConfig::default());
        let counts = config.election_counts().unwrap();
        assert_eq!(counts.registered_voters, Some(2500));
        assert_eq!(counts.ballots_cast, None);
    }

    #[test]
    fn first_data_row_default() {
        let fs = FileSource::new("csv", "a.csv");
        assert_eq!(fs.first_data_row_index().unwrap(), 2);
    }
}
