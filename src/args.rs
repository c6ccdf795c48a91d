use clap::Parser;

/// This is a tabulation program for election results.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the configuration of the tally, in JSON format.
    /// For more information about the file format, read the documentation of the manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of an election in JSON format. If provided, eltally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the file containing the election results. Setting this option overrides the
    /// file sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default json) The type of the input. One of json, csv, xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (identifier or empty) The election to tally. It is only required when the inputs contain several elections.
    #[clap(short, long, value_parser)]
    pub election: Option<String>,

    /// (default allTied) What to do when several candidates share the highest count:
    /// allTied, useCandidateOrder, random, noWinner.
    #[clap(long, value_parser)]
    pub tiebreak_mode: Option<String>,

    /// (integer) The seed of the random tiebreak mode.
    #[clap(long, value_parser)]
    pub random_seed: Option<String>,

    /// (default 1) The number of decimals kept in the percentages.
    #[clap(long, value_parser)]
    pub decimal_places: Option<u32>,

    /// (integer) The number of registered voters, for the inputs that do not include it.
    #[clap(long, value_parser)]
    pub registered_voters: Option<u64>,

    /// (integer) The number of ballots cast, for the inputs that do not include it.
    #[clap(long, value_parser)]
    pub ballots_cast: Option<u64>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
