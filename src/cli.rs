use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "stroop-session",
    version,
    about = "Run the two-phase Stroop interference test in a terminal"
)]
pub struct Cli {
    /// JSON file with the word and color phase activities.
    #[arg(long, env = "STROOP_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-lines file results are appended to.
    #[arg(long, env = "STROOP_STORE", default_value = "stroop-results.jsonl")]
    pub store: PathBuf,

    /// Participant the results are stored under.
    #[arg(long, env = "STROOP_USER", default_value = "local")]
    pub user: String,

    /// Overrides the duration of both phases, in seconds.
    #[arg(long)]
    pub duration: Option<u32>,

    /// Seeds stimulus generation for a reproducible sequence.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Length of one countdown tick in milliseconds.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
