use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;
use clap::{error::ErrorKind, Parser, ValueEnum};
use tracing::info;

use crate::config::PipelineConfig;
use crate::constants::ranking::DEFAULT_MIN_CASES;
use crate::constants::report::{DEFAULT_OUTPUT_DIR, DEFAULT_PREFIX};
use crate::data::Channel;
use crate::pipeline::Pipeline;
use crate::source::load_json_lines;
use crate::store::{FileReportStore, ReportStore};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Sms,
    Call,
}

impl From<ChannelArg> for Channel {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Sms => Channel::Sms,
            ChannelArg::Call => Channel::Call,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "rep_scorecard",
    version,
    disable_help_subcommand = true,
    about = "Score outreach representatives and publish a versioned report",
    long_about = "Join a message table with a case-outcome table (JSON Lines), validate the join, score message quality, rank actors by a weighted composite, and write a versioned Markdown report plus JSON data dump.",
    after_help = "Set RUST_LOG (e.g. RUST_LOG=debug) to adjust log verbosity."
)]
struct ScorecardCli {
    #[arg(long, value_name = "PATH", help = "Message table, one JSON object per line")]
    messages: PathBuf,
    #[arg(long, value_name = "PATH", help = "Outcome table, one JSON object per line")]
    outcomes: PathBuf,
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        help = "Directory receiving versioned reports"
    )]
    output_dir: PathBuf,
    #[arg(
        long,
        default_value = DEFAULT_PREFIX,
        help = "File name prefix for reports and data dumps"
    )]
    prefix: String,
    #[arg(
        long = "min-cases",
        default_value_t = DEFAULT_MIN_CASES,
        help = "Minimum distinct cases an actor needs to be ranked"
    )]
    min_cases: usize,
    #[arg(
        long,
        value_enum,
        default_value = "sms",
        help = "Rubric for messages without a channel value"
    )]
    channel: ChannelArg,
    #[arg(long = "dry-run", help = "Print the report instead of writing files")]
    dry_run: bool,
}

/// Install the global `tracing` subscriber, honoring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the scorecard CLI with `args_iter` (program name excluded).
pub fn run_scorecard<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<ScorecardCli, _>(std::iter::once("rep_scorecard".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };
    init_tracing();

    let mut config = PipelineConfig {
        min_cases: cli.min_cases,
        default_channel: cli.channel.into(),
        ..PipelineConfig::default()
    };
    config.versioning.prefix = cli.prefix.into();
    let pipeline = Pipeline::new(config)?;

    let datasets = load_json_lines(&cli.messages, &cli.outcomes, pipeline.config())?;
    let run = pipeline.run_datasets(&datasets)?;
    let mut store = FileReportStore::new(&cli.output_dir);
    let generated_at = Utc::now();

    if cli.dry_run {
        let rendered = pipeline.preview(&run, &store, generated_at)?;
        info!(
            "[scorecard:app] dry run; v{} not written to {}",
            rendered.context.version,
            store.root().display()
        );
        println!("{}", rendered.markdown);
        return Ok(());
    }

    let saved = pipeline.publish(&run, &mut store, generated_at)?;
    println!("Report saved: {}", saved.report.display());
    println!("Data saved: {}", saved.data.display());
    println!("Version: {}", saved.version);
    if let Ok(names) = store.existing_names() {
        info!("[scorecard:app] {} file(s) now in output directory", names.len());
    }
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::vec::IntoIter<String> {
        list.iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn defaults_apply_when_flags_are_omitted() {
        let cli = parse_cli::<ScorecardCli, _>(
            std::iter::once("rep_scorecard".to_string())
                .chain(args(&["--messages", "m.jsonl", "--outcomes", "o.jsonl"])),
        )
        .unwrap()
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("reports"));
        assert_eq!(cli.prefix, "rep_scorecard");
        assert_eq!(cli.min_cases, 100);
        assert_eq!(Channel::from(cli.channel), Channel::Sms);
        assert!(!cli.dry_run);
    }

    #[test]
    fn help_exits_cleanly() {
        assert!(run_scorecard(args(&["--help"])).is_ok());
    }

    #[test]
    fn missing_required_flags_are_errors() {
        assert!(run_scorecard(args(&["--messages", "m.jsonl"])).is_err());
    }
}
