use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use microsat::{ArgumentError, ConversionConfig, Converter, LocusConfig, OutputLayout, RngSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Convert ms output into linked microsatellite repeat lengths (single-step model).
///
/// Example: ms 10 5 -t 4.0 | microsat -a 30 -l 2 0.4 0.6 > msat.dat
#[derive(Parser, Debug)]
#[command(name = "microsat", version, about)]
struct Cli {
    /// Ancestral repeat count of every individual at every locus.
    #[arg(short = 'a', value_name = "ANC_STATE", default_value_t = 0, allow_negative_numbers = true)]
    ancestral_state: i64,

    /// Number of linked STRs followed by each STR's share of theta.
    #[arg(
        short = 'l',
        value_name = "N THETA",
        num_args = 1..,
        allow_negative_numbers = true
    )]
    linked: Option<Vec<String>>,

    /// Print one line per individual and close each replicate with `//`.
    #[arg(short = 'i')]
    individual: bool,

    /// Seed for the random stream (default: seeded from system entropy).
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Read ms output from a file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write repeat lengths to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log progress to stderr.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            return Err(ArgumentError::Usage(err.to_string().trim_end().to_string()))
                .context("invalid command line");
        }
    };

    init_tracing(cli.verbose);

    let config = build_config(&cli).context("invalid command line")?;
    let source = match cli.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open input {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create output {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = Converter::new(config)
        .run(reader, &mut writer, source)
        .context("conversion failed")?;

    info!(
        "{} of {} replicates converted\n{}",
        summary.replicates,
        summary.header.ms_datasets,
        summary.buffer_profile.report()
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<ConversionConfig, ArgumentError> {
    let loci = match &cli.linked {
        Some(values) => parse_loci(values)?,
        None => LocusConfig::single(),
    };
    let layout = if cli.individual {
        OutputLayout::PerIndividual
    } else {
        OutputLayout::Standard
    };

    Ok(ConversionConfig::default()
        .with_ancestral_state(cli.ancestral_state)
        .with_loci(loci)
        .with_layout(layout))
}

fn parse_loci(values: &[String]) -> Result<LocusConfig, ArgumentError> {
    let (count, thetas) = values
        .split_first()
        .ok_or(ArgumentError::MissingValue { flag: 'l' })?;
    let linked_n: i64 = count.parse().map_err(|_| ArgumentError::InvalidValue {
        flag: 'l',
        value: count.clone(),
    })?;

    let wanted = if linked_n == 1 { 0 } else { linked_n.max(0) as usize };
    if thetas.len() > wanted {
        warn!(
            ignored = thetas.len() - wanted,
            "more theta proportions than linked STRs"
        );
    }

    let thetas = thetas
        .iter()
        .take(wanted)
        .map(|value| {
            value.parse::<f64>().map_err(|_| ArgumentError::InvalidValue {
                flag: 'l',
                value: value.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    LocusConfig::from_request(linked_n, &thetas)
}
