use std::fs::File;
use std::io::{self, Read, Write};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cnlist::config::Settings;
use cnlist::emit::{self, OutputFormat};
use cnlist::error::Error;
use cnlist::pipeline;
use cnlist::source::{self, SourceFormat};
use iprange::IntervalSet;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogOutputFormat {
    Json,
    Pretty,
}

/// Generate and query country IPv4 address tables.
#[derive(Debug, Parser)]
#[clap(name = "cnlist", version)]
struct CnlistArgs {
    /// Optional path to the configuration file. If not provided, the
    /// built-in defaults and `CNLIST_` environment variables are used.
    #[clap(short = 'c', long, global = true, required = false)]
    config: Option<PathBuf>,

    /// The format of the log output on stderr.
    #[clap(short = 'o', long = "output-format", global = true, default_value = "json")]
    output_format: Option<LogOutputFormat>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the address table from a feed and write it out.
    Generate {
        #[clap(flatten)]
        source: SourceArgs,

        /// The shape of the generated table.
        #[clap(long)]
        emit: Option<OutputFormat>,

        /// Where to write the table. Defaults to stdout.
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Report whether each address belongs to the table.
    Check {
        /// A JSON table written by `generate --emit json`. When absent the
        /// table is built from the feed.
        #[clap(
            long,
            conflicts_with_all = ["input", "format", "country", "merge", "no_merge"]
        )]
        table: Option<PathBuf>,

        #[clap(flatten)]
        source: SourceArgs,

        /// IPv4 addresses (dotted or integer) or IPv4-mapped IPv6 addresses.
        #[clap(required = true)]
        addresses: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// The feed to read. Defaults to stdin.
    #[clap(long)]
    input: Option<PathBuf>,

    /// The layout of the feed.
    #[clap(long)]
    format: Option<SourceFormat>,

    /// Keep only records attributed to this country.
    #[clap(long)]
    country: Option<String>,

    /// Merge overlapping and adjacent ranges.
    #[clap(long, overrides_with = "no_merge")]
    merge: bool,

    /// Reject overlapping ranges instead of merging them.
    #[clap(long, overrides_with = "merge")]
    no_merge: bool,
}

impl SourceArgs {
    /// Lays the command line flags over the loaded settings.
    fn apply(self, settings: &mut Settings) -> Result<(), Error> {
        if let Some(path) = self.input {
            settings.source.path = Some(path);
        }
        if let Some(format) = self.format {
            settings.source.format = format;
        }
        if let Some(country) = self.country {
            settings.source.country = country;
        }
        if self.merge {
            settings.normalize.merge = true;
        }
        if self.no_merge {
            settings.normalize.merge = false;
        }
        settings.validate()?;
        Ok(())
    }
}

fn main() -> ExitCode {
    let args = CnlistArgs::parse();

    let pretty = matches!(args.output_format, Some(LogOutputFormat::Pretty));
    cnlist::logging::setup_logging(cnlist::logging::DEFAULT_DIRECTIVES, pretty);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "cnlist failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CnlistArgs) -> Result<(), Error> {
    let mut settings = Settings::new(args.config)?;

    match args.command {
        Command::Generate { source, emit, output } => {
            source.apply(&mut settings)?;
            if let Some(format) = emit {
                settings.output.format = format;
            }
            if let Some(path) = output {
                settings.output.path = Some(path);
            }

            let set = build_from_source(&settings)?;
            match &settings.output.path {
                Some(path) => emit::write_table(&set, settings.output.format, path)?,
                None => emit::emit(&set, settings.output.format, io::stdout().lock())?,
            }
        }
        Command::Check { table, source, addresses } => {
            let set = match table {
                Some(path) => emit::load_table(File::open(path)?)?,
                None => {
                    source.apply(&mut settings)?;
                    build_from_source(&settings)?
                }
            };

            let mut stdout = io::stdout().lock();
            for address in &addresses {
                let member = contains(&set, address)?;
                writeln!(stdout, "{address}\t{member}")?;
            }
        }
    }

    Ok(())
}

fn build_from_source(settings: &Settings) -> Result<IntervalSet, Error> {
    let reader: Box<dyn Read> = match &settings.source.path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    pipeline::build_set(reader, settings.source.format, &settings.normalizer())
}

fn contains(set: &IntervalSet, address: &str) -> Result<bool, Error> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(set.contains_ip(ip)?);
    }
    let address = source::parse_address(address)
        .map_err(|_| Error::InvalidAddress(address.to_string()))?;
    Ok(set.contains(address))
}
