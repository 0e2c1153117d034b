use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rootcause::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wgrdata::dump::DumpRequest;
use wgrdata::pipeline::Pipeline;

/// Extracts unit data from Wargame: Red Dragon table dumps into CSV.
#[derive(Parser, Debug)]
#[command(name = "wgrd", author, version, about, long_about = None)]
struct Args {
    /// Log at debug level. `RUST_LOG` takes precedence when set.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the table exporter over a game version's database
    Dump {
        /// The table exporter executable
        exporter: PathBuf,
        /// The game's data directory, e.g. `Data/WARGAME/PC`
        wargame: PathBuf,
        /// Version directory to dump
        version: Option<String>,
        /// Where `<version>/` is written
        #[clap(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Flatten the dumped tables into the raw unit dataset
    Export {
        /// Root of the dumps
        path: PathBuf,
        version: String,
        /// Root of the outputs
        output: PathBuf,
    },
    /// Clean a previously exported raw dataset into `final_data.csv`
    Clean {
        /// Root of the dumps, for localization
        path: PathBuf,
        version: String,
        /// Root of the outputs
        wargame: PathBuf,
    },
    /// Clean the raw FOB dataset
    Fobs {
        /// Root of the dumps
        path: PathBuf,
        version: String,
        /// Root of the outputs
        wargame: PathBuf,
        /// Append the FOBs to `final_data.csv` instead of writing `final_fobs.csv`
        #[clap(long)]
        combine: bool,
    },
    /// Export and clean in one go
    Run {
        /// Root of the dumps
        path: PathBuf,
        version: String,
        /// Root of the outputs
        output: PathBuf,
    },
}

fn pipeline(path: PathBuf, version: String, output: PathBuf) -> Pipeline {
    Pipeline::builder()
        .dump_root(path)
        .version(version)
        .output_root(output)
        .build()
}

fn dump(request: DumpRequest) -> Result<(), Report> {
    let pb = ProgressBar::new(request.tables().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let mut started = false;
    let result = request.run(|table| {
        if started {
            pb.inc(1);
        }
        started = true;
        pb.set_message(table.to_string());
    });
    if result.is_err() {
        pb.abandon();
    }
    let dir = result.context_with(|| {
        format!(
            "Could not dump {} from {}",
            request.version(),
            request.database_path().display()
        )
    })?;
    pb.inc(1);
    pb.finish_with_message("done");
    info!(dir = %dir.display(), "tables dumped");
    Ok(())
}

fn run(args: Args) -> Result<(), Report> {
    match args.command {
        Command::Dump {
            exporter,
            wargame,
            version,
            output,
        } => {
            let request = DumpRequest::builder()
                .exporter(exporter)
                .wargame(wargame)
                .maybe_version(version)
                .destination(output)
                .build();
            dump(request)?;
        }
        Command::Export {
            path,
            version,
            output,
        } => {
            let pipeline = pipeline(path, version, output);
            let units = pipeline
                .export()
                .context_with(|| format!("Could not export version {}", pipeline.version()))?;
            info!(units = units.len(), "export complete");
        }
        Command::Clean {
            path,
            version,
            wargame,
        } => {
            let pipeline = pipeline(path, version, wargame);
            pipeline.clean().context_with(|| {
                format!(
                    "Could not clean {}. Has `wgrd export` been run for it?",
                    pipeline.output_dir().display()
                )
            })?;
        }
        Command::Fobs {
            path,
            version,
            wargame,
            combine,
        } => {
            let pipeline = pipeline(path, version, wargame);
            pipeline
                .fobs(combine)
                .context_with(|| format!("Could not clean FOBs for {}", pipeline.version()))?;
        }
        Command::Run {
            path,
            version,
            output,
        } => {
            let pipeline = pipeline(path, version, output);
            pipeline
                .run()
                .context_with(|| format!("Could not process version {}", pipeline.version()))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report}");
            ExitCode::FAILURE
        }
    }
}
