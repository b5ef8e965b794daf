extern crate pv_balance;

use clap::Parser;
use pv_balance::input::ingest_for_processing;
use pv_balance::output::{FileOutput, SinkOutput};
use pv_balance::report::headline_figures;
use pv_balance::run_scenario;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct PvBalanceArgs {
    /// JSON scenario to simulate
    input_file: String,
    /// Directory to write the report files to (defaults to the directory of the input file)
    #[arg(long, short)]
    output_dir: Option<PathBuf>,
    /// Seed to use instead of the one in the scenario
    #[arg(long, short)]
    seed: Option<u64>,
    /// Only print the headline figures, without writing any report files
    #[arg(long, default_value_t = false)]
    summary_only: bool,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = PvBalanceArgs::parse();

    let input_file = Path::new(args.input_file.as_str());
    let input_file_stem = input_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("scenario");

    let mut input = ingest_for_processing(BufReader::new(File::open(input_file)?))?;
    if let Some(seed) = args.seed {
        input.seed = seed;
    }

    let results = if args.summary_only {
        run_scenario(&input, SinkOutput)?
    } else {
        let output_dir = args.output_dir.unwrap_or_else(|| {
            input_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        });
        println!("writing out to {}", output_dir.display());
        run_scenario(
            &input,
            FileOutput::new(output_dir, format!("{input_file_stem}__{{}}.{{}}")),
        )?
    };

    for (label, value) in headline_figures(&results) {
        println!("{label}: {value}");
    }

    Ok(())
}
