pub mod core;
pub mod corpus;
pub mod errors;
pub mod input;
pub mod output;
pub mod report;
pub mod simulation_time;

#[cfg(test)]
mod tests;

pub use crate::corpus::RunResults;
use crate::corpus::Corpus;
pub use crate::errors::PvBalanceError;
use crate::errors::OutputError;
use crate::input::{ingest_for_processing, Input};
use crate::output::Output;
use crate::report::write_report;
use std::io::Read;
use tracing::info;

/// Run a scenario read as JSON from `input`, writing its report to `output`.
pub fn run_project(input: impl Read, output: impl Output) -> Result<RunResults, PvBalanceError> {
    let input = ingest_for_processing(input)?;
    info!(
        simulation_year = input.simulation_year,
        seed = input.seed,
        "ingested scenario"
    );

    run_scenario(&input, output)
}

/// Run an already ingested scenario, writing its report to `output`.
pub fn run_scenario(input: &Input, output: impl Output) -> Result<RunResults, PvBalanceError> {
    let corpus = Corpus::from_inputs(input)?;
    let results = corpus.run()?;

    write_report(&output, &results, input)
        .map_err(|err| PvBalanceError::ErrorInOutput(OutputError::new(err)))?;

    Ok(results)
}
