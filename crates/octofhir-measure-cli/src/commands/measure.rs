use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_measure_client::{EvaluationClient, EvaluationOutcome, add_trailing_slash};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_statistic, print_warning};

/// What the caller should do after a command succeeded.
#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// The server answered with a client error; reported, not a failure.
    NoData(u16),
}

/// Absolute locations are kept, anything else is taken relative to `server`.
pub fn resolve_location(server: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        format!("{}{}", add_trailing_slash(server), location.trim_start_matches('/'))
    }
}

pub async fn evaluate(
    client: &EvaluationClient,
    location: &str,
    format: OutputFormat,
) -> Result<Completion> {
    let location = resolve_location(client.base_url(), location);
    let outcome = client
        .evaluate(&location)
        .await
        .with_context(|| format!("Evaluation of {location} failed"))?;

    match outcome {
        EvaluationOutcome::Statistic(stat) => {
            print_statistic(&stat, format)?;
            Ok(Completion::Done)
        }
        EvaluationOutcome::Error(err) => {
            print_warning(&format!(
                "No statistic for {location}: server answered {}",
                err.code
            ));
            Ok(Completion::NoData(err.code))
        }
    }
}

pub async fn subject_list(
    client: &EvaluationClient,
    location: &str,
    format: OutputFormat,
) -> Result<Completion> {
    let location = resolve_location(client.base_url(), location);
    let uri = client
        .create_subject_list(&location)
        .await
        .with_context(|| format!("Subject list creation for {location} failed"))?;

    match format {
        OutputFormat::Json => print_json(&json!({ "measure": location, "subjectList": uri }))?,
        OutputFormat::Table => println!("{}: {}", "Subject list".cyan(), uri),
    }
    Ok(Completion::Done)
}
