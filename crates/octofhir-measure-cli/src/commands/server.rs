use anyhow::Result;
use colored::Colorize;
use octofhir_measure_client::{CapabilityInfo, EvaluationClient, UNKNOWN_VERSION};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_warning};

pub async fn version(client: &EvaluationClient, format: OutputFormat) -> Result<()> {
    let info = CapabilityInfo {
        software_version: client.get_version().await,
    };
    let version = info.software_version.as_str();
    if version == UNKNOWN_VERSION {
        print_warning(&format!("Could not read the version of {}", client.base_url()));
    }

    match format {
        OutputFormat::Json => print_json(&json!({
            "server": client.base_url(),
            "version": version,
            "userAgent": info.user_agent(),
        }))?,
        OutputFormat::Table => {
            println!("{}: {}", "Server".cyan(), client.base_url());
            println!("{}: {}", "Version".cyan(), version);
            println!("{}: {}", "User agent".cyan(), info.user_agent());
        }
    }
    Ok(())
}
