mod cli;
mod commands;
mod config;
mod observability;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use octofhir_measure_client::{EvaluationClient, MeasureClientConfig};

use cli::{Cli, Commands, OutputFormat};
use commands::measure::Completion;
use config::ProfileConfig;
use output::print_error;

/// Exit code when the server answered the evaluation with a client error.
const EXIT_NO_DATA: i32 = 2;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(Completion::Done) => {}
        Ok(Completion::NoData(_)) => std::process::exit(EXIT_NO_DATA),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<Completion> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    let config_path = config::config_path()?;
    let profile = config::load_profile(&config_path, &cli.profile)?;
    let format = resolve_format(cli.format, &profile);

    match &cli.command {
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), cli.profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    profile.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    profile.format.as_deref().unwrap_or("json")
                );
                println!(
                    "{}: {}",
                    "Timeout".cyan(),
                    profile
                        .timeout_ms
                        .map_or_else(|| "(default)".to_string(), |ms| format!("{ms} ms"))
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut updated = profile.clone();
                config::set_key(&mut updated, &set_args.key, &set_args.value)?;
                config::save_profile(&config_path, &cli.profile, &updated)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Version => {
            let client = make_client(&cli, &profile)?;
            commands::server::version(&client, format).await?;
        }
        Commands::Evaluate(args) => {
            let client = make_client(&cli, &profile)?;
            return commands::measure::evaluate(&client, &args.location, format).await;
        }
        Commands::SubjectList(args) => {
            let client = make_client(&cli, &profile)?;
            return commands::measure::subject_list(&client, &args.location, format).await;
        }
    }

    Ok(Completion::Done)
}

fn resolve_format(flag: Option<OutputFormat>, profile: &ProfileConfig) -> OutputFormat {
    flag.or_else(|| {
        profile
            .format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    })
    .unwrap_or_default()
}

fn make_client(cli: &Cli, profile: &ProfileConfig) -> Result<EvaluationClient> {
    let server = config::resolve_server(&cli.server, profile)?;
    let mut config = MeasureClientConfig::new(server);
    if let Some(ms) = cli.timeout_ms.or(profile.timeout_ms) {
        config = config.with_request_timeout(Duration::from_millis(ms));
    }
    tracing::debug!(
        profile = %cli.profile,
        server = %config.base_url,
        timeout_ms = config.request_timeout_ms,
        "Using measure server"
    );
    Ok(EvaluationClient::new(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_client_prefers_flags_over_profile() {
        let cli = Cli::parse_from([
            "octofhir-measure",
            "--server",
            "http://flag/fhir",
            "--timeout-ms",
            "1500",
            "version",
        ]);
        let profile = ProfileConfig {
            server: Some("http://profile/fhir".to_string()),
            format: Some("table".to_string()),
            timeout_ms: Some(9000),
        };

        let client = make_client(&cli, &profile).unwrap();
        assert_eq!(client.base_url(), "http://flag/fhir");
        assert_eq!(client.config().request_timeout_ms, 1500);
    }

    #[test]
    fn test_resolve_format_falls_back_to_profile() {
        let profile = ProfileConfig {
            format: Some("table".to_string()),
            ..Default::default()
        };
        assert!(matches!(resolve_format(None, &profile), OutputFormat::Table));
        assert!(matches!(
            resolve_format(Some(OutputFormat::Json), &profile),
            OutputFormat::Json
        ));
        assert!(matches!(
            resolve_format(None, &ProfileConfig::default()),
            OutputFormat::Json
        ));
    }
}
