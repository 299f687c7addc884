use anyhow::Result;
use colored::Colorize;
use octofhir_measure_client::QueryResultStatistic;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_statistic(stat: &QueryResultStatistic, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(stat),
        OutputFormat::Table => {
            println!("{}", statistic_table(stat));
            println!("{}: {}", "Total".cyan(), stat.total_size);
            Ok(())
        }
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn statistic_table(stat: &QueryResultStatistic) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Stratifier", "Stratum", "Count"]);
    for stratification in &stat.stratification {
        if stratification.strata.is_empty() {
            builder.push_record([stratification.title.as_str(), "-", "0"]);
        }
        for stratum in &stratification.strata {
            builder.push_record([
                stratification.title.clone(),
                stratum.label.clone(),
                stratum.count.to_string(),
            ]);
        }
    }
    builder.build().with(Style::rounded()).to_string()
}
