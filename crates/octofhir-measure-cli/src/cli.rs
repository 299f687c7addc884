use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "octofhir-measure")]
#[command(about = "Evaluate measures and create subject lists on a FHIR server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL (overrides config and OCTOFHIR_MEASURE_URL env var)
    #[arg(short, long, global = true, env = "OCTOFHIR_MEASURE_URL")]
    pub server: Option<String>,

    /// Profile in ~/.octofhir/measure.toml
    #[arg(short, long, global = true, env = "OCTOFHIR_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format (json or table; overrides the profile)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the server software version
    Version,
    /// Evaluate a Measure and print its statistic
    Evaluate(MeasureArgs),
    /// Create a subject list for a Measure and print its URI
    SubjectList(MeasureArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct MeasureArgs {
    /// Measure location (absolute, or relative to the server base URL, e.g. Measure/123)
    pub location: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the active profile
    Show,
    /// Set a value in the active profile
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format, timeout_ms)
    pub key: String,
    /// Value
    pub value: String,
}
