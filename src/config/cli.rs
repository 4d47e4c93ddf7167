use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the taggr-client binary.
#[derive(Debug, Parser)]
#[command(name = "taggr-client", version, about = "Taggr headless client")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TAGGR_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Keep the reference cache and session fresh, logging client events.
    Watch,
    /// Refresh once and print the reference snapshot summary as JSON.
    Snapshot,
    /// Refresh once and resolve a hash route.
    Route(RouteArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RouteArgs {
    /// Hash route to resolve, e.g. `#/user/alice`.
    #[arg(value_name = "HASH")]
    pub hash: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the backend base URL.
    #[arg(long = "backend-url", value_name = "URL", global = true)]
    pub backend_url: Option<String>,

    /// Override the per-request timeout.
    #[arg(long = "backend-request-timeout-seconds", value_name = "SECONDS", global = true)]
    pub backend_request_timeout_seconds: Option<u64>,

    /// Override the file holding the serialized identity credential.
    #[arg(long = "identity-file", value_name = "PATH", global = true)]
    pub identity_file: Option<PathBuf>,

    /// Override the background refresh interval.
    #[arg(long = "refresh-interval-seconds", value_name = "SECONDS", global = true)]
    pub refresh_interval_seconds: Option<u64>,

    /// Override how many recent tags are requested.
    #[arg(long = "refresh-recent-tags", value_name = "COUNT", global = true)]
    pub refresh_recent_tags: Option<u64>,

    /// Override the idle time after which activity is reported.
    #[arg(long = "session-activity-threshold-seconds", value_name = "SECONDS", global = true)]
    pub activity_threshold_seconds: Option<u64>,

    /// Render every route into one persistent frame.
    #[arg(
        long = "router-test-mode",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub router_test_mode: Option<bool>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}
