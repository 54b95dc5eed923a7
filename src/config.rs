use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LOG_FILTER: &str = "educored=info";

/// EduCore sidecar: school records over newline-delimited JSON on stdio.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "educored", version)]
pub struct Args {
    /// Open this workspace directory at startup
    #[arg(long, value_name = "PATH", env = "EDUCORED_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Start with the built-in teacher, student and fee rows
    #[arg(long, env = "EDUCORED_SEED_SAMPLE")]
    pub seed_sample: bool,

    /// Log filter directives, e.g. `educored=debug`
    #[arg(long, value_name = "FILTER", env = "EDUCORED_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log: String,
}

/// Logs go to stderr; stdout carries responses.
pub fn setup_tracing(filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
