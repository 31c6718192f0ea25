use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "runview",
    version,
    about = "Preview externally-produced ML run artifacts — validation metrics, training loss, prediction samples, and probe summaries"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a run payload and render its sections as text tables
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Base URL of the host API (falls back to RUNVIEW_URL)
    #[arg(long, conflicts_with = "path")]
    pub url: Option<String>,

    /// Read artifacts from a local run directory instead of the endpoint
    #[arg(long)]
    pub path: Option<String>,

    /// Cap on prediction rows to request (server default when omitted)
    #[arg(long = "max-rows")]
    pub max_rows: Option<u32>,
}
