use clap::{Parser, Subcommand, ValueEnum};
use fleetdeck_core::AgentUuid;

#[derive(Parser, Debug)]
#[command(name = "fleetdeck")]
#[command(about = "Send administrative commands to a fleet admin backend")]
#[command(version)]
pub struct Cli {
    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        env = "FLEETDECK_LOG_FORMAT",
        default_value = "pretty"
    )]
    pub log_format: LogOutput,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogOutput {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a distributed query on the chosen environments
    Query {
        /// Comma-separated environment names, or `all`
        envs: String,
        /// Query text; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        sql: Vec<String>,
        /// Keep the query active for agents that check in later
        #[arg(long)]
        repeat: bool,
    },

    /// Carve a file from the chosen environments
    Carve {
        /// Comma-separated environment names, or `all`
        envs: String,
        path: String,
    },

    /// Remove nodes by UUID (asks for confirmation)
    RemoveNodes {
        #[arg(required = true, num_args = 1..)]
        uuids: Vec<AgentUuid>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Issue a GET request and print the JSON reply
    Get { endpoint: String },
}
