use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "unid", version, about = "Best-effort device identifier service")]
pub struct Cli {
    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the device identifier
    Id {
        /// Read the identifier in-process instead of asking the daemon
        #[arg(long)]
        local: bool,
    },

    /// Run the daemon in the foreground
    Daemon,

    /// Show whether the daemon is running
    Status,

    /// Stop a running daemon
    Stop,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
