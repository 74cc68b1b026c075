use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use contract_lineage::commands::{
    extract_command, init_config_command, list_backends_command, list_chains_command,
    ExtractOptions,
};

/// Inheritance-tree extraction for smart-contract codebases.
///
/// This CLI is a thin wrapper around `lineage-core` (exposed in code as `lineage_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "contract-lineage",
    version,
    about = "Extract contract inheritance trees as JSON",
    long_about = None
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analyzer and write the inheritance document.
    ///
    /// Selects contracts under the contracts directory (and optional tests
    /// directory), builds one inheritance tree per contract, and writes
    /// `{ "contracts": [...] }` to the output file.
    Extract(ExtractOptions),

    /// Write a default project configuration file.
    InitConfig {
        /// Where to write the config. Defaults to `lineage.json` in the current directory.
        #[arg(long)]
        out: Option<String>,

        /// Project name.
        #[arg(long)]
        name: Option<String>,

        /// Directory holding the target contracts.
        #[arg(long)]
        contracts_dir: Option<String>,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List supported on-chain network prefixes.
    Chains {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List available analyzer backends.
    Backends {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract(opts) => {
            extract_command(&opts)?;
        }
        Command::InitConfig { out, name, contracts_dir, force } => {
            init_config_command(out.as_deref(), name, contracts_dir, force)?;
        }
        Command::Chains { json } => list_chains_command(json)?,
        Command::Backends { json } => list_backends_command(json)?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays usable for summaries and JSON listings.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
