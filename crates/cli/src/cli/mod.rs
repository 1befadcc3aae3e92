pub mod config;
pub mod make;
pub mod run;

use clap::{Parser, Subcommand};

/// agent-action: run and scaffold AI agent actions.
#[derive(Debug, Parser)]
#[command(name = "agent-action", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate source files.
    #[command(subcommand)]
    Make(MakeCommand),
    /// Execute a built-in echo action offline and print the result as JSON.
    Run {
        /// Text the scripted provider answers with.
        #[arg(long)]
        text: String,
        /// Stream the answer word by word instead of returning it at once.
        #[arg(long)]
        stream: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum MakeCommand {
    /// Scaffold a new action type.
    Action {
        /// Action name, e.g. `SummarizeTicket` or `summarize-ticket`.
        name: String,
        /// Implement `StructuredOutput`.
        #[arg(long)]
        structured: bool,
        /// Implement `StreamingResponse`.
        #[arg(long)]
        streaming: bool,
        /// Implement `HasTools`.
        #[arg(long)]
        tools: bool,
        /// Directory the file is written to.
        #[arg(long, default_value = "src/actions")]
        dir: String,
    },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `AI_ACTION_CONFIG` (or
/// `ai-action.toml` by default), with `AI_ACTION_*` overrides applied.
/// Returns the parsed [`Config`](aa_domain::config::Config) and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(aa_domain::config::Config, String)> {
    let config_path =
        std::env::var("AI_ACTION_CONFIG").unwrap_or_else(|_| "ai-action.toml".into());

    let config = aa_domain::config::Config::load(&config_path)
        .map_err(|e| anyhow::anyhow!("loading {config_path}: {e}"))?;

    Ok((config, config_path))
}
