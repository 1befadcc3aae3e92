use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use aa_cli::cli::{make, Cli, Command, ConfigCommand, MakeCommand};
use aa_domain::config::{LogFormat, ObservabilityConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = aa_cli::cli::load_config()?;
            let valid = aa_cli::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _config_path) = aa_cli::cli::load_config()?;
            aa_cli::cli::config::show(&config)
        }
        Command::Make(MakeCommand::Action {
            name,
            structured,
            streaming,
            tools,
            dir,
        }) => {
            init_cli_tracing();
            let caps = make::Capabilities {
                structured,
                streaming,
                tools,
            };
            make::action(&name, caps, &dir)
        }
        Command::Run { text, stream } => {
            let (config, _) = aa_cli::cli::load_config()?;
            init_tracing(&config.observability);
            aa_cli::cli::run::run(config.action, text, stream).await
        }
        Command::Version => {
            println!("agent-action {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Install the subscriber described by `[observability]`.  `RUST_LOG`
/// overrides `log_filter`.  Logs go to stderr so stdout stays parseable.
fn init_tracing(obs: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&obs.log_filter));

    match obs.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
