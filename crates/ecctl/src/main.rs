//! ecctl binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecctl::cli::{
    Cli, Commands, DeploymentCommands, ElasticsearchCommands, PlatformCommands,
};
use ecctl::commands::{
    CommentCommand, ConfigCommand, ExtensionCommand, KeystoreCommand, ProxyCommand,
    TemplateCommand, TrafficFilterCommand,
};
use ecctl::output::OutputFormat;
use ecctl::{CliError, Context, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(&cli)?;
    let format = OutputFormat::new(settings.output);
    let mut stdout = io::stdout().lock();

    // Needs no API host.
    if let Commands::Config { command } = &cli.command {
        return ConfigCommand::new(&settings).execute(&mut stdout, &format, command);
    }

    let ctx = Context::from_settings(&settings)?;

    match cli.command {
        Commands::Comment { command } => {
            let cmd = CommentCommand::new(&ctx);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Deployment { command } => match command {
            DeploymentCommands::Elasticsearch {
                command: ElasticsearchCommands::Keystore { command },
            } => {
                let cmd = KeystoreCommand::new(&ctx);
                cmd.execute(&mut stdout, &format, &command).await?;
            }
            DeploymentCommands::Extension { command } => {
                let cmd = ExtensionCommand::new(&ctx);
                cmd.execute(&mut stdout, &format, &command).await?;
            }
            DeploymentCommands::Template { command } => {
                let cmd = TemplateCommand::new(&ctx);
                cmd.execute(&mut stdout, &format, &command).await?;
            }
            DeploymentCommands::TrafficFilter { command } => {
                let cmd = TrafficFilterCommand::new(&ctx);
                cmd.execute(&mut stdout, &format, &command).await?;
            }
        },
        Commands::Platform {
            command: PlatformCommands::Proxy { command },
        } => {
            let cmd = ProxyCommand::new(&ctx);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
