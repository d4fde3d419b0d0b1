//! CLI entry point - the composition root.
//!
//! Settings and the speech stack are wired together via bootstrap; command
//! dispatch routes to handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use readalong_cli::handlers::{read::ReadArgs, say::SayArgs};
use readalong_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(CliConfig::with_settings_path(cli.settings))?;

    match command {
        Commands::Tokens { file } => handlers::tokens::execute(&file)?,
        Commands::Read {
            file,
            rate,
            voice,
            constrained,
            no_boundaries,
            debug,
        } => {
            let args = ReadArgs {
                file,
                rate,
                voice,
                constrained,
                no_boundaries,
                debug,
            };
            handlers::read::execute(&ctx, args).await?;
        }
        Commands::Say {
            text,
            single_word,
            voice,
        } => {
            let args = SayArgs {
                text,
                single_word,
                voice,
            };
            handlers::say::execute(&ctx, args).await?;
        }
        Commands::Voices => handlers::voices::execute(&ctx).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables before parsing so `READALONG_SETTINGS` applies
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}
