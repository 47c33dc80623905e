mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ruledns_core::CloudflareProvider;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config and redirect conversion never touch the API
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Redirects(args) => commands::redirects::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ruledns", &mut std::io::stdout());
            Ok(())
        }

        // Man pages: the whole tree into a directory, or the root page to stdout
        Command::Man(args) => {
            use clap::CommandFactory;

            let cmd = Cli::command();
            match args.dir {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    clap_mangen::generate_to(cmd, &dir)?;
                    tracing::debug!(dir = %dir.display(), "wrote man pages");
                }
                None => clap_mangen::Man::new(cmd).render(&mut std::io::stdout())?,
            }
            Ok(())
        }

        // Everything else needs credentials and a provider
        cmd => {
            let session = config::resolve_session(&cli.global)?;
            let provider = CloudflareProvider::connect(&session.provider)?;

            tracing::debug!(command = ?cmd, profile = %session.profile_name, "dispatching command");
            commands::dispatch(cmd, provider, &session, &cli.global).await
        }
    }
}
