//! Command dispatch: bridges CLI args -> reconciliation workflow -> output formatting.

pub mod config_cmd;
pub mod dns;
pub mod redirects;
pub mod rules;
pub mod util;

use ruledns_core::CloudflareProvider;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    provider: CloudflareProvider,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Rules(args) => rules::handle(provider, session, args, global).await,
        Command::Dns(args) => dns::handle(provider, session, args, global).await,
        // Offline commands are handled before a provider is built
        Command::Redirects(_) | Command::Config(_) | Command::Completions(_) | Command::Man(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "command does not talk to the Cloudflare API".into(),
            })
        }
    }
}
