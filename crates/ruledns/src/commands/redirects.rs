//! Offline redirect description handlers.

use ruledns_core::engine::{self, ConvertedRules};

use crate::cli::{GlobalOpts, RedirectsArgs, RedirectsCommand};
use crate::error::CliError;

use super::{rules, util};

/// Report every redirect that failed to convert, then fail if any did.
pub(crate) fn reject_invalid(
    converted: &ConvertedRules,
    total: usize,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if converted.rejected.is_empty() {
        return Ok(());
    }
    if !global.quiet {
        for rejected in &converted.rejected {
            eprintln!(
                "✗ redirect #{} ({}): {}",
                rejected.index + 1,
                rejected.redirect.from,
                rejected.error
            );
        }
    }
    Err(CliError::Validation {
        field: "redirects".into(),
        reason: format!(
            "{} of {total} redirects could not be converted",
            converted.rejected.len()
        ),
    })
}

pub fn handle(args: RedirectsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RedirectsCommand::Convert { file } => {
            let description = util::read_description(&file)?;
            let converted = engine::page_rules_from_description(&description);
            rules::print_rules(&converted.rules, global);
            reject_invalid(&converted, description.redirects.len(), global)
        }
    }
}
