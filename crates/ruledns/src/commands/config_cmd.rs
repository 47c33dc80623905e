//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn read_token() -> Result<String, CliError> {
    let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(invalid("api_token", "API token cannot be empty"));
    }
    Ok(token)
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            let candidate = Profile {
                api_url: Some(value.clone()),
                ..Profile::default()
            };
            ruledns_config::profile_api_url(&candidate)?;
            profile.api_url = Some(value);
        }
        "api_token" | "api-token" => profile.api_token = Some(value),
        "api_token_env" | "api-token-env" => profile.api_token_env = Some(value),
        "default_zone" | "default-zone" => profile.default_zone = Some(value),
        "placeholder_address" | "placeholder-address" => {
            profile.placeholder_address = Some(
                value
                    .parse()
                    .map_err(|_| invalid("placeholder_address", "must be an IPv4 or IPv6 address"))?,
            );
        }
        "timeout" => {
            profile.timeout = Some(
                value
                    .parse()
                    .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
            );
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(invalid(
                other,
                format!(
                    "unknown config key '{other}'. Valid keys: api_url, api_token, \
                     api_token_env, default_zone, placeholder_address, timeout, ca_cert"
                ),
            ));
        }
    }
    Ok(())
}

/// Hide plaintext tokens before the config is printed.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.api_token.is_some() {
            profile.api_token = Some("********".into());
        }
    }
    cfg
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("ruledns configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. API endpoint
            let api_url: String = Input::new()
                .with_prompt("Cloudflare API URL")
                .default(ruledns_config::DEFAULT_API_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Default zone (optional)
            let default_zone: String = Input::new()
                .with_prompt("Default zone (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            // 4. Token and where it lives
            let token = read_token()?;
            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the API token?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let api_token = if store_selection == 0 {
                ruledns_config::store_api_token(&profile_name, &token)?;
                eprintln!("   ✓ API token stored in system keyring");
                None
            } else {
                Some(token)
            };

            let mut profile = Profile {
                api_token,
                default_zone: Some(default_zone).filter(|z| !z.trim().is_empty()),
                ..Profile::default()
            };
            if api_url != ruledns_config::DEFAULT_API_URL {
                set_profile_key(&mut profile, "api_url", api_url)?;
            }

            // 5. Merge into any existing config
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: ruledns rules list --zone <your-zone>");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{e}")),
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: ruledns config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let token = read_token()?;
            ruledns_config::store_api_token(&profile_name, &token)?;
            eprintln!("✓ API token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_typed_keys() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "placeholder-address", "2001:db8::1".into()).unwrap();
        set_profile_key(&mut profile, "timeout", "12".into()).unwrap();
        set_profile_key(&mut profile, "default_zone", "example.com".into()).unwrap();

        assert_eq!(
            profile.placeholder_address,
            Some("2001:db8::1".parse().unwrap())
        );
        assert_eq!(profile.timeout, Some(12));
        assert_eq!(profile.default_zone.as_deref(), Some("example.com"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "site", "x".into()).is_err());
        assert!(set_profile_key(&mut profile, "timeout", "soon".into()).is_err());
        assert!(set_profile_key(&mut profile, "api_url", "ftp://example.com".into()).is_err());
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn show_hides_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_token: Some("secret".into()),
                ..Profile::default()
            },
        );
        let cfg = redacted(cfg);
        assert_eq!(cfg.profiles["default"].api_token.as_deref(), Some("********"));
    }
}
