//! Map validated CLI arguments to the action the binary should execute.

use crate::cli::actions::Action;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --jwt-secret")?;
    let access_token_ttl = matches
        .get_one::<u64>("access-token-ttl")
        .copied()
        .map_or(Duration::from_secs(86400), Duration::from_secs);
    let rate_limit_rps = matches
        .get_one::<u32>("rate-limit-rps")
        .copied()
        .unwrap_or(10);
    let rate_limit_burst = matches
        .get_one::<u32>("rate-limit-burst")
        .copied()
        .unwrap_or(20);
    let cors_origin = matches
        .get_one::<String>("cors-origin")
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());

    Ok(Action::Server {
        port,
        dsn,
        jwt_secret,
        access_token_ttl,
        rate_limit_rps,
        rate_limit_burst,
        cors_origin,
    })
}
