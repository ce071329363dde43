use crate::api::{self, ApiConfig};
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn handle(action: Action) -> Result<()> {
    let Action::Server {
        port,
        dsn,
        jwt_secret,
        access_token_ttl,
        rate_limit_rps,
        rate_limit_burst,
        cors_origin,
    } = action;

    api::new(
        port,
        dsn,
        ApiConfig {
            jwt_secret,
            access_token_ttl,
            rate_limit_rps,
            rate_limit_burst,
            cors_origin,
        },
    )
    .await
}
