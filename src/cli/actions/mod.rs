pub mod server;

use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;

pub enum Action {
    Server {
        port: u16,
        dsn: String,
        jwt_secret: SecretString,
        access_token_ttl: Duration,
        rate_limit_rps: u32,
        rate_limit_burst: u32,
        cors_origin: String,
    },
}

impl Action {
    /// Execute the action.
    ///
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server { .. } => server::handle(self).await,
        }
    }
}
