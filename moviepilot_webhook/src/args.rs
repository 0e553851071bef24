//! Command line for the receiver binary.

use clap::Parser;

use crate::webhook::DEFAULT_PORT;

#[derive(Debug, Parser)]
#[command(
    name = "moviepilot_webhook",
    version,
    about = "Receive MoviePilot push notifications and print them as JSON lines"
)]
pub struct Args {
    /// Port to listen on (all interfaces)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Require `?token=TOKEN` on every webhook request
    #[arg(long, env = "MOVIEPILOT_WEBHOOK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl Args {
    /// An empty token means no check.
    pub fn auth_token(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.is_empty())
    }
}
