pub mod cli;
pub mod client;
pub mod commands;
pub mod credentials;
pub mod render;
pub mod telemetry;

use std::io;
use std::time::Duration;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::client::{ClientConfig, HttpClient};
use crate::commands::OutputFormat;
use crate::credentials::{CredentialResolver, CredentialStore, InteractivePrompt};

/// Resolve credentials, call the service once, and print the result to stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let store = CredentialStore::default_location()?;
    let api_key =
        CredentialResolver::new(cli.api_key, store, InteractivePrompt::stdio()).resolve()?;

    let config = ClientConfig::new(api_key)
        .with_base_url(cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = HttpClient::new(config)?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Pretty
    };
    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Extract(args) => commands::extract(&client, &args.url, format, &mut out).await,
        Commands::Search(args) => {
            commands::search(&client, &args.joined(), format, &mut out).await
        }
    }
}
