use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

use crate::client::{ApiError, Uapi};
use crate::credentials::CredentialError;
use crate::render;

/// How a response is written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// `uapi extract <url>`
pub async fn extract<C: Uapi, W: Write>(
    client: &C,
    url: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let envelope = client.extract(url).await?;
    match format {
        OutputFormat::Json => write_json(out, &envelope),
        OutputFormat::Pretty => render::extracted(out, render::payload(&envelope))
            .context("failed to write extracted data"),
    }
}

/// `uapi search <query...>`
pub async fn search<C: Uapi, W: Write>(
    client: &C,
    query: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let envelope = client.search(query).await?;
    match format {
        OutputFormat::Json => write_json(out, &envelope),
        OutputFormat::Pretty => render::search_results(out, render::payload(&envelope))
            .context("failed to write search results"),
    }
}

fn write_json<W: Write>(out: &mut W, envelope: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(envelope)?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Print a top-level failure the way the CLI reports it.
///
/// A declined key prompt goes to `out`; API and unexpected errors go to `err_out`.
pub fn report_failure<O: Write, E: Write>(error: &anyhow::Error, out: &mut O, err_out: &mut E) {
    let written = match error.downcast_ref::<CredentialError>() {
        Some(CredentialError::NoKeyEntered) => {
            writeln!(out, "{}", "No key entered. Exiting.".bright_yellow())
        }
        _ => match error.downcast_ref::<ApiError>() {
            Some(api) => writeln!(err_out, "[ERROR] {}: {api}", api.kind()),
            None => writeln!(err_out, "[UNEXPECTED ERROR] {error:#}"),
        },
    };
    if let Err(err) = written {
        tracing::debug!(error = %err, "failed to report command failure");
    }
}
