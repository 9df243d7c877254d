//! Console rendering of uAPI payloads.

use std::io::{self, Write};

use colored::Colorize;
use serde_json::{Map, Value};

const KEY_WIDTH: usize = 25;

static EMPTY: Value = Value::Null;

/// The `data` member of a response envelope, or `null` when absent.
pub fn payload(envelope: &Value) -> &Value {
    envelope.get("data").unwrap_or(&EMPTY)
}

/// Mirrors truthiness of the payload: null, false, zero, and empty containers count as empty.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Strings print bare; everything else prints as JSON.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", format!("=== {title} ===").bold().bright_magenta())
}

/// Recursively print a mapping, indenting nested mappings and sequences.
pub fn pretty_map<W: Write>(out: &mut W, map: &Map<String, Value>, indent: usize) -> io::Result<()> {
    let pad = " ".repeat(indent);
    for (key, value) in map {
        match value {
            Value::Object(inner) => {
                writeln!(out, "{pad}{}", format!("{key}:").bold().bright_cyan())?;
                pretty_map(out, inner, indent + 2)?;
            }
            Value::Array(items) => {
                writeln!(out, "{pad}{}", format!("{key}:").bold().bright_cyan())?;
                pretty_items(out, items, indent)?;
            }
            other => {
                writeln!(
                    out,
                    "{pad}{}: {}",
                    format!("{key:<KEY_WIDTH$}").bright_cyan(),
                    scalar(other).bright_green()
                )?;
            }
        }
    }
    Ok(())
}

fn pretty_items<W: Write>(out: &mut W, items: &[Value], indent: usize) -> io::Result<()> {
    let pad = " ".repeat(indent);
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Object(inner) => {
                writeln!(out, "{pad}  {}", format!("[{}]", i + 1).bright_black())?;
                pretty_map(out, inner, indent + 4)?;
            }
            other => writeln!(out, "{pad}  {}", scalar(other).bright_green())?,
        }
    }
    Ok(())
}

/// Body of `uapi extract`.
pub fn extracted<W: Write>(out: &mut W, data: &Value) -> io::Result<()> {
    header(out, "Extracted Data")?;
    writeln!(out)?;

    if is_empty(data) {
        return writeln!(out, "{}", "No data returned.".bright_yellow());
    }
    match data {
        Value::Object(map) => pretty_map(out, map, 0),
        Value::Array(items) => pretty_items(out, items, 0),
        other => writeln!(out, "{}", scalar(other).bright_green()),
    }
}

const ANSWER_KEY: &str = "answer_text";
const SOURCES_KEY: &str = "sources";

/// Body of `uapi search`: answer, sources, then any remaining keys.
pub fn search_results<W: Write>(out: &mut W, data: &Value) -> io::Result<()> {
    header(out, "Answer")?;
    writeln!(out)?;

    match data.get(ANSWER_KEY).filter(|answer| !is_empty(answer)) {
        Some(answer) => writeln!(out, "{}\n", scalar(answer).bright_green())?,
        None => writeln!(out, "{}\n", "No answer found.".bright_yellow())?,
    }

    let sources = data
        .get(SOURCES_KEY)
        .and_then(Value::as_array)
        .filter(|sources| !sources.is_empty());
    if let Some(sources) = sources {
        header(out, "Sources")?;
        for source in sources {
            if source.is_object() {
                let title = field_or(source, "title", "Untitled source");
                let url = field_or(source, "url", "N/A");
                writeln!(out, "• {} — {}", title.bold(), url.bright_cyan())?;
            } else {
                writeln!(out, "• {}", scalar(source).bright_cyan())?;
            }
        }
    }

    let details: Map<String, Value> = data
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(key, _)| match key.as_str() {
            ANSWER_KEY => false,
            // Anything the Sources section did not print falls through to Details.
            SOURCES_KEY => sources.is_none(),
            _ => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !details.is_empty() {
        writeln!(out)?;
        header(out, "Details")?;
        pretty_map(out, &details, 0)?;
    }
    Ok(())
}

fn field_or(source: &Value, field: &str, default: &str) -> String {
    source
        .get(field)
        .filter(|value| !value.is_null())
        .map(scalar)
        .unwrap_or_else(|| default.to_string())
}
