use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page where users create or retrieve their key.
pub const SIGNUP_URL: &str = "https://uapi.nl/api";

const CONFIG_DIR: &str = ".uapi";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no API key entered")]
    NoKeyEntered,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// On-disk shape of `~/.uapi/config.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredConfig {
    #[serde(default)]
    api_key: Option<String>,
}

/// JSON file holding the persisted API key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// `$HOME/.uapi/config.json`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("failed to resolve home directory")?;
        Ok(Self::at(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored key, or `None` when the file is missing, unreadable,
    /// malformed, or holds an empty key.
    pub fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read config file");
                return None;
            }
        };

        match serde_json::from_str::<StoredConfig>(&raw) {
            Ok(config) => config.api_key.filter(|key| !key.is_empty()),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring malformed config file");
                None
            }
        }
    }

    /// Write `{"api_key": ...}`, creating the config directory if needed.
    pub fn save(&self, api_key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let config = StoredConfig {
            api_key: Some(api_key.to_string()),
        };
        let json = serde_json::to_string(&config).context("failed to serialize config")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write config file {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "saved API key");
        Ok(())
    }
}

/// Interaction used when no key is configured.
pub trait Prompt {
    /// Point the user at `signup_url` and read one entry; the result is trimmed.
    fn request_key(&mut self, signup_url: &str) -> Result<String>;

    /// Acknowledge that the key was persisted at `path`.
    fn key_saved(&mut self, path: &Path) -> Result<()>;
}

pub type BrowserOpener = fn(&str) -> io::Result<()>;

fn open_in_browser(url: &str) -> io::Result<()> {
    webbrowser::open(url)
}

/// Terminal prompt over any reader/writer pair.
pub struct InteractivePrompt<R, W> {
    input: R,
    output: W,
    open_browser: BrowserOpener,
}

impl InteractivePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), open_in_browser)
    }
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    pub fn new(input: R, output: W, open_browser: BrowserOpener) -> Self {
        Self {
            input,
            output,
            open_browser,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompt for InteractivePrompt<R, W> {
    fn request_key(&mut self, signup_url: &str) -> Result<String> {
        writeln!(self.output, "{}", "No API key found.".yellow())?;
        writeln!(self.output, "You can create or retrieve your key here:")?;
        writeln!(self.output, "{}\n", signup_url.bright_cyan())?;

        match (self.open_browser)(signup_url) {
            Ok(()) => writeln!(self.output, "(Opened {signup_url} in your browser.)\n")?,
            Err(err) => {
                tracing::debug!(error = %err, "failed to launch browser");
                writeln!(self.output, "(Please visit {signup_url} manually.)\n")?;
            }
        }

        write!(self.output, "{} ", "Enter your UAPI API key:".bold())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("failed to read API key from stdin")?;
        Ok(line.trim().to_string())
    }

    fn key_saved(&mut self, path: &Path) -> Result<()> {
        let message = format!("✓ API key saved to {}", path.display());
        writeln!(self.output, "{}", message.bright_green())?;
        Ok(())
    }
}

/// Resolves the API key: override, then config file, then prompt.
pub struct CredentialResolver<P> {
    override_key: Option<String>,
    store: CredentialStore,
    prompt: P,
}

impl<P: Prompt> CredentialResolver<P> {
    /// `override_key` carries `UAPI_API_KEY` / `--api-key`; empty counts as unset.
    pub fn new(override_key: Option<String>, store: CredentialStore, prompt: P) -> Self {
        Self {
            override_key,
            store,
            prompt,
        }
    }

    pub fn resolve(&mut self) -> Result<String, CredentialError> {
        if let Some(key) = self.override_key.as_deref().filter(|key| !key.is_empty()) {
            tracing::debug!("using API key from environment");
            return Ok(key.to_string());
        }

        if let Some(key) = self.store.load() {
            tracing::debug!(path = %self.store.path().display(), "using API key from config file");
            return Ok(key);
        }

        let key = self.prompt.request_key(SIGNUP_URL)?;
        if key.is_empty() {
            return Err(CredentialError::NoKeyEntered);
        }

        self.store.save(&key)?;
        self.prompt.key_saved(self.store.path())?;
        Ok(key)
    }

    pub fn into_prompt(self) -> P {
        self.prompt
    }
}
