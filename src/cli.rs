use clap::{ArgAction, Parser, Subcommand};

/// Top-level CLI definition for uapi.
#[derive(Parser, Debug)]
#[command(name = "uapi")]
#[command(about = "uAPI console utility: extract structured data and search the web", long_about = None)]
#[command(version)]
pub struct Cli {
    /// API key; takes precedence over the saved config file.
    #[arg(long, global = true, env = "UAPI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the uAPI service.
    #[arg(long, global = true, env = "UAPI_BASE_URL", default_value = crate::client::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout applied to the API request (seconds).
    #[arg(long, global = true, default_value_t = crate::client::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Print the raw response envelope as JSON instead of the formatted view.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Increase diagnostic output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract structured data from a URL.
    Extract(ExtractArgs),
    /// Perform a web search or ask a question.
    Search(SearchArgs),
}

/// Arguments for the `extract` subcommand.
#[derive(clap::Args, Debug)]
pub struct ExtractArgs {
    /// Page to extract data from.
    pub url: String,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search terms or question; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl SearchArgs {
    pub fn joined(&self) -> String {
        self.query.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_words_are_joined() {
        let cli = Cli::try_parse_from(["uapi", "search", "who", "wrote", "dune"]).unwrap();
        match cli.command {
            Commands::Search(args) => assert_eq!(args.joined(), "who wrote dune"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["uapi", "search"]).is_err());
    }

    #[test]
    fn extract_takes_one_url() {
        let cli = Cli::try_parse_from(["uapi", "extract", "https://example.com", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Extract(args) => assert_eq!(args.url, "https://example.com"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["uapi", "-vv", "extract", "https://example.com"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn api_key_flag_is_captured() {
        let cli = Cli::try_parse_from(["uapi", "search", "q", "--api-key", "sk-flag"]).unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("sk-flag"));
        assert_eq!(cli.timeout_secs, crate::client::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["uapi"]).is_err());
    }
}
