// src/cli.rs
use clap::{Parser, Subcommand, ValueEnum};
use notion_sdk::api::ObjectKind;
use notion_sdk::config::ConfigFile;
use notion_sdk::{AppError, ClientConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// JSON config file (api_key, base_url, retry settings, default ids)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Physical attempts per call, first one included
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Wait before the first retry, in milliseconds
    #[arg(long)]
    pub retry_wait_min_ms: Option<u64>,

    /// Ceiling for exponential backoff, in milliseconds
    #[arg(long)]
    pub retry_wait_max_ms: Option<u64>,

    /// Per-attempt timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Send oversized payloads instead of rejecting them locally
    #[arg(long = "no-validation", action = clap::ArgAction::SetTrue)]
    pub no_validation: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Retrieve a page (ID or URL; defaults to page_id from the config file)
    Page { id: Option<String> },
    /// Retrieve a database (defaults to database_id from the config file)
    Database { id: Option<String> },
    /// Query a database's rows
    Query {
        id: Option<String>,
        /// Follow cursors and return every row
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// List a block's children
    Children {
        id: String,
        /// Follow cursors and return every child
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Search pages and databases shared with the integration
    Search {
        query: Option<String>,
        #[arg(long, value_enum)]
        object: Option<ObjectArg>,
    },
    /// Show the integration's bot user
    Me,
    /// List workspace users
    Users,
    /// List comments on a page or block
    Comments { id: String },
    /// Append a paragraph to a page or block
    Append { id: String, text: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectArg {
    Page,
    Database,
}

impl From<ObjectArg> for ObjectKind {
    fn from(arg: ObjectArg) -> Self {
        match arg {
            ObjectArg::Page => ObjectKind::Page,
            ObjectArg::Database => ObjectKind::Database,
        }
    }
}

impl CommandLineInput {
    /// Resolves the client configuration: defaults, then the config file,
    /// then the environment, then flags.
    pub fn resolve(&self) -> Result<(ClientConfig, Option<ConfigFile>), AppError> {
        let file = self.config.as_deref().map(ConfigFile::load).transpose()?;
        let mut config =
            ClientConfig::resolve_with(file.as_ref(), |name| std::env::var(name).ok())?;

        if let Some(attempts) = self.max_attempts {
            config = config.with_max_attempts(attempts);
        }
        if self.retry_wait_min_ms.is_some() || self.retry_wait_max_ms.is_some() {
            let min = self
                .retry_wait_min_ms
                .map_or(config.backoff.wait_min(), Duration::from_millis);
            let max = self
                .retry_wait_max_ms
                .map_or(config.backoff.wait_max(), Duration::from_millis);
            config = config.with_retry_wait(min, max)?;
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if self.no_validation {
            config = config.with_input_validation(false);
        }

        Ok((config, file))
    }
}

/// The explicit ID if given, else the config file's default.
pub fn id_or_default(
    explicit: Option<&str>,
    fallback: Option<&str>,
    what: &str,
) -> Result<String, AppError> {
    explicit
        .or(fallback)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::MissingConfiguration(format!(
                "no {} given and none set in the config file",
                what
            ))
        })
}
