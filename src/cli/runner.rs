//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::database::DuckDbSource;
use crate::error::{Error, Result};
use crate::types::StringMap;
use crate::view::ListView;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use url::Url;

/// Base URL for links printed by `fetch`
const FETCH_BASE_URL: &str = "http://localhost";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port } => self.serve(*port).await,
            Commands::Fetch { params } => self.fetch(params),
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file, or the defaults when none was given
    fn load_config(&self) -> Result<Config> {
        match &self.cli.config {
            Some(path) => Config::load(path),
            None => {
                tracing::debug!("No config file given, using defaults");
                let config = Config::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Open the configured DuckDB table
    fn open_source(config: &Config) -> Result<DuckDbSource> {
        let source = DuckDbSource::open(&config.source.database, config.source.table.clone())?;
        source.check_connection()?;
        tracing::info!(
            "Serving table '{}' from {}",
            source.table(),
            source.location()
        );
        Ok(source)
    }

    /// Start the HTTP server
    async fn serve(&self, port: Option<u16>) -> Result<()> {
        let config = self.load_config()?;
        let source = Arc::new(Self::open_source(&config)?);
        let port = port.unwrap_or(config.server.port);
        crate::cli::serve(&config, source, port).await
    }

    /// Run one list request against the configured source
    fn fetch(&self, params: &[String]) -> Result<()> {
        let config = self.load_config()?;
        let query = parse_params(params)?;
        let url = fetch_url(&config.server.path, &query)?;

        let source = Self::open_source(&config)?;
        let response = ListView::from_config(&config).list(&source, &url, &query)?;
        self.output(&response)
    }

    /// Validate the config and show the derived parameter names
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let names = config.pagination.param_names();
        let limits = config.pagination.limits();

        self.output(&json!({
            "valid": true,
            "ordered_field": config.pagination.ordered_field().name,
            "tie_breaker_field": config.pagination.tie_breaker_field().name,
            "params": {
                "after": names.after,
                "from": names.from,
                "start_from": names.start_from,
                "limit": names.limit,
            },
            "default_limit": limits.default_limit,
            "max_limit": limits.max_limit,
            "path": config.server.path,
        }))
    }

    /// Print a value in the selected format
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

/// Parse `key=value` arguments into a query map
fn parse_params(params: &[String]) -> Result<StringMap> {
    params
        .iter()
        .map(|param| {
            param
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| {
                    Error::Other(format!("Invalid --param '{param}': expected KEY=VALUE"))
                })
        })
        .collect()
}

/// Request URL a `fetch` is answered as
fn fetch_url(path: &str, query: &StringMap) -> Result<Url> {
    let mut url = Url::parse(FETCH_BASE_URL)?.join(path)?;
    if !query.is_empty() {
        let mut pairs: Vec<(&String, &String)> = query.iter().collect();
        pairs.sort();
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}
