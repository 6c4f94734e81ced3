//! Configuration types
//!
//! Deployment configuration loaded from YAML: which fields drive the
//! pagination, how the query parameters are named, page size limits, the
//! record source and the HTTP server.

use crate::error::{Error, Result};
use crate::pagination::{CursorFilter, LimitConfig, PageFetcher, QueryParamNames};
use crate::types::{FieldDef, FieldType, OrderBy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Record source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        self.source.validate()?;
        self.server.validate()
    }
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Pagination settings for one list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Field that drives ordering (a mutable timestamp)
    #[serde(default = "default_target_field")]
    pub target_field: String,

    /// Type of the target field
    #[serde(default)]
    pub target_field_type: FieldType,

    /// Tie-breaker field (immutable, unique)
    #[serde(default = "default_start_from_target_field")]
    pub start_from_target_field: String,

    /// Type of the tie-breaker field
    #[serde(default = "default_tie_breaker_type")]
    pub start_from_target_field_type: FieldType,

    /// Template for the exclusive-start parameter
    #[serde(default = "default_after_template")]
    pub after_query_param_template: String,

    /// Template for the inclusive-start parameter
    #[serde(default = "default_from_template")]
    pub from_query_param_template: String,

    /// Template for the tie-breaker start parameter
    #[serde(default = "default_start_from_template")]
    pub start_from_query_param_template: String,

    /// Renames the limit parameter
    #[serde(default)]
    pub limit_query_param_override: Option<String>,

    /// Caps any requested limit
    #[serde(default)]
    pub max_limit_override: Option<usize>,

    /// Page size when the request doesn't give one
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_target_field() -> String {
    "modified".to_string()
}

fn default_start_from_target_field() -> String {
    "id".to_string()
}

fn default_tie_breaker_type() -> FieldType {
    FieldType::Integer
}

fn default_after_template() -> String {
    "{}_after".to_string()
}

fn default_from_template() -> String {
    "{}_from".to_string()
}

fn default_start_from_template() -> String {
    "start_from_{}".to_string()
}

fn default_limit() -> usize {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            target_field: default_target_field(),
            target_field_type: FieldType::Timestamp,
            start_from_target_field: default_start_from_target_field(),
            start_from_target_field_type: default_tie_breaker_type(),
            after_query_param_template: default_after_template(),
            from_query_param_template: default_from_template(),
            start_from_query_param_template: default_start_from_template(),
            limit_query_param_override: None,
            max_limit_override: None,
            default_limit: default_limit(),
        }
    }
}

impl PaginationConfig {
    /// Validate field names, templates and limits
    pub fn validate(&self) -> Result<()> {
        require_non_empty("pagination.target_field", &self.target_field)?;
        require_non_empty(
            "pagination.start_from_target_field",
            &self.start_from_target_field,
        )?;

        for (field, template) in [
            (
                "pagination.after_query_param_template",
                &self.after_query_param_template,
            ),
            (
                "pagination.from_query_param_template",
                &self.from_query_param_template,
            ),
            (
                "pagination.start_from_query_param_template",
                &self.start_from_query_param_template,
            ),
        ] {
            if !template.contains("{}") {
                return Err(Error::invalid_config(
                    field,
                    format!("template '{template}' must contain '{{}}'"),
                ));
            }
        }

        if let Some(param) = &self.limit_query_param_override {
            require_non_empty("pagination.limit_query_param_override", param)?;
        }

        if self.default_limit == 0 {
            return Err(Error::invalid_config(
                "pagination.default_limit",
                "must be at least 1",
            ));
        }

        if self.max_limit_override == Some(0) {
            return Err(Error::invalid_config(
                "pagination.max_limit_override",
                "must be at least 1",
            ));
        }

        let names = self.param_names();
        if names.after == names.from {
            return Err(Error::invalid_config(
                "pagination.from_query_param_template",
                format!("'{}' is also the after parameter", names.from),
            ));
        }

        Ok(())
    }

    /// The ordered field
    pub fn ordered_field(&self) -> FieldDef {
        FieldDef::new(&self.target_field, self.target_field_type)
    }

    /// The tie-breaker field
    pub fn tie_breaker_field(&self) -> FieldDef {
        FieldDef::new(
            &self.start_from_target_field,
            self.start_from_target_field_type,
        )
    }

    /// Query parameter names derived from the templates
    pub fn param_names(&self) -> QueryParamNames {
        QueryParamNames::from_templates(
            &self.after_query_param_template,
            &self.from_query_param_template,
            &self.start_from_query_param_template,
            &self.target_field,
            &self.start_from_target_field,
            self.limit_query_param_override.as_deref(),
        )
    }

    /// Page size limits
    pub fn limits(&self) -> LimitConfig {
        LimitConfig::new(self.default_limit, self.max_limit_override)
    }

    /// Build the fetcher for this endpoint
    pub fn fetcher(&self) -> PageFetcher {
        PageFetcher::new(
            CursorFilter::new(self.ordered_field(), self.tie_breaker_field()),
            self.limits(),
            self.param_names(),
        )
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Record source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// DuckDB database file, or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,

    /// Table to serve
    #[serde(default = "default_table")]
    pub table: String,

    /// Ordering for requests without a cursor
    #[serde(default = "default_ordering")]
    pub default_ordering: Vec<FieldDef>,
}

fn default_database() -> String {
    crate::database::IN_MEMORY.to_string()
}

fn default_table() -> String {
    "records".to_string()
}

fn default_ordering() -> Vec<FieldDef> {
    vec![FieldDef::integer("id")]
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            table: default_table(),
            default_ordering: default_ordering(),
        }
    }
}

impl SourceConfig {
    /// Validate source settings
    pub fn validate(&self) -> Result<()> {
        require_non_empty("source.database", &self.database)?;
        require_non_empty("source.table", &self.table)?;
        for field in &self.default_ordering {
            require_non_empty("source.default_ordering", &field.name)?;
        }
        Ok(())
    }

    /// Sort order for requests without a cursor
    pub fn default_order(&self) -> Vec<OrderBy> {
        self.default_ordering
            .iter()
            .cloned()
            .map(OrderBy::asc)
            .collect()
    }
}

// ============================================================================
// Server Settings
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the list endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// Name of the page-number parameter used without a cursor
    #[serde(default = "default_page_param")]
    pub page_query_param: String,
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/records".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_path(),
            page_query_param: default_page_param(),
        }
    }
}

impl ServerSettings {
    /// Validate server settings
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(Error::invalid_config(
                "server.path",
                format!("'{}' must start with '/'", self.path),
            ));
        }
        require_non_empty("server.page_query_param", &self.page_query_param)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_config(field, "must not be empty"));
    }
    Ok(())
}
