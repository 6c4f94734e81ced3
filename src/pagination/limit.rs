//! Page size resolution
//!
//! Malformed input never fails a request: anything that is not a positive
//! integer falls back to the configured default.

use crate::error::{Error, Result};
use std::fmt;

/// A resolved page size, always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Limit(usize);

impl Limit {
    /// Create a limit, raising zero to 1
    pub fn new(value: usize) -> Self {
        Self(value.max(1))
    }

    /// The page size
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default and maximum page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    /// Used when the request supplies no usable limit
    pub default_limit: usize,
    /// Cap for any limit, including the default
    pub max_limit: Option<usize>,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: None,
        }
    }
}

impl LimitConfig {
    /// Create a limit config
    pub fn new(default_limit: usize, max_limit: Option<usize>) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Resolve the effective limit from an optional raw request value
    pub fn resolve(&self, requested: Option<&str>) -> Limit {
        let value = match requested.map(parse_positive) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                tracing::debug!("{}, using default", e);
                self.default_limit
            }
            None => self.default_limit,
        };
        self.clamp(value)
    }

    fn clamp(&self, value: usize) -> Limit {
        match self.max_limit {
            Some(max) => Limit::new(value.min(max)),
            None => Limit::new(value),
        }
    }
}

/// Parse a strictly positive integer
pub(super) fn parse_positive(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| Error::invalid_limit(raw))
}
