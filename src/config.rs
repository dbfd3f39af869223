use std::env;

/// Environment variable overriding [`Config::iteration_limit`].
pub const ITERATION_LIMIT_VAR: &str = "AVENGER_ITERATION_LIMIT";
/// Environment variable overriding [`Config::max_call_depth`].
pub const MAX_CALL_DEPTH_VAR: &str = "AVENGER_MAX_CALL_DEPTH";

/// Runtime limits shared by every scope of one interpreter session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Iterations a single loop may run before it is aborted.
    pub iteration_limit: usize,
    /// Nested user function calls allowed before the call is aborted.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iteration_limit: 100_000,
            max_call_depth: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

impl Config {
    /// Defaults, overridden by `AVENGER_ITERATION_LIMIT` and `AVENGER_MAX_CALL_DEPTH` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ITERATION_LIMIT_VAR) {
            config.iteration_limit = parse_limit(ITERATION_LIMIT_VAR, &value)?;
        }
        if let Some(value) = lookup(MAX_CALL_DEPTH_VAR) {
            config.max_call_depth = parse_limit(MAX_CALL_DEPTH_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_limit(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}
