//! Environment variable helpers.

use snafu::prelude::*;

/// An environment variable required by the application is not set.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub struct MissingEnvVarError {
    /// Name of the missing variable.
    pub name: String,
    source: std::env::VarError,
}

/// Reads an environment variable, returning a structured error if it's missing.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).context(MissingEnvVarSnafu {
        name: name.to_string(),
    })
}

/// Reads an environment variable, falling back to `default` when unset.
pub fn get_env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
