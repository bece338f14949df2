//! Environment variable and home directory expansion for configuration paths.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - a leading `~` - expands to the current user's home directory

use std::path::PathBuf;

use crate::ConfigError;

/// Expand a path string from the config file.
///
/// Variables are expanded first, then a leading `~`. Bare `$VAR` is kept
/// as is.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<PathBuf, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(PathBuf::from(shellexpand::tilde(&expanded).into_owned()))
}

/// Expand `${VAR}` references in a string.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}
