//! Environment variable expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key and is only used for error reporting.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_unchanged() {
        assert_eq!(
            expand_env("src/site/resources", "resources.dir").unwrap(),
            "src/site/resources"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("APTDOC_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${APTDOC_EXPAND_UNSET:-target/apt}", "output.dir").unwrap(),
            "target/apt"
        );
    }

    #[test]
    fn test_unset_without_default_is_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("APTDOC_EXPAND_MISSING");
        }
        let err = expand_env("${APTDOC_EXPAND_MISSING}/apt", "output.dir").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("APTDOC_EXPAND_MISSING"), "got: {msg}");
        assert!(msg.contains("output.dir"), "got: {msg}");
    }
}
