//! Environment variable expansion for configuration values.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// - `${VAR}` expands to the value of `VAR`, erroring if unset
/// - `${VAR:-default}` expands to `VAR` if set, otherwise the default
///
/// Text outside references (including bare `$`) passes through verbatim.
///
/// # Errors
///
/// Returns [`ConfigError::EnvVar`] for an unset variable without a default,
/// or [`ConfigError::Validation`] for an unterminated reference.
pub(crate) fn expand(value: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::Validation(format!(
                "unterminated variable reference in '{value}'"
            )));
        };
        let reference = &after[..end];
        let (name, default) = match reference.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (reference, None),
        };
        match std::env::var(name) {
            Ok(resolved) => out.push_str(&resolved),
            Err(_) => match default {
                Some(default) => out.push_str(default),
                None => {
                    return Err(ConfigError::EnvVar {
                        name: name.to_owned(),
                    });
                }
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(expand("no references").unwrap(), "no references");
        assert_eq!(expand("bare $ sign").unwrap(), "bare $ sign");
    }

    #[test]
    fn test_expands_set_variable() {
        // Unique name per test; env mutation is process global.
        unsafe { std::env::set_var("MDPRESS_TEST_EXPAND_SET", "value") };

        assert_eq!(
            expand("pre-${MDPRESS_TEST_EXPAND_SET}-post").unwrap(),
            "pre-value-post"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        assert_eq!(
            expand("${MDPRESS_TEST_EXPAND_UNSET:-fallback}").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_set_variable_wins_over_default() {
        unsafe { std::env::set_var("MDPRESS_TEST_EXPAND_WINS", "actual") };

        assert_eq!(
            expand("${MDPRESS_TEST_EXPAND_WINS:-fallback}").unwrap(),
            "actual"
        );
    }

    #[test]
    fn test_unset_without_default_errors() {
        let err = expand("${MDPRESS_TEST_EXPAND_MISSING}").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { name } if name == "MDPRESS_TEST_EXPAND_MISSING"));
    }

    #[test]
    fn test_unterminated_reference_errors() {
        assert!(expand("${UNTERMINATED").is_err());
    }

    #[test]
    fn test_multiple_references() {
        unsafe {
            std::env::set_var("MDPRESS_TEST_EXPAND_A", "1");
            std::env::set_var("MDPRESS_TEST_EXPAND_B", "2");
        }

        assert_eq!(
            expand("${MDPRESS_TEST_EXPAND_A}/${MDPRESS_TEST_EXPAND_B}").unwrap(),
            "1/2"
        );
    }
}
