use std::env;
use std::fmt;
use std::str::FromStr;

/// Parse an optional environment variable, falling back to `default` when the
/// variable is unset.
///
/// A variable that is set but malformed is an error rather than a silent
/// fallback, so typos in deployment config surface at startup.
pub fn parse_env<T>(name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("Invalid {name} value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_parse_env_default_when_unset() {
        unsafe {
            env::remove_var("KAIWA_TEST_PARSE_ENV");
        }
        assert_eq!(parse_env("KAIWA_TEST_PARSE_ENV", 42u32), Ok(42));
    }

    #[test]
    #[serial]
    fn test_parse_env_reads_value() {
        unsafe {
            env::set_var("KAIWA_TEST_PARSE_ENV", "7");
        }
        assert_eq!(parse_env("KAIWA_TEST_PARSE_ENV", 42u32), Ok(7));
        unsafe {
            env::remove_var("KAIWA_TEST_PARSE_ENV");
        }
    }

    #[test]
    #[serial]
    fn test_parse_env_trims_whitespace() {
        unsafe {
            env::set_var("KAIWA_TEST_PARSE_ENV", " 1.5 ");
        }
        assert_eq!(parse_env("KAIWA_TEST_PARSE_ENV", 0.0f32), Ok(1.5));
        unsafe {
            env::remove_var("KAIWA_TEST_PARSE_ENV");
        }
    }

    #[test]
    #[serial]
    fn test_parse_env_malformed_is_error() {
        unsafe {
            env::set_var("KAIWA_TEST_PARSE_ENV", "not-a-number");
        }
        let result = parse_env("KAIWA_TEST_PARSE_ENV", 42u32);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("KAIWA_TEST_PARSE_ENV"));
        unsafe {
            env::remove_var("KAIWA_TEST_PARSE_ENV");
        }
    }
}
