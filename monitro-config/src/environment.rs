use std::fmt;
use std::io::Error;
use std::sync::OnceLock;

/// Environment variable name containing the environment identifier.
const MONITRO_ENVIRONMENT_ENV_NAME: &str = "MONITRO_ENVIRONMENT";

/// Environment variable name containing the monitoring endpoint base URL.
const API_URL_ENV_NAME: &str = "MONITRO_API_URL";

/// Base URL used when `MONITRO_API_URL` is not set.
const DEFAULT_API_URL: &str = "http://localhost:5173/api/v1";

/// Production environment identifier.
const PROD_ENV_NAME: &str = "prod";

/// Staging environment identifier.
const STAGING_ENV_NAME: &str = "staging";

/// Development environment identifier.
const DEV_ENV_NAME: &str = "dev";

/// Process-wide endpoint base URL storage.
static API_URL: OnceLock<String> = OnceLock::new();

/// Returns the monitoring endpoint base URL for this process.
///
/// Resolved exactly once from the `MONITRO_API_URL` environment variable,
/// falling back to the local development endpoint. Subsequent changes to the
/// environment variable have no effect.
pub fn api_url() -> &'static str {
    API_URL.get_or_init(|| {
        std::env::var(API_URL_ENV_NAME).unwrap_or_else(|_| DEFAULT_API_URL.to_owned())
    })
}

/// Runtime environment for the application.
///
/// Used to distinguish between development, staging, and production modes
/// for configuration loading and log output selection.
#[derive(Debug, Clone)]
pub enum Environment {
    /// Production environment.
    Prod,
    /// Staging environment.
    Staging,
    /// Development environment.
    Dev,
}

impl Environment {
    /// Loads the environment from the `MONITRO_ENVIRONMENT` environment variable.
    ///
    /// Defaults to [`Environment::Prod`] if the variable is not set.
    pub fn load() -> Result<Environment, Error> {
        std::env::var(MONITRO_ENVIRONMENT_ENV_NAME)
            .unwrap_or_else(|_| PROD_ENV_NAME.into())
            .try_into()
    }

    /// Sets the `MONITRO_ENVIRONMENT` environment variable to this environment's value.
    pub fn set(&self) {
        unsafe { std::env::set_var(MONITRO_ENVIRONMENT_ENV_NAME, self.to_string()) }
    }

    /// Returns whether this is a production-like environment.
    ///
    /// Returns `true` for both [`Environment::Prod`] and [`Environment::Staging`].
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod | Self::Staging)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Environment::Prod => write!(f, "{PROD_ENV_NAME}"),
            Environment::Staging => write!(f, "{STAGING_ENV_NAME}"),
            Environment::Dev => write!(f, "{DEV_ENV_NAME}"),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = Error;

    /// Creates an [`Environment`] from a string, case-insensitively.
    ///
    /// Accepts "dev", "staging", or "prod". Returns an error for unsupported values.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            PROD_ENV_NAME => Ok(Self::Prod),
            STAGING_ENV_NAME => Ok(Self::Staging),
            DEV_ENV_NAME => Ok(Self::Dev),
            other => Err(Error::other(format!(
                "{other} is not a supported environment. Use either `{PROD_ENV_NAME}`/`{STAGING_ENV_NAME}`/`{DEV_ENV_NAME}`.",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        let env: Environment = "STAGING".to_owned().try_into().unwrap();
        assert!(env.is_prod());

        let env: Environment = "dev".to_owned().try_into().unwrap();
        assert!(!env.is_prod());
    }

    #[test]
    fn environment_rejects_unknown_values() {
        let result: Result<Environment, _> = "qa".to_owned().try_into();
        assert!(result.is_err());
    }

    #[test]
    fn api_url_falls_back_to_local_endpoint() {
        // MONITRO_API_URL is not set in the test environment.
        assert_eq!(api_url(), DEFAULT_API_URL);
    }
}
