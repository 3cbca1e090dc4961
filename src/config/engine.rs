//! External tax engine configuration.
//!
//! Credentials are carried in an explicit [`EngineConfig`] value so the
//! adapter can be built and tested without touching process state.
//! [`EngineConfig::from_env`] is the only place environment variables are read.

use std::str::FromStr;

/// Environment variable holding the engine API key.
pub const ENV_API_KEY: &str = "SYMMETRY_API_KEY";
/// Environment variable selecting sandbox or production.
pub const ENV_ENVIRONMENT: &str = "SYMMETRY_ENVIRONMENT";
/// Environment variable holding the company identifier.
pub const ENV_COMPANY_ID: &str = "SYMMETRY_COMPANY_ID";
/// Environment variable overriding the engine base URL.
pub const ENV_BASE_URL: &str = "SYMMETRY_BASE_URL";

const SANDBOX_BASE_URL: &str = "https://sandbox.symmetry.com";
const PRODUCTION_BASE_URL: &str = "https://api.symmetry.com";
const CALCULATE_PATH: &str = "/api/v1/payroll/calculate";

/// Which engine deployment to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineEnvironment {
    /// Test deployment.
    #[default]
    Sandbox,
    /// Live deployment.
    Production,
}

impl FromStr for EngineEnvironment {
    type Err = std::convert::Infallible;

    /// Anything other than `production`/`prod` selects the sandbox.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "production" | "prod" => EngineEnvironment::Production,
            _ => EngineEnvironment::Sandbox,
        })
    }
}

impl EngineEnvironment {
    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEnvironment::Sandbox => "sandbox",
            EngineEnvironment::Production => "production",
        }
    }
}

/// Credentials and endpoint for the external tax engine.
///
/// # Example
///
/// ```
/// use payroll_withholding::config::EngineConfig;
///
/// assert!(!EngineConfig::default().is_configured());
///
/// let config = EngineConfig::new("key_123", "company_9");
/// assert!(config.is_configured());
/// assert!(config.calculate_url().ends_with("/api/v1/payroll/calculate"));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// API key sent as a bearer token.
    pub api_key: Option<String>,
    /// Sandbox or production.
    pub environment: EngineEnvironment,
    /// Company identifier the calculation is filed under.
    pub company_id: Option<String>,
    /// Overrides the environment's default base URL.
    pub base_url: Option<String>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("environment", &self.environment)
            .field("company_id", &self.company_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl EngineConfig {
    /// Creates a sandbox configuration with credentials.
    pub fn new(api_key: impl Into<String>, company_id: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            environment: EngineEnvironment::Sandbox,
            company_id: Some(company_id.into()),
            base_url: None,
        }
    }

    /// Sets the deployment environment.
    pub fn with_environment(mut self, environment: EngineEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            api_key: get(ENV_API_KEY),
            environment: get(ENV_ENVIRONMENT)
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            company_id: get(ENV_COMPANY_ID),
            base_url: get(ENV_BASE_URL),
        }
    }

    /// Returns true when both the API key and company id are present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.company_id.is_some()
    }

    /// Returns the full URL of the calculation endpoint.
    pub fn calculate_url(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(match self.environment {
            EngineEnvironment::Sandbox => SANDBOX_BASE_URL,
            EngineEnvironment::Production => PRODUCTION_BASE_URL,
        });
        format!("{}{}", base.trim_end_matches('/'), CALCULATE_PATH)
    }
}
