//! HTTP client for the Symmetry payroll calculation API.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` so the async
//! runtime is never blocked on the network. Every failure is reported as
//! [`EngineOutcome::Failed`]; nothing here panics or returns an error.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::EngineConfig;

use super::wire::{SymmetryRequest, SymmetryResponse};
use super::{EngineOutcome, EngineRequest, ExternalTaxEngine};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Adapter for the Symmetry tax engine.
///
/// # Example
///
/// ```
/// use payroll_withholding::config::EngineConfig;
/// use payroll_withholding::engine::{ExternalTaxEngine, SymmetryEngine};
///
/// let engine = SymmetryEngine::new(EngineConfig::default());
/// assert!(!engine.is_configured());
/// assert_eq!(engine.engine_id(), "symmetry");
/// ```
#[derive(Clone)]
pub struct SymmetryEngine {
    config: EngineConfig,
    agent: ureq::Agent,
}

impl std::fmt::Debug for SymmetryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetryEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SymmetryEngine {
    /// Creates an adapter from explicit configuration.
    pub fn new(config: EngineConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Self { config, agent }
    }

    /// Returns true when credentials are present.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Returns the configuration the adapter was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[async_trait]
impl ExternalTaxEngine for SymmetryEngine {
    async fn calculate(&self, request: &EngineRequest) -> EngineOutcome {
        let (Some(api_key), Some(company_id)) = (
            self.config.api_key.clone(),
            self.config.company_id.as_deref(),
        ) else {
            return EngineOutcome::NotConfigured;
        };

        let body = SymmetryRequest::new(company_id, request);
        let url = self.config.calculate_url();
        let agent = self.agent.clone();

        debug!(
            employee_id = %request.employee.id,
            url = %url,
            "Calling Symmetry"
        );

        let result = tokio::task::spawn_blocking(move || {
            let response = agent
                .post(&url)
                .header("Authorization", &format!("Bearer {}", api_key))
                .header("Accept", "application/json")
                .send_json(&body)
                .map_err(describe_transport_error)?;

            let parsed: SymmetryResponse = response
                .into_body()
                .read_json()
                .map_err(|e| format!("failed to parse engine response: {}", e))?;

            parsed.into_external()
        })
        .await;

        match result {
            Ok(Ok(external)) => EngineOutcome::Success(external),
            Ok(Err(message)) => EngineOutcome::Failed(message),
            Err(e) => EngineOutcome::Failed(format!("engine task join error: {}", e)),
        }
    }

    fn engine_id(&self) -> &str {
        "symmetry"
    }
}

fn describe_transport_error(error: ureq::Error) -> String {
    match error {
        ureq::Error::StatusCode(status) => format!("engine returned HTTP {}", status),
        other => format!("engine request failed: {}", other),
    }
}
