//! Application state for the payroll withholding API.

use std::sync::Arc;

use crate::withholding::WithholdingService;

/// Shared application state.
///
/// Holds the withholding service that every handler delegates to.
#[derive(Clone)]
pub struct AppState {
    service: Arc<WithholdingService>,
}

impl AppState {
    /// Creates application state around a service.
    pub fn new(service: WithholdingService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Returns the withholding service.
    pub fn service(&self) -> &WithholdingService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
