//! Withholding orchestration.
//!
//! [`WithholdingService`] owns the request flow: validate the pay event,
//! load the worker's profile and record, try the external engine, fall back
//! to the internal calculators when it is unavailable, and append the
//! result to the audit log.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{compute_internal_withholding, round_to_cent};
use crate::config::TaxTables;
use crate::engine::{EngineOutcome, EngineRequest, ExternalTaxEngine, ExternalWithholding};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditRecord, AuditStep, AuditTrace, AuditWarning, CalculationDetails, CalculationResult,
    EngineUsed, PayEvent, TaxProfile,
};
use crate::store::{AuditLogStore, EmployeeStore, TaxProfileStore};

/// The version of the withholding engine.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One worker's withholding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithholdingRequest {
    /// The worker being paid.
    pub employee_id: String,
    /// Wages and accumulators for this pay.
    pub pay_event: PayEvent,
}

/// The result of one entry in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The worker the entry was for.
    pub employee_id: String,
    /// The calculation result or the error that stopped it.
    pub result: EngineResult<CalculationResult>,
}

/// Computes withholdings for pay events.
#[derive(Clone)]
pub struct WithholdingService {
    profiles: Arc<dyn TaxProfileStore>,
    employees: Arc<dyn EmployeeStore>,
    audit_log: Arc<dyn AuditLogStore>,
    engine: Arc<dyn ExternalTaxEngine>,
    tables: Arc<TaxTables>,
}

impl std::fmt::Debug for WithholdingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithholdingService")
            .field("engine", &self.engine.engine_id())
            .field("tax_years", &self.tables.years())
            .finish_non_exhaustive()
    }
}

impl WithholdingService {
    /// Creates a service from individual stores.
    pub fn new(
        profiles: Arc<dyn TaxProfileStore>,
        employees: Arc<dyn EmployeeStore>,
        audit_log: Arc<dyn AuditLogStore>,
        engine: Arc<dyn ExternalTaxEngine>,
        tables: Arc<TaxTables>,
    ) -> Self {
        Self {
            profiles,
            employees,
            audit_log,
            engine,
            tables,
        }
    }

    /// Creates a service backed by a single store implementing all three traits.
    pub fn with_store<S>(
        store: Arc<S>,
        engine: Arc<dyn ExternalTaxEngine>,
        tables: Arc<TaxTables>,
    ) -> Self
    where
        S: TaxProfileStore + EmployeeStore + AuditLogStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store, engine, tables)
    }

    /// Returns the loaded tables.
    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Computes withholdings for one pay event.
    ///
    /// Fails only when the pay event is invalid, the worker has no tax
    /// profile or record, or a store read fails. External engine problems
    /// are never errors: they route to the internal calculators.
    pub async fn calculate(&self, request: &WithholdingRequest) -> EngineResult<CalculationResult> {
        let start = Instant::now();
        let employee_id = request.employee_id.as_str();
        let event = &request.pay_event;

        event.validate()?;

        let profile = self
            .profiles
            .get_tax_profile(employee_id)
            .await?
            .ok_or_else(|| EngineError::TaxProfileNotFound {
                employee_id: employee_id.to_string(),
            })?;
        profile.validate()?;

        let employee = self
            .employees
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;

        let engine_request = EngineRequest {
            employee,
            profile,
            pay_event: event.clone(),
            period: event.resolved_period(),
        };

        let mut warnings = Vec::new();

        let mut result = match self.engine.calculate(&engine_request).await {
            EngineOutcome::Success(external) => {
                debug!(
                    employee_id,
                    engine = self.engine.engine_id(),
                    calculation_id = %external.calculation_id,
                    "External engine succeeded"
                );
                self.external_result(&engine_request, external, warnings)
            }
            outcome => {
                match outcome {
                    EngineOutcome::Failed(message) => {
                        warn!(
                            employee_id,
                            engine = self.engine.engine_id(),
                            error = %message,
                            "External engine failed; using internal calculators"
                        );
                        warnings.push(AuditWarning::new(
                            "EXTERNAL_ENGINE_FAILED",
                            format!("External engine failed: {}", message),
                            "medium",
                        ));
                    }
                    _ => {
                        debug!(
                            employee_id,
                            "External engine not configured; using internal calculators"
                        );
                        warnings.push(AuditWarning::new(
                            "EXTERNAL_ENGINE_NOT_CONFIGURED",
                            "External engine credentials are not configured",
                            "low",
                        ));
                    }
                }
                self.internal_result(&engine_request.profile, event, warnings)
            }
        };

        result.audit_trace.duration_us = start.elapsed().as_micros() as u64;

        info!(
            employee_id,
            calculation_id = %result.calculation_id,
            engine = result.engine_used().as_str(),
            total_withholdings = %result.total_withholdings,
            net_pay = %result.net_pay,
            duration_us = result.audit_trace.duration_us,
            "Withholding calculated"
        );

        self.record(&result).await;

        Ok(result)
    }

    /// Computes withholdings for several workers.
    ///
    /// Entries are independent: a failure for one worker is reported in its
    /// own outcome and never affects the others. Outcomes are returned in
    /// request order.
    pub async fn calculate_batch(&self, requests: &[WithholdingRequest]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());

        for request in requests {
            let result = self.calculate(request).await;
            if let Err(ref e) = result {
                warn!(employee_id = %request.employee_id, error = %e, "Batch entry failed");
            }
            outcomes.push(BatchOutcome {
                employee_id: request.employee_id.clone(),
                result,
            });
        }

        outcomes
    }

    /// Returns a worker's audit history, oldest first.
    pub async fn audit_history(&self, employee_id: &str) -> EngineResult<Vec<AuditRecord>> {
        Ok(self.audit_log.list_for_employee(employee_id).await?)
    }

    fn external_result(
        &self,
        request: &EngineRequest,
        external: ExternalWithholding,
        mut warnings: Vec<AuditWarning>,
    ) -> CalculationResult {
        let event = &request.pay_event;
        let gross = event.gross_wages;
        let withholdings = external.withholdings.map(round_to_cent);
        let total_withholdings = withholdings.total();
        let net_pay = gross - total_withholdings;

        if net_pay < Decimal::ZERO {
            warn!(
                employee_id = %request.employee.id,
                gross = %gross,
                total_withholdings = %total_withholdings,
                "External engine withheld more than gross"
            );
            warnings.push(AuditWarning::new(
                "NEGATIVE_NET_PAY",
                format!(
                    "External withholding ${} exceeds gross ${}",
                    total_withholdings, gross
                ),
                "high",
            ));
        }

        let step = AuditStep {
            step_number: 1,
            rule_id: "external_engine".to_string(),
            rule_name: "External Tax Engine".to_string(),
            authority: self.engine.engine_id().to_string(),
            input: serde_json::json!({
                "gross_wages": gross.normalize().to_string(),
                "pay_frequency": event.pay_frequency.as_str(),
                "pay_period_start": request.period.start_date.to_string(),
                "pay_period_end": request.period.end_date.to_string()
            }),
            output: serde_json::json!({
                "calculation_id": external.calculation_id,
                "total_withholdings": total_withholdings.to_string()
            }),
            reasoning: format!(
                "Withholdings supplied by {} calculation {}",
                self.engine.engine_id(),
                external.calculation_id
            ),
        };

        CalculationResult {
            calculation_id: external.calculation_id,
            timestamp: external.timestamp,
            engine_version: ENGINE_VERSION.to_string(),
            employee_id: request.employee.id.clone(),
            gross_wages: gross,
            withholdings,
            total_withholdings,
            net_pay,
            calculation_details: CalculationDetails {
                engine: EngineUsed::Symmetry,
                annualized_income: None,
                adjusted_annual_income: None,
                pay_frequency: event.pay_frequency,
                filing_status: request.profile.filing_status,
                tax_year: event.tax_year(),
                timestamp: external.timestamp,
            },
            audit_trace: AuditTrace {
                steps: vec![step],
                warnings,
                duration_us: 0,
            },
        }
    }

    fn internal_result(
        &self,
        profile: &TaxProfile,
        event: &PayEvent,
        mut warnings: Vec<AuditWarning>,
    ) -> CalculationResult {
        let internal = compute_internal_withholding(profile, event, &self.tables);
        let timestamp = Utc::now();

        let total_withholdings = internal.withholdings.total();
        let net_pay = event.gross_wages - total_withholdings;
        warnings.extend(internal.warnings);

        CalculationResult {
            calculation_id: Uuid::new_v4().to_string(),
            timestamp,
            engine_version: ENGINE_VERSION.to_string(),
            employee_id: profile.employee_id.clone(),
            gross_wages: event.gross_wages,
            withholdings: internal.withholdings,
            total_withholdings,
            net_pay,
            calculation_details: CalculationDetails {
                engine: EngineUsed::InternalFallback,
                annualized_income: Some(internal.annualized_income),
                adjusted_annual_income: Some(internal.adjusted_annual_income),
                pay_frequency: event.pay_frequency,
                filing_status: profile.filing_status,
                tax_year: internal.tax_year,
                timestamp,
            },
            audit_trace: AuditTrace {
                steps: internal.audit_steps,
                warnings,
                duration_us: 0,
            },
        }
    }

    /// Appends to the audit log. Failures are logged, never returned.
    async fn record(&self, result: &CalculationResult) {
        if let Err(e) = self.audit_log.append(AuditRecord::from(result)).await {
            warn!(
                employee_id = %result.employee_id,
                calculation_id = %result.calculation_id,
                error = %e,
                "Failed to append audit record"
            );
        }
    }
}
