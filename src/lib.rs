//! Payroll Tax Withholding Engine
//!
//! This crate computes the employee-side tax withholdings for a single pay
//! event: federal and state income tax, Social Security, Medicare,
//! Additional Medicare and state disability insurance.
//!
//! Calculations are delegated to an external tax engine when one is
//! configured and reachable. Otherwise the internal bracket-based calculators
//! produce the result. Every calculation is tagged with the engine that
//! produced it and appended to an audit log.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod withholding;
