#![forbid(unsafe_code)]

//! Core domain model and decision logic for the abx antibiotic recommendation engine.
//!
//! This crate provides:
//! - Domain types (patient profile, derived facts, regimens, results)
//! - Biometric calculators (BMI, IBW, ABW, Cockcroft-Gault, GFR bands)
//! - Severity scoring and pathogen profiling
//! - Versioned reference tables and safety screening
//! - The recommendation selector and dose annotators
//! - Boundary I/O (config, co-medication lists, audit log, CSV batches)

pub mod types;
pub mod error;
pub mod profile;
pub mod biometrics;
pub mod severity;
pub mod pathogens;
pub mod reference;
pub mod safety;
pub mod dosing;
pub mod rationale;
pub mod selector;
pub mod config;
pub mod logging;
pub mod medications;
pub mod audit;
pub mod batch;
pub mod summary;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use biometrics::derive_facts;
pub use reference::{build_default_tables, get_default_tables, ReferenceTables};
pub use config::Config;
pub use audit::{AuditRecord, AuditSink, JsonlAuditSink};
pub use medications::load_current_medications;
pub use summary::AdvisorySummary;
pub use selector::{recommend, recommend_with};
