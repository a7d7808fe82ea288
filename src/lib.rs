//! Mortis: Mortality Report Library
//!
//! Loads a year of mortality records with their administrative-division,
//! cause-code and boundary references, aggregates them into summary tables
//! and renders those as a single-page interactive report.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod utils;

pub use report::{build_report, ReportArtifacts, ReportInputs};
