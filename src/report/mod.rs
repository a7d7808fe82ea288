//! Report module - charts, page layout, export and terminal summary

pub mod charts;
pub mod export;
pub mod summary;
pub mod view;

pub use charts::*;
pub use export::*;
pub use summary::*;
pub use view::*;

use anyhow::Result;
use serde::Serialize;

use crate::config::ColumnsConfig;
use crate::pipeline::{AggregateOptions, DataSources, Datasets, Summaries};

/// Country and year shown in the page and chart titles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSettings {
    pub country: String,
    pub year: i32,
}

/// Everything [`build_report`] needs
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub sources: DataSources,
    pub columns: ColumnsConfig,
    pub aggregate: AggregateOptions,
    pub page: PageSettings,
}

/// Sizes of the loaded inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputStats {
    pub mortality_records: usize,
    pub geographic_codes: usize,
    pub departments: usize,
    pub cause_codes: usize,
    pub boundary_regions: usize,
    pub oversized_geo_codes: usize,
}

impl InputStats {
    pub fn from_datasets(datasets: &Datasets) -> Self {
        Self {
            mortality_records: datasets.mortality.len(),
            geographic_codes: datasets.divisions.len(),
            departments: datasets.divisions.department_count(),
            cause_codes: datasets.causes.len(),
            boundary_regions: datasets.boundaries.features().len(),
            oversized_geo_codes: datasets.mortality.oversized_geo_codes,
        }
    }
}

/// The finished report: summary tables, page layout and rendered HTML
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub stats: InputStats,
    pub summaries: Summaries,
    pub page: Page,
    pub html: String,
}

impl ReportArtifacts {
    /// Aggregate already-loaded datasets and render the page
    pub fn from_datasets(datasets: &Datasets, inputs: &ReportInputs) -> Result<Self> {
        let summaries = Summaries::compute(
            &datasets.mortality,
            &datasets.divisions,
            &datasets.causes,
            &inputs.aggregate,
        );
        let charts = ChartSet::build(
            &summaries,
            &datasets.boundaries,
            &inputs.page,
            &inputs.aggregate,
        );
        let page = Page::compose(charts, &inputs.page, &inputs.aggregate);
        let html = page.render_html()?;

        Ok(Self {
            stats: InputStats::from_datasets(datasets),
            summaries,
            page,
            html,
        })
    }
}

/// Load every input, aggregate and render the report.
///
/// Holds no state between calls: the same input files always produce the
/// same artifacts.
pub fn build_report(inputs: &ReportInputs) -> Result<ReportArtifacts> {
    let datasets = Datasets::load(&inputs.sources, &inputs.columns)?;
    ReportArtifacts::from_datasets(&datasets, inputs)
}
