//! Export of the summary tables as CSV and JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::Summaries;

use super::{InputStats, PageSettings, ReportArtifacts};

/// File name of the JSON summary export
pub const SUMMARIES_JSON: &str = "summaries.json";

/// File name of the run metadata written next to the summaries
pub const RUN_METADATA_JSON: &str = "run.json";

/// Metadata about the run that produced an export
#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// Mortis version
    pub mortis_version: String,
}

/// Complete JSON export. Holds nothing run-specific, so identical inputs
/// give a byte-identical file.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryExport<'a> {
    pub page: &'a PageSettings,
    pub inputs: InputStats,
    pub summaries: &'a Summaries,
}

fn totals_column(totals: impl Iterator<Item = usize>) -> Column {
    let values: Vec<u64> = totals.map(|t| t as u64).collect();
    Column::new("total".into(), values)
}

/// Convert each summary table to a DataFrame, keyed by export file stem
pub fn summary_frames(summaries: &Summaries) -> Result<Vec<(&'static str, DataFrame)>> {
    let by_department = DataFrame::new(vec![
        Column::new(
            "department_code".into(),
            summaries
                .by_department
                .iter()
                .map(|r| r.department_code.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "department_name".into(),
            summaries
                .by_department
                .iter()
                .map(|r| r.department_name.clone())
                .collect::<Vec<_>>(),
        ),
        totals_column(summaries.by_department.iter().map(|r| r.total)),
    ])?;

    let by_month = DataFrame::new(vec![
        Column::new(
            "month".into(),
            summaries
                .by_month
                .iter()
                .map(|r| r.month.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>(),
        ),
        totals_column(summaries.by_month.iter().map(|r| r.total)),
    ])?;

    let top_violent = municipality_frame(&summaries.top_violent_municipalities)?;
    let bottom_mortality = municipality_frame(&summaries.bottom_mortality_municipalities)?;

    let top_causes = DataFrame::new(vec![
        Column::new(
            "cause_code".into(),
            summaries
                .top_causes
                .iter()
                .map(|r| r.cause_code.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "description".into(),
            summaries
                .top_causes
                .iter()
                .map(|r| r.description.clone())
                .collect::<Vec<_>>(),
        ),
        totals_column(summaries.top_causes.iter().map(|r| r.total)),
    ])?;

    let by_age_band = DataFrame::new(vec![
        Column::new(
            "band".into(),
            summaries
                .by_age_band
                .iter()
                .map(|r| r.band.clone())
                .collect::<Vec<_>>(),
        ),
        totals_column(summaries.by_age_band.iter().map(|r| r.total)),
    ])?;

    let by_sex_and_department = DataFrame::new(vec![
        Column::new(
            "department_code".into(),
            summaries
                .by_sex_and_department
                .iter()
                .map(|r| r.department_code.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "department_name".into(),
            summaries
                .by_sex_and_department
                .iter()
                .map(|r| r.department_name.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "sex_code".into(),
            summaries
                .by_sex_and_department
                .iter()
                .map(|r| r.sex_code)
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "sex_label".into(),
            summaries
                .by_sex_and_department
                .iter()
                .map(|r| r.sex_label.clone())
                .collect::<Vec<_>>(),
        ),
        totals_column(summaries.by_sex_and_department.iter().map(|r| r.total)),
    ])?;

    Ok(vec![
        ("by_department", by_department),
        ("by_month", by_month),
        ("top_violent_municipalities", top_violent),
        ("bottom_mortality_municipalities", bottom_mortality),
        ("top_causes", top_causes),
        ("by_age_band", by_age_band),
        ("by_sex_and_department", by_sex_and_department),
    ])
}

fn municipality_frame(rows: &[crate::pipeline::MunicipalityTotal]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            "geo_code".into(),
            rows.iter().map(|r| r.geo_code.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "municipality_name".into(),
            rows.iter()
                .map(|r| r.municipality_name.clone())
                .collect::<Vec<_>>(),
        ),
        totals_column(rows.iter().map(|r| r.total)),
    ])?;
    Ok(df)
}

/// Write every summary table as `<name>.csv`, all of them together as
/// `summaries.json`, and the run timestamp and version as `run.json`.
///
/// Everything except `run.json` is reproducible from the inputs.
/// Returns the paths written, CSV files first.
pub fn export_summaries(
    artifacts: &ReportArtifacts,
    page: &PageSettings,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let mut written = Vec::new();

    for (name, mut df) in summary_frames(&artifacts.summaries)? {
        let path = dir.join(format!("{}.csv", name));
        let mut file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        written.push(path);
    }

    let export = SummaryExport {
        page,
        inputs: artifacts.stats,
        summaries: &artifacts.summaries,
    };

    let json_path = dir.join(SUMMARIES_JSON);
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize summaries")?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("Failed to write summaries file: {}", json_path.display()))?;
    written.push(json_path);

    let metadata = ExportMetadata {
        timestamp: Utc::now().to_rfc3339(),
        mortis_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let metadata_path = dir.join(RUN_METADATA_JSON);
    let json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize run metadata")?;
    std::fs::write(&metadata_path, json)
        .with_context(|| format!("Failed to write run metadata: {}", metadata_path.display()))?;
    written.push(metadata_path);

    Ok(written)
}

/// Write the rendered page to a file
pub fn write_html(artifacts: &ReportArtifacts, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, &artifacts.html)
        .with_context(|| format!("Failed to write report page: {}", path.display()))
}
