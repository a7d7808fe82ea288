//! Pipeline module - loads, normalizes and aggregates the input tables

pub mod aggregate;
pub mod bands;
pub mod boundary;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod records;

pub use aggregate::*;
pub use bands::*;
pub use boundary::*;
pub use error::*;
pub use loader::*;
pub use normalize::*;
pub use records::*;

use std::path::PathBuf;

use anyhow::Result;

use crate::config::ColumnsConfig;

/// A tabular input file and the worksheet to read from it
#[derive(Debug, Clone, PartialEq)]
pub struct TableSource {
    pub path: PathBuf,
    /// Worksheet name; ignored for CSV and Parquet
    pub sheet: Option<String>,
}

impl TableSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        Self {
            path: path.into(),
            sheet,
        }
    }
}

/// Locations of the four input files
#[derive(Debug, Clone, PartialEq)]
pub struct DataSources {
    pub mortality: TableSource,
    pub divisions: TableSource,
    pub causes: TableSource,
    pub boundaries: PathBuf,
    pub boundary_name_property: String,
}

/// The four normalized inputs, loaded once
#[derive(Debug, Clone)]
pub struct Datasets {
    pub mortality: MortalityTable,
    pub divisions: DivisionReference,
    pub causes: CauseReference,
    pub boundaries: GeoBoundaries,
}

impl Datasets {
    /// Load every input. Reference tables are read before the records so a
    /// broken reference fails before the large file is parsed.
    pub fn load(sources: &DataSources, columns: &ColumnsConfig) -> Result<Self> {
        let divisions = DivisionReference::load(
            &sources.divisions.path,
            sources.divisions.sheet.as_deref(),
            columns,
        )?;
        let causes = CauseReference::load(
            &sources.causes.path,
            sources.causes.sheet.as_deref(),
            columns,
        )?;
        let boundaries = GeoBoundaries::load(&sources.boundaries, &sources.boundary_name_property)?;
        let mortality = MortalityTable::load(
            &sources.mortality.path,
            sources.mortality.sheet.as_deref(),
            columns,
        )?;

        log_unmatched(&mortality, &divisions, &causes);

        Ok(Self {
            mortality,
            divisions,
            causes,
            boundaries,
        })
    }
}

fn log_unmatched(mortality: &MortalityTable, divisions: &DivisionReference, causes: &CauseReference) {
    let unmatched_geo = mortality
        .records
        .iter()
        .filter(|r| {
            r.geo_code
                .as_deref()
                .map_or(true, |code| divisions.get(code).is_none())
        })
        .count();
    let unmatched_cause = mortality
        .records
        .iter()
        .filter(|r| {
            r.cause_code
                .as_deref()
                .map_or(true, |code| causes.description(code).is_none())
        })
        .count();

    if unmatched_geo > 0 {
        tracing::warn!(
            count = unmatched_geo,
            "records with a geographic code missing from the division reference"
        );
    }
    if unmatched_cause > 0 {
        tracing::warn!(
            count = unmatched_cause,
            "records with a cause code missing from the cause reference"
        );
    }
}
