//! Normalized in-memory tables built from the raw input files

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;

use super::loader::{float_values, integer_values, read_table, require_column, string_values};
use super::normalize::{is_oversized_geo_code, normalize_cause_code, normalize_name, pad_geo_code};
use crate::config::ColumnsConfig;

/// One death record
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityRecord {
    /// Six-character municipality code (`None` when the cell is empty)
    pub geo_code: Option<String>,
    pub department_code: Option<String>,
    /// Trimmed, uppercased cause code
    pub cause_code: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Age value used for the age histogram
    pub age: Option<f64>,
    /// 1 = male, 2 = female, 9 = unspecified
    pub sex: Option<i64>,
}

impl MortalityRecord {
    /// First day of the month of death, or `None` if year/month do not form a date
    pub fn death_month(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, 1)
    }

    /// True when the cause code starts with `prefix`
    pub fn cause_starts_with(&self, prefix: &str) -> bool {
        self.cause_code
            .as_deref()
            .map(|code| code.starts_with(prefix))
            .unwrap_or(false)
    }
}

/// All mortality records for the reporting year
#[derive(Debug, Clone, Default)]
pub struct MortalityTable {
    pub records: Vec<MortalityRecord>,
    /// Number of geographic codes wider than six characters
    pub oversized_geo_codes: usize,
}

impl MortalityTable {
    /// Load and normalize the mortality table
    pub fn load(path: &Path, sheet: Option<&str>, columns: &ColumnsConfig) -> Result<Self> {
        let df = read_table(path, sheet)?;
        Self::from_dataframe(&df, columns)
    }

    pub fn from_dataframe(df: &DataFrame, columns: &ColumnsConfig) -> Result<Self> {
        const TABLE: &str = "mortality";

        let geo_codes = string_values(require_column(df, TABLE, &columns.geo_code)?)?;
        let department_codes =
            string_values(require_column(df, TABLE, &columns.department_code)?)?;
        let cause_codes = string_values(require_column(df, TABLE, &columns.cause_code)?)?;
        let years = integer_values(require_column(df, TABLE, &columns.year)?)?;
        let months = integer_values(require_column(df, TABLE, &columns.month)?)?;
        let ages = float_values(require_column(df, TABLE, &columns.age)?)?;
        let sexes = integer_values(require_column(df, TABLE, &columns.sex)?)?;

        let mut oversized_geo_codes = 0usize;
        let mut records = Vec::with_capacity(df.height());

        for idx in 0..df.height() {
            let geo_code = geo_codes[idx].as_deref().map(pad_geo_code);
            if geo_code.as_deref().is_some_and(is_oversized_geo_code) {
                oversized_geo_codes += 1;
            }

            records.push(MortalityRecord {
                geo_code,
                department_code: department_codes[idx].as_deref().map(|s| s.trim().to_string()),
                cause_code: cause_codes[idx].as_deref().map(normalize_cause_code),
                year: years[idx].and_then(|y| i32::try_from(y).ok()),
                month: months[idx].and_then(|m| u32::try_from(m).ok()),
                age: ages[idx],
                sex: sexes[idx],
            });
        }

        if oversized_geo_codes > 0 {
            tracing::warn!(
                count = oversized_geo_codes,
                "geographic codes wider than six characters kept verbatim; they will not match the division reference"
            );
        }

        Ok(Self {
            records,
            oversized_geo_codes,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Names attached to one geographic code
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    pub department_code: Option<String>,
    pub department_name: Option<String>,
    pub municipality_name: Option<String>,
}

/// Administrative-division reference keyed by geographic code
#[derive(Debug, Clone, Default)]
pub struct DivisionReference {
    divisions: BTreeMap<String, Division>,
    departments: BTreeMap<String, String>,
}

impl DivisionReference {
    pub fn load(path: &Path, sheet: Option<&str>, columns: &ColumnsConfig) -> Result<Self> {
        let df = read_table(path, sheet)?;
        Self::from_dataframe(&df, columns)
    }

    pub fn from_dataframe(df: &DataFrame, columns: &ColumnsConfig) -> Result<Self> {
        const TABLE: &str = "division";

        let geo_codes = string_values(require_column(df, TABLE, &columns.geo_code)?)?;
        let department_codes =
            string_values(require_column(df, TABLE, &columns.department_code)?)?;
        let department_names =
            string_values(require_column(df, TABLE, &columns.department_name)?)?;
        let municipality_names =
            string_values(require_column(df, TABLE, &columns.municipality_name)?)?;

        let mut reference = Self::default();

        for idx in 0..df.height() {
            let department_code = department_codes[idx].as_deref().map(|s| s.trim().to_string());
            let department_name = department_names[idx].as_deref().map(normalize_name);

            // First name seen for a department code wins
            if let (Some(code), Some(name)) = (&department_code, &department_name) {
                reference
                    .departments
                    .entry(code.clone())
                    .or_insert_with(|| name.clone());
            }

            let Some(geo_code) = geo_codes[idx].as_deref().map(pad_geo_code) else {
                continue;
            };

            reference.divisions.entry(geo_code).or_insert(Division {
                department_code,
                department_name,
                municipality_name: municipality_names[idx].as_deref().map(normalize_name),
            });
        }

        Ok(reference)
    }

    pub fn get(&self, geo_code: &str) -> Option<&Division> {
        self.divisions.get(geo_code)
    }

    pub fn municipality_name(&self, geo_code: &str) -> Option<&str> {
        self.divisions
            .get(geo_code)
            .and_then(|d| d.municipality_name.as_deref())
    }

    pub fn department_name(&self, department_code: &str) -> Option<&str> {
        self.departments.get(department_code).map(String::as_str)
    }

    /// Number of distinct geographic codes
    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }
}

/// Cause-of-death descriptions keyed by normalized cause code
#[derive(Debug, Clone, Default)]
pub struct CauseReference {
    descriptions: BTreeMap<String, String>,
}

impl CauseReference {
    pub fn load(path: &Path, sheet: Option<&str>, columns: &ColumnsConfig) -> Result<Self> {
        let df = read_table(path, sheet)?;
        Self::from_dataframe(&df, columns)
    }

    pub fn from_dataframe(df: &DataFrame, columns: &ColumnsConfig) -> Result<Self> {
        const TABLE: &str = "cause";

        let codes = string_values(require_column(df, TABLE, &columns.cause_code)?)?;
        let descriptions =
            string_values(require_column(df, TABLE, &columns.cause_description)?)?;

        let mut reference = Self::default();
        for (code, description) in codes.into_iter().zip(descriptions) {
            if let (Some(code), Some(description)) = (code, description) {
                reference
                    .descriptions
                    .entry(normalize_cause_code(&code))
                    .or_insert_with(|| description.trim().to_string());
            }
        }

        Ok(reference)
    }

    pub fn description(&self, cause_code: &str) -> Option<&str> {
        self.descriptions.get(cause_code).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.descriptions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
