//! Summary tables computed from the normalized records
//!
//! Every routine is a single group-count pass over the mortality records,
//! optionally followed by a lookup in a reference table and a sort/limit.
//! Groups are held in ordered maps so the output is deterministic; ties in
//! count-ordered summaries keep ascending key order.
//!
//! Records whose code has no match in a reference table still count. Only
//! their display field is `None`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bands::{band_index, band_labels, BAND_COUNT};
use super::normalize::canonical_department_name;
use super::records::{CauseReference, DivisionReference, MortalityTable};

/// Cause-code prefix for homicide by firearm discharge
pub const DEFAULT_HOMICIDE_PREFIX: &str = "X95";

/// Deaths per department
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentTotal {
    pub department_code: Option<String>,
    /// Name spelled as in the boundary file
    pub department_name: Option<String>,
    pub total: usize,
}

/// Deaths per calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// First day of the month
    pub month: NaiveDate,
    pub total: usize,
}

/// Deaths per municipality
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityTotal {
    pub geo_code: Option<String>,
    pub municipality_name: Option<String>,
    pub total: usize,
}

/// Deaths per cause code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseTotal {
    pub cause_code: Option<String>,
    pub description: Option<String>,
    pub total: usize,
}

/// Deaths per age band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBandTotal {
    pub band: String,
    pub total: usize,
}

/// Deaths per department and sex
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexDepartmentTotal {
    pub department_code: Option<String>,
    pub department_name: Option<String>,
    pub sex_code: Option<i64>,
    pub sex_label: Option<String>,
    pub total: usize,
}

/// Filters and limits for the ranked summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    pub homicide_prefix: String,
    pub top_violent_limit: usize,
    pub bottom_mortality_limit: usize,
    pub top_causes_limit: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            homicide_prefix: DEFAULT_HOMICIDE_PREFIX.to_string(),
            top_violent_limit: 5,
            bottom_mortality_limit: 10,
            top_causes_limit: 10,
        }
    }
}

/// Display label for a sex code
pub fn sex_label(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Masculino"),
        2 => Some("Femenino"),
        9 => Some("Sin especificar"),
        _ => None,
    }
}

/// Total deaths per department code
pub fn by_department(
    mortality: &MortalityTable,
    divisions: &DivisionReference,
) -> Vec<DepartmentTotal> {
    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for record in &mortality.records {
        *counts.entry(record.department_code.as_deref()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(code, total)| DepartmentTotal {
            department_code: code.map(str::to_string),
            department_name: code
                .and_then(|c| divisions.department_name(c))
                .map(canonical_department_name),
            total,
        })
        .collect()
}

/// Total deaths per month, ascending.
///
/// Records whose year and month do not form a valid date are left out.
pub fn by_month(mortality: &MortalityTable) -> Vec<MonthTotal> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut undated = 0usize;

    for record in &mortality.records {
        match record.death_month() {
            Some(month) => *counts.entry(month).or_insert(0) += 1,
            None => undated += 1,
        }
    }

    if undated > 0 {
        tracing::debug!(count = undated, "records without a valid month left out of monthly totals");
    }

    counts
        .into_iter()
        .map(|(month, total)| MonthTotal { month, total })
        .collect()
}

/// Municipalities with the most deaths whose cause starts with `prefix`
pub fn top_violent_municipalities(
    mortality: &MortalityTable,
    divisions: &DivisionReference,
    prefix: &str,
    limit: usize,
) -> Vec<MunicipalityTotal> {
    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for record in mortality
        .records
        .iter()
        .filter(|r| r.cause_starts_with(prefix))
    {
        *counts.entry(record.geo_code.as_deref()).or_insert(0) += 1;
    }

    let mut totals = municipality_totals(counts, divisions);
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals.truncate(limit);
    totals
}

/// Municipalities with the fewest recorded deaths
pub fn bottom_mortality_municipalities(
    mortality: &MortalityTable,
    divisions: &DivisionReference,
    limit: usize,
) -> Vec<MunicipalityTotal> {
    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for record in &mortality.records {
        *counts.entry(record.geo_code.as_deref()).or_insert(0) += 1;
    }

    let mut totals = municipality_totals(counts, divisions);
    totals.sort_by(|a, b| a.total.cmp(&b.total));
    totals.truncate(limit);
    totals
}

fn municipality_totals(
    counts: BTreeMap<Option<&str>, usize>,
    divisions: &DivisionReference,
) -> Vec<MunicipalityTotal> {
    counts
        .into_iter()
        .map(|(code, total)| MunicipalityTotal {
            geo_code: code.map(str::to_string),
            municipality_name: code
                .and_then(|c| divisions.municipality_name(c))
                .map(str::to_string),
            total,
        })
        .collect()
}

/// Most frequent causes of death with their descriptions
pub fn top_causes(
    mortality: &MortalityTable,
    causes: &CauseReference,
    limit: usize,
) -> Vec<CauseTotal> {
    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for record in &mortality.records {
        *counts.entry(record.cause_code.as_deref()).or_insert(0) += 1;
    }

    let mut totals: Vec<CauseTotal> = counts
        .into_iter()
        .map(|(code, total)| CauseTotal {
            cause_code: code.map(str::to_string),
            description: code
                .and_then(|c| causes.description(c))
                .map(str::to_string),
            total,
        })
        .collect();

    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals.truncate(limit);
    totals
}

/// Deaths per five-year age band, in band order.
///
/// Every band is present even with a zero count. Records with a missing,
/// unparseable or negative age count toward the other summaries but are
/// absent here.
pub fn by_age_band(mortality: &MortalityTable) -> Vec<AgeBandTotal> {
    let mut counts = [0usize; BAND_COUNT];
    let mut unbanded = 0usize;

    for record in &mortality.records {
        match record.age.and_then(band_index) {
            Some(idx) => counts[idx] += 1,
            None => unbanded += 1,
        }
    }

    if unbanded > 0 {
        tracing::debug!(count = unbanded, "records without a usable age left out of age bands");
    }

    band_labels()
        .into_iter()
        .zip(counts)
        .map(|(band, total)| AgeBandTotal { band, total })
        .collect()
}

/// Deaths per (department code, sex code)
pub fn by_sex_and_department(
    mortality: &MortalityTable,
    divisions: &DivisionReference,
) -> Vec<SexDepartmentTotal> {
    let mut counts: BTreeMap<(Option<&str>, Option<i64>), usize> = BTreeMap::new();
    for record in &mortality.records {
        *counts
            .entry((record.department_code.as_deref(), record.sex))
            .or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((department, sex), total)| SexDepartmentTotal {
            department_code: department.map(str::to_string),
            department_name: department
                .and_then(|c| divisions.department_name(c))
                .map(str::to_string),
            sex_code: sex,
            sex_label: sex.and_then(sex_label).map(str::to_string),
            total,
        })
        .collect()
}

/// The seven summary tables behind the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summaries {
    pub by_department: Vec<DepartmentTotal>,
    pub by_month: Vec<MonthTotal>,
    pub top_violent_municipalities: Vec<MunicipalityTotal>,
    pub bottom_mortality_municipalities: Vec<MunicipalityTotal>,
    pub top_causes: Vec<CauseTotal>,
    pub by_age_band: Vec<AgeBandTotal>,
    pub by_sex_and_department: Vec<SexDepartmentTotal>,
}

impl Summaries {
    pub fn compute(
        mortality: &MortalityTable,
        divisions: &DivisionReference,
        causes: &CauseReference,
        options: &AggregateOptions,
    ) -> Self {
        Self {
            by_department: by_department(mortality, divisions),
            by_month: by_month(mortality),
            top_violent_municipalities: top_violent_municipalities(
                mortality,
                divisions,
                &options.homicide_prefix,
                options.top_violent_limit,
            ),
            bottom_mortality_municipalities: bottom_mortality_municipalities(
                mortality,
                divisions,
                options.bottom_mortality_limit,
            ),
            top_causes: top_causes(mortality, causes, options.top_causes_limit),
            by_age_band: by_age_band(mortality),
            by_sex_and_department: by_sex_and_department(mortality, divisions),
        }
    }
}
