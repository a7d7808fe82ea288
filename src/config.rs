//! Configuration file handling.
//!
//! Settings come from an optional `mortis.toml` and are then overridden by
//! explicit command-line arguments. Every field has a default matching the
//! shipped 2019 Colombian dataset, so an empty or absent file is valid.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::pipeline::{AggregateOptions, DataSources, TableSource, DEFAULT_NAME_PROPERTY};
use crate::report::{PageSettings, ReportInputs};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mortis.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Column names in the input tables.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Report content settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Local web server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory the file names below are resolved against.
    #[serde(default = "default_data_dir")]
    pub directory: PathBuf,

    #[serde(default = "default_mortality_file")]
    pub mortality_file: String,

    #[serde(default = "default_divisions_file")]
    pub divisions_file: String,

    #[serde(default = "default_causes_file")]
    pub causes_file: String,

    #[serde(default = "default_boundaries_file")]
    pub boundaries_file: String,

    /// Worksheet of the mortality workbook. Unset or `""` reads the first sheet.
    #[serde(default)]
    pub mortality_sheet: Option<String>,

    /// Worksheet of the division workbook. Unset or `""` reads the first sheet.
    #[serde(default)]
    pub divisions_sheet: Option<String>,

    /// Worksheet of the cause-code workbook. `""` reads the first sheet.
    #[serde(default = "default_causes_sheet")]
    pub causes_sheet: Option<String>,

    /// GeoJSON feature property holding the department name.
    #[serde(default = "default_boundary_name_property")]
    pub boundary_name_property: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: default_data_dir(),
            mortality_file: default_mortality_file(),
            divisions_file: default_divisions_file(),
            causes_file: default_causes_file(),
            boundaries_file: default_boundaries_file(),
            mortality_sheet: None,
            divisions_sheet: None,
            causes_sheet: default_causes_sheet(),
            boundary_name_property: default_boundary_name_property(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_mortality_file() -> String {
    "Anexo1.NoFetal2019_CE_15-03-23.xlsx".to_string()
}

fn default_divisions_file() -> String {
    "Anexo3.Divipola_CE_15-03-23.xlsx".to_string()
}

fn default_causes_file() -> String {
    "Anexo2.CodigosDeMuerte_CE_15-03-23.xlsx".to_string()
}

fn default_boundaries_file() -> String {
    "colombia_departamentos.geojson".to_string()
}

fn default_causes_sheet() -> Option<String> {
    Some("Final".to_string())
}

/// Sheet to read: a blank name selects the first sheet
fn sheet_name(sheet: Option<&str>) -> Option<String> {
    sheet.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

fn default_boundary_name_property() -> String {
    DEFAULT_NAME_PROPERTY.to_string()
}

/// Column names shared by the input tables.
///
/// The mortality and division tables share the code columns; the cause
/// table shares `cause_code` with the mortality table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub geo_code: String,
    pub department_code: String,
    pub cause_code: String,
    pub year: String,
    pub month: String,
    pub age: String,
    pub sex: String,
    pub department_name: String,
    pub municipality_name: String,
    pub cause_description: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            geo_code: "COD_DANE".to_string(),
            department_code: "COD_DEPARTAMENTO".to_string(),
            cause_code: "COD_MUERTE".to_string(),
            year: "AÑO".to_string(),
            month: "MES".to_string(),
            age: "GRUPO_EDAD1".to_string(),
            sex: "SEXO".to_string(),
            department_name: "DEPARTAMENTO".to_string(),
            municipality_name: "MUNICIPIO".to_string(),
            cause_description: "DESCRIPCION_MUERTE".to_string(),
        }
    }
}

/// Report content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Country name shown in titles.
    #[serde(default = "default_country")]
    pub country: String,

    /// Year shown in titles.
    #[serde(default = "default_year")]
    pub year: i32,

    /// Filters and limits for the ranked summaries.
    #[serde(flatten)]
    pub aggregate: AggregateOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            year: default_year(),
            aggregate: AggregateOptions::default(),
        }
    }
}

fn default_country() -> String {
    "Colombia".to_string()
}

fn default_year() -> i32 {
    2019
}

/// Local web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the configuration for a CLI invocation: an explicit `--config`
    /// file, else `mortis.toml` if present, else defaults; then CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?.unwrap_or_default(),
        };
        config.merge_with_args(cli);
        Ok(config)
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only arguments given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, cli: &Cli) {
        if let Some(ref dir) = cli.data_dir {
            self.data.directory = dir.clone();
        }
        if let Some(year) = cli.year {
            self.report.year = year;
        }
        if let Some(ref host) = cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    /// Build the pipeline inputs described by this configuration
    pub fn report_inputs(&self) -> ReportInputs {
        let dir = &self.data.directory;
        ReportInputs {
            sources: DataSources {
                mortality: TableSource::new(
                    dir.join(&self.data.mortality_file),
                    sheet_name(self.data.mortality_sheet.as_deref()),
                ),
                divisions: TableSource::new(
                    dir.join(&self.data.divisions_file),
                    sheet_name(self.data.divisions_sheet.as_deref()),
                ),
                causes: TableSource::new(
                    dir.join(&self.data.causes_file),
                    sheet_name(self.data.causes_sheet.as_deref()),
                ),
                boundaries: dir.join(&self.data.boundaries_file),
                boundary_name_property: self.data.boundary_name_property.clone(),
            },
            columns: self.columns.clone(),
            aggregate: self.report.aggregate.clone(),
            page: PageSettings {
                country: self.report.country.clone(),
                year: self.report.year,
            },
        }
    }

    /// Address the report server binds to
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
