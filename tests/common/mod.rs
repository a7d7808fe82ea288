//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use mortis::config::Config;
use mortis::ReportInputs;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

pub const MORTALITY_FILE: &str = "mortality.csv";
pub const DIVISIONS_FILE: &str = "divisions.csv";
pub const CAUSES_FILE: &str = "causes.csv";
pub const BOUNDARIES_FILE: &str = "departments.geojson";

/// Number of data rows in the mortality fixture
pub const MORTALITY_ROWS: usize = 9;

/// Mortality fixture covering:
/// - three matched municipalities (Medellín, Bogotá, Cali)
/// - one record with unknown geographic, department and cause codes
/// - firearm homicides (`X95*`), including one lowercase code with padding
/// - an invalid month (13) and an unparseable age ("abc")
/// - ages on both sides of the open 85+ band
pub fn mortality_csv() -> String {
    [
        "COD_DANE,COD_DEPARTAMENTO,COD_MUERTE,AÑO,MES,GRUPO_EDAD1,SEXO",
        "5001,5,X950,2019,1,30,1",
        "5001,5,X951,2019,1,86,1",
        "5001,5,I219,2019,2,70,2",
        "11001,11,X954,2019,2,25,1",
        "11001,11,I219,2019,3,3,2",
        "11001,11,I219,2019,3,90,9",
        "76001,76,\" x95.1 \",2019,4,40,1",
        "76001,76,J189,2019,13,abc,2",
        "99999,99,Z999,2019,5,50,1",
    ]
    .join("\n")
}

/// Division fixture with names that need trimming, uppercasing and canonicalization
pub fn divisions_csv() -> String {
    [
        "COD_DANE,COD_DEPARTAMENTO,DEPARTAMENTO,MUNICIPIO",
        "5001,5,antioquia ,Medellín",
        "5002,5,ANTIOQUIA,Abejorral",
        "11001,11,BOGOTA D.C.,Bogotá D.C.",
        "76001,76,Valle,Cali",
    ]
    .join("\n")
}

pub fn causes_csv() -> String {
    [
        "COD_MUERTE,DESCRIPCION_MUERTE",
        "x950,\" Agresión con disparo de arma corta \"",
        "X951,Agresión con disparo de rifle",
        "X954,Agresión con disparo de otras armas",
        "I219,Infarto agudo del miocardio",
        "J189,Neumonía",
    ]
    .join("\n")
}

pub fn boundaries_geojson() -> String {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"NOMBRE_DPT": " Antioquia"}, "geometry": null},
            {"type": "Feature", "properties": {"NOMBRE_DPT": "BOGOTÁ D.C."}, "geometry": null},
            {"type": "Feature", "properties": {"NOMBRE_DPT": "valle del cauca "}, "geometry": null}
        ]
    })
    .to_string()
}

/// Write a text file into `dir`
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Create a temporary data directory holding the four fixture inputs
pub fn create_fixture_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), MORTALITY_FILE, &mortality_csv());
    write_file(temp_dir.path(), DIVISIONS_FILE, &divisions_csv());
    write_file(temp_dir.path(), CAUSES_FILE, &causes_csv());
    write_file(temp_dir.path(), BOUNDARIES_FILE, &boundaries_geojson());
    temp_dir
}

/// Write CSV text into a worksheet. Fields that parse as numbers become
/// numeric cells; quotes around a field are dropped and inner spaces kept.
fn write_sheet(workbook: &mut Workbook, name: &str, csv: &str) {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name).unwrap();

    for (row, line) in csv.lines().enumerate() {
        for (col, field) in line.split(',').enumerate() {
            let field = field.trim_matches('"');
            match field.parse::<f64>() {
                Ok(number) if row > 0 => {
                    worksheet.write_number(row as u32, col as u16, number).unwrap();
                }
                _ => {
                    worksheet.write_string(row as u32, col as u16, field).unwrap();
                }
            }
        }
    }
}

/// Write a workbook with one worksheet per `(name, csv)` pair, in order
pub fn write_workbook(dir: &Path, file: &str, sheets: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(file);
    let mut workbook = Workbook::new();
    for (name, csv) in sheets {
        write_sheet(&mut workbook, name, csv);
    }
    workbook.save(&path).unwrap();
    path
}

pub const MORTALITY_WORKBOOK: &str = "mortality.xlsx";
pub const DIVISIONS_WORKBOOK: &str = "divisions.xlsx";
pub const CAUSES_WORKBOOK: &str = "causes.xlsx";

/// Notes sheet placed around the data sheets
const NOTES_SHEET: &str = "Notas\nFuente: DANE";

/// Workbook version of the fixture inputs, laid out like the published files:
/// records and divisions on the first sheet, causes on a sheet named `Final`
/// after a notes sheet.
pub fn create_workbook_fixture_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let mortality = mortality_csv();
    let divisions = divisions_csv();
    let causes = causes_csv();

    write_workbook(
        temp_dir.path(),
        MORTALITY_WORKBOOK,
        &[("NoFetal2019", mortality.as_str()), ("Notas", NOTES_SHEET)],
    );
    write_workbook(
        temp_dir.path(),
        DIVISIONS_WORKBOOK,
        &[("Divipola", divisions.as_str()), ("Notas", NOTES_SHEET)],
    );
    write_workbook(
        temp_dir.path(),
        CAUSES_WORKBOOK,
        &[("Notas", NOTES_SHEET), ("Final", causes.as_str())],
    );
    write_file(temp_dir.path(), BOUNDARIES_FILE, &boundaries_geojson());
    temp_dir
}

/// Configuration pointing at the workbook fixtures in `dir`
pub fn workbook_fixture_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.data.directory = dir.to_path_buf();
    config.data.mortality_file = MORTALITY_WORKBOOK.to_string();
    config.data.divisions_file = DIVISIONS_WORKBOOK.to_string();
    config.data.causes_file = CAUSES_WORKBOOK.to_string();
    config.data.boundaries_file = BOUNDARIES_FILE.to_string();
    config
}

/// Configuration pointing at the fixture files in `dir`
pub fn fixture_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.data.directory = dir.to_path_buf();
    config.data.mortality_file = MORTALITY_FILE.to_string();
    config.data.divisions_file = DIVISIONS_FILE.to_string();
    config.data.causes_file = CAUSES_FILE.to_string();
    config.data.boundaries_file = BOUNDARIES_FILE.to_string();
    config
}

/// Report inputs pointing at the fixture files in `dir`
pub fn fixture_inputs(dir: &Path) -> ReportInputs {
    fixture_config(dir).report_inputs()
}
