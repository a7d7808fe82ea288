//! End-to-end tests: inputs on disk to rendered page, exports and server

use mortis::build_report;
use mortis::pipeline::LoadError;
use mortis::report::{
    export_summaries, write_html, Artifact, RUN_METADATA_JSON, SUMMARIES_JSON,
};
use mortis::server;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_build_report_from_fixture() {
    let temp_dir = common::create_fixture_dir();
    let inputs = common::fixture_inputs(temp_dir.path());

    let artifacts = build_report(&inputs).unwrap();

    assert_eq!(artifacts.stats.mortality_records, common::MORTALITY_ROWS);
    assert_eq!(artifacts.stats.geographic_codes, 4);
    assert_eq!(artifacts.stats.departments, 3);
    assert_eq!(artifacts.stats.cause_codes, 5);
    assert_eq!(artifacts.stats.boundary_regions, 3);

    assert_eq!(artifacts.page.title, "Análisis de Mortalidad - Colombia 2019");
    assert_eq!(artifacts.page.sections.len(), 7);
    assert!(matches!(
        artifacts.page.sections[4].artifact,
        Artifact::Table(_)
    ));
    assert_eq!(
        artifacts
            .page
            .sections
            .iter()
            .filter(|s| matches!(s.artifact, Artifact::Figure(_)))
            .count(),
        6
    );
}

#[test]
fn test_workbook_inputs_match_csv_inputs() {
    let csv_dir = common::create_fixture_dir();
    let workbook_dir = common::create_workbook_fixture_dir();

    let from_csv = build_report(&common::fixture_inputs(csv_dir.path())).unwrap();
    let from_workbooks =
        build_report(&common::workbook_fixture_config(workbook_dir.path()).report_inputs())
            .unwrap();

    assert_eq!(from_workbooks.stats, from_csv.stats);
    assert_eq!(from_workbooks.summaries, from_csv.summaries);
    assert_eq!(from_workbooks.html, from_csv.html);
}

#[test]
fn test_sections_render_in_fixed_order() {
    let temp_dir = common::create_fixture_dir();
    let artifacts = build_report(&common::fixture_inputs(temp_dir.path())).unwrap();
    let html = &artifacts.html;

    let headings = [
        "Distribución de muertes por departamento",
        "Evolución mensual de muertes",
        "Top 5 ciudades más violentas por homicidios",
        "Top 10 ciudades con menor índice de mortalidad",
        "Top 10 principales causas de muerte",
        "Distribución de muertes por edad",
        "Comparación de muertes por sexo y departamento",
    ];

    let positions: Vec<usize> = headings
        .iter()
        .map(|h| html.find(&format!("<h2>{}</h2>", h)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert!(html.contains("Plotly.newPlot(\"figure-1\""));
    assert!(html.contains("<th>Código</th>"));
    assert!(html.contains("<td>Infarto agudo del miocardio</td>"));
}

#[test]
fn test_report_is_deterministic() {
    let temp_dir = common::create_fixture_dir();
    let inputs = common::fixture_inputs(temp_dir.path());

    let first = build_report(&inputs).unwrap();
    let second = build_report(&inputs).unwrap();

    assert_eq!(first.summaries, second.summaries);
    assert_eq!(first.page, second.page);
    assert_eq!(first.html, second.html);
}

#[test]
fn test_year_and_limits_flow_into_titles() {
    let temp_dir = common::create_fixture_dir();
    let mut config = common::fixture_config(temp_dir.path());
    config.report.year = 2020;
    config.report.aggregate.top_violent_limit = 2;

    let artifacts = build_report(&config.report_inputs()).unwrap();

    assert_eq!(artifacts.page.title, "Análisis de Mortalidad - Colombia 2020");
    assert_eq!(artifacts.summaries.top_violent_municipalities.len(), 2);
    assert!(artifacts
        .html
        .contains("Top 2 ciudades más violentas por homicidios"));
}

#[test]
fn test_missing_input_fails_before_rendering() {
    let temp_dir = common::create_fixture_dir();
    std::fs::remove_file(temp_dir.path().join(common::CAUSES_FILE)).unwrap();

    let err = build_report(&common::fixture_inputs(temp_dir.path())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::MissingFile { .. })
    ));
}

#[test]
fn test_export_writes_csv_and_json() {
    let temp_dir = common::create_fixture_dir();
    let inputs = common::fixture_inputs(temp_dir.path());
    let artifacts = build_report(&inputs).unwrap();

    let out_dir = TempDir::new().unwrap();
    let export_dir = out_dir.path().join("export");
    let written = export_summaries(&artifacts, &inputs.page, &export_dir).unwrap();

    assert_eq!(written.len(), 9);
    assert!(export_dir.join("by_department.csv").exists());
    assert!(export_dir.join("by_age_band.csv").exists());

    let csv = std::fs::read_to_string(export_dir.join("top_causes.csv")).unwrap();
    assert!(csv.starts_with("cause_code,description,total"));
    assert!(csv.contains("I219"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(export_dir.join(SUMMARIES_JSON)).unwrap())
            .unwrap();
    assert_eq!(json["page"]["year"], 2019);
    assert_eq!(json["page"]["country"], "Colombia");
    assert_eq!(json["inputs"]["mortality_records"], common::MORTALITY_ROWS);
    assert_eq!(json["summaries"]["by_age_band"].as_array().unwrap().len(), 18);
}

#[test]
fn test_summary_export_is_reproducible() {
    let temp_dir = common::create_fixture_dir();
    let inputs = common::fixture_inputs(temp_dir.path());
    let artifacts = build_report(&inputs).unwrap();

    let out_dir = TempDir::new().unwrap();
    let first = out_dir.path().join("first");
    let second = out_dir.path().join("second");
    export_summaries(&artifacts, &inputs.page, &first).unwrap();
    export_summaries(&build_report(&inputs).unwrap(), &inputs.page, &second).unwrap();

    for name in [SUMMARIES_JSON, "by_department.csv", "top_causes.csv"] {
        assert_eq!(
            std::fs::read(first.join(name)).unwrap(),
            std::fs::read(second.join(name)).unwrap(),
            "{} differs between runs",
            name
        );
    }

    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(first.join(RUN_METADATA_JSON)).unwrap())
            .unwrap();
    assert!(metadata["timestamp"].is_string());
    assert!(metadata["mortis_version"].is_string());
}

#[test]
fn test_write_html_creates_parent_dirs() {
    let temp_dir = common::create_fixture_dir();
    let artifacts = build_report(&common::fixture_inputs(temp_dir.path())).unwrap();

    let out_dir = TempDir::new().unwrap();
    let path = out_dir.path().join("site").join("index.html");
    write_html(&artifacts, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), artifacts.html);
}

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).to_string()
}

#[tokio::test]
async fn test_server_routes() {
    let temp_dir = common::create_fixture_dir();
    let artifacts = build_report(&common::fixture_inputs(temp_dir.path())).unwrap();

    let app = server::router(&artifacts).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let index = http_get(addr, "/").await;
    assert!(index.starts_with("HTTP/1.1 200"));
    assert!(index.contains("Análisis de Mortalidad - Colombia 2019"));

    let report = http_get(addr, "/report.json").await;
    assert!(report.starts_with("HTTP/1.1 200"));
    assert!(report.contains("application/json"));
    assert!(report.contains("\"by_department\""));

    let health = http_get(addr, "/healthz").await;
    assert!(health.contains("{\"ok\":true}"));

    let missing = http_get(addr, "/nope").await;
    assert!(missing.starts_with("HTTP/1.1 404"));
}
