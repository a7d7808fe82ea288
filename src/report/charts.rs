//! Chart and table specifications for each summary table
//!
//! Figures are Plotly figure objects (`{"data": [...], "layout": {...}}`) so
//! the page can hand them straight to `Plotly.newPlot` in the browser.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::pipeline::{
    AgeBandTotal, AggregateOptions, CauseTotal, DepartmentTotal, GeoBoundaries, MonthTotal,
    MunicipalityTotal, SexDepartmentTotal, Summaries,
};

use super::PageSettings;

/// Kind of chart a figure draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Choropleth,
    Line,
    Bar,
    Pie,
    StackedBar,
}

/// A Plotly figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    #[serde(skip)]
    pub kind: ChartKind,
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    /// Figure title from the layout
    pub fn title(&self) -> Option<&str> {
        self.layout
            .get("title")
            .and_then(|t| t.get("text"))
            .and_then(Value::as_str)
    }
}

/// One table column: display name plus the record key it reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub id: String,
    pub name: String,
}

/// A plain data table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Map<String, Value>>,
}

/// Every visual artifact of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub department_map: Figure,
    pub monthly_line: Figure,
    pub violent_bar: Figure,
    pub low_mortality_pie: Figure,
    pub causes_table: TableSpec,
    pub age_bar: Figure,
    pub sex_department_bar: Figure,
}

impl ChartSet {
    pub fn build(
        summaries: &Summaries,
        boundaries: &GeoBoundaries,
        page: &PageSettings,
        options: &AggregateOptions,
    ) -> Self {
        Self {
            department_map: department_choropleth(&summaries.by_department, boundaries, page),
            monthly_line: monthly_line(&summaries.by_month, page),
            violent_bar: violent_municipalities_bar(
                &summaries.top_violent_municipalities,
                options,
            ),
            low_mortality_pie: low_mortality_pie(
                &summaries.bottom_mortality_municipalities,
                page,
                options,
            ),
            causes_table: causes_table(&summaries.top_causes),
            age_bar: age_band_bar(&summaries.by_age_band, page),
            sex_department_bar: sex_department_bar(&summaries.by_sex_and_department, page),
        }
    }
}

fn title(text: String) -> Value {
    json!({ "text": text })
}

/// Departments shaded by total deaths, joined to the boundary regions by name
pub fn department_choropleth(
    rows: &[DepartmentTotal],
    boundaries: &GeoBoundaries,
    page: &PageSettings,
) -> Figure {
    let locations: Vec<Option<&str>> = rows.iter().map(|r| r.department_name.as_deref()).collect();
    let totals: Vec<usize> = rows.iter().map(|r| r.total).collect();

    Figure {
        kind: ChartKind::Choropleth,
        data: vec![json!({
            "type": "choropleth",
            "geojson": boundaries.as_value(),
            "featureidkey": boundaries.feature_id_key(),
            "locations": locations,
            "z": totals,
            "colorscale": "Reds",
            "colorbar": { "title": { "text": "TotalMuertes" } },
            "hovertemplate": "%{location}<br>Muertes: %{z}<extra></extra>",
        })],
        layout: json!({
            "title": title(format!(
                "Total de muertes por departamento en {} ({})",
                page.country, page.year
            )),
            "height": 600,
            "margin": { "r": 0, "t": 50, "l": 0, "b": 0 },
            "geo": {
                "fitbounds": "locations",
                "visible": false,
                "projection": { "type": "mercator" },
            },
        }),
    }
}

/// Deaths per month as a line with markers
pub fn monthly_line(rows: &[MonthTotal], page: &PageSettings) -> Figure {
    let months: Vec<String> = rows
        .iter()
        .map(|r| r.month.format("%Y-%m-%d").to_string())
        .collect();
    let totals: Vec<usize> = rows.iter().map(|r| r.total).collect();

    Figure {
        kind: ChartKind::Line,
        data: vec![json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": months,
            "y": totals,
        })],
        layout: json!({
            "title": title(format!(
                "Evolución mensual de muertes en {} ({})",
                page.country, page.year
            )),
            "height": 400,
            "xaxis": { "title": { "text": "Fecha" }, "dtick": "M1", "tickformat": "%b" },
            "yaxis": { "title": { "text": "Número de muertes" } },
        }),
    }
}

/// Municipalities with the most firearm homicides
pub fn violent_municipalities_bar(
    rows: &[MunicipalityTotal],
    options: &AggregateOptions,
) -> Figure {
    let names: Vec<Option<&str>> = rows.iter().map(|r| r.municipality_name.as_deref()).collect();
    let totals: Vec<usize> = rows.iter().map(|r| r.total).collect();

    Figure {
        kind: ChartKind::Bar,
        data: vec![json!({
            "type": "bar",
            "x": names,
            "y": totals,
            "marker": {
                "color": totals,
                "colorscale": "Reds",
                "showscale": true,
            },
        })],
        layout: json!({
            "title": title(format!(
                "Top {} ciudades más violentas por homicidios (código {})",
                options.top_violent_limit, options.homicide_prefix
            )),
            "height": 400,
            "xaxis": { "title": { "text": "Ciudad" } },
            "yaxis": { "title": { "text": "Homicidios por arma de fuego" } },
        }),
    }
}

/// Municipalities with the fewest deaths as pie slices
pub fn low_mortality_pie(
    rows: &[MunicipalityTotal],
    page: &PageSettings,
    options: &AggregateOptions,
) -> Figure {
    let names: Vec<Option<&str>> = rows.iter().map(|r| r.municipality_name.as_deref()).collect();
    let totals: Vec<usize> = rows.iter().map(|r| r.total).collect();

    Figure {
        kind: ChartKind::Pie,
        data: vec![json!({
            "type": "pie",
            "labels": names,
            "values": totals,
        })],
        layout: json!({
            "title": title(format!(
                "Top {} ciudades con menor índice de mortalidad ({})",
                options.bottom_mortality_limit, page.year
            )),
            "height": 400,
        }),
    }
}

/// Most frequent causes as a three-column table
pub fn causes_table(rows: &[CauseTotal]) -> TableSpec {
    let columns = vec![
        TableColumn {
            id: "cause_code".to_string(),
            name: "Código".to_string(),
        },
        TableColumn {
            id: "description".to_string(),
            name: "Descripción".to_string(),
        },
        TableColumn {
            id: "total".to_string(),
            name: "Total".to_string(),
        },
    ];

    let rows = rows
        .iter()
        .map(|r| {
            let mut record = Map::new();
            record.insert("cause_code".to_string(), json!(r.cause_code));
            record.insert("description".to_string(), json!(r.description));
            record.insert("total".to_string(), json!(r.total));
            record
        })
        .collect();

    TableSpec { columns, rows }
}

/// Deaths per age band
pub fn age_band_bar(rows: &[AgeBandTotal], page: &PageSettings) -> Figure {
    let bands: Vec<&str> = rows.iter().map(|r| r.band.as_str()).collect();
    let totals: Vec<usize> = rows.iter().map(|r| r.total).collect();

    Figure {
        kind: ChartKind::Bar,
        data: vec![json!({
            "type": "bar",
            "x": bands,
            "y": totals,
        })],
        layout: json!({
            "title": title(format!(
                "Distribución de muertes por rangos de edad ({})",
                page.year
            )),
            "height": 400,
            "xaxis": { "title": { "text": "Rango de Edad" }, "type": "category" },
            "yaxis": { "title": { "text": "Número de muertes" } },
        }),
    }
}

/// Deaths per department stacked by sex, one trace per sex code
pub fn sex_department_bar(rows: &[SexDepartmentTotal], page: &PageSettings) -> Figure {
    let mut traces: BTreeMap<Option<i64>, (Option<&str>, Vec<Option<&str>>, Vec<usize>)> =
        BTreeMap::new();
    for row in rows {
        let trace = traces
            .entry(row.sex_code)
            .or_insert_with(|| (row.sex_label.as_deref(), Vec::new(), Vec::new()));
        trace.1.push(row.department_name.as_deref());
        trace.2.push(row.total);
    }

    let data = traces
        .into_values()
        .map(|(label, departments, totals)| {
            json!({
                "type": "bar",
                "name": label,
                "x": departments,
                "y": totals,
            })
        })
        .collect();

    Figure {
        kind: ChartKind::StackedBar,
        data,
        layout: json!({
            "title": title(format!(
                "Comparación del total de muertes por sexo en cada departamento ({})",
                page.year
            )),
            "height": 500,
            "barmode": "stack",
            "xaxis": { "title": { "text": "Departamento" }, "tickangle": -45 },
            "yaxis": { "title": { "text": "Número de muertes" } },
            "legend": { "title": { "text": "SEXO" } },
        }),
    }
}
