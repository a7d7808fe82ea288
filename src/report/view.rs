//! Page layout and HTML rendering

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::pipeline::AggregateOptions;

use super::charts::{ChartSet, Figure, TableSpec};
use super::PageSettings;

/// Plotly bundle loaded by the rendered page
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Content of one page section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Figure(Figure),
    Table(TableSpec),
}

/// A heading followed by one artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub artifact: Artifact,
}

/// The full report page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Page {
    /// Lay the artifacts out in their fixed order
    pub fn compose(charts: ChartSet, page: &PageSettings, options: &AggregateOptions) -> Self {
        let ChartSet {
            department_map,
            monthly_line,
            violent_bar,
            low_mortality_pie,
            causes_table,
            age_bar,
            sex_department_bar,
        } = charts;

        let sections = vec![
            Section {
                heading: "Distribución de muertes por departamento".to_string(),
                artifact: Artifact::Figure(department_map),
            },
            Section {
                heading: "Evolución mensual de muertes".to_string(),
                artifact: Artifact::Figure(monthly_line),
            },
            Section {
                heading: format!(
                    "Top {} ciudades más violentas por homicidios",
                    options.top_violent_limit
                ),
                artifact: Artifact::Figure(violent_bar),
            },
            Section {
                heading: format!(
                    "Top {} ciudades con menor índice de mortalidad",
                    options.bottom_mortality_limit
                ),
                artifact: Artifact::Figure(low_mortality_pie),
            },
            Section {
                heading: format!(
                    "Top {} principales causas de muerte",
                    options.top_causes_limit
                ),
                artifact: Artifact::Table(causes_table),
            },
            Section {
                heading: "Distribución de muertes por edad".to_string(),
                artifact: Artifact::Figure(age_bar),
            },
            Section {
                heading: "Comparación de muertes por sexo y departamento".to_string(),
                artifact: Artifact::Figure(sex_department_bar),
            },
        ];

        Self {
            title: format!("Análisis de Mortalidad - {} {}", page.country, page.year),
            sections,
        }
    }

    /// Render the page as a standalone HTML document
    pub fn render_html(&self) -> Result<String> {
        let mut html = String::new();

        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"es\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"utf-8\">")?;
        writeln!(
            html,
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
        )?;
        writeln!(html, "<title>{}</title>", escape_html(&self.title))?;
        writeln!(html, "<script src=\"{}\" charset=\"utf-8\"></script>", PLOTLY_CDN)?;
        writeln!(html, "<style>{}</style>", STYLESHEET)?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<h1>{}</h1>", escape_html(&self.title))?;

        for (idx, section) in self.sections.iter().enumerate() {
            writeln!(html, "<h2>{}</h2>", escape_html(&section.heading))?;
            match &section.artifact {
                Artifact::Figure(figure) => render_figure(&mut html, idx + 1, figure)?,
                Artifact::Table(table) => render_table(&mut html, table)?,
            }
        }

        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;

        Ok(html)
    }
}

const STYLESHEET: &str = "body{font-family:sans-serif;margin:0 2rem;}\
h1{text-align:center;}\
.table-wrapper{overflow-x:auto;}\
table{border-collapse:collapse;width:100%;}\
th,td{border:1px solid #ddd;padding:6px 8px;text-align:left;}\
th{background-color:lightgrey;font-weight:bold;}";

fn render_figure(html: &mut String, number: usize, figure: &Figure) -> Result<()> {
    let id = format!("figure-{}", number);
    let data = script_json(&serde_json::to_string(&figure.data)?);
    let layout = script_json(&serde_json::to_string(&figure.layout)?);

    writeln!(html, "<div id=\"{}\" class=\"figure\"></div>", id)?;
    writeln!(
        html,
        "<script>Plotly.newPlot(\"{}\", {}, {}, {{\"responsive\": true}});</script>",
        id, data, layout
    )?;
    Ok(())
}

fn render_table(html: &mut String, table: &TableSpec) -> Result<()> {
    writeln!(html, "<div class=\"table-wrapper\">")?;
    writeln!(html, "<table>")?;

    write!(html, "<thead><tr>")?;
    for column in &table.columns {
        write!(html, "<th>{}</th>", escape_html(&column.name))?;
    }
    writeln!(html, "</tr></thead>")?;

    writeln!(html, "<tbody>")?;
    for row in &table.rows {
        write!(html, "<tr>")?;
        for column in &table.columns {
            let cell = row.get(&column.id).map(cell_text).unwrap_or_default();
            write!(html, "<td>{}</td>", escape_html(&cell))?;
        }
        writeln!(html, "</tr>")?;
    }
    writeln!(html, "</tbody>")?;

    writeln!(html, "</table>")?;
    writeln!(html, "</div>")?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape text for an HTML element or attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Make serialized JSON safe to embed in a `<script>` element
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"A&B\"</b>"),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_script_json_cannot_close_script() {
        let json = serde_json::to_string(&serde_json::json!({"name": "</script>"})).unwrap();
        assert!(!script_json(&json).contains("</script>"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&serde_json::json!("X95")), "X95");
        assert_eq!(cell_text(&serde_json::json!(12)), "12");
    }
}
