//! Terminal summary of a report run

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::{InputStats, ReportArtifacts};

/// Summary of the inputs and generated tables, printed after the run
#[derive(Debug, Default)]
pub struct ReportSummary {
    pub stats: Option<InputStats>,
    /// (summary name, row count)
    pub tables: Vec<(&'static str, usize)>,
    pub ranked_totals: Vec<(String, usize)>,
    pub load_time: Duration,
    pub aggregate_time: Duration,
}

impl ReportSummary {
    pub fn new(artifacts: &ReportArtifacts) -> Self {
        let s = &artifacts.summaries;
        let tables = vec![
            ("Deaths by department", s.by_department.len()),
            ("Deaths by month", s.by_month.len()),
            ("Top violent municipalities", s.top_violent_municipalities.len()),
            ("Lowest mortality municipalities", s.bottom_mortality_municipalities.len()),
            ("Top causes", s.top_causes.len()),
            ("Age bands", s.by_age_band.len()),
            ("Deaths by sex and department", s.by_sex_and_department.len()),
        ];

        let ranked_totals = s
            .top_causes
            .iter()
            .take(3)
            .map(|c| {
                let label = match (&c.cause_code, &c.description) {
                    (Some(code), Some(desc)) => format!("{} {}", code, desc),
                    (Some(code), None) => code.clone(),
                    (None, _) => "(sin código)".to_string(),
                };
                (label, c.total)
            })
            .collect();

        Self {
            stats: Some(artifacts.stats),
            tables,
            ranked_totals,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_aggregate_time(&mut self, elapsed: Duration) {
        self.aggregate_time = elapsed;
    }

    /// Build the inputs table
    pub fn inputs_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Input").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
        ]);

        if let Some(stats) = &self.stats {
            table.add_row(vec![
                Cell::new("Mortality records"),
                Cell::new(stats.mortality_records)
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![
                Cell::new("Geographic codes"),
                Cell::new(stats.geographic_codes),
            ]);
            table.add_row(vec![Cell::new("Departments"), Cell::new(stats.departments)]);
            table.add_row(vec![Cell::new("Cause codes"), Cell::new(stats.cause_codes)]);
            table.add_row(vec![
                Cell::new("Boundary regions"),
                Cell::new(stats.boundary_regions),
            ]);
            table.add_row(vec![
                Cell::new("Codes wider than 6"),
                Cell::new(stats.oversized_geo_codes).fg(if stats.oversized_geo_codes == 0 {
                    Color::White
                } else {
                    Color::Yellow
                }),
            ]);
        }

        table
    }

    /// Build the summary-tables table
    pub fn tables_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Summary").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
        ]);

        for (name, rows) in &self.tables {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(rows).fg(if *rows == 0 { Color::Red } else { Color::Cyan }),
            ]);
        }

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("REPORT SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.inputs_table().to_string().lines() {
            println!("    {}", line);
        }
        println!();
        for line in self.tables_table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.ranked_totals.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("LEADING CAUSES").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (label, total) in &self.ranked_totals {
                println!(
                    "        {} {} {}",
                    style("•").dim(),
                    label,
                    style(format!("({})", total)).yellow()
                );
            }
        }

        println!();
        println!(
            "      Load: {:.2}s  Aggregate + render: {:.2}s",
            self.load_time.as_secs_f64(),
            self.aggregate_time.as_secs_f64()
        );
    }
}
