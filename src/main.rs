//! Mortis: Mortality Report CLI Tool
//!
//! Builds the mortality report once, then serves it on a local web server.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use mortis::cli::Cli;
use mortis::config::Config;
use mortis::pipeline::Datasets;
use mortis::report::{export_summaries, write_html, ReportArtifacts, ReportSummary};
use mortis::server;
use mortis::utils::{
    create_spinner, finish_with_error, finish_with_success, init_logging, print_banner,
    print_completion, print_config, print_info, print_step_header, print_step_time,
    print_success, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config = Config::resolve(&cli)?;
    let inputs = config.report_inputs();
    let server_addr = config.server_addr();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        data_dir: &config.data.directory,
        year: config.report.year,
        output: cli.output.as_deref(),
        export_dir: cli.export_dir.as_deref(),
        server: (!cli.no_serve).then_some(server_addr.as_str()),
    });

    if cli.has_no_output() {
        print_info("--no-serve without --output or --export-dir: the report is only validated");
    }

    // Step 1: Load inputs
    print_step_header(1, "Load Inputs");

    let step_start = Instant::now();
    let spinner = create_spinner("Reading mortality records and reference tables...");
    let datasets = match Datasets::load(&inputs.sources, &inputs.columns) {
        Ok(datasets) => datasets,
        Err(e) => {
            finish_with_error(&spinner, "Failed to load inputs");
            return Err(e);
        }
    };
    finish_with_success(
        &spinner,
        &format!("Loaded {} mortality records", datasets.mortality.len()),
    );
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Step 2: Aggregate and render
    print_step_header(2, "Aggregate & Render");

    let step_start = Instant::now();
    let spinner = create_spinner("Building summary tables and charts...");
    let artifacts = match ReportArtifacts::from_datasets(&datasets, &inputs) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            finish_with_error(&spinner, "Failed to build report");
            return Err(e);
        }
    };
    finish_with_success(
        &spinner,
        &format!("Report page built ({} sections)", artifacts.page.sections.len()),
    );
    let aggregate_elapsed = step_start.elapsed();
    print_step_time(aggregate_elapsed);

    // Step 3: Write outputs
    if cli.output.is_some() || cli.export_dir.is_some() {
        print_step_header(3, "Write Outputs");

        if let Some(output) = &cli.output {
            write_html(&artifacts, output)?;
            print_success(&format!("Saved page to {}", output.display()));
        }

        if let Some(dir) = &cli.export_dir {
            let written = export_summaries(&artifacts, &inputs.page, dir)?;
            print_success(&format!(
                "Exported {} file(s) to {}",
                written.len(),
                dir.display()
            ));
        }
    }

    let mut summary = ReportSummary::new(&artifacts);
    summary.set_load_time(load_elapsed);
    summary.set_aggregate_time(aggregate_elapsed);
    summary.display();

    if cli.no_serve {
        print_completion("Mortis report complete!");
        return Ok(());
    }

    // Step 4: Serve
    print_step_header(4, "Serve Report");
    print_info(&format!(
        "Open http://{} in a browser (Ctrl+C to stop)",
        server_addr
    ));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(&artifacts, &server_addr))
}
