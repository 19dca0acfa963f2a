//! `dashrun docs` — regenerate HTML pages for changed Markdown files.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use dashrun_docs::{update_docs, DocsReport};

use super::RootArg;

/// Arguments for `dashrun docs`.
#[derive(Args, Debug)]
pub struct DocsArgs {
    #[command(flatten)]
    pub root: RootArg,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PageRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl DocsArgs {
    pub fn run(self) -> Result<()> {
        let root = self.root.resolve()?;
        dashrun_daemon::init_tracing();
        let report = update_docs(&root).context("documentation update failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
            return Ok(());
        }
        print_table(&report);
        Ok(())
    }
}

fn print_table(report: &DocsReport) {
    let rows: Vec<PageRow> = report
        .updated_files
        .iter()
        .map(|f| PageRow {
            file: f.clone(),
            result: "updated".to_string(),
        })
        .chain(report.failed.iter().map(|f| PageRow {
            file: f.clone(),
            result: "failed".to_string(),
        }))
        .chain(report.skipped.iter().map(|f| PageRow {
            file: f.clone(),
            result: "up to date".to_string(),
        }))
        .collect();

    if !rows.is_empty() {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let summary = format!("{} pages updated", report.files_updated);
    if report.failed.is_empty() {
        println!("{} {summary}", "✓".green().bold());
    } else {
        println!(
            "{} {summary}, {} failed",
            "!".yellow().bold(),
            report.failed.len()
        );
    }
}
