//! Rendering of violations for people (`human`) and tools (`json`).

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use cxxsense_core::Violation;
use cxxsense_sensors::RunSummary;
use serde::Serialize;
use std::io::Write;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Serialize)]
struct AnalysisDocument<'a> {
    violations: &'a [Violation],
    summary: &'a RunSummary,
}

pub fn write_analysis(
    out: &mut dyn Write,
    format: OutputFormat,
    violations: &[Violation],
    summary: &RunSummary,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &AnalysisDocument { violations, summary })?;
            writeln!(out)?;
        }
        OutputFormat::Human => {
            write_human(out, violations)?;
            write_summary(out, violations.len(), summary)?;
        }
    }
    Ok(())
}

pub fn write_violations(
    out: &mut dyn Write,
    format: OutputFormat,
    violations: &[Violation],
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, violations)?;
            writeln!(out)?;
        }
        OutputFormat::Human => write_human(out, violations)?,
    }
    Ok(())
}

fn write_human(out: &mut dyn Write, violations: &[Violation]) -> Result<()> {
    for violation in violations {
        writeln!(
            out,
            "{}:{}: {} {}",
            violation.file_path.display().to_string().bold(),
            violation.line,
            format!("[{}]", violation.rule_key()).yellow(),
            violation.message
        )?;
        if let Some(steps) = &violation.flow_steps {
            for (index, step) in steps.iter().enumerate() {
                writeln!(
                    out,
                    "    {} {}:{}: {}",
                    format!("{}.", index + 1).dimmed(),
                    step.file,
                    step.line,
                    step.message
                )?;
            }
        }
    }
    Ok(())
}

fn write_summary(out: &mut dyn Write, shown: usize, summary: &RunSummary) -> Result<()> {
    let headline = format!(
        "{shown} violation(s) from {} report(s), {} duplicate(s) suppressed",
        summary.reports, summary.sink.suppressed
    );
    writeln!(out, "{}", headline.green())?;
    if !summary.failed_reports.is_empty() {
        writeln!(
            out,
            "{}",
            format!("{} report(s) skipped as malformed:", summary.failed_reports.len()).red()
        )?;
        for failed in &summary.failed_reports {
            writeln!(out, "  {}: {}", failed.path.display(), failed.reason)?;
        }
    }
    if summary.unresolved + summary.unlocatable > 0 {
        writeln!(
            out,
            "{} record(s) with unresolved paths, {} without a project frame",
            summary.unresolved, summary.unlocatable
        )?;
    }
    Ok(())
}
