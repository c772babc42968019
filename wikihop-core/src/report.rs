// Report rendering for finished searches

use crate::run::SearchReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Serializable summary of one search run.
#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub start: String,
    pub dest: String,
    pub found: bool,
    pub path: Vec<String>,
    pub hops: usize,
    pub pages_visited: usize,
    pub elapsed_secs: f64,
    pub generated_at: String,
}

impl PathReport {
    pub fn from_search(report: &SearchReport) -> Self {
        Self {
            start: report.start.clone(),
            dest: report.dest.clone(),
            found: !report.path.is_empty(),
            path: report.path.clone(),
            hops: report.path.len().saturating_sub(1),
            pages_visited: report.pages_visited,
            elapsed_secs: report.elapsed.as_secs_f64(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The `A -> B -> C` line.
pub fn format_path_line(path: &[String]) -> String {
    path.join(" -> ")
}

pub fn render(report: &PathReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).context("serializing report")
        }
    }
}

fn render_text(report: &PathReport) -> String {
    let mut out = String::new();
    if report.found {
        out.push_str(&format_path_line(&report.path));
        out.push('\n');
        out.push_str(&format!(
            "Found in {:.2} s ({} hops, {} pages visited)\n",
            report.elapsed_secs, report.hops, report.pages_visited
        ));
    } else {
        out.push_str(&format!(
            "No path found from {} to {}\n",
            report.start, report.dest
        ));
        out.push_str(&format!(
            "Gave up after {:.2} s ({} pages visited)\n",
            report.elapsed_secs, report.pages_visited
        ));
    }
    out
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
