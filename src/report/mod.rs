mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::scan::ScanReport;
use miette::Result;
use std::path::PathBuf;

/// Output format for scan reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for scan results
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_dependencies: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_dependencies: false,
        }
    }

    /// Include the full per-class dependency listing in terminal output.
    pub fn with_dependencies(mut self, show: bool) -> Self {
        self.show_dependencies = show;
        self
    }

    pub fn report(&self, report: &ScanReport) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => TerminalReporter::new()
                .with_dependencies(self.show_dependencies)
                .report(report),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(report),
        }
    }
}
