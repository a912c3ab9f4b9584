use crate::scan::ScanReport;
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    show_dependencies: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_dependencies: false,
        }
    }

    pub fn with_dependencies(mut self, show: bool) -> Self {
        self.show_dependencies = show;
        self
    }

    pub fn report(&self, report: &ScanReport) -> Result<()> {
        println!();
        println!(
            "{}",
            format!(
                "Scanned {} - {} of {} class entries parsed, {} classes in scope",
                report.archive.display(),
                report.parsed_units,
                report.total_entries,
                report.universe.len()
            )
            .bold()
        );

        self.print_mutual(report);
        self.print_unused(report);
        self.print_reflection(report);

        if self.show_dependencies {
            self.print_dependencies(report);
        }

        self.print_diagnostics(report);

        Ok(())
    }

    fn print_mutual(&self, report: &ScanReport) {
        println!();
        if report.mutual.is_empty() {
            println!("{}", "No mutual dependencies found.".green());
            return;
        }
        println!(
            "{}",
            format!("{} mutual dependency pairs:", report.mutual.len())
                .red()
                .bold()
        );
        for pair in &report.mutual {
            println!("  {}", pair.to_string().red());
        }
    }

    fn print_unused(&self, report: &ScanReport) {
        let unused = report.usage.unused_targets();
        println!();
        if unused.is_empty() {
            println!("{}", "Every target class is referenced.".green());
        } else {
            println!(
                "{}",
                format!("{} target classes look unused:", unused.len())
                    .yellow()
                    .bold()
            );
            for name in &unused {
                println!("  {}", name.to_string().yellow());
            }
        }
        if !report.usage.is_sound() {
            println!(
                "{}",
                "Reflection detected: \"unused\" verdicts above are not sound."
                    .yellow()
                    .bold()
            );
        }
    }

    fn print_reflection(&self, report: &ScanReport) {
        if report.reflection.is_empty() {
            return;
        }
        println!();
        println!(
            "{}",
            format!("{} reflective call sites:", report.reflection.len()).cyan()
        );
        for site in &report.reflection {
            println!(
                "  {} in {}::{}",
                site.kind.to_string().cyan(),
                site.unit,
                site.method
            );
        }
    }

    fn print_dependencies(&self, report: &ScanReport) {
        let adjacency = report.graph.adjacency();
        if adjacency.is_empty() {
            return;
        }
        println!();
        println!("{}", "Dependencies:".bold());
        for (unit, deps) in &adjacency {
            let list: Vec<&str> = deps.iter().map(|d| d.as_str()).collect();
            println!("  {} -> {}", unit, list.join(", "));
        }
    }

    fn print_diagnostics(&self, report: &ScanReport) {
        if report.diagnostics.is_empty() {
            return;
        }
        println!();
        println!(
            "{}",
            format!("{} diagnostics:", report.diagnostics.len()).dimmed()
        );
        for diagnostic in &report.diagnostics {
            println!("  {}", diagnostic.to_string().dimmed());
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
