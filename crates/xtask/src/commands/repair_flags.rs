//! Repair persisted flag sets
//!
//! Restores a JSON flag set against the current category domain, reports what
//! moved, and optionally writes the repaired set back out.

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use stat_content::{DomainLoader, FlagSetLoader};

/// Restore a persisted flag set against a category domain
#[derive(Parser)]
pub struct RepairFlags {
    /// Live category domain (RON list of names)
    #[arg(long, value_name = "RON")]
    domain: PathBuf,

    /// Persisted flag set (JSON)
    #[arg(short, long, value_name = "JSON")]
    input: PathBuf,

    /// Where to write the repaired flag set (prints only when omitted)
    #[arg(short, long, value_name = "JSON")]
    output: Option<PathBuf>,
}

impl RepairFlags {
    pub fn execute(self) -> Result<()> {
        let domain = DomainLoader::load(&self.domain)?;
        let (flags, report) = FlagSetLoader::restore(&self.input, domain)?;

        println!(
            "{} {}",
            style("Flag Set:").bold().cyan(),
            self.input.display()
        );
        println!(
            "{} {}",
            style("Domain Changed:").bold().cyan(),
            if report.domain_changed { "yes" } else { "no" }
        );
        println!();

        println!("{} {}", style("Active:").bold().yellow(), flags);
        if !report.resolved.is_empty() {
            println!(
                "{} {}",
                style("Resolved:").bold().green(),
                report.resolved.join(", ")
            );
        }
        if !report.newly_pending.is_empty() {
            println!(
                "{} {}",
                style("Newly Pending:").bold().red(),
                report.newly_pending.join(", ")
            );
        }
        if !flags.pending().is_empty() {
            println!(
                "{} {}",
                style("Pending:").bold().yellow(),
                flags.pending().join(", ")
            );
        }

        if let Some(output) = &self.output {
            FlagSetLoader::save(output, &flags)?;
            println!();
            println!("{} {}", style("Written:").bold().green(), output.display());
        } else if report.is_clean() && !report.domain_changed {
            println!();
            println!("{}", style("Nothing to repair.").dim());
        }

        Ok(())
    }
}
