//! Inspect persisted flag sets without a live domain

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use stat_content::FlagSetLoader;

/// Show the active and pending categories of a persisted flag set
#[derive(Parser)]
pub struct InspectFlags {
    /// Persisted flag set (JSON)
    #[arg(short, long, value_name = "JSON")]
    input: PathBuf,
}

impl InspectFlags {
    pub fn execute(self) -> Result<()> {
        let persisted = FlagSetLoader::load(&self.input)?;
        let bits = persisted
            .decode()
            .with_context(|| format!("Corrupt flag set: {}", self.input.display()))?;

        println!(
            "{} {}",
            style("Flag Set:").bold().cyan(),
            self.input.display()
        );
        println!("{} {}", style("Bits:").bold().cyan(), persisted.bits);
        println!();

        println!("{}", style("Categories:").bold().yellow());
        for (index, name) in persisted.names.iter().enumerate() {
            let marker = if bits.get(index) {
                style("●").green()
            } else {
                style("○").dim()
            };
            println!("  {} {:>3} {}", marker, index, name);
        }

        if !persisted.pending.is_empty() {
            println!();
            println!(
                "{} {}",
                style("Pending:").bold().yellow(),
                persisted.pending.join(", ")
            );
        }

        Ok(())
    }
}
