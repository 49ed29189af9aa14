//! Evaluate stat content
//!
//! Loads a domain, modifiers and aggregates, builds a registry and prints the
//! value of every aggregate. Content comes either from a data directory laid
//! out for [`ContentFactory`] or from individually named files.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use stat_content::{
    AggregateLoader, ConfigLoader, ContentFactory, DomainLoader, LoadedAggregate, ModifierLoader,
};
use stat_core::{AggregateView, Registry, RegistryConfig};

/// Build a registry from content files and print every aggregate
#[derive(Parser)]
pub struct Evaluate {
    /// Data directory holding domain.ron, modifiers.ron, aggregates.ron and
    /// an optional config.toml
    #[arg(
        short,
        long,
        value_name = "DIR",
        conflicts_with_all = ["domain", "modifiers", "aggregates", "config"]
    )]
    data_dir: Option<PathBuf>,

    /// Category domain (RON list of names)
    #[arg(long, value_name = "RON", required_unless_present = "data_dir")]
    domain: Option<PathBuf>,

    /// Modifier definitions (RON)
    #[arg(long, value_name = "RON", required_unless_present = "data_dir")]
    modifiers: Option<PathBuf>,

    /// Aggregate definitions (RON)
    #[arg(long, value_name = "RON", required_unless_present = "data_dir")]
    aggregates: Option<PathBuf>,

    /// Registry configuration (TOML, defaults when omitted)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Also list the modifiers counted by each aggregate
    #[arg(short, long)]
    breakdown: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Aligned table with colored headers
    Table,
    /// JSON object of aggregate name to value
    Json,
}

impl Evaluate {
    pub fn execute(self) -> Result<()> {
        let (registry, aggregates) = match &self.data_dir {
            Some(dir) => ContentFactory::new(dir).build_registry()?,
            None => self.build_from_files()?,
        };

        match self.format {
            OutputFormat::Json => {
                let values: serde_json::Map<String, serde_json::Value> = aggregates
                    .iter()
                    .map(|loaded| {
                        let value = registry.value(loaded.id)?;
                        Ok((loaded.name.clone(), serde_json::json!(value)))
                    })
                    .collect::<Result<_>>()?;
                let json = serde_json::to_string_pretty(&values)
                    .context("Failed to serialize values to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Table => {
                println!(
                    "{} {} modifiers, {} aggregates",
                    style("Registry:").bold().cyan(),
                    registry.modifier_count(),
                    registry.aggregate_count()
                );
                println!();

                for loaded in &aggregates {
                    let view = registry
                        .aggregate(loaded.id)
                        .with_context(|| format!("Aggregate `{}` vanished", loaded.name))?;
                    print_aggregate(&loaded.name, &view, self.breakdown);
                }
            }
        }

        Ok(())
    }

    fn build_from_files(&self) -> Result<(Registry, Vec<LoadedAggregate>)> {
        let (Some(domain), Some(modifiers), Some(aggregates)) =
            (&self.domain, &self.modifiers, &self.aggregates)
        else {
            anyhow::bail!("--domain, --modifiers and --aggregates are required without --data-dir");
        };

        let config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => RegistryConfig::default(),
        };
        let domain = DomainLoader::load(domain)?;
        let modifiers = ModifierLoader::load(modifiers, &domain)?;

        let mut registry = Registry::with_config(domain, config);
        let aggregates = AggregateLoader::load_into(aggregates, &mut registry)?;
        registry
            .add_modifiers(modifiers)
            .context("Failed to add modifiers to registry")?;

        Ok((registry, aggregates))
    }
}

fn print_aggregate(name: &str, view: &AggregateView<'_>, breakdown: bool) {
    let totals = view.totals();
    println!(
        "{:<20} {:<28} {}",
        style(name).bold().yellow(),
        style(view.signature()).dim(),
        style(format!("{:.4}", totals.value())).bold().green()
    );
    println!(
        "  flat {:.4}  percent {:.4}  multiplicative {:.4}",
        totals.flat, totals.percent, totals.multiplicative
    );

    if breakdown {
        let details = view.breakdown();
        for contribution in &details.contributions {
            println!(
                "    {} {:<15} {:>10.4}  from {}",
                style(contribution.modifier).dim(),
                contribution.kind,
                contribution.magnitude,
                contribution.source
            );
        }
        for (id, signature, value) in &details.children {
            println!("    child {} {:<24} {:>10.4}", style(id).dim(), signature, value);
        }
    }
    println!();
}
