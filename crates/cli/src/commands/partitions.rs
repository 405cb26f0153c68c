//! Partitions command handler.
//!
//! Lists the registered knowledge-base partitions with their routing
//! keywords and backing collections.

use crate::commands::load_registry;
use clap::Args;
use mevzuat_core::{AppConfig, AppError, AppResult};

/// List the registered knowledge-base partitions
#[derive(Args, Debug)]
pub struct PartitionsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PartitionsCommand {
    /// Execute the partitions command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let registry = load_registry(config)?;

        if self.json {
            let json = serde_json::to_string_pretty(registry.all())
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        for partition in registry.all() {
            println!(
                "{} {} ({})",
                partition.icon, partition.display_name, partition.key
            );
            println!("  Koleksiyon: {}", partition.collection);
            println!("  Anahtar kelimeler: {}", partition.keywords.join(", "));
            if !partition.description.is_empty() {
                println!("  {}", partition.description);
            }
        }

        Ok(())
    }
}
