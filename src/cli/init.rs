use issuedb::Config;
use tracing::instrument;

use super::{Options, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Pretty-print the database document
    #[arg(long)]
    pretty: bool,
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, options: &Options) -> anyhow::Result<()> {
        let config_path = &options.config;
        if config_path.exists() {
            anyhow::bail!(
                "Configuration already exists at {}",
                config_path.display()
            );
        }

        let mut config = Config::default();
        config.pretty = self.pretty;
        if let Some(database) = &options.database {
            config.set_database(database.clone());
        }
        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", config_path.display()))?;

        let storage = options.open()?;

        println!("{}", "Initialized issue database".success());
        println!("  Config:   {}", config_path.display());
        println!("  Database: {}", storage.path().display());
        Ok(())
    }
}
