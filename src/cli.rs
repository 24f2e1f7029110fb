use std::path::{Path, PathBuf};

mod checklist;
mod init;
mod issue;
mod item;
mod status;
mod terminal;
mod version;

use anyhow::Context;
use clap::ArgAction;
use issuedb::{Config, IssuesStorage};
use serde::Serialize;
use status::Status;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&self.options)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Where the database lives and how results are printed.
#[derive(Debug, Clone, clap::Args)]
pub struct Options {
    /// Path to the configuration file
    #[arg(short, long, default_value = "issues.toml", global = true)]
    config: PathBuf,

    /// Path to the database file, overriding the configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty", global = true)]
    output: OutputFormat,
}

impl Options {
    #[cfg(test)]
    pub fn for_database(database: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: database.with_extension("toml"),
            database: Some(database),
            output,
        }
    }

    /// Loads the configuration file, or the defaults if there is none.
    fn load_config(&self) -> anyhow::Result<Config> {
        if !self.config.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                self.config.display()
            );
            return Ok(Config::default());
        }
        Config::load(&self.config).map_err(anyhow::Error::msg)
    }

    pub fn open(&self) -> anyhow::Result<IssuesStorage> {
        let mut config = self.load_config()?;

        // An explicit database path is taken relative to the working
        // directory, a configured one relative to the config file.
        let base = if let Some(database) = &self.database {
            config.set_database(database.clone());
            Path::new("")
        } else {
            self.config.parent().unwrap_or_else(|| Path::new(""))
        };

        let storage = IssuesStorage::from_config(&config, base)
            .with_context(|| format!("failed to open database {}", config.database().display()))?;
        tracing::debug!("Opened database {}", storage.path().display());
        Ok(storage)
    }

    pub const fn output(&self) -> OutputFormat {
        self.output
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl OutputFormat {
    /// Prints `value`, either with `pretty` or as JSON.
    pub fn emit<T: Serialize + ?Sized>(
        self,
        value: &T,
        pretty: impl FnOnce(&T),
    ) -> anyhow::Result<()> {
        match self {
            Self::Pretty => pretty(value),
            Self::Json => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }
}

/// Confirms the removal of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deleted<T> {
    /// Id of the removed record.
    pub deleted: T,
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show database location and record counts (default)
    Status(Status),

    /// Write a configuration file and create an empty database
    Init(init::Command),

    /// Create, list, show and update issues
    Issue(issue::Command),

    /// Create, list, show and rename versions
    Version(version::Command),

    /// Manage the checklists attached to issues
    Checklist(checklist::Command),

    /// Manage the items of a checklist
    Item(item::Command),
}

impl Command {
    fn run(self, options: &Options) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(options),
            Self::Init(command) => command.run(options),
            Self::Issue(command) => command.run(options),
            Self::Version(command) => command.run(options),
            Self::Checklist(command) => command.run(options),
            Self::Item(command) => command.run(options),
        }
    }
}
