use issuedb::{Version, VersionId};
use tracing::instrument;

use super::{Options, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: VersionCommand,
}

#[derive(Debug, clap::Subcommand)]
enum VersionCommand {
    /// Create a new version
    Create {
        /// Unique name of the version, e.g. 1.2.0
        name: String,
    },

    /// List all versions
    List,

    /// Show a single version
    Show {
        /// The version to show
        id: VersionId,
    },

    /// Rename a version
    ///
    /// The new name must not be used by any version, including this one.
    Rename {
        /// The version to rename
        id: VersionId,

        /// The new name
        name: String,
    },
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, options: &Options) -> anyhow::Result<()> {
        let storage = options.open()?;
        let output = options.output();

        match self.command {
            VersionCommand::Create { name } => {
                let version = storage.create_version(name)?;
                output.emit(&version, |version| {
                    println!("{} {}", "Created version".success(), line(version));
                })
            }
            VersionCommand::List => {
                let versions = storage.get_all_versions()?;
                output.emit(versions.as_slice(), |versions| {
                    if versions.is_empty() {
                        println!("{}", "No versions".dim());
                    }
                    for version in versions {
                        println!("{}", line(version));
                    }
                })
            }
            VersionCommand::Show { id } => {
                let version = storage.get_version(id)?;
                output.emit(&version, |version| println!("{}", line(version)))
            }
            VersionCommand::Rename { id, name } => {
                let version = storage.update_version(id, name)?;
                output.emit(&version, |version| {
                    println!("{} {}", "Renamed version".success(), line(version));
                })
            }
        }
    }
}

fn line(version: &Version) -> String {
    format!("{:>4}  {}", version.id, version.name.info())
}
