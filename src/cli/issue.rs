use issuedb::{Issue, IssueDraft, IssueId, VersionId};
use tracing::instrument;

use super::{Options, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: IssueCommand,
}

#[derive(Debug, clap::Subcommand)]
enum IssueCommand {
    /// Create a new issue
    Create(Fields),

    /// List all issues
    List,

    /// Show a single issue
    Show {
        /// The issue to show
        id: IssueId,
    },

    /// Change some fields of an issue
    ///
    /// Fields that are not given keep their current value.
    Update {
        /// The issue to update
        id: IssueId,

        #[command(flatten)]
        changes: Changes,
    },
}

#[derive(Debug, clap::Args)]
struct Fields {
    /// Short summary of the issue
    #[arg(long)]
    title: String,

    /// Longer description
    #[arg(long, default_value = "")]
    description: String,

    /// Workflow status, e.g. Open or Closed
    #[arg(long, default_value = "Open")]
    status: String,

    /// The version to assign the issue to
    #[arg(long)]
    version: Option<VersionId>,
}

#[derive(Debug, Default, clap::Args)]
struct Changes {
    /// New summary
    #[arg(long)]
    title: Option<String>,

    /// New description
    #[arg(long)]
    description: Option<String>,

    /// New workflow status
    #[arg(long)]
    status: Option<String>,

    /// Assign the issue to this version
    #[arg(long, conflicts_with = "no_version")]
    version: Option<VersionId>,

    /// Remove the issue from its version
    #[arg(long)]
    no_version: bool,
}

impl Changes {
    fn apply(self, issue: Issue) -> IssueDraft {
        let version_id = if self.no_version {
            None
        } else {
            self.version
                .or_else(|| issue.version.map(|version| version.id))
        };
        IssueDraft {
            title: self.title.unwrap_or(issue.title),
            description: self.description.unwrap_or(issue.description),
            status: self.status.unwrap_or(issue.status),
            version_id,
        }
    }
}

impl From<Fields> for IssueDraft {
    fn from(fields: Fields) -> Self {
        Self {
            title: fields.title,
            description: fields.description,
            status: fields.status,
            version_id: fields.version,
        }
    }
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, options: &Options) -> anyhow::Result<()> {
        let storage = options.open()?;
        let output = options.output();

        match self.command {
            IssueCommand::Create(fields) => {
                let issue = storage.create_issue(fields.into())?;
                output.emit(&issue, |issue| {
                    println!("{} {}", "Created issue".success(), issue.id);
                })
            }
            IssueCommand::List => {
                let issues = storage.get_all_issues()?;
                output.emit(issues.as_slice(), |issues| {
                    if issues.is_empty() {
                        println!("{}", "No issues".dim());
                    }
                    for issue in issues {
                        println!("{}", summary_line(issue));
                    }
                })
            }
            IssueCommand::Show { id } => {
                let issue = storage.get_issue(id)?;
                output.emit(&issue, print_details)
            }
            IssueCommand::Update { id, changes } => {
                let draft = changes.apply(storage.get_issue(id)?);
                let issue = storage.update_issue(id, draft)?;
                output.emit(&issue, |issue| {
                    println!("{} {}", "Updated issue".success(), issue.id);
                })
            }
        }
    }
}

fn summary_line(issue: &Issue) -> String {
    let version = issue
        .version
        .as_ref()
        .map(|version| format!(" ({})", version.name).info())
        .unwrap_or_default();
    format!(
        "{:>4}  {}  {}{version}",
        issue.id,
        format!("[{}]", issue.status).warning(),
        issue.title
    )
}

fn print_details(issue: &Issue) {
    println!("{}", summary_line(issue));
    println!(
        "      {}",
        format!(
            "created {}, updated {}",
            issue.created_date_time.format("%Y-%m-%d %H:%M:%S"),
            issue.updated_date_time.format("%Y-%m-%d %H:%M:%S")
        )
        .dim()
    );
    if !issue.description.is_empty() {
        println!();
        for line in issue.description.lines() {
            println!("      {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use issuedb::{IssueId, IssuesStorage};
    use tempfile::tempdir;

    use super::*;
    use crate::cli::OutputFormat;

    fn fields(title: &str, version: Option<u64>) -> Fields {
        Fields {
            title: title.to_string(),
            description: String::new(),
            status: "Open".to_string(),
            version: version.map(VersionId::new),
        }
    }

    #[test]
    fn create_then_update_issue() {
        let tmp = tempdir().unwrap();
        let database = tmp.path().join("issues-db.json");
        let options = Options::for_database(database.clone(), OutputFormat::Json);

        Command {
            command: IssueCommand::Create(fields("Broken login", None)),
        }
        .run(&options)
        .expect("create should succeed");

        Command {
            command: IssueCommand::Update {
                id: IssueId::new(1),
                changes: Changes {
                    title: Some("Broken logout".to_string()),
                    ..Changes::default()
                },
            },
        }
        .run(&options)
        .expect("update should succeed");

        let storage = IssuesStorage::open(database).unwrap();
        assert_eq!(storage.get_issue(IssueId::new(1)).unwrap().title, "Broken logout");
    }

    #[test]
    fn update_keeps_fields_that_are_not_given() {
        let tmp = tempdir().unwrap();
        let database = tmp.path().join("issues-db.json");
        let storage = IssuesStorage::open(&database).unwrap();
        let version = storage.create_version("1.0").unwrap();
        let issue = storage
            .create_issue(
                IssueDraft::new("Crash on save", "Steps to reproduce", "Closed")
                    .with_version(version.id),
            )
            .unwrap();
        let options = Options::for_database(database, OutputFormat::Json);

        Command {
            command: IssueCommand::Update {
                id: issue.id,
                changes: Changes {
                    title: Some("Crash on autosave".to_string()),
                    ..Changes::default()
                },
            },
        }
        .run(&options)
        .expect("update should succeed");

        let updated = storage.get_issue(issue.id).unwrap();
        assert_eq!(updated.title, "Crash on autosave");
        assert_eq!(updated.description, "Steps to reproduce");
        assert_eq!(updated.status, "Closed");
        assert_eq!(updated.version, Some(version));
    }

    #[test]
    fn update_can_remove_version() {
        let tmp = tempdir().unwrap();
        let database = tmp.path().join("issues-db.json");
        let storage = IssuesStorage::open(&database).unwrap();
        let version = storage.create_version("1.0").unwrap();
        let issue = storage
            .create_issue(IssueDraft::new("Typo", "", "Open").with_version(version.id))
            .unwrap();
        let options = Options::for_database(database, OutputFormat::Json);

        Command {
            command: IssueCommand::Update {
                id: issue.id,
                changes: Changes {
                    no_version: true,
                    ..Changes::default()
                },
            },
        }
        .run(&options)
        .expect("update should succeed");

        assert_eq!(storage.get_issue(issue.id).unwrap().version, None);
    }

    #[test]
    fn create_with_unknown_version_fails() {
        let tmp = tempdir().unwrap();
        let options = Options::for_database(tmp.path().join("db.json"), OutputFormat::Json);

        let result = Command {
            command: IssueCommand::Create(fields("Versioned", Some(4))),
        }
        .run(&options);

        assert!(result.is_err());
    }

    #[test]
    fn show_unknown_issue_fails() {
        let tmp = tempdir().unwrap();
        let options = Options::for_database(tmp.path().join("db.json"), OutputFormat::Pretty);

        let result = Command {
            command: IssueCommand::Show { id: IssueId::new(1) },
        }
        .run(&options);

        assert!(result.is_err());
    }
}
