use issuedb::{Checklist, ChecklistId, IssueId};
use tracing::instrument;

use super::{
    Deleted, Options,
    terminal::{Colorize, checkbox},
};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ChecklistCommand,
}

#[derive(Debug, clap::Subcommand)]
enum ChecklistCommand {
    /// Add a checklist to an issue
    Create {
        /// The issue to attach the checklist to
        issue: IssueId,

        /// Heading of the checklist
        title: String,
    },

    /// List the checklists of an issue
    List {
        /// The issue whose checklists to list
        issue: IssueId,
    },

    /// Show a checklist and its items
    Show {
        /// The checklist to show
        id: ChecklistId,
    },

    /// Change the heading of a checklist
    Rename {
        /// The checklist to rename
        id: ChecklistId,

        /// The new heading
        title: String,
    },

    /// Delete a checklist and all of its items
    Delete {
        /// The checklist to delete
        id: ChecklistId,
    },
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, options: &Options) -> anyhow::Result<()> {
        let storage = options.open()?;
        let output = options.output();

        match self.command {
            ChecklistCommand::Create { issue, title } => {
                let checklist = storage.create_checklist(issue, title)?;
                output.emit(&checklist, |checklist| {
                    println!(
                        "{} {} on issue {}",
                        "Created checklist".success(),
                        checklist.id,
                        checklist.issue_id
                    );
                })
            }
            ChecklistCommand::List { issue } => {
                let checklists = storage.get_all_checklists(issue)?;
                output.emit(checklists.as_slice(), |checklists| {
                    if checklists.is_empty() {
                        println!("{}", format!("Issue {issue} has no checklists").dim());
                    }
                    for checklist in checklists {
                        print_checklist(checklist);
                    }
                })
            }
            ChecklistCommand::Show { id } => {
                let checklist = storage.get_checklist(id)?;
                output.emit(&checklist, print_checklist)
            }
            ChecklistCommand::Rename { id, title } => {
                let checklist = storage.update_checklist(id, title)?;
                output.emit(&checklist, |checklist| {
                    println!("{} {}", "Renamed checklist".success(), checklist.id);
                })
            }
            ChecklistCommand::Delete { id } => {
                storage.delete_checklist(id)?;
                output.emit(&Deleted { deleted: id }, |deleted| {
                    println!("{} {}", "Deleted checklist".success(), deleted.deleted);
                })
            }
        }
    }
}

fn print_checklist(checklist: &Checklist) {
    println!(
        "{:>4}  {} {}",
        checklist.id,
        checklist.title.info(),
        format!("({}/{})", checklist.checked_count(), checklist.items.len()).dim()
    );
    for item in &checklist.items {
        println!(
            "      {} {}  {}",
            checkbox(item.is_checked),
            item.content,
            format!("#{}", item.id).dim()
        );
    }
}
