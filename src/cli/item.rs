use issuedb::{ChecklistId, ChecklistItem, ChecklistItemId};
use tracing::instrument;

use super::{
    Deleted, Options,
    terminal::{Colorize, checkbox},
};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Debug, clap::Subcommand)]
enum ItemCommand {
    /// Add an item to a checklist
    Add {
        /// The checklist to add the item to
        checklist: ChecklistId,

        /// Text of the item
        content: String,

        /// Mark the item as done
        #[arg(long)]
        checked: bool,
    },

    /// List the items of a checklist
    List {
        /// The checklist whose items to list
        checklist: ChecklistId,
    },

    /// Show a single item
    Show {
        /// The item to show
        id: ChecklistItemId,
    },

    /// Replace the text and checked state of an item
    Update {
        /// The item to update
        id: ChecklistItemId,

        /// New text of the item
        content: String,

        /// Mark the item as done; omit to mark it as not done
        #[arg(long)]
        checked: bool,
    },

    /// Delete an item
    Delete {
        /// The item to delete
        id: ChecklistItemId,
    },
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, options: &Options) -> anyhow::Result<()> {
        let storage = options.open()?;
        let output = options.output();

        match self.command {
            ItemCommand::Add {
                checklist,
                content,
                checked,
            } => {
                let item = storage.create_checklist_item(checklist, content, checked)?;
                output.emit(&item, |item| {
                    println!("{} {}", "Added item".success(), line(item));
                })
            }
            ItemCommand::List { checklist } => {
                let items = storage.get_all_checklist_items(checklist)?;
                output.emit(items.as_slice(), |items| {
                    for item in items {
                        println!("{}", line(item));
                    }
                })
            }
            ItemCommand::Show { id } => {
                let item = storage.get_checklist_item(id)?;
                output.emit(&item, |item| println!("{}", line(item)))
            }
            ItemCommand::Update {
                id,
                content,
                checked,
            } => {
                let item = storage.update_checklist_item(id, content, checked)?;
                output.emit(&item, |item| {
                    println!("{} {}", "Updated item".success(), line(item));
                })
            }
            ItemCommand::Delete { id } => {
                storage.delete_checklist_item(id)?;
                output.emit(&Deleted { deleted: id }, |deleted| {
                    println!("{} {}", "Deleted item".success(), deleted.deleted);
                })
            }
        }
    }
}

fn line(item: &ChecklistItem) -> String {
    format!("{:>4}  {} {}", item.id, checkbox(item.is_checked), item.content)
}

#[cfg(test)]
mod tests {
    use issuedb::{IssueDraft, IssuesStorage};
    use tempfile::tempdir;

    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn add_and_check_item() {
        let tmp = tempdir().unwrap();
        let database = tmp.path().join("issues-db.json");
        let storage = IssuesStorage::open(&database).unwrap();
        let issue = storage
            .create_issue(IssueDraft::new("Release", "", "Open"))
            .unwrap();
        let checklist = storage.create_checklist(issue.id, "Steps").unwrap();
        let options = Options::for_database(database, OutputFormat::Json);

        Command {
            command: ItemCommand::Add {
                checklist: checklist.id,
                content: "Write notes".into(),
                checked: false,
            },
        }
        .run(&options)
        .unwrap();
        Command {
            command: ItemCommand::Update {
                id: ChecklistItemId::new(1),
                content: "Write release notes".into(),
                checked: true,
            },
        }
        .run(&options)
        .unwrap();

        let items = storage.get_all_checklist_items(checklist.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "Write release notes");
        assert!(items[0].is_checked);
    }

    #[test]
    fn delete_item_with_json_output() {
        let tmp = tempdir().unwrap();
        let database = tmp.path().join("issues-db.json");
        let storage = IssuesStorage::open(&database).unwrap();
        let issue = storage
            .create_issue(IssueDraft::new("Release", "", "Open"))
            .unwrap();
        let checklist = storage.create_checklist(issue.id, "Steps").unwrap();
        let item = storage
            .create_checklist_item(checklist.id, "Tag release", false)
            .unwrap();
        let options = Options::for_database(database, OutputFormat::Json);

        Command {
            command: ItemCommand::Delete { id: item.id },
        }
        .run(&options)
        .expect("delete should succeed");

        assert!(storage.get_all_checklist_items(checklist.id).unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_item_fails() {
        let tmp = tempdir().unwrap();
        let options = Options::for_database(tmp.path().join("db.json"), OutputFormat::Json);

        let result = Command {
            command: ItemCommand::Delete {
                id: ChecklistItemId::new(1),
            },
        }
        .run(&options);

        assert!(result.is_err());
    }
}
