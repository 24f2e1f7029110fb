use issuedb::Summary;
use tracing::instrument;

use super::{Options, terminal::Colorize};

#[derive(Debug, Default, clap::Parser)]
pub struct Status {}

impl Status {
    #[instrument(skip(self))]
    pub fn run(self, options: &Options) -> anyhow::Result<()> {
        let storage = options.open()?;
        let summary = storage.summary()?;

        options.output().emit(&summary, |summary: &Summary| {
            println!("{} {}", "Database:".dim(), storage.path().display());
            println!("{} {}", "Schema version:".dim(), summary.schema_version);
            println!("{} {}", "Issues:".dim(), summary.issues);
            println!("{} {}", "Versions:".dim(), summary.versions);
            println!(
                "{} {} ({} items)",
                "Checklists:".dim(),
                summary.checklists,
                summary.checklist_items
            );
        })
    }
}
