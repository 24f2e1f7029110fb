//! Concurrent callers sharing one store.

use std::{collections::BTreeSet, thread};

use issuedb::{IssueDraft, IssuesStorage};
use tempfile::TempDir;

const CALLERS: u64 = 3;
const ISSUES_PER_CALLER: u64 = 1000;

#[test]
fn concurrent_creates_assign_contiguous_unique_ids() {
    let tmp = TempDir::new().unwrap();
    let storage = IssuesStorage::open(tmp.path().join("issues-db.json")).unwrap();

    thread::scope(|scope| {
        for caller in 0..CALLERS {
            let storage = &storage;
            scope.spawn(move || {
                for n in 0..ISSUES_PER_CALLER {
                    let draft = IssueDraft::new(
                        format!("Issue {n} from caller {caller}"),
                        String::new(),
                        "Open",
                    );
                    storage.create_issue(draft).unwrap();

                    if n % 50 == 0 {
                        let seen = storage.get_all_issues().unwrap();
                        assert!(seen.len() as u64 > n);
                    }
                }
            });
        }
    });

    let issues = storage.get_all_issues().unwrap();
    let ids: BTreeSet<u64> = issues.iter().map(|issue| issue.id.get()).collect();

    assert_eq!(issues.len() as u64, CALLERS * ISSUES_PER_CALLER);
    assert_eq!(ids, (1..=CALLERS * ISSUES_PER_CALLER).collect());
}

#[test]
fn concurrent_checklist_edits_are_not_lost() {
    let tmp = TempDir::new().unwrap();
    let storage = IssuesStorage::open(tmp.path().join("issues-db.json")).unwrap();
    let issue = storage
        .create_issue(IssueDraft::new("Shared", "", "Open"))
        .unwrap();
    let checklist = storage.create_checklist(issue.id, "Shared list").unwrap();

    thread::scope(|scope| {
        for caller in 0..CALLERS {
            let storage = &storage;
            scope.spawn(move || {
                for n in 0..20 {
                    storage
                        .create_checklist_item(checklist.id, format!("{caller}-{n}"), false)
                        .unwrap();
                }
            });
        }
    });

    let items = storage.get_all_checklist_items(checklist.id).unwrap();
    assert_eq!(items.len(), 60);
    assert!(storage.get_issue(issue.id).unwrap().updated_date_time > issue.updated_date_time);
}
