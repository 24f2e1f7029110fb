mod document;
mod engine;
mod error;
/// Schema detection and sequential upgrades of the on-disk document.
pub mod upgrade;

pub use engine::{IssuesStorage, Summary};
pub use error::{Error, ErrorKind, OpenError};
pub use upgrade::{CURRENT_VERSION, UpgradeError};
