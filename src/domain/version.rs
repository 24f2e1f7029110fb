use serde::{Deserialize, Serialize};

use crate::domain::VersionId;

/// A named release that issues can be assigned to.
///
/// Names are unique across all versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Identifier, assigned on creation.
    pub id: VersionId,
    /// Unique display name, e.g. `1.2.0`.
    pub name: String,
}
