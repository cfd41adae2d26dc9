//! Tag (category) domain value.

use crate::db::seed::DEFAULT_TAGS;
use crate::model::RecordId;
use serde::{Deserialize, Serialize};

/// Category label a note is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: RecordId,
    pub name: String,
}

impl Default for Tag {
    fn default() -> Self {
        let (id, name) = DEFAULT_TAGS[0];
        Self {
            id,
            name: name.to_string(),
        }
    }
}
