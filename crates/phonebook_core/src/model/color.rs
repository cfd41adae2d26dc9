//! Color domain value.

use crate::db::seed::DEFAULT_COLORS;
use crate::model::RecordId;
use serde::{Deserialize, Serialize};

/// Display color a note can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: RecordId,
    pub name: String,
    /// `#RRGGBB` form.
    pub hex: String,
}

impl Default for Color {
    /// First seeded color, used for fresh note entries.
    fn default() -> Self {
        let (id, name, hex) = DEFAULT_COLORS[0];
        Self {
            id,
            name: name.to_string(),
            hex: hex.to_string(),
        }
    }
}
