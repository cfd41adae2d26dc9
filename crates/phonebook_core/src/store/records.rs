//! Persisted row shapes and their SQLite column mapping.
//!
//! # Invariants
//! - `id: None` means "let the store generate the key on insert".
//! - `colors.hex` must be `#RRGGBB`.
//! - `notes.in_trash` must be `0` or `1`.

use crate::model::RecordId;
use crate::store::{StoreError, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::Row;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color regex"));

/// Column mapping shared by the generic SQLite store.
pub trait TableRecord: Clone + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Non-key columns in bind order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<RecordId>;
    /// Values for `COLUMNS`, same order.
    fn values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> StoreResult<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRecord {
    pub id: Option<RecordId>,
    pub name: String,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub id: Option<RecordId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub id: Option<RecordId>,
    pub title: String,
    pub content: String,
    pub color_id: RecordId,
    pub tag_id: RecordId,
    pub in_trash: bool,
}

impl TableRecord for ColorRecord {
    const TABLE: &'static str = "colors";
    const COLUMNS: &'static [&'static str] = &["name", "hex"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.hex.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let hex: String = row.get("hex")?;
        if !HEX_COLOR_RE.is_match(&hex) {
            return Err(StoreError::InvalidData(format!(
                "invalid hex value `{hex}` in colors.hex"
            )));
        }

        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("name")?,
            hex,
        })
    }
}

impl TableRecord for TagRecord {
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("name")?,
        })
    }
}

impl TableRecord for NoteRecord {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] =
        &["title", "content", "color_id", "tag_id", "in_trash"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.content.clone()),
            Value::Integer(self.color_id),
            Value::Integer(self.tag_id),
            Value::Integer(bool_to_int(self.in_trash)),
        ]
    }

    fn from_row(row: &Row<'_>) -> StoreResult<Self> {
        let in_trash = match row.get::<_, i64>("in_trash")? {
            0 => false,
            1 => true,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "invalid in_trash value `{other}` in notes.in_trash"
                )));
            }
        };

        Ok(Self {
            id: Some(row.get("id")?),
            title: row.get("title")?,
            content: row.get("content")?,
            color_id: row.get("color_id")?,
            tag_id: row.get("tag_id")?,
            in_trash,
        })
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
