use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The `type` column of the `interactions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    Save,
    Report,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Save => "save",
            InteractionKind::Report => "report",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(InteractionKind::Like),
            "save" => Some(InteractionKind::Save),
            "report" => Some(InteractionKind::Report),
            _ => None,
        }
    }
}

/// The interaction kinds a viewer can flip on and off. Reports are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleKind {
    Like,
    Save,
}

impl From<ToggleKind> for InteractionKind {
    fn from(kind: ToggleKind) -> Self {
        match kind {
            ToggleKind::Like => InteractionKind::Like,
            ToggleKind::Save => InteractionKind::Save,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InteractionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quote_id: Uuid,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl InteractionRow {
    pub fn kind(&self) -> Option<InteractionKind> {
        InteractionKind::parse(&self.kind)
    }
}
