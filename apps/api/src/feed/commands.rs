use serde::Serialize;
use uuid::Uuid;

use crate::models::interaction::ToggleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOp {
    Add,
    Remove,
}

/// A like/save flip. Applied to the local feed first, then replayed against
/// the store; a failed replay may roll the feed back to the confirmed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InteractionCommand {
    pub quote_id: Uuid,
    pub kind: ToggleKind,
    pub op: ToggleOp,
}

impl InteractionCommand {
    /// The command that flips `current` to its opposite.
    pub fn toggle(quote_id: Uuid, kind: ToggleKind, current: bool) -> Self {
        Self {
            quote_id,
            kind,
            op: if current { ToggleOp::Remove } else { ToggleOp::Add },
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            op: match self.op {
                ToggleOp::Add => ToggleOp::Remove,
                ToggleOp::Remove => ToggleOp::Add,
            },
            ..*self
        }
    }

    /// Flag value after the command.
    pub fn target_flag(&self) -> bool {
        self.op == ToggleOp::Add
    }

    /// Counter movement caused by the command.
    pub fn delta(&self) -> i32 {
        match self.op {
            ToggleOp::Add => 1,
            ToggleOp::Remove => -1,
        }
    }
}
