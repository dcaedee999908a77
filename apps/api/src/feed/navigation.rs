//! Bounded cursor over the quote cards.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::feed::gestures::NavAction;

/// How long the slide direction stays readable after a move.
pub const DIRECTION_HOLD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursorView {
    pub index: usize,
    pub total: usize,
    pub direction: Option<Direction>,
    pub can_undo: bool,
    pub loop_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct CardCursor {
    index: usize,
    total: usize,
    loop_enabled: bool,
    history: Vec<usize>,
    direction: Option<(Direction, Instant)>,
}

impl CardCursor {
    pub fn new(total: usize, initial: usize, loop_enabled: bool) -> Self {
        let index = if total == 0 { 0 } else { initial.min(total - 1) };
        Self {
            index,
            total,
            loop_enabled,
            history: vec![index],
            direction: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn can_go_next(&self) -> bool {
        self.total > 0 && (self.loop_enabled || self.index + 1 < self.total)
    }

    pub fn can_go_previous(&self) -> bool {
        self.total > 0 && (self.loop_enabled || self.index > 0)
    }

    /// Direction of the last move while it is still within `DIRECTION_HOLD`.
    pub fn direction_at(&self, now: Instant) -> Option<Direction> {
        match self.direction {
            Some((dir, since)) if now.saturating_duration_since(since) < DIRECTION_HOLD => {
                Some(dir)
            }
            _ => None,
        }
    }

    pub fn go_to_next(&mut self, now: Instant) -> bool {
        if !self.can_go_next() {
            return false;
        }
        let next = (self.index + 1) % self.total;
        self.move_to(next, Direction::Next, now)
    }

    pub fn go_to_previous(&mut self, now: Instant) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        let prev = if self.index == 0 {
            self.total - 1
        } else {
            self.index - 1
        };
        self.move_to(prev, Direction::Previous, now)
    }

    /// Jumps to `target`. Out-of-range and same-index requests are ignored.
    pub fn go_to_index(&mut self, target: usize, now: Instant) -> bool {
        if target >= self.total || target == self.index {
            return false;
        }
        let dir = if target > self.index {
            Direction::Next
        } else {
            Direction::Previous
        };
        self.move_to(target, dir, now)
    }

    pub fn go_to_first(&mut self, now: Instant) -> bool {
        self.go_to_index(0, now)
    }

    pub fn go_to_last(&mut self, now: Instant) -> bool {
        match self.total {
            0 => false,
            n => self.go_to_index(n - 1, now),
        }
    }

    /// Returns to the previous history entry. No-op with a single entry.
    pub fn undo(&mut self, now: Instant) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        self.history.pop();
        let Some(&target) = self.history.last() else {
            return false;
        };
        let dir = if target > self.index {
            Direction::Next
        } else {
            Direction::Previous
        };
        self.index = target;
        self.direction = Some((dir, now));
        true
    }

    /// Adopts a new collection size, clamping a cursor left past the end.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if self.index >= total {
            self.index = total.saturating_sub(1);
            self.history = vec![self.index];
            self.direction = None;
        }
    }

    pub fn perform(&mut self, action: NavAction, now: Instant) -> bool {
        match action {
            NavAction::Next => self.go_to_next(now),
            NavAction::Previous => self.go_to_previous(now),
            NavAction::First => self.go_to_first(now),
            NavAction::Last => self.go_to_last(now),
            NavAction::Undo => self.undo(now),
        }
    }

    pub fn view(&self, now: Instant) -> CursorView {
        CursorView {
            index: self.index,
            total: self.total,
            direction: self.direction_at(now),
            can_undo: self.history.len() > 1,
            loop_enabled: self.loop_enabled,
        }
    }

    fn move_to(&mut self, target: usize, dir: Direction, now: Instant) -> bool {
        if target == self.index {
            return false;
        }
        self.index = target;
        self.history.push(target);
        self.direction = Some((dir, now));
        true
    }
}
