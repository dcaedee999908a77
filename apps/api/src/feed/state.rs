use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::feed::commands::InteractionCommand;
use crate::models::interaction::ToggleKind;
use crate::models::quote::Quote;

pub type SharedFeed = Arc<Mutex<QuoteFeed>>;

/// Remote bookkeeping for one (quote, kind) pair with writes in flight.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    latest: u64,
    /// Flag value the store is known to hold.
    confirmed: bool,
}

/// The viewer's page of quotes with their local interaction flags.
///
/// `epoch` moves whenever the page is replaced or the flags are wiped, so a
/// compensation computed against an older page is dropped instead of applied.
/// Within one epoch only the newest command per (quote, kind) may roll the
/// flag back, and it rolls back to the last value the store confirmed.
#[derive(Debug, Default)]
pub struct QuoteFeed {
    quotes: Vec<Quote>,
    epoch: u64,
    next_seq: u64,
    in_flight: HashMap<(Uuid, ToggleKind), InFlight>,
}

impl QuoteFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedFeed {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    pub fn find(&self, quote_id: Uuid) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == quote_id)
    }

    pub fn replace(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
        self.bump_epoch();
    }

    fn bump_epoch(&mut self) {
        self.epoch += 1;
        self.in_flight.clear();
    }

    /// Registers a command about to be queued and returns its sequence number.
    /// The first command for a pair records the flag it flips from as confirmed.
    pub fn track(&mut self, cmd: &InteractionCommand) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight
            .entry((cmd.quote_id, cmd.kind))
            .or_insert(InFlight {
                latest: seq,
                confirmed: !cmd.target_flag(),
            })
            .latest = seq;
        seq
    }

    /// Records that the store now holds `cmd`'s target flag.
    pub fn confirm(&mut self, cmd: &InteractionCommand, epoch: u64) {
        if epoch != self.epoch {
            return;
        }
        if let Some(entry) = self.in_flight.get_mut(&(cmd.quote_id, cmd.kind)) {
            entry.confirmed = cmd.target_flag();
        }
    }

    /// Applies a command locally. Returns the updated quote, or `None` when the
    /// quote is not on this page.
    pub fn apply(&mut self, cmd: &InteractionCommand) -> Option<Quote> {
        let quote = self.quotes.iter_mut().find(|q| q.id == cmd.quote_id)?;
        // Re-applying a command whose target already holds is a no-op.
        if quote.flag(cmd.kind) == cmd.target_flag() {
            return Some(quote.clone());
        }
        quote.set_interaction(cmd.kind, cmd.target_flag(), cmd.delta());
        Some(quote.clone())
    }

    /// Rolls a failed command back to the confirmed flag. Skipped when the page
    /// was reloaded or a newer command for the same pair is queued behind it.
    pub fn compensate(&mut self, cmd: &InteractionCommand, epoch: u64, seq: u64) -> Option<Quote> {
        if epoch != self.epoch {
            return None;
        }
        let entry = self.in_flight.get(&(cmd.quote_id, cmd.kind)).copied()?;
        if entry.latest != seq {
            return None;
        }
        // As the newest command, `cmd` set the flag now shown.
        if entry.confirmed == cmd.target_flag() {
            return self.find(cmd.quote_id).cloned();
        }
        self.apply(&cmd.inverse())
    }

    /// Drops every per-user flag. Counters are left alone.
    pub fn clear_interaction_flags(&mut self) {
        for quote in &mut self.quotes {
            quote.is_liked = false;
            quote.is_saved = false;
        }
        self.bump_epoch();
    }

    pub fn flag(&self, quote_id: Uuid, kind: ToggleKind) -> Option<bool> {
        self.find(quote_id).map(|q| q.flag(kind))
    }
}
