//! Replays local like/save commands against the store, one at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};
use uuid::Uuid;

use crate::feed::commands::{InteractionCommand, ToggleOp};
use crate::feed::state::SharedFeed;
use crate::models::interaction::{InteractionKind, ToggleKind};
use crate::store::{QuoteStore, StoreError};
use crate::viewer::notifications::Notifier;

enum Job {
    Replay {
        user_id: Uuid,
        cmd: InteractionCommand,
        epoch: u64,
        seq: u64,
    },
    Flush(oneshot::Sender<()>),
}

/// FIFO worker owned by one viewer. Dropping the queue lets the worker drain
/// what is already queued and exit.
pub struct MutationQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl MutationQueue {
    pub fn spawn(store: Arc<dyn QuoteStore>, feed: SharedFeed, notifier: Notifier) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, store, feed, notifier));
        Self { tx }
    }

    /// Queues the remote half of a command already applied to the feed at
    /// `epoch`. `seq` comes from `QuoteFeed::track`.
    pub fn submit(&self, user_id: Uuid, cmd: InteractionCommand, epoch: u64, seq: u64) {
        let job = Job::Replay {
            user_id,
            cmd,
            epoch,
            seq,
        };
        if self.tx.send(job).is_err() {
            error!(quote_id = %cmd.quote_id, "Mutation worker is gone; dropping command");
        }
    }

    /// Resolves once every command submitted before the call has been replayed.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Job::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Job>,
    store: Arc<dyn QuoteStore>,
    feed: SharedFeed,
    notifier: Notifier,
) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Replay {
                user_id,
                cmd,
                epoch,
                seq,
            } => match replay(store.as_ref(), user_id, &cmd).await {
                Ok(()) => feed.lock().confirm(&cmd, epoch),
                Err(e) => {
                    error!(
                        quote_id = %cmd.quote_id,
                        kind = ?cmd.kind,
                        op = ?cmd.op,
                        "Remote interaction update failed: {e}"
                    );
                    notifier.error(failure_message(cmd.kind));
                    if feed.lock().compensate(&cmd, epoch, seq).is_none() {
                        debug!(quote_id = %cmd.quote_id, seq, "Superseded or reloaded; compensation skipped");
                    }
                }
            },
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Inserts or deletes the interaction row and moves the counter to match.
/// Adding an interaction that already exists changes nothing. When the counter
/// update fails the row change is undone, so row and counter move together.
pub async fn replay(
    store: &dyn QuoteStore,
    user_id: Uuid,
    cmd: &InteractionCommand,
) -> Result<(), StoreError> {
    let kind = InteractionKind::from(cmd.kind);
    match cmd.op {
        ToggleOp::Add => {
            if store
                .find_interaction(user_id, cmd.quote_id, kind)
                .await?
                .is_some()
            {
                return Ok(());
            }
            store.insert_interaction(user_id, cmd.quote_id, kind).await?;
            if let Err(e) = store.adjust_counter(cmd.quote_id, kind, 1).await {
                if let Err(undo) = store.delete_interaction(user_id, cmd.quote_id, kind).await {
                    error!(quote_id = %cmd.quote_id, "Could not roll back interaction row: {undo}");
                }
                return Err(e);
            }
            Ok(())
        }
        ToggleOp::Remove => {
            let removed = store.delete_interaction(user_id, cmd.quote_id, kind).await?;
            if removed == 0 {
                return Ok(());
            }
            if let Err(e) = store.adjust_counter(cmd.quote_id, kind, -1).await {
                if let Err(undo) = store.insert_interaction(user_id, cmd.quote_id, kind).await {
                    error!(quote_id = %cmd.quote_id, "Could not restore interaction row: {undo}");
                }
                return Err(e);
            }
            Ok(())
        }
    }
}

fn failure_message(kind: ToggleKind) -> &'static str {
    match kind {
        ToggleKind::Like => "Failed to update like. Please try again.",
        ToggleKind::Save => "Failed to update save. Please try again.",
    }
}
