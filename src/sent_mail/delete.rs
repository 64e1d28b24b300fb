use std::time::Duration;

use crate::error::{ItemError, MailboxError};
use crate::sent_mail::mailbox::{Mailbox, MessageId};
use crate::sent_mail::Progress;
use log::{info, warn};

#[derive(Debug)]
pub struct DeleteReport {
    pub flagged: usize,
    pub total: usize,
    pub expunge: Result<(), MailboxError>,
}

impl DeleteReport {
    // Flagged messages only count as deleted once the expunge went through
    pub fn deleted(&self) -> Option<usize> {
        self.expunge.as_ref().ok().map(|_| self.flagged)
    }
}

/// Flags every id as `\Deleted`, pausing `pacing` after each one, then
/// expunges the folder once. The expunge runs even if every flag failed.
/// `on_progress` hears about every message, with the error when flagging it
/// failed.
pub async fn delete_messages<M, F>(
    mailbox: &mut M,
    ids: &[MessageId],
    pacing: Duration,
    mut on_progress: F,
) -> DeleteReport
where
    M: Mailbox + ?Sized,
    F: FnMut(Progress, Option<&ItemError>),
{
    let total = ids.len();
    let mut flagged = 0;

    for (idx, id) in ids.iter().copied().enumerate() {
        let progress = Progress {
            position: idx + 1,
            total,
        };
        match mailbox.flag_deleted(id).await {
            Ok(()) => {
                flagged += 1;
                on_progress(progress, None);
            }
            Err(source) => {
                let error = ItemError::Flag { id, source };
                warn!("message {} not flagged: {}", error.id(), error);
                on_progress(progress, Some(&error));
            }
        }
        tokio::time::sleep(pacing).await;
    }

    let expunge = mailbox.expunge().await;
    match &expunge {
        Ok(()) => info!("-- flagged {}/{} and expunged", flagged, total),
        Err(e) => warn!("expunge after flagging {}/{} failed: {}", flagged, total, e),
    }

    DeleteReport {
        flagged,
        total,
        expunge,
    }
}
