use crate::error::{ItemError, MailboxError};
use crate::sent_mail::mailbox::{subject_criteria, Mailbox, MessageId};
use crate::sent_mail::message::{parse_recipients, MessageRecord, RecipientEntry};
use crate::sent_mail::Progress;
use log::{info, warn};

/// Everything one search produced. Only valid until the ids are expunged.
#[derive(Debug, Default)]
pub struct SearchResult {
    pub ids: Vec<MessageId>,
    pub records: Vec<MessageRecord>,
}

impl SearchResult {
    pub fn entries(&self) -> impl Iterator<Item = RecipientEntry<'_>> {
        self.records.iter().flat_map(|record| record.entries())
    }

    pub fn recipient_count(&self) -> usize {
        self.records.iter().map(|record| record.recipients.len()).sum()
    }
}

/// Selects the sent folder and runs a SUBJECT search in it. A search the
/// server refuses with NO comes back as an empty list; a failed select, a
/// BAD answer or a broken connection is an error.
pub async fn search_sent<M: Mailbox + ?Sized>(
    mailbox: &mut M,
    sent_folder: &str,
    subject_prefix: &str,
) -> Result<Vec<MessageId>, MailboxError> {
    mailbox.select(sent_folder).await?;

    let criteria = subject_criteria(subject_prefix);
    match mailbox.search(&criteria).await {
        Ok(ids) => {
            info!("{} matched {} message(s) in {}", criteria, ids.len(), sent_folder);
            Ok(ids)
        }
        Err(MailboxError::Imap(async_imap::error::Error::No(text))) => {
            warn!("search {} refused: {}", criteria, text);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Fetches and parses every id in order. `on_progress` hears about each
/// message as soon as it is done, with its record or the error that made it
/// get skipped; messages without a body are skipped silently.
pub async fn collect_records<M, F>(
    mailbox: &mut M,
    ids: Vec<MessageId>,
    owner_address: &str,
    mut on_progress: F,
) -> SearchResult
where
    M: Mailbox + ?Sized,
    F: FnMut(Progress, Result<&MessageRecord, &ItemError>),
{
    let total = ids.len();
    let mut records = Vec::new();

    for (idx, id) in ids.iter().copied().enumerate() {
        let progress = Progress {
            position: idx + 1,
            total,
        };
        match parse_recipients(mailbox, id, owner_address).await {
            Ok(Some(record)) => {
                on_progress(progress, Ok(&record));
                records.push(record);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("message {} skipped: {}", e.id(), e);
                on_progress(progress, Err(&e));
            }
        }
    }

    SearchResult { ids, records }
}
