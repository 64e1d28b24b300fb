use mailparse::{parse_headers, MailHeaderMap};

use crate::error::ItemError;
use crate::sent_mail::mailbox::{Mailbox, MessageId};
use log::debug;

// What we keep of a sent message: enough to list who it went to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: MessageId,
    pub subject: String,
    pub date: String,
    pub recipients: Vec<String>,
}

// One line item of an export: a single recipient of a single message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEntry<'a> {
    pub date: &'a str,
    pub recipient: &'a str,
    pub subject: &'a str,
}

impl MessageRecord {
    pub fn entries(&self) -> impl Iterator<Item = RecipientEntry<'_>> {
        self.recipients.iter().map(move |recipient| RecipientEntry {
            date: &self.date,
            recipient,
            subject: &self.subject,
        })
    }
}

/// Splits a `To` header value into addresses, dropping blanks and the owner's
/// own address. The owner comparison is exact; other duplicates are kept.
pub fn split_recipients(to: &str, owner_address: &str) -> Vec<String> {
    to.split(',')
        .map(str::trim)
        .filter(|recipient| !recipient.is_empty() && *recipient != owner_address)
        .map(str::to_string)
        .collect()
}

// Build a record from the raw RFC822 bytes; only the headers are needed
pub fn parse_message(id: MessageId, raw: &[u8], owner_address: &str) -> Result<MessageRecord, ItemError> {
    let (headers, _) = parse_headers(raw).map_err(|source| ItemError::Parse { id, source })?;

    // get_first_value decodes RFC 2047 words and falls back to lossy text
    let subject = headers.get_first_value("Subject").unwrap_or_default();
    let to = headers.get_first_value("To").unwrap_or_default();
    let date = headers.get_first_value("Date").unwrap_or_default();

    Ok(MessageRecord {
        id,
        recipients: split_recipients(&to, owner_address),
        subject,
        date,
    })
}

/// Fetches one message and extracts its recipients. `Ok(None)` means the
/// server gave no body for it and the message is skipped without complaint.
pub async fn parse_recipients<M: Mailbox + ?Sized>(
    mailbox: &mut M,
    id: MessageId,
    owner_address: &str,
) -> Result<Option<MessageRecord>, ItemError> {
    let raw = mailbox
        .fetch_raw(id)
        .await
        .map_err(|source| ItemError::Fetch { id, source })?;

    let Some(raw) = raw else {
        debug!("message {} came back without a body, skipping", id);
        return Ok(None);
    };

    parse_message(id, &raw, owner_address).map(Some)
}
