use async_trait::async_trait;
use std::fmt;

use crate::error::MailboxError;

// Server-assigned UID, only meaningful inside the currently selected folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The handful of IMAP primitives the tool needs from a mailbox.
#[async_trait]
pub trait Mailbox: Send {
    async fn select(&mut self, folder: &str) -> Result<(), MailboxError>;

    /// Runs a SEARCH in the selected folder. `criteria` is the raw IMAP
    /// search expression, e.g. `SUBJECT "invoice"`.
    async fn search(&mut self, criteria: &str) -> Result<Vec<MessageId>, MailboxError>;

    /// Full RFC822 message, or `None` when the server answered without a body.
    async fn fetch_raw(&mut self, id: MessageId) -> Result<Option<Vec<u8>>, MailboxError>;

    async fn flag_deleted(&mut self, id: MessageId) -> Result<(), MailboxError>;

    async fn expunge(&mut self) -> Result<(), MailboxError>;

    async fn logout(&mut self) -> Result<(), MailboxError>;
}

// Quote a string for use as an IMAP quoted string
pub fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

pub fn subject_criteria(subject: &str) -> String {
    format!("SUBJECT {}", quote(subject))
}
