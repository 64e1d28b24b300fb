use thiserror::Error;

use crate::sent_mail::mailbox::MessageId;

// Failures of a single mailbox primitive
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("IMAP error: {0}")]
    Imap(#[from] async_imap::error::Error),
}

/// Failure for one message of a search result. The message is skipped and
/// processing goes on with the next one.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("fetch failed: {source}")]
    Fetch {
        id: MessageId,
        #[source]
        source: MailboxError,
    },

    #[error("cannot parse message: {source}")]
    Parse {
        id: MessageId,
        #[source]
        source: mailparse::MailParseError,
    },

    #[error("flagging as deleted failed: {source}")]
    Flag {
        id: MessageId,
        #[source]
        source: MailboxError,
    },
}

impl ItemError {
    pub fn id(&self) -> MessageId {
        match self {
            ItemError::Fetch { id, .. } | ItemError::Parse { id, .. } | ItemError::Flag { id, .. } => *id,
        }
    }
}
