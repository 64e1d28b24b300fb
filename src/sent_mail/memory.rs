use async_trait::async_trait;
use mailparse::MailHeaderMap;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;

use crate::error::MailboxError;
use crate::sent_mail::mailbox::{Mailbox, MessageId};

// Stored message; `raw: None` models a fetch answered without a body
#[derive(Debug, Clone, Default)]
pub struct StoredMessage {
    pub subject: String,
    pub raw: Option<Vec<u8>>,
}

/// In-memory mailbox for tests. SEARCH understands `SUBJECT "<text>"` as a
/// case-insensitive substring match; everything else is recorded so tests can
/// inspect what was asked of the server.
#[derive(Debug, Default)]
pub struct MemoryMailbox {
    pub folders: BTreeMap<String, BTreeMap<MessageId, StoredMessage>>,
    pub selected: Option<String>,
    pub searches: Vec<String>,
    pub flagged: BTreeSet<MessageId>,
    pub fail_fetch: HashSet<MessageId>,
    pub fail_flag: HashSet<MessageId>,
    pub fail_search: bool,
    pub search_io_error: bool,
    pub fail_expunge: bool,
    pub fail_logout: bool,
    pub expunge_calls: usize,
    pub logged_out: bool,
}

impl MemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, folder: &str, id: u32, raw: &str) -> Self {
        let subject = mailparse::parse_mail(raw.as_bytes())
            .ok()
            .and_then(|parsed| parsed.headers.get_first_value("Subject"))
            .unwrap_or_default();
        self.folders.entry(folder.to_string()).or_default().insert(
            MessageId(id),
            StoredMessage {
                subject,
                raw: Some(raw.as_bytes().to_vec()),
            },
        );
        self
    }

    pub fn with_bodyless(mut self, folder: &str, id: u32, subject: &str) -> Self {
        self.folders.entry(folder.to_string()).or_default().insert(
            MessageId(id),
            StoredMessage {
                subject: subject.to_string(),
                raw: None,
            },
        );
        self
    }

    pub fn ids_in(&self, folder: &str) -> Vec<MessageId> {
        self.folders
            .get(folder)
            .map(|messages| messages.keys().copied().collect())
            .unwrap_or_default()
    }

    fn selected_folder(&mut self) -> Result<&mut BTreeMap<MessageId, StoredMessage>, MailboxError> {
        let name = self.selected.clone().ok_or_else(|| imap_bad("No mailbox selected"))?;
        Ok(self.folders.entry(name).or_default())
    }
}

fn imap_no(text: &str) -> MailboxError {
    MailboxError::Imap(async_imap::error::Error::No(text.to_string()))
}

fn imap_bad(text: &str) -> MailboxError {
    MailboxError::Imap(async_imap::error::Error::Bad(text.to_string()))
}

fn subject_needle(criteria: &str) -> String {
    let quoted = criteria.trim_start_matches("SUBJECT ").trim();
    let inner = quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(quoted);
    inner.replace("\\\"", "\"").replace("\\\\", "\\").to_lowercase()
}

#[async_trait]
impl Mailbox for MemoryMailbox {
    async fn select(&mut self, folder: &str) -> Result<(), MailboxError> {
        if !self.folders.contains_key(folder) {
            return Err(imap_no("[NONEXISTENT] Unknown Mailbox"));
        }
        self.selected = Some(folder.to_string());
        Ok(())
    }

    async fn search(&mut self, criteria: &str) -> Result<Vec<MessageId>, MailboxError> {
        self.searches.push(criteria.to_string());
        if self.fail_search {
            return Err(imap_no("SEARCH failed"));
        }
        if self.search_io_error {
            return Err(MailboxError::Io(io::Error::from(io::ErrorKind::ConnectionReset)));
        }
        let needle = subject_needle(criteria);
        let folder = self.selected_folder()?;
        Ok(folder
            .iter()
            .filter(|(_, message)| message.subject.to_lowercase().contains(&needle))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn fetch_raw(&mut self, id: MessageId) -> Result<Option<Vec<u8>>, MailboxError> {
        if self.fail_fetch.contains(&id) {
            return Err(imap_no("FETCH failed"));
        }
        let folder = self.selected_folder()?;
        // Unknown UIDs produce an empty FETCH response
        Ok(folder.get(&id).and_then(|message| message.raw.clone()))
    }

    async fn flag_deleted(&mut self, id: MessageId) -> Result<(), MailboxError> {
        if self.fail_flag.contains(&id) {
            return Err(imap_no("STORE failed"));
        }
        let folder = self.selected_folder()?;
        if folder.contains_key(&id) {
            self.flagged.insert(id);
        }
        Ok(())
    }

    async fn expunge(&mut self) -> Result<(), MailboxError> {
        self.expunge_calls += 1;
        if self.fail_expunge {
            return Err(imap_no("EXPUNGE failed"));
        }
        let flagged = std::mem::take(&mut self.flagged);
        let folder = self.selected_folder()?;
        folder.retain(|id, _| !flagged.contains(id));
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), MailboxError> {
        if self.fail_logout {
            return Err(imap_no("LOGOUT failed"));
        }
        self.logged_out = true;
        Ok(())
    }
}
