use async_imap::types::Fetch;
use async_imap::{Client, Session};
use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::net::TcpStream;
use tokio_native_tls::TlsStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::error::MailboxError;
use crate::sent_mail::mailbox::{Mailbox, MessageId};
use log::{debug, info};

type ImapStream = Compat<TlsStream<TcpStream>>;

// Establish a TLS-encrypted connection to the IMAP server
async fn connect_to_server(server: &str, port: u16) -> Result<TlsStream<TcpStream>, MailboxError> {
    let imap_addr = (server, port);
    let tcp_stream = TcpStream::connect(imap_addr).await?;
    let tls = tokio_native_tls::TlsConnector::from(native_tls::TlsConnector::new()?);
    let tls_stream = tls.connect(server, tcp_stream).await?;

    info!("-- connected to {}:{}", server, port);
    Ok(tls_stream)
}

// Login to the IMAP server and return an authenticated session
async fn login_to_server(
    client: Client<ImapStream>,
    username: &str,
    password: &str,
) -> Result<Session<ImapStream>, MailboxError> {
    let imap_session = client
        .login(username, password)
        .await
        .map_err(|e| e.0)?;

    info!("-- logged in as {}", username);
    Ok(imap_session)
}

/// A live, authenticated IMAP session. Message ids are UIDs.
pub struct ImapMailbox {
    session: Session<ImapStream>,
}

impl ImapMailbox {
    pub async fn connect(
        server: &str,
        port: u16,
        username: &str,
        password: &str,
    ) -> Result<Self, MailboxError> {
        let tls_stream = connect_to_server(server, port).await?;
        let client = Client::new(tls_stream.compat());
        let session = login_to_server(client, username, password).await?;
        Ok(ImapMailbox { session })
    }
}

#[async_trait]
impl Mailbox for ImapMailbox {
    async fn select(&mut self, folder: &str) -> Result<(), MailboxError> {
        let mailbox_data = self.session.select(folder).await?;
        info!("-- {} selected ({} messages)", folder, mailbox_data.exists);
        Ok(())
    }

    async fn search(&mut self, criteria: &str) -> Result<Vec<MessageId>, MailboxError> {
        let uids = self.session.uid_search(criteria).await?;
        // The server answers with an unordered set
        let mut ids: Vec<MessageId> = uids.into_iter().map(MessageId).collect();
        ids.sort();
        debug!("search {} matched {} message(s)", criteria, ids.len());
        Ok(ids)
    }

    async fn fetch_raw(&mut self, id: MessageId) -> Result<Option<Vec<u8>>, MailboxError> {
        let fetches: Vec<Fetch> = self
            .session
            .uid_fetch(id.to_string(), "RFC822")
            .await?
            .try_collect()
            .await?;

        Ok(fetches.iter().find_map(|fetch| fetch.body().map(<[u8]>::to_vec)))
    }

    async fn flag_deleted(&mut self, id: MessageId) -> Result<(), MailboxError> {
        let _updates: Vec<Fetch> = self
            .session
            .uid_store(id.to_string(), "+FLAGS (\\Deleted)")
            .await?
            .try_collect()
            .await?;
        Ok(())
    }

    async fn expunge(&mut self) -> Result<(), MailboxError> {
        let expunged: Vec<u32> = self.session.expunge().await?.try_collect().await?;
        info!("-- expunged {} message(s)", expunged.len());
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), MailboxError> {
        self.session.logout().await?;
        info!("-- logged out");
        Ok(())
    }
}
