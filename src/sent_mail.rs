use anyhow::{bail, Context, Result};
use std::io;

pub mod credentials;
pub mod delete;
pub mod display;
pub mod export;
pub mod imap;
pub mod mailbox;
#[cfg(test)]
pub mod memory;
pub mod menu;
pub mod message;
pub mod search;

use crate::settings::Settings;
use display::{section, Terminal};
use imap::ImapMailbox;
use log::{debug, error, info};
use mailbox::Mailbox;
use menu::App;

// Position of one item in a per-message pass over a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> usize {
        self.position * 100 / self.total.max(1)
    }
}

/// An authenticated mailbox together with the address that owns it. Connecting
/// and logging in both happen before a session exists; the only transition
/// left is closing it.
pub struct Session<M: Mailbox> {
    owner: String,
    mailbox: M,
    closed: bool,
}

impl<M: Mailbox> Session<M> {
    pub fn new(owner: String, mailbox: M) -> Self {
        Session {
            owner,
            mailbox,
            closed: false,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn mailbox(&mut self) -> &mut M {
        &mut self.mailbox
    }

    // Best effort: a failed logout changes nothing for the user
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.mailbox.logout().await {
            debug!("logout failed: {}", e);
        }
        self.closed = true;
    }
}

pub async fn main(settings: Settings) -> Result<()> {
    let mut term = Terminal::new(io::stdin().lock(), io::stdout());
    term.say(display::banner())?;

    let Some(email) = credentials::get_valid_email(&mut term, "Enter your email address: ")? else {
        bail!("input closed before an email address was entered");
    };
    let password = credentials::read_secret("Enter your password/app password: ")?;

    term.say(section("INITIALIZING CONNECTION"))?;
    let mailbox = match ImapMailbox::connect(&settings.imap_server, settings.port, &email, &password).await {
        Ok(mailbox) => {
            term.say("Login successful!")?;
            mailbox
        }
        Err(e) => {
            error!("connection to {}:{} failed: {}", settings.imap_server, settings.port, e);
            term.say(format!("Connection failed: {}", e))?;
            return Err(e).context("cannot open the mailbox session");
        }
    };
    info!("session open for {}", email);

    let output_dir = export::desktop_dir()?;
    let mut app = App::new(Session::new(email, mailbox), term, &settings, output_dir);
    app.run().await?;
    Ok(())
}
