use chrono::Local;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::sent_mail::delete::delete_messages;
use crate::sent_mail::display::{section, Terminal};
use crate::sent_mail::export::export;
use crate::sent_mail::mailbox::{Mailbox, MessageId};
use crate::sent_mail::search::{collect_records, search_sent, SearchResult};
use crate::sent_mail::Session;
use crate::settings::Settings;
use log::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    Search,
    Exit,
}

impl MainChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MainChoice::Search),
            "2" => Some(MainChoice::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionChoice {
    Export,
    Delete,
    Return,
}

impl ActionChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(ActionChoice::Export),
            "2" => Some(ActionChoice::Delete),
            "3" => Some(ActionChoice::Return),
            _ => None,
        }
    }
}

// Whether the main menu keeps going after a search flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

const MAIN_MENU_PROMPT: &str = "\nEnter your choice (1-2): ";
const SUBJECT_PROMPT: &str = "Enter the starting words of the subject: ";
const ACTION_PROMPT: &str = "Choose action:\n\
    1. Save emails to file\n\
    2. Delete these emails\n\
    3. Return to menu\n\
    Enter choice (1-3): ";
const INVALID_CHOICE: &str = "Invalid choice. Please try again.";

/// The interactive loop: main menu, search flow and the action menu that
/// follows a successful search.
pub struct App<M: Mailbox, R, W> {
    session: Session<M>,
    term: Terminal<R, W>,
    sent_folder: String,
    delete_pacing: Duration,
    output_dir: PathBuf,
}

impl<M: Mailbox, R: BufRead, W: Write> App<M, R, W> {
    pub fn new(session: Session<M>, term: Terminal<R, W>, settings: &Settings, output_dir: PathBuf) -> Self {
        App {
            session,
            term,
            sent_folder: settings.sent_folder.clone(),
            delete_pacing: settings.delete_pacing(),
            output_dir,
        }
    }

    /// Runs until the user exits or the input closes, then logs out.
    pub async fn run(&mut self) -> io::Result<()> {
        let result = self.main_menu().await;
        self.session.close().await;
        result
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (Session<M>, Terminal<R, W>) {
        (self.session, self.term)
    }

    async fn main_menu(&mut self) -> io::Result<()> {
        loop {
            self.term.say(section("MAIN MENU"))?;
            self.term.say("1. Search Sent emails by subject")?;
            self.term.say("2. Exit program")?;

            let Some(choice) = self.term.prompt(MAIN_MENU_PROMPT)? else {
                debug!("input closed at the main menu");
                break;
            };
            match MainChoice::parse(&choice) {
                Some(MainChoice::Search) => {
                    if self.search_flow().await? == Flow::Exit {
                        break;
                    }
                }
                Some(MainChoice::Exit) => break,
                None => self.term.say(INVALID_CHOICE)?,
            }
        }

        self.term.say(section("THANK YOU"))?;
        self.term.say("Thank you for using Email Manager Pro!")
    }

    async fn search_flow(&mut self) -> io::Result<Flow> {
        self.term.say(section("SEARCHING EMAILS"))?;
        let Some(subject) = self.term.prompt(SUBJECT_PROMPT)? else {
            return Ok(Flow::Exit);
        };
        let subject = subject.trim();

        let ids = match search_sent(self.session.mailbox(), &self.sent_folder, subject).await {
            Ok(ids) => ids,
            Err(e) => {
                error!("search in {} failed: {}", self.sent_folder, e);
                self.term.say(format!("Search error: {}", e))?;
                return Ok(Flow::Continue);
            }
        };
        if ids.is_empty() {
            self.term.say("No emails found with that subject.")?;
            return Ok(Flow::Continue);
        }
        self.term.say(format!("Found {} email(s) matching your search!", ids.len()))?;

        let owner = self.session.owner().to_string();
        let term = &mut self.term;
        let mut write_error = None;
        let result = collect_records(self.session.mailbox(), ids, &owner, |progress, outcome| {
            let written = match outcome {
                Ok(record) => record.recipients.iter().try_for_each(|recipient| {
                    term.say(format!(
                        "Processing {}/{}: Found email to {}",
                        progress.position, progress.total, recipient
                    ))
                }),
                Err(e) => term.say(format!("Error processing email {}: {}", progress.position, e)),
            };
            if let Err(e) = written {
                write_error.get_or_insert(e);
            }
        })
        .await;
        if let Some(e) = write_error {
            return Err(e);
        }

        if result.recipient_count() == 0 {
            self.term.say("No valid recipients found in matching emails.")?;
            return Ok(Flow::Continue);
        }
        self.action_menu(&result).await
    }

    async fn action_menu(&mut self, result: &SearchResult) -> io::Result<Flow> {
        self.term.say(section("ACTION MENU"))?;
        loop {
            let Some(choice) = self.term.prompt(ACTION_PROMPT)? else {
                return Ok(Flow::Exit);
            };
            match ActionChoice::parse(&choice) {
                Some(ActionChoice::Export) => {
                    self.save_to_file(result)?;
                    return Ok(Flow::Continue);
                }
                Some(ActionChoice::Delete) => {
                    self.delete_matches(&result.ids).await?;
                    return Ok(Flow::Continue);
                }
                Some(ActionChoice::Return) => return Ok(Flow::Continue),
                None => self.term.say(INVALID_CHOICE)?,
            }
        }
    }

    fn save_to_file(&mut self, result: &SearchResult) -> io::Result<()> {
        match export(result.entries(), &self.output_dir, Local::now()) {
            Ok(path) => self.term.say(format!("Email list saved to: {}", path.display())),
            Err(e) => {
                error!("export failed: {:#}", e);
                self.term.say(format!("Error saving file: {:#}", e))
            }
        }
    }

    async fn delete_matches(&mut self, ids: &[MessageId]) -> io::Result<()> {
        self.term.say(section("DELETING EMAILS"))?;

        let term = &mut self.term;
        let mut write_error = None;
        let report = delete_messages(self.session.mailbox(), ids, self.delete_pacing, |progress, failure| {
            let line = match failure {
                None => format!(
                    "Deleting email {}/{} ({}% complete)...",
                    progress.position,
                    progress.total,
                    progress.percent()
                ),
                Some(e) => format!("Failed to delete email {}: {}", progress.position, e),
            };
            if let Err(e) = term.say(line) {
                write_error.get_or_insert(e);
            }
        })
        .await;
        if let Some(e) = write_error {
            return Err(e);
        }

        if let Err(e) = &report.expunge {
            self.term.say(format!("Expunge failed: {}", e))?;
        }
        match report.deleted() {
            Some(deleted) => self.term.say(format!(
                "\nSuccessfully deleted {}/{} emails!",
                deleted, report.total
            )),
            None => self.term.say(format!(
                "\nFlagged {}/{} emails but expunge failed",
                report.flagged, report.total
            )),
        }
    }
}
