use regex::Regex;
use std::io::{self, BufRead, Write};
use std::sync::LazyLock;

use crate::sent_mail::display::Terminal;
use log::debug;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("email pattern compiles")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Keeps asking until the answer looks like an email address. `None` when
/// the input is closed before a valid address was typed.
pub fn get_valid_email<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    prompt: &str,
) -> io::Result<Option<String>> {
    loop {
        let Some(email) = term.prompt(prompt)? else {
            return Ok(None);
        };
        if validate_email(&email) {
            return Ok(Some(email));
        }
        debug!("rejected address {:?}", email);
        term.say("Invalid email format! Please use a valid email address")?;
    }
}

// Password or app password, read without echo
pub fn read_secret(prompt: &str) -> io::Result<String> {
    rpassword::prompt_password(prompt)
}
