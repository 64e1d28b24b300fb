use std::fmt::Display;
use std::io::{self, BufRead, Write};

const RULER_WIDTH: usize = 70;
const SECTION_PAD: usize = 40;

pub fn banner() -> String {
    let ruler = "=".repeat(RULER_WIDTH);
    format!(
        "\n  Email Manager Pro\n{}\n  Search and clean up your Sent folder\n{}\n",
        ruler, ruler
    )
}

pub fn section(title: &str) -> String {
    let pad = "═".repeat(SECTION_PAD);
    format!("\n{} {} {}", pad, title, pad)
}

/// Line-oriented terminal: prompts go to `output`, answers come from `input`.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Terminal { input, output }
    }

    // Returns None once the input is closed
    pub fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\r', '\n']).to_string();
        Ok(Some(answer))
    }

    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
