use std::io::{self, BufRead, Write};

use simshell_core::bootstrap::Prompt;

/// Line-based prompt on stdin/stdout, used before the alternate screen opens.
#[derive(Default)]
pub struct ConsolePrompt {
    notices: Vec<String>,
}

impl ConsolePrompt {
    /// Notices printed so far.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Whether bootstrap raised a warning worth repeating inside the UI.
    pub fn has_warning(&self) -> bool {
        self.notices.iter().any(|notice| notice.starts_with("WARNING"))
    }
}

impl Prompt for ConsolePrompt {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn notify(&mut self, message: &str) {
        if message.starts_with("WARNING") {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
        self.notices.push(message.to_string());
    }
}
