//! Interactive session
//!
//! Handles `clara shell`. One command per input line; confirmations and PIN
//! prompts read the next line from the same input, so a whole session can be
//! scripted through a pipe.

use anyhow::{Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use clara_backend::Document;
use clara_utils::error::{ClaraError, WorkflowError};
use clara_vault::VaultState;

use super::common::{FLUSH_QUESTION, REMOVE_KEY_QUESTION, confirm_from, strip_line_ending};
use crate::{Config, Session};

const PROMPT: &str = "clara> ";

const HELP: &str = "\
Commands:
  select <path>    choose the document to ingest
  ingest           upload and process the selected document
  flush            delete the knowledge base (asks for confirmation)
  save <api key>   store an API key behind a PIN (asks for the PIN)
  unlock           unlock the stored key (asks for the PIN)
  lock             forget the unlocked key
  clear            delete the stored key (asks for confirmation)
  send <message>   ask a question once the knowledge base is ready
  new              start a new chat
  status           show vault and knowledge-base status
  log              show the event log
  transcript       show the chat transcript
  help             show this help
  quit             leave the session";

/// Reads a PIN without echo. Receives the prompt label.
pub type PinReader<'s> = Box<dyn FnMut(&str) -> io::Result<String> + 's>;

enum Flow {
    Continue,
    Quit,
}

/// Line-driven session over any reader/writer pair.
pub struct Shell<'s, R, W> {
    session: &'s mut Session,
    input: R,
    output: W,
    printed_events: usize,
    pin_reader: Option<PinReader<'s>>,
}

impl<'s, R: BufRead, W: Write> Shell<'s, R, W> {
    pub fn new(session: &'s mut Session, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            printed_events: 0,
            pin_reader: None,
        }
    }

    /// Read PINs through `reader` instead of the command input.
    #[must_use]
    pub fn with_pin_reader(mut self, reader: PinReader<'s>) -> Self {
        self.pin_reader = Some(reader);
        self
    }

    /// Read and execute commands until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        let size = self.session.workflow().refresh_knowledge_base_size().await;
        writeln!(self.output, "clara shell. Type 'help' for commands.")?;
        writeln!(self.output, "Knowledge base: {size} units")?;
        if self.session.vault().has_stored_secret() {
            writeln!(
                self.output,
                "A stored API key was found. Use 'unlock' to open it."
            )?;
        }
        self.printed_events = self.session.workflow().event_log().len();

        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Flow::Quit = self.dispatch(line).await? {
                break;
            }
            self.print_new_events()?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "select" => self.select(rest)?,
            "ingest" => {
                let result = self.session.workflow().start_ingestion().await;
                if let Err(e) = result {
                    self.print_new_events()?;
                    self.print_error(e)?;
                }
            }
            "flush" => self.flush().await?,
            "save" => self.save(rest)?,
            "unlock" => self.unlock(rest)?,
            "lock" => {
                self.session.vault_mut().lock();
                writeln!(self.output, "Vault {}.", self.session.vault().state())?;
            }
            "clear" => self.clear()?,
            "send" => self.send(rest).await?,
            "new" => self.session.workflow().new_chat(),
            "status" => self.status()?,
            "log" => {
                for entry in self.session.workflow().event_log() {
                    writeln!(self.output, "{entry}")?;
                }
                self.printed_events = self.session.workflow().event_log().len();
            }
            "transcript" => {
                let transcript = self.session.workflow().transcript();
                if transcript.is_empty() {
                    writeln!(self.output, "(no messages)")?;
                }
                for entry in transcript {
                    writeln!(self.output, "{entry}")?;
                }
            }
            "help" | "?" => writeln!(self.output, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            other => writeln!(self.output, "Unknown command: {other}. Type 'help' for the list.")?,
        }
        Ok(Flow::Continue)
    }

    fn select(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            writeln!(self.output, "Usage: select <path>")?;
            return Ok(());
        }
        match Document::from_path(Path::new(path)) {
            Ok(document) => self.session.workflow().select_document(document),
            Err(e) => self.print_error(e)?,
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if !confirm_from(&mut self.input, &mut self.output, FLUSH_QUESTION)? {
            writeln!(self.output, "Aborted.")?;
            return Ok(());
        }
        let result = self.session.workflow().flush().await;
        if let Err(e) = result {
            self.print_new_events()?;
            self.print_error(e)?;
        }
        Ok(())
    }

    fn save(&mut self, secret: &str) -> Result<()> {
        let Some(pin) = self.read_pin()? else {
            return Ok(());
        };
        match self.session.vault_mut().save(secret, &pin) {
            Ok(()) => writeln!(self.output, "Key saved securely!")?,
            Err(e) => self.print_error(e)?,
        }
        Ok(())
    }

    fn unlock(&mut self, pin: &str) -> Result<()> {
        let pin = if pin.is_empty() {
            match self.read_pin()? {
                Some(pin) => pin,
                None => return Ok(()),
            }
        } else {
            pin.to_string()
        };

        match self.session.vault_mut().unlock(&pin) {
            Ok(_) => writeln!(self.output, "Vault unlocked.")?,
            Err(e) => self.print_error(e)?,
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if !confirm_from(&mut self.input, &mut self.output, REMOVE_KEY_QUESTION)? {
            writeln!(self.output, "Aborted.")?;
            return Ok(());
        }
        match self.session.vault_mut().clear() {
            Ok(()) => writeln!(self.output, "Stored key removed.")?,
            Err(e) => self.print_error(e)?,
        }
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        let result = self.session.send_message(text).await;
        match result {
            Ok(turn) => writeln!(self.output, "assistant: {}", turn.reply_text())?,
            Err(WorkflowError::EmptyMessage) => writeln!(self.output, "Usage: send <message>")?,
            Err(e) => self.print_error(e)?,
        }
        Ok(())
    }

    fn status(&mut self) -> Result<()> {
        let vault = self.session.vault();
        let vault_line = match vault.state() {
            VaultState::Unset => "Vault: unset (no API key stored)".to_string(),
            state => format!("Vault: {state}"),
        };
        let workflow = self.session.workflow();
        let document = workflow
            .selected_document()
            .map_or_else(|| "none".to_string(), |d| format!("{} ({} bytes)", d.name, d.len()));

        writeln!(self.output, "{vault_line}")?;
        writeln!(
            self.output,
            "Knowledge base: {} ({} units)",
            workflow.status(),
            workflow.knowledge_base_size()
        )?;
        writeln!(self.output, "Document: {document}")?;
        writeln!(
            self.output,
            "Chat: {}",
            if workflow.status().chat_available() {
                "available"
            } else {
                "unavailable"
            }
        )?;
        Ok(())
    }

    fn read_pin(&mut self) -> Result<Option<String>> {
        if let Some(reader) = self.pin_reader.as_mut() {
            let pin = reader("PIN: ").context("Failed to read PIN from terminal")?;
            return Ok(Some(pin));
        }
        self.prompt("PIN: ")
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let answer = self.read_line()?;
        if answer.is_none() {
            writeln!(self.output)?;
        }
        Ok(answer)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(&line).to_string()))
    }

    fn print_new_events(&mut self) -> io::Result<()> {
        let events = self.session.workflow().event_log();
        for entry in events.iter().skip(self.printed_events) {
            writeln!(self.output, "{entry}")?;
        }
        self.printed_events = events.len();
        Ok(())
    }

    fn print_error(&mut self, error: impl Into<ClaraError>) -> io::Result<()> {
        write!(self.output, "{}", error.into().display_for_user())
    }
}

/// Execute the shell command on stdin/stdout
pub async fn execute_shell_command(config: &Config) -> Result<()> {
    let mut session = Session::from_config(config)?;
    let stdin = io::stdin();
    let hide_pin = stdin.is_terminal();
    let mut shell = Shell::new(&mut session, stdin.lock(), io::stdout());
    if hide_pin {
        let hidden: PinReader<'_> = Box::new(|label: &str| rpassword::prompt_password(label));
        shell = shell.with_pin_reader(hidden);
    }
    shell.run().await
}
