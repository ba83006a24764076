pub mod commands;

use std::fmt::{self, Write as _};

use anyhow::Result;
use clap::error::ErrorKind;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::{
    display::RecentTable,
    form::{FormController, FormField, FormState},
    gateway::TableWrite,
};
use commands::Command;

const TITLE: &str = "Smart Greenhouse Monitor";

/// Outcome of the last operator action, shown on one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ready,
    /// `row` is the table id when the reading also went to the database.
    Saved { timestamp: String, row: Option<i64> },
    ValidationFailed(String),
    PersistenceFailed(String),
    Edited(String),
    Rejected(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("Ready"),
            Status::Saved { timestamp, row: None } => {
                write!(f, "Last successful submission: {timestamp}")
            }
            Status::Saved { timestamp, row: Some(id) } => {
                write!(f, "Last successful submission: {timestamp} (row {id})")
            }
            Status::ValidationFailed(reason) => write!(f, "Validation failed: {reason}"),
            Status::PersistenceFailed(reason) => write!(f, "Persistence failed: {reason}"),
            Status::Edited(what) => f.write_str(what),
            Status::Rejected(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// Line-oriented entry form: holds the form contents, the recent table and
/// the status line, and turns commands into controller calls.
pub struct Console {
    controller: FormController,
    form: FormState,
    table: RecentTable,
    status: Status,
}

impl Console {
    /// Builds the console and fills the recent table once.
    pub async fn start(controller: FormController, recent_limit: u32) -> Self {
        let mut console = Self {
            controller,
            form: FormState::default(),
            table: RecentTable::new(recent_limit),
            status: Status::Ready,
        };
        if let Err(e) = console.table.refresh(console.controller.gateway()).await {
            console.status = Status::PersistenceFailed(e.to_string());
        }
        console
    }

    #[cfg(test)]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    #[cfg(test)]
    pub fn table(&self) -> &RecentTable {
        &self.table
    }

    #[cfg(test)]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Everything printed before the first prompt.
    pub fn greeting(&self) -> String {
        let mut out = format!("{TITLE}\n\n");
        out.push_str(&self.table.render());
        out.push('\n');
        out.push_str(&self.render_form());
        out.push_str("type help for commands\n");
        let _ = writeln!(out, "[{}]", self.status);
        out
    }

    /// Parses and runs one input line. `help` prints the generated command
    /// list; a line that does not parse is reported on the status line.
    pub async fn handle_line(&mut self, line: &str) -> Option<String> {
        let err = match commands::parse_line(line) {
            Ok(cmd) => return self.handle(cmd).await,
            Err(e) => e,
        };
        let mut out = err.render().to_string();
        if !out.ends_with('\n') {
            out.push('\n');
        }
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = writeln!(out, "[{}]", self.status);
            }
            _ => {
                let reason = out
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_owned();
                out.push_str(&self.reject(reason));
            }
        }
        Some(out)
    }

    /// Runs one command. Returns the text to print, or `None` to quit.
    pub async fn handle(&mut self, cmd: Command) -> Option<String> {
        let mut out = String::new();
        match cmd {
            Command::Set { field, text } => {
                self.form.set(field, text.join(" "));
                self.status = Status::Edited(format!("{field} updated"));
            }
            Command::SelectType { sensor_type } => {
                self.form.sensor_type = sensor_type;
                self.status = Status::Edited(format!(
                    "sensor_type set to {sensor_type}, unit {}",
                    self.form.unit()
                ));
            }
            Command::Db { switch } => {
                self.form.save_to_database = switch.is_on();
                self.status = Status::Edited(format!(
                    "save to database {}",
                    if switch.is_on() { "on" } else { "off" }
                ));
            }
            Command::Submit => self.submit(&mut out).await,
            Command::Clear => {
                FormController::clear(&mut self.form);
                self.status = Status::Edited("form cleared".to_owned());
                out.push_str(&self.render_form());
            }
            Command::Show => out.push_str(&self.render_form()),
            Command::Table => out.push_str(&self.table.render()),
            Command::Quit => return None,
        }
        let _ = writeln!(out, "[{}]", self.status);
        Some(out)
    }

    /// Records a rejected line on the status line.
    pub fn reject(&mut self, reason: impl fmt::Display) -> String {
        self.status = Status::Rejected(reason.to_string());
        format!("[{}]\n", self.status)
    }

    async fn submit(&mut self, out: &mut String) {
        let submission = match self.controller.submit(&self.form).await {
            Ok(s) => s,
            Err(e) => {
                self.status = Status::ValidationFailed(e.to_string());
                return;
            }
        };

        if let Some(advisory) = &submission.advisory {
            let _ = writeln!(out, "WARNING: {}", advisory.message());
        }

        let mut failures: Vec<String> = submission
            .outcome
            .failures()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        if let Err(e) = self.table.refresh(self.controller.gateway()).await {
            failures.push(e.to_string());
        }
        out.push_str(&self.table.render());

        self.status = if failures.is_empty() {
            let row = match submission.outcome.table {
                TableWrite::Inserted(id) => Some(id),
                _ => None,
            };
            Status::Saved {
                timestamp: submission.reading.timestamp().to_owned(),
                row,
            }
        } else {
            Status::PersistenceFailed(failures.join("; "))
        };
    }

    fn render_form(&self) -> String {
        let mut out = String::new();
        for field in FormField::TEXT.into_iter().chain(FormField::NUMERIC) {
            let _ = writeln!(out, "  {:<16} {}", field.as_str(), self.form.get(field));
            if field == FormField::SensorId {
                let _ = writeln!(out, "  {:<16} {}", "sensor_type", self.form.sensor_type);
                let _ = writeln!(out, "  {:<16} {}", "unit", self.form.unit());
            }
        }
        let _ = writeln!(
            out,
            "  {:<16} {}",
            "save to database",
            if self.form.save_to_database { "on" } else { "off" }
        );
        out
    }

    /// Reads commands from stdin until `quit` or end of input.
    pub async fn run(mut self) -> Result<()> {
        let mut stdout = io::stdout();
        let mut lines = BufReader::new(io::stdin()).lines();

        stdout.write_all(self.greeting().as_bytes()).await?;
        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_line(&line).await {
                Some(text) => stdout.write_all(text.as_bytes()).await?,
                None => break,
            }
        }

        stdout.flush().await?;
        info!("Console closed");
        Ok(())
    }
}
