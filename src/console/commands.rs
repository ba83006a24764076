use clap::{Parser, Subcommand, ValueEnum};

use crate::{db::models::SensorType, form::FormField};

/// One console line. The first word names the command.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

/// One operator action read from a console line.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Edit a form field; no text blanks it
    Set {
        field: FormField,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Select the sensor type, which sets the unit
    #[command(name = "type")]
    SelectType { sensor_type: SensorType },
    /// Also save submissions to the database
    Db { switch: Switch },
    /// Validate and record the reading
    Submit,
    /// Empty the form
    Clear,
    /// Print the form
    Show,
    /// Print the most recent readings
    Table,
    /// Leave
    #[command(visible_alias = "exit")]
    Quit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

/// Splits `line` on whitespace and parses it as a command.
///
/// `help` and `help <command>` come back as an error of kind
/// `ErrorKind::DisplayHelp` carrying the rendered help text.
pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
    Line::try_parse_from(line.split_whitespace()).map(|l| l.command)
}
