//! Console command parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sections,
    Section(Option<i64>),
    Periods,
    Period(Option<i64>),
    /// List students, optionally changing the class filter first
    Students(Option<String>),
    /// List availabilities, optionally changing the domain filter first
    Corps(Option<String>),
    Student(Option<i64>),
    Corp(Option<i64>),
    Contacts,
    Contact(Option<i64>),
    Referents,
    Referent(Option<i64>),
    Pair,
    Trainings,
    Delete(i64),
    Export { path: PathBuf, non_attributed: bool },
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  sections                 list sections
  section <id|->           select a section (- clears)
  periods                  list periods of the section
  period <id|->            select a period
  students [class|-]       list students, optionally filtered by class
  corps [domain|-]         list availabilities, optionally filtered by domain
  student <id|->           select a student
  corp <id|->              select an availability
  contacts                 list contacts of the availability's corporation
  contact <id|->           select a contact
  referents                list referents
  referent <id|->          select a referent
  pair                     create a training from the current selection
  trainings                show the trainings of the period
  delete <training id>     delete a training
  export <file> [non-attr] save the export of the period
  status                   show the current selection
  help                     show this help
  quit                     leave";

impl Command {
    /// Parse a prompt line. Blank lines give `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "sections" => no_arg(name, rest, Command::Sections)?,
            "section" => Command::Section(selection_arg(name, rest)?),
            "periods" => no_arg(name, rest, Command::Periods)?,
            "period" => Command::Period(selection_arg(name, rest)?),
            "students" => Command::Students(filter_arg(rest)),
            "corps" => Command::Corps(filter_arg(rest)),
            "student" => Command::Student(selection_arg(name, rest)?),
            "corp" => Command::Corp(selection_arg(name, rest)?),
            "contacts" => no_arg(name, rest, Command::Contacts)?,
            "contact" => Command::Contact(selection_arg(name, rest)?),
            "referents" => no_arg(name, rest, Command::Referents)?,
            "referent" => Command::Referent(selection_arg(name, rest)?),
            "pair" => no_arg(name, rest, Command::Pair)?,
            "trainings" => no_arg(name, rest, Command::Trainings)?,
            "delete" => {
                let id = selection_arg(name, rest)?
                    .ok_or_else(|| anyhow!("delete needs a training id"))?;
                Command::Delete(id)
            }
            "export" => export_args(rest)?,
            "status" => no_arg(name, rest, Command::Status)?,
            "help" | "?" => no_arg(name, rest, Command::Help)?,
            "quit" | "exit" | "q" => no_arg(name, rest, Command::Quit)?,
            other => bail!("unknown command '{}', type 'help'", other),
        };
        Ok(Some(command))
    }
}

fn no_arg(name: &str, rest: &str, command: Command) -> Result<Command> {
    if !rest.is_empty() {
        bail!("'{}' takes no argument", name);
    }
    Ok(command)
}

/// `<id>` selects, `-` clears
fn selection_arg(name: &str, rest: &str) -> Result<Option<i64>> {
    match rest {
        "" => bail!("{} needs an id or '-'", name),
        "-" => Ok(None),
        id if id.contains(char::is_whitespace) => bail!("too many arguments for '{}'", name),
        id => id
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("'{}' is not a valid id", id)),
    }
}

/// The rest of the line is the value, spaces included.
/// Missing keeps the filter, `-` resets it.
fn filter_arg(rest: &str) -> Option<String> {
    match rest {
        "" => None,
        "-" => Some(String::new()),
        value => Some(value.to_string()),
    }
}

fn export_args(rest: &str) -> Result<Command> {
    let mut words = rest.split_whitespace();
    let path = words
        .next()
        .ok_or_else(|| anyhow!("export needs a file name"))?;
    let non_attributed = match words.next() {
        None => false,
        Some("non-attr") => true,
        Some(other) => bail!("unknown export option '{}'", other),
    };
    if words.next().is_some() {
        bail!("too many arguments for 'export'");
    }
    Ok(Command::Export {
        path: PathBuf::from(path),
        non_attributed,
    })
}
