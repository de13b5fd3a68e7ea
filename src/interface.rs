use chrono::{Local, NaiveDateTime};
use humantime::format_duration;
use std::time::Duration as STDDuration;
use textwrap::indent;

use crate::error::CommandError;
use crate::model::{parse_date_time, Task};
use crate::storage::{self, LineStore};
use crate::tasks::{SlotSearch, TaskList};

pub const GREETING: &str = "Hello! I'm Quill\nWhat can I do for you?";
const FAREWELL: &str = "Bye. Hope to see you again soon!";

/// Source of the current time, used by the free time search.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The local wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at a given instant.
#[derive(Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// What the front end should do with the reply to a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Show the text and keep reading commands.
    Reply(String),
    /// Show the text and stop.
    Exit(String),
}

/// Behaviour switches of a session.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    /// Reject events that end before they start.
    pub strict: bool,
}

/// Owns the task list for the whole session and applies commands to
/// it, saving after every change.
pub struct Session<S, C> {
    tasks: TaskList,
    store: S,
    clock: C,
    options: Options,
}

type Handler<S, C> = fn(&mut Session<S, C>, &str) -> Result<Outcome, CommandError>;

struct Command<S, C> {
    keyword: &'static str,
    handler: Handler<S, C>,
    /// Whether the list must be saved after the command succeeds.
    mutates: bool,
}

impl<S: LineStore, C: Clock> Session<S, C> {
    /// Start a session with the tasks found in `store`. A store that
    /// cannot be read leaves the list empty; the error is returned next
    /// to the session so the front end can mention it.
    pub fn open(store: S, clock: C, options: Options) -> (Self, Option<anyhow::Error>) {
        let (tasks, load_error) = match store.load_lines() {
            Ok(lines) => (storage::decode(&lines), None),
            Err(error) => {
                log::error!("Failed to load tasks: {:#}", error);
                (Vec::new(), Some(error))
            }
        };
        log::info!("Session started with {} tasks.", tasks.len());
        let session = Session {
            tasks: TaskList::new(tasks),
            store,
            clock,
            options,
        };
        (session, load_error)
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Interpret one line of input. Command errors become the reply;
    /// nothing here ends the session except `bye`.
    pub fn handle(&mut self, input: &str) -> Outcome {
        let input = input.trim();
        let (keyword, rest) = match input.find(char::is_whitespace) {
            Some(split) => (&input[..split], input[split..].trim()),
            None => (input, ""),
        };
        log::debug!("Command {:?} with arguments {:?}", keyword, rest);

        let commands = Self::commands();
        let command = match commands.iter().find(|command| command.keyword == keyword) {
            Some(command) => command,
            None => return Outcome::Reply(CommandError::UnknownCommand.to_string()),
        };

        match (command.handler)(self, rest) {
            Ok(outcome) if command.mutates => self.save_after(outcome),
            Ok(outcome) => outcome,
            Err(error) => {
                log::debug!("Command {:?} failed: {:?}", keyword, error);
                Outcome::Reply(error.to_string())
            }
        }
    }

    fn commands() -> [Command<S, C>; 10] {
        [
            Command {
                keyword: "bye",
                handler: Self::bye,
                mutates: false,
            },
            Command {
                keyword: "list",
                handler: Self::list,
                mutates: false,
            },
            Command {
                keyword: "todo",
                handler: Self::todo,
                mutates: true,
            },
            Command {
                keyword: "deadline",
                handler: Self::deadline,
                mutates: true,
            },
            Command {
                keyword: "event",
                handler: Self::event,
                mutates: true,
            },
            Command {
                keyword: "mark",
                handler: Self::mark,
                mutates: true,
            },
            Command {
                keyword: "unmark",
                handler: Self::unmark,
                mutates: true,
            },
            Command {
                keyword: "delete",
                handler: Self::delete,
                mutates: true,
            },
            Command {
                keyword: "find",
                handler: Self::find,
                mutates: false,
            },
            Command {
                keyword: "free",
                handler: Self::free,
                mutates: false,
            },
        ]
    }

    /// Persist the whole list. A failed save is reported in the reply
    /// but the change stays in memory.
    fn save_after(&mut self, outcome: Outcome) -> Outcome {
        let lines = storage::encode(self.tasks.iter());
        match self.store.save_lines(&lines) {
            Ok(()) => {
                log::info!("Saved {} tasks.", lines.len());
                outcome
            }
            Err(error) => {
                log::error!("Failed to save tasks: {:#}", error);
                let warning = format!("Warning: your tasks could not be saved: {:#}", error);
                match outcome {
                    Outcome::Reply(text) => Outcome::Reply(format!("{}\n{}", text, warning)),
                    Outcome::Exit(text) => Outcome::Exit(format!("{}\n{}", text, warning)),
                }
            }
        }
    }

    fn bye(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        no_arguments(rest)?;
        Ok(Outcome::Exit(FAREWELL.to_string()))
    }

    fn list(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        no_arguments(rest)?;
        if self.tasks.is_empty() {
            return Ok(Outcome::Reply("Your task list is empty!".to_string()));
        }
        Ok(Outcome::Reply(format!(
            "Here are the tasks in your list:\n{}",
            numbered(self.tasks.iter())
        )))
    }

    fn todo(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        let description = required(rest, "todo <desc>")?;
        Ok(self.added(Task::todo(description)))
    }

    fn deadline(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        const USAGE: &str = "deadline <desc> /by <yyyy-MM-dd HHmm>";
        let (description, by) = rest
            .split_once(" /by ")
            .ok_or(CommandError::EmptyDescription { usage: USAGE })?;
        let description = required(description, USAGE)?;
        let by = date_argument(required(by, USAGE)?)?;
        Ok(self.added(Task::deadline(description, by)))
    }

    fn event(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        const USAGE: &str = "event <desc> /from <yyyy-MM-dd HHmm> /to <yyyy-MM-dd HHmm>";
        let missing = || CommandError::EmptyDescription { usage: USAGE };
        let (description, period) = rest.split_once(" /from ").ok_or_else(missing)?;
        let (from, to) = period.split_once(" /to ").ok_or_else(missing)?;

        let description = required(description, USAGE)?;
        let from = date_argument(required(from, USAGE)?)?;
        let to = date_argument(required(to, USAGE)?)?;
        if self.options.strict && from > to {
            return Err(CommandError::InvalidArgument(
                "An event cannot end before it starts.".to_string(),
            ));
        }
        Ok(self.added(Task::event(description, from, to)))
    }

    fn mark(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        let index = self.index_argument(rest)?;
        let task = self.tasks.mark_done(index)?;
        Ok(Outcome::Reply(format!(
            "Nice! I've marked this task as done:\n{}",
            indented(task)
        )))
    }

    fn unmark(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        let index = self.index_argument(rest)?;
        let task = self.tasks.mark_not_done(index)?;
        Ok(Outcome::Reply(format!(
            "OK, I've marked this task as not done yet:\n{}",
            indented(task)
        )))
    }

    fn delete(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        let index = self.index_argument(rest)?;
        let task = self.tasks.remove(index)?;
        Ok(Outcome::Reply(format!(
            "Noted. I've removed this task:\n{}\nNow you have {} tasks in the list.",
            indented(&task),
            self.tasks.len()
        )))
    }

    fn find(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        let keyword = required(rest, "find <keyword>")?;
        let matches = self.tasks.find(keyword);
        if matches.is_empty() {
            return Ok(Outcome::Reply("No matching tasks found.".to_string()));
        }
        Ok(Outcome::Reply(format!(
            "Here are the matching tasks in your list:\n{}",
            numbered(matches)
        )))
    }

    fn free(&mut self, rest: &str) -> Result<Outcome, CommandError> {
        let hours = hours_argument(rest)?;
        let reply = match self.tasks.find_free_slot(hours, self.clock.now()) {
            SlotSearch::Found(slot) => format!(
                "The nearest {} free slot is on {} from {} to {}",
                hours_text(hours),
                slot.date().format("%Y-%m-%d"),
                slot.start.format("%-I:%M %p"),
                slot.end.format("%-I:%M %p")
            ),
            SlotSearch::NoneFound { hours } => format!(
                "No free slots available in the next 7 days for {}.",
                hours_text(hours)
            ),
        };
        Ok(Outcome::Reply(reply))
    }

    /// Read a 1-based task number and return the matching 0-based index.
    fn index_argument(&self, text: &str) -> Result<usize, CommandError> {
        let position: usize = text.trim().parse().map_err(|_| {
            CommandError::InvalidArgument("Please specify a valid task number.".to_string())
        })?;
        position
            .checked_sub(1)
            .ok_or(CommandError::IndexOutOfRange {
                position,
                size: self.tasks.len(),
            })
    }

    fn added(&mut self, task: Task) -> Outcome {
        let line = indented(&task);
        let size = self.tasks.add(task);
        Outcome::Reply(format!(
            "Got it. I've added this task:\n{}\nNow you have {} tasks in the list.",
            line, size
        ))
    }
}

/// `bye` and `list` only exist as bare words.
fn no_arguments(rest: &str) -> Result<(), CommandError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CommandError::UnknownCommand)
    }
}

/// The trimmed text, or EmptyDescription if there is none.
fn required<'a>(text: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommandError::EmptyDescription { usage });
    }
    Ok(text)
}

fn date_argument(text: &str) -> Result<NaiveDateTime, CommandError> {
    parse_date_time(text).map_err(|source| CommandError::DateParseFailure {
        input: text.to_string(),
        source,
    })
}

/// Read a duration written as `<hours>h`, e.g. `2h`.
fn hours_argument(text: &str) -> Result<u32, CommandError> {
    let invalid = || {
        CommandError::InvalidArgument(
            "Please specify the duration in whole hours, e.g. free 2h".to_string(),
        )
    };
    let hours: u32 = text
        .trim()
        .strip_suffix('h')
        .ok_or_else(invalid)?
        .parse()
        .map_err(|_| invalid())?;
    if hours == 0 {
        return Err(invalid());
    }
    Ok(hours)
}

fn hours_text(hours: u32) -> String {
    format_duration(STDDuration::from_secs(u64::from(hours) * 3600)).to_string()
}

fn indented(task: &Task) -> String {
    indent(&task.to_string(), "  ").trim_end_matches('\n').to_string()
}

fn numbered<'a, I>(tasks: I) -> String
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {}", i + 1, task))
        .collect::<Vec<_>>()
        .join("\n")
}
