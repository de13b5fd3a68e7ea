use thiserror::Error;

/// Every command keyword with its expected arguments, shown when the
/// input does not start with a known keyword.
pub const HELP_TEXT: &str = "Looks like you got creative with the input.
Let's try one of the following commands:
list
todo <desc>
deadline <desc> /by <date yyyy-MM-dd HHmm>
event <desc> /from <start yyyy-MM-dd HHmm> /to <end yyyy-MM-dd HHmm>
mark <num>
unmark <num>
delete <num>
find <keyword>
free <hours>h
bye (to exit the program)";

/// Failures of a single command. They are turned into the reply text
/// and never end the session.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Oops! Something is missing :(\nTry {usage}")]
    EmptyDescription { usage: &'static str },

    #[error("{}", HELP_TEXT)]
    UnknownCommand,

    /// `position` is the 1-based number the user typed.
    #[error("There is no task number {position}. You have {size} tasks in the list.")]
    IndexOutOfRange { position: usize, size: usize },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("'{input}' is not a valid date, expected yyyy-MM-dd HHmm (e.g. 2024-01-31 1800).")]
    DateParseFailure {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}
