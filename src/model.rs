use chrono::NaiveDateTime;
use std::fmt;

/// Pattern used to read dates from user input and to store them.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H%M";

/// Pattern used when showing a date to the user. Never parsed back.
pub const DISPLAY_FORMAT: &str = "%b %d %Y, %-I:%M %p";

const FIELD_SEPARATOR: &str = " | ";

/// What a task is, together with the dates that only some kinds carry.
#[derive(Debug, PartialEq, Eq)]
pub enum TaskKind {
    Todo,
    Deadline {
        by: NaiveDateTime,
    },
    Event {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
}

/// A single entry of the task list.
#[derive(Debug, PartialEq, Eq)]
pub struct Task {
    pub description: String,
    pub is_done: bool,
    pub kind: TaskKind,
}

/// Parse a date in the fixed `yyyy-MM-dd HHmm` pattern.
pub fn parse_date_time(text: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
}

impl Task {
    pub fn todo(description: &str) -> Task {
        Task::with_kind(description, TaskKind::Todo)
    }

    pub fn deadline(description: &str, by: NaiveDateTime) -> Task {
        Task::with_kind(description, TaskKind::Deadline { by })
    }

    pub fn event(description: &str, from: NaiveDateTime, to: NaiveDateTime) -> Task {
        Task::with_kind(description, TaskKind::Event { from, to })
    }

    fn with_kind(description: &str, kind: TaskKind) -> Task {
        Task {
            description: description.to_string(),
            is_done: false,
            kind,
        }
    }

    pub fn mark_done(&mut self) {
        self.is_done = true;
    }

    pub fn mark_not_done(&mut self) {
        self.is_done = false;
    }

    /// The letter identifying the kind, both on disk and on screen.
    pub fn type_letter(&self) -> char {
        match self.kind {
            TaskKind::Todo => 'T',
            TaskKind::Deadline { .. } => 'D',
            TaskKind::Event { .. } => 'E',
        }
    }

    /// Start and end of the task if it occupies time in the calendar.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match self.kind {
            TaskKind::Event { from, to } => Some((from, to)),
            _ => None,
        }
    }

    fn status_icon(&self) -> char {
        if self.is_done {
            'X'
        } else {
            ' '
        }
    }

    /// Render the task as one line of the tasks file:
    /// `TYPE | done | description [| date...]`.
    pub fn to_record_line(&self) -> String {
        let mut fields = vec![
            self.type_letter().to_string(),
            String::from(if self.is_done { "1" } else { "0" }),
            self.description.clone(),
        ];
        match self.kind {
            TaskKind::Todo => {}
            TaskKind::Deadline { by } => {
                fields.push(by.format(DATE_TIME_FORMAT).to_string());
            }
            TaskKind::Event { from, to } => {
                fields.push(from.format(DATE_TIME_FORMAT).to_string());
                fields.push(to.format(DATE_TIME_FORMAT).to_string());
            }
        }
        fields.join(FIELD_SEPARATOR)
    }

    /// Build a task back from a line of the tasks file. Returns None
    /// when the line does not describe a valid task; callers decide
    /// whether that is worth reporting.
    ///
    /// Dates are always the trailing fields, so a description that
    /// itself contains the separator is rebuilt from everything between
    /// the done flag and the dates.
    pub fn from_record_line(line: &str) -> Option<Task> {
        let fields: Vec<&str> = line.trim_end().split(FIELD_SEPARATOR).collect();
        if fields.len() < 3 {
            return None;
        }

        let date_fields = match fields[0] {
            "T" => 0,
            "D" => 1,
            "E" => 2,
            _ => return None,
        };
        let description_end = fields.len().checked_sub(date_fields)?;
        if description_end < 3 {
            return None;
        }
        let description = fields[2..description_end].join(FIELD_SEPARATOR);
        if description.trim().is_empty() {
            return None;
        }
        let dates = &fields[description_end..];

        let mut task = match dates {
            [] => Task::todo(&description),
            [by] => Task::deadline(&description, parse_date_time(by).ok()?),
            [from, to] => Task::event(
                &description,
                parse_date_time(from).ok()?,
                parse_date_time(to).ok()?,
            ),
            _ => return None,
        };

        if fields[1] == "1" {
            task.mark_done();
        }
        Some(task)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}] {}",
            self.type_letter(),
            self.status_icon(),
            self.description
        )?;
        match self.kind {
            TaskKind::Todo => Ok(()),
            TaskKind::Deadline { by } => write!(f, " (by: {})", by.format(DISPLAY_FORMAT)),
            TaskKind::Event { from, to } => write!(
                f,
                " (from: {} to: {})",
                from.format(DISPLAY_FORMAT),
                to.format(DISPLAY_FORMAT)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> NaiveDateTime {
        parse_date_time(text).unwrap()
    }

    #[test]
    fn todo_starts_not_done() {
        let task = Task::todo("Read book");
        assert_eq!(task.description, "Read book");
        assert!(!task.is_done);
    }

    #[test]
    fn marking_is_idempotent() {
        let mut task = Task::todo("Read book");
        task.mark_done();
        task.mark_done();
        assert!(task.is_done);

        task.mark_not_done();
        task.mark_not_done();
        assert!(!task.is_done);
    }

    #[test]
    fn todo_record_line_reflects_done_flag() {
        let mut task = Task::todo("Read book");
        assert_eq!(task.to_record_line(), "T | 0 | Read book");
        task.mark_done();
        assert_eq!(task.to_record_line(), "T | 1 | Read book");
    }

    #[test]
    fn display_shows_kind_status_and_dates() {
        let mut todo = Task::todo("Read book");
        assert_eq!(todo.to_string(), "[T][ ] Read book");
        todo.mark_done();
        assert_eq!(todo.to_string(), "[T][X] Read book");

        let deadline = Task::deadline("Return book", at("2024-01-05 1800"));
        assert_eq!(
            deadline.to_string(),
            "[D][ ] Return book (by: Jan 05 2024, 6:00 PM)"
        );

        let event = Task::event("Meeting", at("2024-01-01 0900"), at("2024-01-01 1030"));
        assert_eq!(
            event.to_string(),
            "[E][ ] Meeting (from: Jan 01 2024, 9:00 AM to: Jan 01 2024, 10:30 AM)"
        );
    }

    #[test]
    fn record_lines_round_trip() {
        let mut deadline = Task::deadline("Return book", at("2024-01-05 1800"));
        deadline.mark_done();
        let tasks = vec![
            Task::todo("Read book"),
            deadline,
            Task::event("Meeting", at("2024-01-01 0900"), at("2024-01-01 1030")),
        ];

        for task in tasks {
            let line = task.to_record_line();
            assert_eq!(Task::from_record_line(&line), Some(task), "line: {}", line);
        }
    }

    #[test]
    fn descriptions_containing_the_separator_round_trip() {
        let mut todo = Task::todo("x | y");
        todo.mark_done();
        let tasks = vec![
            todo,
            Task::deadline("a | b", at("2024-01-05 1800")),
            Task::event(
                "plan | review | ship",
                at("2024-01-01 0900"),
                at("2024-01-01 1030"),
            ),
        ];

        for task in tasks {
            let line = task.to_record_line();
            assert_eq!(Task::from_record_line(&line), Some(task), "line: {}", line);
        }
        assert_eq!(
            Task::deadline("a | b", at("2024-01-05 1800")).to_record_line(),
            "D | 0 | a | b | 2024-01-05 1800"
        );
    }

    #[test]
    fn event_record_line_keeps_both_dates() {
        let event = Task::event("Meeting", at("2024-01-01 0900"), at("2024-01-01 1030"));
        assert_eq!(
            event.to_record_line(),
            "E | 0 | Meeting | 2024-01-01 0900 | 2024-01-01 1030"
        );
    }

    #[test]
    fn malformed_record_lines_are_rejected() {
        assert_eq!(Task::from_record_line("X | 1 | bad"), None);
        assert_eq!(Task::from_record_line("T | 1"), None);
        assert_eq!(Task::from_record_line("T | 0 | "), None);
        assert_eq!(Task::from_record_line("D | 0 | Return book"), None);
        assert_eq!(Task::from_record_line("E | 0 | Meeting | 2024-01-01 0900"), None);
        assert_eq!(Task::from_record_line("D | 0 | Return book | tomorrow"), None);
        assert_eq!(Task::from_record_line(""), None);
    }

    #[test]
    fn inverted_event_is_accepted_as_is() {
        let line = "E | 0 | Backwards | 2024-01-01 1000 | 2024-01-01 0900";
        let task = Task::from_record_line(line).unwrap();
        assert_eq!(
            task.time_range(),
            Some((at("2024-01-01 1000"), at("2024-01-01 0900")))
        );
    }

    #[test]
    fn date_parsing_rejects_other_patterns() {
        assert!(parse_date_time("2024-01-01 0900").is_ok());
        assert!(parse_date_time(" 2024-01-01 0900 ").is_ok());
        assert!(parse_date_time("2024-01-01").is_err());
        assert!(parse_date_time("01/01/2024 0900").is_err());
    }
}
