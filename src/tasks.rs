use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::CommandError;
use crate::model::Task;

/// First hour of the day considered when looking for free time.
pub const WORKDAY_START_HOUR: u32 = 8;
/// Hour at which the searchable part of the day ends.
pub const WORKDAY_END_HOUR: u32 = 22;
/// Number of days, today included, searched for free time.
pub const SEARCH_DAYS: i64 = 7;

/// The ordered list of tasks. Positions are 0-based here; the
/// interface presents them 1-based.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

/// A free interval found in the calendar.
#[derive(Debug, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// Outcome of a free time search. Not finding anything is a normal
/// answer, so it is not an error.
#[derive(Debug, PartialEq, Eq)]
pub enum SlotSearch {
    Found(Slot),
    NoneFound { hours: u32 },
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> TaskList {
        TaskList { tasks }
    }

    /// Append a task and return the new number of tasks.
    pub fn add(&mut self, task: Task) -> usize {
        self.tasks.push(task);
        self.tasks.len()
    }

    pub fn remove(&mut self, index: usize) -> Result<Task, CommandError> {
        self.check_index(index)?;
        Ok(self.tasks.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Task, CommandError> {
        self.check_index(index)?;
        Ok(&self.tasks[index])
    }

    pub fn mark_done(&mut self, index: usize) -> Result<&Task, CommandError> {
        let task = self.get_mut(index)?;
        task.mark_done();
        Ok(task)
    }

    pub fn mark_not_done(&mut self, index: usize) -> Result<&Task, CommandError> {
        let task = self.get_mut(index)?;
        task.mark_not_done();
        Ok(task)
    }

    /// Tasks whose description contains the keyword, ignoring case.
    pub fn find(&self, keyword: &str) -> Vec<&Task> {
        let keyword = keyword.to_lowercase();
        self.tasks
            .iter()
            .filter(|task| task.description.to_lowercase().contains(&keyword))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Task, CommandError> {
        self.check_index(index)?;
        Ok(&mut self.tasks[index])
    }

    fn check_index(&self, index: usize) -> Result<(), CommandError> {
        if index >= self.tasks.len() {
            return Err(CommandError::IndexOutOfRange {
                position: index + 1,
                size: self.tasks.len(),
            });
        }
        Ok(())
    }

    /// Find the earliest slot of `hours` hours that does not overlap any
    /// event, between 8:00 and 22:00, today or in the following days.
    /// Today's search starts at `now` when it falls inside the window.
    pub fn find_free_slot(&self, hours: u32, now: NaiveDateTime) -> SlotSearch {
        match self.earliest_slot(Duration::hours(i64::from(hours)), now) {
            Some(slot) => SlotSearch::Found(slot),
            None => SlotSearch::NoneFound { hours },
        }
    }

    fn earliest_slot(&self, length: Duration, now: NaiveDateTime) -> Option<Slot> {
        let mut events: Vec<(NaiveDateTime, NaiveDateTime)> =
            self.tasks.iter().filter_map(Task::time_range).collect();
        events.sort_by_key(|&(start, _)| start);

        let today = now.date();
        for day_offset in 0..SEARCH_DAYS {
            let day = today + Duration::days(day_offset);
            let window_start = day.and_hms_opt(WORKDAY_START_HOUR, 0, 0)?;
            let window_end = day.and_hms_opt(WORKDAY_END_HOUR, 0, 0)?;

            let mut cursor = window_start;
            if day_offset == 0 && now > window_start && now < window_end {
                cursor = now;
            }

            for &(start, end) in &events {
                if end < cursor {
                    continue;
                }
                if start - cursor >= length && cursor + length <= window_end {
                    return Some(Slot {
                        start: cursor,
                        end: cursor + length,
                    });
                }
                cursor = std::cmp::max(cursor, end);
            }

            if window_end - cursor >= length {
                return Some(Slot {
                    start: cursor,
                    end: cursor + length,
                });
            }
        }
        None
    }
}
