use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Task;

/// Somewhere the task list can be kept between sessions, one record
/// per line.
pub trait LineStore {
    fn load_lines(&self) -> Result<Vec<String>>;
    fn save_lines(&self, lines: &[String]) -> Result<()>;
}

/// A plain text file holding one record per line.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> FileStore {
        FileStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineStore for FileStore {
    /// A missing file is an empty list. Lines that are not valid UTF-8
    /// are dropped one by one so the rest of the file still loads.
    fn load_lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            log::info!("No tasks file at {}, starting empty.", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read(&self.path)
            .with_context(|| format!("Failed to read tasks file {}.", self.path.display()))?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let mut lines = Vec::new();
        for (number, bytes) in content.split(|&byte| byte == b'\n').enumerate() {
            let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
            match std::str::from_utf8(bytes) {
                Ok(line) => lines.push(line.to_string()),
                Err(error) => log::warn!(
                    "Dropping line {} of {}: {}",
                    number + 1,
                    self.path.display(),
                    error
                ),
            }
        }
        if content.ends_with(b"\n") {
            lines.pop();
        }
        Ok(lines)
    }

    /// Replace the whole file. The content goes to a temporary sibling
    /// first and is then renamed over the tasks file.
    fn save_lines(&self, lines: &[String]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory {}.", dir.display()))?;
            }
        }

        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}.", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace tasks file {}.", self.path.display()))?;
        Ok(())
    }
}

/// Turn stored lines into tasks. Lines that do not describe a task are
/// dropped, the rest keep their order.
pub fn decode<S: AsRef<str>>(lines: &[S]) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(lines.len());
    for (number, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        match Task::from_record_line(line) {
            Some(task) => tasks.push(task),
            None => log::warn!("Dropping malformed record on line {}: {:?}", number + 1, line),
        }
    }
    tasks
}

pub fn encode<'a, I>(tasks: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().map(Task::to_record_line).collect()
}

/// Store kept in memory, for tests that should not touch the disk.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub lines: std::cell::RefCell<Vec<String>>,
    pub saves: std::cell::Cell<usize>,
}

#[cfg(test)]
impl LineStore for MemoryStore {
    fn load_lines(&self) -> Result<Vec<String>> {
        Ok(self.lines.borrow().clone())
    }

    fn save_lines(&self, lines: &[String]) -> Result<()> {
        *self.lines.borrow_mut() = lines.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
