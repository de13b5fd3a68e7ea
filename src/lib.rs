//! Task tracking through one-line commands: a task list that can be
//! saved as plain text, and a command interpreter on top of it. Front
//! ends only pass lines to [`interface::Session::handle`] and show what
//! comes back.

pub mod cli;
pub mod error;
pub mod interface;
pub mod model;
pub mod storage;
pub mod tasks;
