use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

use quill::cli::CommandLineArgs;
use quill::interface::{Options, Outcome, Session, SystemClock, GREETING};
use quill::storage::FileStore;

/// Directory where quill keeps its tasks and log, created if needed.
fn find_data_dir() -> anyhow::Result<PathBuf> {
    let base_dirs = ProjectDirs::from("com", "gozque", "quill")
        .ok_or_else(|| anyhow!("Failed to find a data directory."))?;
    let root_dir = base_dirs.data_dir();
    if !root_dir.exists() {
        fs::create_dir_all(root_dir)
            .with_context(|| format!("Failed to create directory {}.", root_dir.display()))?;
    }
    Ok(PathBuf::from(root_dir))
}

/// Send log records to a file; stdout belongs to the conversation.
fn init_logging(log_path: &Path, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let file = File::create(log_path)
        .with_context(|| format!("Failed to create log file {}.", log_path.display()))?;
    WriteLogger::init(level, Config::default(), file).context("Failed to start logging.")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let CommandLineArgs {
        tasks_file,
        log_file,
        strict,
        verbose,
    } = CommandLineArgs::from_args();

    let log_file = match log_file {
        Some(path) => path,
        None => find_data_dir()?.join("quill.log"),
    };
    init_logging(&log_file, verbose)?;

    let tasks_file = match tasks_file {
        Some(path) => path,
        None => find_data_dir()?.join("tasks.txt"),
    };
    let store = FileStore::new(tasks_file);
    log::info!("Using tasks file {}", store.path().display());

    let (mut session, load_error) = Session::open(store, SystemClock, Options { strict });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", GREETING)?;
    if let Some(error) = load_error {
        writeln!(out, "Could not load your tasks, starting with an empty list: {:#}", error)?;
    }
    out.flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input.")?;
        match session.handle(&line) {
            Outcome::Reply(text) => writeln!(out, "{}", text)?,
            Outcome::Exit(text) => {
                writeln!(out, "{}", text)?;
                break;
            }
        }
        out.flush()?;
    }

    log::info!("Session ended.");
    Ok(())
}
