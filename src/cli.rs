use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "Quill",
    about = "A hyper-minimalistic task tracker driven by one-line commands."
)]
pub struct CommandLineArgs {
    /// Use a different tasks file.
    #[structopt(parse(from_os_str), short, long)]
    pub tasks_file: Option<PathBuf>,

    /// Write the log to this file instead of the data directory.
    #[structopt(parse(from_os_str), long)]
    pub log_file: Option<PathBuf>,

    /// Refuse events that end before they start.
    #[structopt(long)]
    pub strict: bool,

    /// Log every command, not only changes to the list.
    #[structopt(short, long)]
    pub verbose: bool,
}
