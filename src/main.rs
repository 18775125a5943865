mod calc;
mod cmd;
mod data;
mod editor;
mod ui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "evedit.log";

#[derive(Parser)]
#[command(name = "evedit", about = "edit choir event schedules and music lists")]
struct Cli {
    /// Path to the data directory containing config and data files (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data files with sample venues and events
    Init,
    /// List all events
    Events,
    /// List all venues
    Venues,
    /// Print one event with its schedule and music list
    Show {
        /// Event slug (e.g. trinity-evensong)
        slug: String,
    },
    /// Open the interactive editor for an event
    Edit {
        /// Event slug (e.g. trinity-evensong)
        slug: String,
        /// Admin token sent with the update
        #[arg(long, env = "EVEDIT_ADMIN_TOKEN", default_value = "", hide_env_values = true)]
        token: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolve data_dir to an absolute path so file I/O works regardless of
    // future directory changes within the process.
    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Auto-init when the data directory is missing or empty and the user did not
    // explicitly invoke the `init` subcommand. Checked before the log file
    // lands in the directory.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    let needs_init = !is_init_command && dir_needs_init(&data_dir);

    init_logging(&data_dir)?;

    if needs_init {
        eprintln!(
            "Data directory '{}' is missing or empty, running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    match cli.command {
        None | Some(Commands::Events) => cmd::events::run(),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Venues) => cmd::venues::run(),
        Some(Commands::Show { slug }) => cmd::show::run(&slug),
        Some(Commands::Edit { slug, token }) => cmd::edit::run(&slug, &token),
    }
}

/// Logs go to a file in the data directory so they never draw over the editor.
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    let file = open_log_file(data_dir)?;
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(data_dir))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Creates the data directory if needed. The directory is no longer empty
/// afterwards.
fn open_log_file(data_dir: &Path) -> anyhow::Result<File> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// `RUST_LOG` wins; otherwise the `log_filter` setting from config.yaml.
fn log_filter(data_dir: &Path) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let settings = data::AppSettings::load_from(data_dir).unwrap_or_default();
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dir_needs_init_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does_not_exist");
        assert!(dir_needs_init(&missing));
    }

    #[test]
    fn test_dir_needs_init_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_dir_needs_init_nonempty_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "data").unwrap();
        assert!(!dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_log_file_created_in_fresh_data_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("config");
        assert!(dir_needs_init(&dir));

        open_log_file(&dir).unwrap();
        assert!(dir.join(LOG_FILE).exists());
        assert!(!dir_needs_init(&dir));
        // Sample data still lands beside the log.
        cmd::init::run_in_dir(&dir).unwrap();
        assert!(dir.join("events.json").exists());
    }

    #[test]
    fn test_cli_parses_edit_token() {
        let cli = Cli::try_parse_from(["evedit", "edit", "advent-carols", "--token", "s3cret"])
            .unwrap();
        match cli.command {
            Some(Commands::Edit { slug, token }) => {
                assert_eq!(slug, "advent-carols");
                assert_eq!(token, "s3cret");
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn test_cli_defaults_to_event_list() {
        let cli = Cli::try_parse_from(["evedit", "--data-dir", "/tmp/x"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/x"));
    }
}
