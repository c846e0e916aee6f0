//! Headless labelgrid driver.
//!
//! Usage: `labelgrid [SETTINGS_JSON] [DATA_ROOT]`
//!
//! Reads one key per line from stdin (`ArrowRight`, `Enter`, `c`,
//! `Ctrl+Z`, ...) and applies it to the dataset named in the settings.
//! Lines starting with `:` are commands:
//!
//! - `:filter all|unmarked|N`
//! - `:grid COLUMNS ROWS`
//! - `:resize WIDTH HEIGHT`
//! - `:settings` opens the settings modal
//! - `:reload` re-reads the settings file
//! - `:stats` prints label counts
//! - `:quit`

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use labelgrid::app::Session;
use labelgrid::config::AppConfig;
use labelgrid::keybindings::KeyEvent;
use labelgrid::message::{Effect, Message};
use labelgrid::navigation::{Filter, GridGeometry};
use labelgrid::state::FileStorage;
use web_time::Instant;

const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    match path {
        Some(path) => match AppConfig::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load settings {:?}: {}, using defaults", path, e);
                AppConfig::default()
            }
        },
        None => AppConfig::load_from_default_path().unwrap_or_default(),
    }
}

fn print_status(session: &Session) {
    let nav = session.navigator();
    let current = session
        .current_item()
        .map(|item| {
            format!(
                "{} [{}]",
                item.file_name,
                session.store().mark_name(item.index)
            )
        })
        .unwrap_or_else(|| "-".to_string());

    println!(
        "page {}/{} slot {} | {} | filter {:?}{}{}",
        nav.current_page(),
        session.total_pages(),
        nav.current_index(),
        current,
        nav.filter(),
        match session.typed() {
            "" => String::new(),
            typed => format!(" | typed {}", typed),
        },
        match session.dialog() {
            Some(dialog) => format!(" | {} open", dialog.name()),
            None => String::new(),
        },
    );
    if let Some(banner) = session.notification() {
        println!("! {}", banner.message);
    }
}

/// Run a `:` command. Returns false to stop.
fn run_command(session: &mut Session, settings: Option<&PathBuf>, line: &str) -> bool {
    let now = Instant::now();
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match (command, args.as_slice()) {
        ("quit", _) => return false,
        ("filter", [name]) => match Filter::parse(name) {
            Some(filter) => {
                session.update(Message::SetFilter(filter), now);
            }
            None => eprintln!("Unknown filter '{}'", name),
        },
        ("grid", [columns, rows]) => match (columns.parse(), rows.parse()) {
            (Ok(columns), Ok(rows)) => {
                session.update(Message::SetGeometry(GridGeometry::new(columns, rows)), now);
            }
            _ => eprintln!("Usage: :grid COLUMNS ROWS"),
        },
        ("resize", [width, height]) => match (width.parse(), height.parse()) {
            (Ok(width), Ok(height)) => {
                session.update(Message::Resize { width, height }, now);
            }
            _ => eprintln!("Usage: :resize WIDTH HEIGHT"),
        },
        ("settings", _) => {
            session.update(Message::OpenSettings, now);
        }
        ("reload", _) => {
            if let Err(e) = session.apply_config(load_config(settings), now) {
                eprintln!("Reload failed: {}", e);
            }
        }
        ("stats", _) => {
            for (name, count) in session.label_statistics() {
                println!("{:>6}  {}", count, name);
            }
        }
        _ => eprintln!("Unknown command ':{}'", line),
    }
    true
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let settings = args.next().map(PathBuf::from);
    let data_root = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let config = load_config(settings.as_ref());
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let storage = Arc::new(FileStorage::new(&data_root));
    let mut session = Session::new(config, storage);
    if let Err(e) = session.load(Instant::now()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    print_status(&session);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };
        let line = line.trim_end_matches(['\r', '\n']);
        let now = Instant::now();
        session.tick(now);

        if let Some(command) = line.strip_prefix(':') {
            if !run_command(&mut session, settings.as_ref(), command) {
                break;
            }
        } else if line.is_empty() {
            continue;
        } else {
            match KeyEvent::parse(line) {
                Some(event) => {
                    if let Some(Effect::CopyToClipboard(text)) = session.handle_key(&event, now) {
                        println!("copy: {}", text);
                    }
                }
                None => eprintln!("Unknown key '{}'", line),
            }
        }
        print_status(&session);
    }

    if !session.flush_saves(SHUTDOWN_FLUSH_TIMEOUT, Instant::now()) {
        eprintln!("Some changes may not have been saved");
        return ExitCode::FAILURE;
    }
    if !session.last_save_success() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
