use clap::Parser;
use navpane::io::{spawn_worker, LocalBackend};
use navpane::{logging, Action, Config, ElementContent, Navigator, RequestChannel};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const PREVIEW_LINES: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "navpane", about = "Browse a directory tree with a live preview")]
struct Cli {
    /// Directory to start browsing from
    path: Option<PathBuf>,
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
    /// Show hidden files
    #[arg(long)]
    show_hidden: bool,
    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

enum Command {
    Quit,
    Help,
    Act(Action),
}

fn parse_command(line: &str) -> Command {
    match line {
        "q" | "quit" => Command::Quit,
        "?" | "help" => Command::Help,
        "j" => Command::Act(Action::MoveSelection(1)),
        "k" => Command::Act(Action::MoveSelection(-1)),
        "" | "l" => Command::Act(Action::ActivateSelected),
        "h" | ".." => Command::Act(Action::NavigateUp),
        _ => {
            if let Some(prefix) = line.strip_prefix('/') {
                Command::Act(Action::SetFilterText(prefix.to_string()))
            } else if let Ok(index) = line.parse::<usize>() {
                Command::Act(Action::SelectRow(index))
            } else {
                Command::Help
            }
        }
    }
}

fn print_help() {
    println!("j/k: move   <enter>/l: open   h/..: parent   N: select row N");
    println!("/text: filter by prefix   /: clear filter   q: quit");
}

fn settle<C: RequestChannel>(navigator: &mut Navigator<C>) {
    while navigator.is_busy() {
        if !navigator.wait_for_event(Duration::from_secs(10)) {
            warn!("backend is not responding");
            break;
        }
    }
}

fn render<C: RequestChannel>(navigator: &mut Navigator<C>) {
    if navigator.take_input_reset() {
        println!();
    }
    let view = navigator.view();
    println!("== {}", view.directory_label.unwrap_or("Loading..."));
    if let Some(failure) = view.state.failure() {
        println!("!! {}", failure.error);
    }
    if !view.filter_text.is_empty() {
        println!("filter: {}", view.filter_text);
    }

    if view.entries.is_empty() {
        println!("   (empty directory)");
    } else if view.visible.is_empty() {
        println!("   (no matches)");
    }
    for &idx in view.visible {
        let entry = &view.entries[idx];
        let marker = if idx == view.selected_index { '>' } else { ' ' };
        println!("{} {:>3} {} {}", marker, idx, entry.get_icon(), entry.display_name());
    }

    println!("-- preview");
    match view.preview {
        ElementContent::Directory { elements_list } if elements_list.is_empty() => {
            println!("   (empty directory)")
        }
        ElementContent::Directory { elements_list } => {
            for entry in elements_list.iter().take(PREVIEW_LINES) {
                println!("   {} {}", entry.get_icon(), entry.display_name());
            }
        }
        ElementContent::File { data } => {
            for line in data.lines().take(PREVIEW_LINES) {
                println!("   {}", line);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if cli.show_hidden {
        config.backend.show_hidden = true;
    }
    logging::init_tracing(&config.logging.filter);

    if cli.write_config {
        let Some(path) = cli.config.clone().or_else(Config::config_path) else {
            return Err("could not determine config directory".into());
        };
        config.save_to(&path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    // Try the given path, then the configured one, then Home, then the cwd
    let start_dir = match cli
        .path
        .or_else(|| config.backend.start_dir.clone())
        .or_else(|| directories::UserDirs::new().map(|ud| ud.home_dir().to_path_buf()))
    {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let start_dir = start_dir.canonicalize()?;
    info!(start = %start_dir.display(), "starting navigator");

    let backend = LocalBackend::new(start_dir, &config.backend);
    let worker = spawn_worker(backend, config.protocol.clone());
    let mut navigator = Navigator::start(worker, config);
    settle(&mut navigator);
    render(&mut navigator);

    for line in io::stdin().lock().lines() {
        match parse_command(line?.trim()) {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Act(action) => {
                navigator.dispatch(action);
                settle(&mut navigator);
                render(&mut navigator);
            }
        }
    }
    Ok(())
}
