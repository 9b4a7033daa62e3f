use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use todo_sync::{
    board::TodoBoard,
    classify,
    config::{Config, CONFIG_FILE},
    form::format_deadline,
    ui, FileStorage, LocalStorage, MemoryStorage, MockGateway, RepositoryError, TaskCache,
    TaskStore, TaskSync, TaskUseCase,
};
use tracing_subscriber::EnvFilter;

type AppSync = TaskSync<MockGateway, Box<dyn LocalStorage>>;
type AppBoard = TodoBoard<MockGateway, Box<dyn LocalStorage>>;

fn cli() -> Command {
    Command::new("todo-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal to-do list with a locally mirrored task cache")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .default_value(CONFIG_FILE)
                .help("Path to the JSON config file"),
        )
        .arg(
            Arg::new("storage-dir")
                .long("storage-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the local mirror"),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .action(ArgAction::SetTrue)
                .help("Keep the mirror in memory only"),
        )
        .arg(
            Arg::new("no-seed")
                .long("no-seed")
                .action(ArgAction::SetTrue)
                .help("Start with an empty task store"),
        )
        .subcommand(Command::new("init").about("Write a default config file"))
        .subcommand(Command::new("list").about("Load tasks and print both lists"))
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if let Some(("init", _)) = matches.subcommand() {
        if Config::init(&config_path)? {
            println!("Wrote default config to {}", config_path.display());
        } else {
            println!("Config already exists at {}", config_path.display());
        }
        return Ok(());
    }

    let config = resolve_config(&config_path, &matches)?;
    let ephemeral = matches.get_flag("ephemeral");

    match matches.subcommand() {
        Some(("list", _)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .init();
            list_tasks(&config, ephemeral)
        }
        _ => {
            init_file_logging(&config)?;
            run_tui(&config, ephemeral)
        }
    }
}

fn resolve_config(path: &Path, matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::load(path)?;
    if let Some(dir) = matches.get_one::<PathBuf>("storage-dir") {
        config.storage_dir = dir.clone();
    }
    if matches.get_flag("no-seed") {
        config.seed_fixture = false;
    }
    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("todo_sync=info"))
}

fn init_file_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let path = config.log_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

fn build_sync(config: &Config, ephemeral: bool) -> AppSync {
    let store = if config.seed_fixture {
        TaskStore::fixture()
    } else {
        TaskStore::new()
    };
    let usecase = TaskUseCase::new(MockGateway::new(store), |err: &RepositoryError| {
        tracing::error!(error = %err, "task operation failed");
    });

    let storage: Box<dyn LocalStorage> = match (ephemeral, config.storage_quota_bytes) {
        (true, Some(quota)) => Box::new(MemoryStorage::new().with_quota(quota)),
        (true, None) => Box::new(MemoryStorage::new()),
        (false, Some(quota)) => Box::new(FileStorage::new(&config.storage_dir).with_quota(quota)),
        (false, None) => Box::new(FileStorage::new(&config.storage_dir)),
    };
    TaskSync::new(usecase, TaskCache::new(storage, config.mirror_key.clone()))
}

fn list_tasks(config: &Config, ephemeral: bool) -> Result<(), Box<dyn Error>> {
    let mut sync = build_sync(config, ephemeral);
    sync.load()?;

    let now = chrono::Utc::now();
    let (open, done) = classify::partition(sync.tasks());
    for (name, tasks) in [("Incomplete", open), ("Completed", done)] {
        println!("{name}:");
        for task in tasks {
            let due = match task.deadline {
                Some(_) => format!(" (Due: {})", format_deadline(task.deadline)),
                None => String::new(),
            };
            let flag = if classify::is_approaching_deadline(task, now, config.deadline_window()) {
                " !"
            } else {
                ""
            };
            println!("- [#{}] {}{}{}", task.id, task.title, due, flag);
        }
    }
    Ok(())
}

fn run_tui(config: &Config, ephemeral: bool) -> Result<(), Box<dyn Error>> {
    let mut board = TodoBoard::new(build_sync(config, ephemeral), config.deadline_window());
    board.load();

    enable_raw_mode()?;
    let result = draw_loop(&mut board, config);
    let restored = restore_terminal();

    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal loop failed");
    }
    result?;
    Ok(restored?)
}

// Raw mode is already on here; the caller restores it whatever this returns.
fn draw_loop(board: &mut AppBoard, config: &Config) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    ui::run_app(&mut terminal, board, config.refresh_interval())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}
