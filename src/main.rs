use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use taskboard::{
    app::{App, Route},
    board::Filter,
    client::{ApiClient, TaskApi},
    config::{self, ApiBase, Config},
    error::{AppError, AppResult},
    logging,
    session::SessionStore,
    ui,
};

#[derive(Parser)]
#[command(name = "taskboard", version, about = "Terminal to-do board for a REST task backend")]
struct Cli {
    /// Backend base URL, overrides TASKBOARD_API_BASE_URL and the config file
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Path to a TOML config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive board (default)
    Ui,
    /// Print the logged-in user's tasks
    List {
        #[arg(long, default_value = "all")]
        filter: Filter,
        /// Case-insensitive text filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Forget the logged-in user
    Logout,
    /// Print a default config file
    InitConfig,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("taskboard: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let command = cli.command.unwrap_or(Command::Ui);
    if let Command::InitConfig = command {
        print!("{}", config::generate_default_config());
        return Ok(());
    }

    let config = Config::load_from(cli.config.as_deref())?;
    let log_path = logging::init(&config.logging)?;
    tracing::info!("taskboard v{} (log: {:?})", env!("CARGO_PKG_VERSION"), log_path);
    match &config.source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("No config file found, using defaults"),
    }

    let session = SessionStore::default_location();
    if let Command::Logout = command {
        session.clear()?;
        println!("Logged out");
        return Ok(());
    }

    let base = match cli.api_base.as_deref() {
        Some(raw) => ApiBase::parse(raw)?,
        None => config.api_base()?,
    };
    tracing::info!(%base, "using backend");
    let client = ApiClient::new(base, config.api.timeout())?;

    match command {
        Command::List { filter, search } => list_tasks(&client, &session, filter, search),
        _ => run_tui(client, session, &config),
    }
}

fn list_tasks(
    client: &impl TaskApi,
    session: &SessionStore,
    filter: Filter,
    search: Option<String>,
) -> AppResult<()> {
    let username = session.username()?.ok_or(AppError::NotLoggedIn)?;
    let tasks = client.list_tasks(&username)?;
    let term = search.unwrap_or_default();

    for task in tasks
        .iter()
        .filter(|t| filter.admits(t) && t.matches_search(&term))
    {
        println!(
            "[{}] #{} {} (due: {}, priority: {}, category: {})",
            if task.completed { "x" } else { " " },
            task.id,
            task.text,
            task.due_label(),
            task.priority,
            task.category_label()
        );
    }
    Ok(())
}

fn run_tui(client: ApiClient, session: SessionStore, config: &Config) -> AppResult<()> {
    let resume = session.username().ok().flatten().is_some();
    let mut app = App::new(client, session, config.ui.clone());
    if resume {
        app.navigate(Route::Board);
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal loop failed");
    }
    result.map_err(AppError::from)
}
