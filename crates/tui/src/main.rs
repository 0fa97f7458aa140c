use directories::ProjectDirs;
use oauth_callback::app::App;
use oauth_callback::Config;
use oauth_callback_core::storage::{FileStore, LocalStore, MemoryStore};
use ratatui::crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyModifiers,
};
use ratatui::crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "oauth-callback", "oauth-callback")
}

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}

/// The terminal owns stdout, so logs go to a file in the data dir.
fn init_logging() {
    let Some(proj_dirs) = project_dirs() else {
        return;
    };
    let log_dir = proj_dirs.data_dir();
    if std::fs::create_dir_all(log_dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("oauth-callback.log"))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .try_init();
}

fn open_storage() -> Arc<dyn LocalStore> {
    match FileStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Falling back to in-memory storage: {}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_logging();

    let config = Config::load_or_default(&get_config_path()).with_env_overrides();
    let redirect = std::env::args().nth(1);

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let mut app = App::new(config, open_storage());
    app.init();
    if let Some(redirect) = redirect {
        if let Err(e) = app.start_callback(&redirect) {
            tracing::error!("Redirect from command line rejected: {}", e);
            app.input.buffer = redirect;
            app.last_error = Some(e.to_string());
        }
    }

    terminal::enable_raw_mode()?;
    let mut terminal = ratatui::init();
    ratatui::crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;

    let result = run(&mut terminal, &mut app);

    app.cancel_callback();
    let _ = ratatui::crossterm::execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    ratatui::restore();

    result
}

fn run(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;

            if let Event::Key(key) = &event {
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
            }

            if let Ok(should_quit) = app.handle_event(event) {
                if should_quit {
                    break;
                }
            }
        }

        app.process_app_events();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
