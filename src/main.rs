mod api;
mod checkin;
mod config;
mod dates;
mod models;
mod store;
mod tui;
mod week;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use api::PlannerClient;
use config::Config;
use tui::App;

/// Structured logs go to a file under the cache directory; stdout belongs
/// to the terminal UI.
fn init_tracing() -> Result<()> {
    let Some(path) = dirs::cache_dir().map(|d| d.join("studyplan-tui").join("studyplan-tui.log"))
    else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit it with your planner server URL, then run studyplan-tui.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("studyplan-tui — A terminal UI for a personal study planner");
        println!();
        println!("USAGE:");
        println!("  studyplan-tui                 Start the TUI");
        println!("  studyplan-tui --date <DATE>   Open at the week of DATE (YYYY-MM-DD)");
        println!("  studyplan-tui --init          Generate a default config file");
        println!();
        println!("CONFIG:");
        println!("  File: ~/.config/studyplan-tui/config.toml");
        println!("  Or set the STUDYPLAN_URL environment variable.");
        println!();
        println!("KEYBINDINGS:");
        println!("  h / l / Left / Right   Select day");
        println!("  p / n                  Previous / next week");
        println!("  m / M, y / Y           Next / previous month, year");
        println!("  t                      Jump to today");
        println!("  r                      Refresh the schedule");
        println!("  i / Enter              Type a chat message (Esc to leave)");
        println!("  s                      Personalization settings");
        println!("  u                      Upcoming tasks");
        println!("  q / Ctrl+C             Quit");
        return Ok(());
    }

    init_tracing()?;

    let config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `studyplan-tui --init` to generate a config file,\n\
         or set the STUDYPLAN_URL environment variable."
    })?;

    let client = PlannerClient::new(&config.server_url)?;

    // An unparsable --date logs a diagnostic and falls back to today.
    let start_date = args
        .windows(2)
        .find(|pair| pair[0] == "--date")
        .map(|pair| dates::parse_local_date(&pair[1]));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, client, start_date).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: PlannerClient,
    start_date: Option<chrono::NaiveDate>,
) -> Result<()> {
    let mut app = App::new(client);
    if let Some(date) = start_date {
        app.week.jump_to(date);
    }

    app.start_refresh();
    app.maybe_daily_checkin();
    terminal.draw(|f| tui::ui::render(f, &mut app))?;

    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(event) = tui::event::poll_event(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event
            {
                tui::event::handle_key(&mut app, code, modifiers);
            }
        }

        if !app.running {
            break;
        }

        // Apply completed background round trips without blocking.
        app.poll_refresh();
        app.poll_chat();
        app.poll_settings_load();
        app.poll_settings_save();

        if app.needs_refresh {
            app.needs_refresh = false;
            app.start_refresh();
        }
    }

    Ok(())
}
