use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::playback::PlaybackSession;

mod event_loop;
mod logging;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    logging::init(&settings.log);
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }

    let tracks = startup::load_tracks(env::args_os().nth(1).map(PathBuf::from), &settings);
    info!(count = tracks.len(), "themes ready");

    let session = PlaybackSession::with_default_output(Duration::from_millis(
        settings.audio.status_interval_ms,
    ))?;
    let mut app = App::new(tracks, &session);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &session);

    // Screens unsubscribe before the session goes away.
    drop(app);
    session.stop();
    session.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
