use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Screen};
use crate::config;
use crate::playback::PlaybackSession;
use crate::ui;

/// Main terminal event loop: polls playback, draws, and handles input.
/// Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &PlaybackSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let notice_ttl = Duration::from_millis(settings.ui.notice_ttl_ms);

    loop {
        app.sync(Instant::now(), notice_ttl);
        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, session) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the app should exit.
pub(super) fn handle_key_event(key: KeyEvent, app: &mut App, session: &PlaybackSession) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // Any other key dismisses a notice and is otherwise swallowed.
    if app.dismiss_notice() {
        return false;
    }

    if app.filter_mode {
        handle_filter_key(key, app);
        return false;
    }

    match app.screen {
        Screen::List => handle_list_key(key, app, session),
        Screen::Detail(_) => handle_detail_key(key, app, session),
    }
}

fn handle_filter_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Enter => app.exit_filter_mode(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => app.next(),
        KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => app.prev(),
        KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
        _ => {}
    }
}

fn handle_list_key(key: KeyEvent, app: &mut App, session: &PlaybackSession) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(session),
        KeyCode::Char('o') | KeyCode::Right => {
            app.open_detail(session);
            debug!(screen = ?app.screen, "detail opened");
        }
        KeyCode::Char('x') => session.stop(),
        _ => {}
    }
    false
}

fn handle_detail_key(key: KeyEvent, app: &mut App, session: &PlaybackSession) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc | KeyCode::Left | KeyCode::Backspace => app.close_detail(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_detail(session),
        KeyCode::Char('x') => session.stop(),
        _ => {}
    }
    false
}
