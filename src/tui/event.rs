use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, Focus, SettingsState};

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return;
    }

    // ── Overlays intercept all keys while open ────────────────────────
    if !app.settings.is_hidden() {
        handle_settings_key(app, code);
        return;
    }
    if app.show_upcoming {
        if matches!(code, KeyCode::Char('u') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_upcoming = false;
        }
        return;
    }

    match app.focus {
        Focus::ChatInput => handle_chat_key(app, code),
        Focus::Calendar => handle_calendar_key(app, code),
    }
}

fn handle_calendar_key(app: &mut App, code: KeyCode) {
    let anchor_moved = match code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('i') | KeyCode::Enter => {
            app.focus = Focus::ChatInput;
            return;
        }
        KeyCode::Char('s') => {
            app.open_settings();
            return;
        }
        KeyCode::Char('u') => {
            app.toggle_upcoming();
            return;
        }
        KeyCode::Char('r') if !app.loading => {
            app.needs_refresh = true;
            return;
        }

        // Moving the selection only refetches when it leaves the
        // displayed week; anchor-changing navigation always does.
        KeyCode::Left | KeyCode::Char('h') => app.week.select_prev_day(),
        KeyCode::Right | KeyCode::Char('l') => app.week.select_next_day(),
        KeyCode::Char('p') => app.week.prev_week(),
        KeyCode::Char('n') => app.week.next_week(),
        KeyCode::Char('M') => app.week.prev_month(),
        KeyCode::Char('m') => app.week.next_month(),
        KeyCode::Char('Y') => app.week.prev_year(),
        KeyCode::Char('y') => app.week.next_year(),
        KeyCode::Char('t') => app.week.jump_to(chrono::Local::now().date_naive()),
        _ => return,
    };

    if anchor_moved {
        app.needs_refresh = true;
    }
}

fn handle_chat_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.focus = Focus::Calendar,
        KeyCode::Enter => app.submit_chat_input(),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(c) => app.chat_input.push(c),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, code: KeyCode) {
    // Close and save act on the whole app; everything else edits the form.
    // Keys are ignored while a save is in flight.
    match (&app.settings, code) {
        (SettingsState::Editing(_) | SettingsState::Loading, KeyCode::Esc) => {
            app.close_settings();
            return;
        }
        (SettingsState::Editing(_), KeyCode::Enter) => {
            app.save_settings();
            return;
        }
        _ => {}
    }

    if let SettingsState::Editing(form) = &mut app.settings {
        match code {
            KeyCode::Up | KeyCode::Char('k') => form.move_up(),
            KeyCode::Down | KeyCode::Char('j') => form.move_down(),
            KeyCode::Tab => form.next_col(),
            KeyCode::Left | KeyCode::Char('h') => form.adjust(-1),
            KeyCode::Right | KeyCode::Char('l') => form.adjust(1),
            KeyCode::Char('a') => form.add_row(),
            KeyCode::Char('d') => form.delete_row(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PlannerClient;

    fn test_app() -> App {
        App::new(PlannerClient::new("http://localhost:5000").unwrap())
    }

    #[test]
    fn test_week_navigation_requests_refresh() {
        let mut app = test_app();
        handle_key(&mut app, KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(app.needs_refresh);
        assert_eq!(app.week.selected(), app.week.anchor());
    }

    #[test]
    fn test_day_move_within_week_does_not_refetch() {
        let mut app = test_app();
        // Force a known mid-week position so one step stays in the week.
        app.week
            .select(chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        app.needs_refresh = false;

        handle_key(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert!(!app.needs_refresh);
    }

    #[test]
    fn test_chat_focus_routes_typed_characters() {
        let mut app = test_app();
        handle_key(&mut app, KeyCode::Char('i'), KeyModifiers::NONE);
        assert_eq!(app.focus, Focus::ChatInput);

        for c in "hi there".chars() {
            handle_key(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        handle_key(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.chat_input, "hi ther");

        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.focus, Focus::Calendar);
        // Leaving focus keeps the draft.
        assert_eq!(app.chat_input, "hi ther");
    }

    #[test]
    fn test_q_quits_only_outside_chat_input() {
        let mut app = test_app();
        handle_key(&mut app, KeyCode::Char('i'), KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(app.running);
        assert_eq!(app.chat_input, "q");

        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.running);
    }

    #[test]
    fn test_upcoming_popup_intercepts_keys() {
        let mut app = test_app();
        handle_key(&mut app, KeyCode::Char('u'), KeyModifiers::NONE);
        assert!(app.show_upcoming);

        // Navigation is swallowed while the popup is open.
        app.needs_refresh = false;
        handle_key(&mut app, KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(!app.needs_refresh);

        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.show_upcoming);
    }
}
