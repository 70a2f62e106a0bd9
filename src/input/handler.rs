use crate::app::AppState;
use crate::domain::UiMode;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::EditingNotes => handle_notes_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),

        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_run_pause(),
        KeyCode::Char('x') => app.stop(),
        KeyCode::Char('s') => app.commit(),
        KeyCode::Char('n') => app.begin_notes(),
        KeyCode::Char('r') => app.reload()?,

        // Quitting discards the session; refuse while one is in progress
        KeyCode::Char('q') | KeyCode::Esc => {
            if app.timer.state().is_active() {
                app.status = Some(crate::app::StatusLine {
                    text: "session in progress: save (s) or stop (x) first, Q to discard".to_string(),
                    is_error: true,
                });
                return Ok(false);
            }
            return Ok(true);
        }
        KeyCode::Char('Q') => return Ok(true),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
        _ => {}
    }
    Ok(false)
}

/// Handle keys while typing session notes
fn handle_notes_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.ui_mode = UiMode::Normal,
        KeyCode::Backspace => {
            app.timer.notes_mut().pop();
        }
        KeyCode::Char(c) => app.timer.notes_mut().push(c),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::{NewProject, NewTask, TimerState};
    use crate::store::memory::MemoryStore;
    use crate::store::Store;

    fn app() -> AppState {
        let mut store = MemoryStore::new();
        let project = store.create_project(NewProject::new("Work")).unwrap();
        store.create_task(project.id, NewTask::new("Code")).unwrap();
        AppState::new(Box::new(store), Config::default(), None).unwrap()
    }

    fn press(app: &mut AppState, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    #[test]
    fn test_space_toggles_timer() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.timer.state(), TimerState::Running);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.timer.state(), TimerState::Paused);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_quit_refused_during_session() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(press(&mut app, KeyCode::Char('Q')));

        let mut idle = self::app();
        assert!(press(&mut idle, KeyCode::Char('q')));
    }

    #[test]
    fn test_typing_notes() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui_mode, UiMode::EditingNotes);
        for c in "fix bugz".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.timer.notes(), "fix bugs");
    }

    #[test]
    fn test_notes_blocked_while_running() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui_mode, UiMode::Normal);
    }
}
