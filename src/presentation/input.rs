use crate::application::{Action, App, LedgerJob, Level, MISSING_KEYPAIR};
use crate::infrastructure::copy_to_clipboard;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    /// Applies a key press to the app. Returns the ledger job to dispatch
    /// when the key pressed a button whose action needs the network.
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> Option<LedgerJob> {
        if app.show_help {
            Self::handle_help_mode(app, key);
            return None;
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('k') => Self::copy_public_key(app),
                KeyCode::Char('l') => Self::copy_last_link(app),
                _ => {}
            }
            return None;
        }

        match key {
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
            KeyCode::F(1) => app.toggle_help(),
            KeyCode::F(2) => return app.press(Action::GenerateKeypair),
            KeyCode::F(3) => return app.press(Action::FundAccount),
            KeyCode::F(4) => return app.press(Action::CreateLiquidityPool),
            KeyCode::F(5) => return app.press(Action::WithdrawFromPool),
            KeyCode::Enter => match app.focus.action() {
                Some(action) => return app.press(action),
                None => app.focus_next(),
            },
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
        None
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
            app.show_help = false;
        }
    }

    fn copy_public_key(app: &mut App) {
        match app.public_key() {
            Some(pk) => {
                let result = copy_to_clipboard(&pk);
                app.set_copy_result("public key", result);
            }
            None => app.notify(Level::Error, MISSING_KEYPAIR, None),
        }
    }

    fn copy_last_link(app: &mut App) {
        match app.last_link.clone() {
            Some(link) => {
                let result = copy_to_clipboard(&link);
                app.set_copy_result("transaction link", result);
            }
            None => app.notify(Level::Error, "No transaction link to copy yet.", None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Focus;

    #[test]
    fn test_tab_moves_focus() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.focus, Focus::FundAccount);
        InputHandler::handle_key_event(&mut app, KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(app.focus, Focus::GenerateKeypair);
    }

    #[test]
    fn test_typing_into_asset_name() {
        let mut app = App::default();
        app.focus = Focus::AssetName;
        for c in "ABCX".chars() {
            InputHandler::handle_key_event(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        InputHandler::handle_key_event(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.form.asset_name, "ABC");

        // Enter on a field moves on
        InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.focus, Focus::TokenAAmount);
    }

    #[test]
    fn test_enter_presses_generate() {
        let mut app = App::default();
        let job = InputHandler::handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(job.is_none());
        assert!(app.keypair.is_some());
    }

    #[test]
    fn test_function_key_returns_job() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        let job = InputHandler::handle_key_event(&mut app, KeyCode::F(3), KeyModifiers::NONE);
        assert!(matches!(job, Some(LedgerJob::Fund { .. })));
        assert!(app.loading.fund_account);
    }

    #[test]
    fn test_precondition_failure_from_keys() {
        let mut app = App::default();
        let job = InputHandler::handle_key_event(&mut app, KeyCode::F(5), KeyModifiers::NONE);
        assert!(job.is_none());
        assert!(!app.loading.any());
        assert_eq!(app.notifications.count(Level::Error), 1);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::F(1), KeyModifiers::NONE);
        assert!(app.show_help);

        let job = InputHandler::handle_key_event(&mut app, KeyCode::F(2), KeyModifiers::NONE);
        assert!(job.is_none());
        assert!(app.keypair.is_none());

        InputHandler::handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.show_help);
    }

    #[test]
    fn test_copy_without_data_reports_error() {
        let mut app = App::default();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('k'), KeyModifiers::CONTROL);
        assert_eq!(app.log, MISSING_KEYPAIR);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(app.log, "No transaction link to copy yet.");
        assert!(app.form.asset_name.is_empty());
    }
}
