use super::*;

impl App {
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Paste(text) => {
                if self.screen == Screen::Redirect {
                    self.input.handle_paste(&text);
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.cancel_callback();
            return Ok(true);
        }

        if self.show_help {
            if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                self.show_help = false;
            }
            return Ok(false);
        }

        if self.show_error_details {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('E')) {
                self.show_error_details = false;
            }
            return Ok(false);
        }

        match self.screen {
            Screen::Redirect => match key.code {
                KeyCode::Enter => {
                    let redirect = self.input.take();
                    if let Err(e) = self.start_callback(&redirect) {
                        self.report_error("Cannot complete sign-in", e);
                        self.input.buffer = redirect;
                    }
                }
                KeyCode::Backspace => self.input.handle_backspace(),
                KeyCode::Esc => self.input.clear(),
                KeyCode::Char('?') if self.input.buffer.is_empty() => self.show_help = true,
                KeyCode::Char('E') if self.input.buffer.is_empty() && self.last_error.is_some() => {
                    self.show_error_details = true;
                }
                KeyCode::Char(c) => self.input.handle_char(c),
                _ => {}
            },
            Screen::Processing => {
                if key.code == KeyCode::Esc {
                    self.cancel_callback();
                    self.screen = Screen::Redirect;
                }
            }
            Screen::Home | Screen::Settings => match key.code {
                KeyCode::Esc => self.screen = Screen::Redirect,
                KeyCode::Char('l') | KeyCode::Char('L') => self.logout(),
                KeyCode::Char('?') => self.show_help = true,
                KeyCode::Char('E') if self.last_error.is_some() => self.show_error_details = true,
                _ => {}
            },
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth_callback_core::storage::MemoryStore;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn invalid_redirect_keeps_input_for_editing() {
        let mut app = App::new(Config::default(), Arc::new(MemoryStore::new()));
        for c in "not-a-redirect".chars() {
            app.handle_event(key(KeyCode::Char(c))).expect("type");
        }
        app.handle_event(key(KeyCode::Enter)).expect("submit");

        assert_eq!(app.screen, Screen::Redirect);
        assert_eq!(app.input.buffer, "not-a-redirect");
        assert!(app.last_error.is_some());
    }

    #[test]
    fn escape_abandons_processing() {
        let mut app = App::new(Config::default(), Arc::new(MemoryStore::new()));
        let cancel = CancellationToken::new();
        app.screen = Screen::Processing;
        app.callback_cancel = Some(cancel.clone());

        app.handle_event(key(KeyCode::Esc)).expect("escape");

        assert_eq!(app.screen, Screen::Redirect);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn ctrl_q_quits_and_cancels() {
        let mut app = App::new(Config::default(), Arc::new(MemoryStore::new()));
        let cancel = CancellationToken::new();
        app.callback_cancel = Some(cancel.clone());

        let quit = app
            .handle_event(Event::Key(KeyEvent::new(
                KeyCode::Char('q'),
                KeyModifiers::CONTROL,
            )))
            .expect("quit");

        assert!(quit);
        assert!(cancel.is_cancelled());
    }
}
