pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Redirect URL:
  Type / paste  Enter the URL the provider redirected to
  Enter         Complete sign-in
  Backspace     Delete last character

While processing:
  Esc           Abandon and return to the URL prompt

Home / Settings:
  L             Log out
  Esc           Start another sign-in

General:
  ?             Toggle this help
  Shift + E     Show latest error details
  Ctrl + Q      Quit
"#
        .to_string()
    }

    pub fn status_hint(&self) -> &'static str {
        "? help  Ctrl+Q quit"
    }
}
