/// Single-line text field for the pasted redirect URL.
pub struct InputState {
    pub buffer: String,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if !c.is_control() {
            self.buffer.push(c);
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.buffer
            .extend(text.chars().filter(|c| !c.is_control()));
    }

    pub fn handle_backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
