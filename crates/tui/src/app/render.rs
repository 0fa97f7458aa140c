use super::*;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let visible_toasts = self.toasts.len().min(5);
        let layout = ScreenLayout::calculate(area, visible_toasts);

        match self.screen {
            Screen::Redirect => self.render_redirect(frame, layout.body),
            Screen::Processing => self.render_processing(frame, layout.body),
            Screen::Home => self.render_home(frame, layout.body),
            Screen::Settings => self.render_settings(frame, layout.body),
        }

        if visible_toasts > 0 {
            self.render_toasts(frame, layout.toasts, visible_toasts);
        }
        self.render_status(frame, layout.status);

        if self.show_help {
            self.render_help(frame, area);
        } else if self.show_error_details {
            self.render_error_details(frame, area);
        }
    }

    fn render_redirect(&self, frame: &mut Frame, area: Rect) {
        let text = format!(
            "\n\n  Paste the URL your browser was redirected to after authorizing\n  with {}, then press [Enter].\n\n  > {}_\n",
            self.config.server.provider, self.input.buffer
        );
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" Sign in "))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_processing(&self, frame: &mut Frame, area: Rect) {
        let tick = self
            .loading_start_time
            .map(|start| (start.elapsed().as_millis() / 150) as usize)
            .unwrap_or(0);
        let text = format!(
            "\n\n  {}  {}  \n\n  [Esc] abandon",
            SPINNER[tick % SPINNER.len()],
            self.current_prompt()
        );
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" oauth-callback "))
            .centered();
        frame.render_widget(paragraph, area);
    }

    fn render_home(&self, frame: &mut Frame, area: Rect) {
        let text = match self.session.current_user() {
            Some(user) => format!("\n\n  Welcome!\n\n  {}\n", pretty_user(&user)),
            None => "\n\n  Welcome! No user is logged in.\n".to_string(),
        };
        let paragraph = Paragraph::new(format!("{text}\n  [L] log out  [Esc] sign in again"))
            .block(Block::default().borders(Borders::ALL).title(" Home "))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_settings(&self, frame: &mut Frame, area: Rect) {
        let account = match self.session.current_user() {
            Some(user) => format!("Logged in as:\n  {}", pretty_user(&user)),
            None => "Not logged in.".to_string(),
        };
        let last = match self.last_outcome {
            Some(outcome) => format!("Last sign-in attempt: {:?}", outcome),
            None => "Last sign-in attempt: none".to_string(),
        };
        let text = format!(
            "\n\n  {}\n\n  {}\n\n  Provider: {}\n  Server:   {}\n\n  [L] log out  [Esc] sign in again",
            account, last, self.config.server.provider, self.config.server.base_url
        );
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" Settings "))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_toasts(&self, frame: &mut Frame, area: Rect, count: usize) {
        let lines: Vec<Line> = self
            .toasts
            .iter()
            .rev()
            .take(count)
            .rev()
            .map(|toast| {
                let (marker, color) = match toast.kind {
                    ToastKind::Success => ("✓", Color::Green),
                    ToastKind::Error => ("✗", Color::Red),
                };
                Line::from(vec![
                    Span::styled(
                        format!("{} ", toast.timestamp.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!("{marker} "), Style::default().fg(color)),
                    Span::raw(toast.message.clone()),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Notifications "));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(format!(" {} ", self.keybinds.status_hint()))];
        if let Some(ref error) = self.last_error {
            spans.push(Span::styled(
                format!(" {error} (Shift+E details)"),
                Style::default().fg(Color::Red),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(area, 60, 22);
        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(self.keybinds.help_text())
            .block(Block::default().borders(Borders::ALL).title(" Help "));
        frame.render_widget(paragraph, popup);
    }

    fn render_error_details(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(area, 70, 10);
        frame.render_widget(Clear, popup);
        let text = self.last_error.clone().unwrap_or_default();
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" Error "))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);
    }
}

fn pretty_user(user: &serde_json::Value) -> String {
    serde_json::to_string_pretty(user)
        .unwrap_or_else(|_| user.to_string())
        .replace('\n', "\n  ")
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
