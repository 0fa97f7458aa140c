use crate::input::InputState;
use crate::keybinds::Keybinds;
use crate::ui::layout::ScreenLayout;
use crate::Config;
use anyhow::Result;
use oauth_callback_core::session::{SessionStore, SharedSession};
use oauth_callback_core::storage::LocalStore;
use oauth_callback_core::view::{CallbackOutcome, CallbackPorts, CallbackView, ViewState};
use oauth_callback_core::{AuthorizationResponse, USER_KEY};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

mod effects;
mod input;
mod render;
mod state;
mod types;

pub use state::App;
pub use types::{AppAsyncEvent, ChannelNavigator, ChannelNotifier, Screen, Toast, ToastKind};

const TOAST_HISTORY: usize = 20;

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {}", Self::redact_sensitive(&error.to_string()));
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
        self.show_error_details = false;
    }

    fn redact_sensitive(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for (i, part) in input.split('&').enumerate() {
            if i > 0 {
                out.push('&');
            }
            match part.split_once('=') {
                Some((key, _)) if key.ends_with("code") || key.ends_with("state") => {
                    out.push_str(key);
                    out.push_str("=[REDACTED]");
                }
                _ => out.push_str(part),
            }
        }
        out
    }

    pub(super) fn push_toast(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > TOAST_HISTORY {
            self.toasts.pop_front();
        }
    }

    pub(super) fn spawn_app_task<F>(&self, future: F)
    where
        F: Future<Output = AppAsyncEvent> + Send + 'static,
    {
        if let Some(tx) = self.app_async_tx.clone() {
            tokio::spawn(async move {
                let event = future.await;
                let _ = tx.send(event);
            });
        }
    }
}
