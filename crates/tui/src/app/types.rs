use chrono::{DateTime, Local};
use oauth_callback_core::ports::{Navigator, Notifier};
use oauth_callback_core::view::CallbackOutcome;
use oauth_callback_core::Route;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Redirect,
    Processing,
    Home,
    Settings,
}

impl From<Route> for Screen {
    fn from(route: Route) -> Self {
        match route {
            Route::Home => Screen::Home,
            Route::Settings => Screen::Settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
            timestamp: Local::now(),
        }
    }
}

/// Callback events carry the id of the activation that produced them so the
/// UI can drop anything sent by an abandoned run.
pub enum AppAsyncEvent {
    Notify { activation: u64, toast: Toast },
    Navigate { activation: u64, route: Route },
    CallbackFinished { activation: u64, outcome: CallbackOutcome },
}

/// Forwards notifications from the callback task to the UI loop.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<AppAsyncEvent>,
    activation: u64,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<AppAsyncEvent>, activation: u64) -> Self {
        Self { tx, activation }
    }

    fn send(&self, toast: Toast) {
        let _ = self.tx.send(AppAsyncEvent::Notify {
            activation: self.activation,
            toast,
        });
    }
}

impl Notifier for ChannelNotifier {
    fn show_success(&self, message: &str) {
        self.send(Toast::new(ToastKind::Success, message));
    }

    fn show_error(&self, message: &str) {
        self.send(Toast::new(ToastKind::Error, message));
    }
}

pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<AppAsyncEvent>,
    activation: u64,
}

impl ChannelNavigator {
    pub fn new(tx: mpsc::UnboundedSender<AppAsyncEvent>, activation: u64) -> Self {
        Self { tx, activation }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        let _ = self.tx.send(AppAsyncEvent::Navigate {
            activation: self.activation,
            route,
        });
    }
}
