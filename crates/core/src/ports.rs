use crate::types::Route;

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
}

/// Imperative redirect to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Toast {
        Success(String),
        Error(String),
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub toasts: Mutex<Vec<Toast>>,
    }

    impl RecordingNotifier {
        pub fn toasts(&self) -> Vec<Toast> {
            self.toasts.lock().expect("toasts lock").clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn show_success(&self, message: &str) {
            self.toasts
                .lock()
                .expect("toasts lock")
                .push(Toast::Success(message.to_string()));
        }

        fn show_error(&self, message: &str) {
            self.toasts
                .lock()
                .expect("toasts lock")
                .push(Toast::Error(message.to_string()));
        }
    }

    #[derive(Default)]
    pub struct RecordingNavigator {
        pub routes: Mutex<Vec<Route>>,
    }

    impl RecordingNavigator {
        pub fn routes(&self) -> Vec<Route> {
            self.routes.lock().expect("routes lock").clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes.lock().expect("routes lock").push(route);
        }
    }
}
