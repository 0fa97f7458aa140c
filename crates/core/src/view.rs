use crate::api::{ExchangeApi, ExchangeRequest};
use crate::callback::{transition, CallbackEvent, CallbackState, Effect, Grant, MachineConfig};
use crate::error::CallbackError;
use crate::ports::{Navigator, Notifier};
use crate::session::SessionStore;
use crate::storage::LocalStore;
use crate::types::{AuthorizationResponse, AFF_KEY, USER_KEY};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What the loading screen shows while the callback is being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub prompt: String,
    pub processing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    ProviderError,
    Bound,
    LoggedIn,
    Exhausted,
    Cancelled,
    /// The run stopped without reaching a terminal state.
    Incomplete,
}

#[derive(Clone)]
pub struct CallbackPorts {
    pub session: Arc<dyn SessionStore>,
    pub storage: Arc<dyn LocalStore>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

enum Suspend {
    Exchange(Grant),
    Sleep(Duration),
}

/// Drives one activation of the callback view. Consumed by [`run`](Self::run),
/// so no state survives into the next activation.
pub struct CallbackView<A> {
    api: A,
    ports: CallbackPorts,
    config: MachineConfig,
    view_tx: watch::Sender<ViewState>,
}

impl<A: ExchangeApi> CallbackView<A> {
    pub fn new(
        api: A,
        ports: CallbackPorts,
        config: MachineConfig,
    ) -> (Self, watch::Receiver<ViewState>) {
        let (view_tx, view_rx) = watch::channel(ViewState {
            prompt: config.messages.processing.clone(),
            processing: true,
        });
        (
            Self {
                api,
                ports,
                config,
                view_tx,
            },
            view_rx,
        )
    }

    pub async fn run(
        self,
        params: AuthorizationResponse,
        cancel: CancellationToken,
    ) -> CallbackOutcome {
        let mut state = CallbackState::Initializing;
        let mut event = CallbackEvent::Activated(params);

        loop {
            if cancel.is_cancelled() {
                debug!("Callback view torn down before {} was handled", event_name(&event));
                return CallbackOutcome::Cancelled;
            }

            let (next, effects) = transition(&state, event, &self.config);
            state = next;

            let mut suspend = None;
            for effect in effects {
                if let Some(s) = self.apply(effect) {
                    suspend = Some(s);
                }
            }

            event = match suspend {
                Some(Suspend::Exchange(grant)) => {
                    let request = self.request_for(grant);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return CallbackOutcome::Cancelled,
                        response = self.api.exchange(request) => CallbackEvent::ExchangeCompleted(response),
                    }
                }
                Some(Suspend::Sleep(delay)) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return CallbackOutcome::Cancelled,
                        _ = tokio::time::sleep(delay) => CallbackEvent::BackoffElapsed,
                    }
                }
                None => break,
            };
        }

        self.view_tx.send_modify(|view| view.processing = false);
        let outcome = outcome_of(&state);
        info!("OAuth callback finished: {:?}", outcome);
        outcome
    }

    fn request_for(&self, grant: Grant) -> ExchangeRequest {
        let aff = match self.ports.storage.get(AFF_KEY) {
            Ok(aff) => aff.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read affiliate code: {}", e);
                String::new()
            }
        };
        debug!(
            "Sending code {} (affiliate {})",
            redact(&grant.code),
            if aff.is_empty() { "absent" } else { "present" }
        );
        ExchangeRequest {
            code: grant.code,
            state: grant.state,
            aff,
        }
    }

    fn apply(&self, effect: Effect) -> Option<Suspend> {
        match effect {
            Effect::ShowSuccess(message) => self.ports.notifier.show_success(&message),
            Effect::ShowError(message) => {
                warn!("OAuth callback error: {}", message);
                self.ports.notifier.show_error(&message);
            }
            Effect::SetPrompt(prompt) => {
                self.view_tx.send_modify(|view| view.prompt = prompt);
            }
            Effect::Navigate(route) => {
                debug!("Navigating to {}", route);
                self.ports.navigator.navigate(route);
            }
            Effect::Dispatch(action) => self.ports.session.dispatch(action),
            Effect::StoreUser(payload) => self.store_user(&payload),
            Effect::RemoveAffiliate => {
                if let Err(e) = self.ports.storage.remove(AFF_KEY) {
                    warn!("Could not remove affiliate code: {}", e);
                }
            }
            Effect::Exchange(grant) => return Some(Suspend::Exchange(grant)),
            Effect::Sleep(delay) => {
                debug!("Retrying exchange in {:?}", delay);
                return Some(Suspend::Sleep(delay));
            }
        }
        None
    }

    fn store_user(&self, payload: &Value) {
        let result = serde_json::to_string(payload)
            .map_err(CallbackError::from)
            .and_then(|json| self.ports.storage.set(USER_KEY, &json));
        if let Err(e) = result {
            warn!("Could not persist user session: {}", e);
        }
    }
}

fn outcome_of(state: &CallbackState) -> CallbackOutcome {
    match state {
        CallbackState::ErrorFromProvider => CallbackOutcome::ProviderError,
        CallbackState::Success { bound: true } => CallbackOutcome::Bound,
        CallbackState::Success { bound: false } => CallbackOutcome::LoggedIn,
        CallbackState::Exhausted => CallbackOutcome::Exhausted,
        CallbackState::Initializing
        | CallbackState::Exchanging { .. }
        | CallbackState::BackingOff { .. } => {
            warn!("Callback view stopped in non-terminal state {:?}", state);
            CallbackOutcome::Incomplete
        }
    }
}

fn event_name(event: &CallbackEvent) -> &'static str {
    match event {
        CallbackEvent::Activated(_) => "activation",
        CallbackEvent::ExchangeCompleted(_) => "exchange result",
        CallbackEvent::BackoffElapsed => "retry",
    }
}

fn redact(secret: &str) -> String {
    format!("[REDACTED len={}]", secret.len())
}
