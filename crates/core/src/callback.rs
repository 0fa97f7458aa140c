//! Retry state machine for one callback activation.
//!
//! [`transition`] is pure: it maps the current state and an incoming event to
//! the next state plus the effects the driver must perform, in order.

use crate::types::{AuthorizationResponse, ExchangeResponse, Route, SessionAction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 0;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failed attempts that may be retried before giving up. Zero means the
    /// first failure is terminal.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `ordinal` (1-based). Linear, not exponential.
    pub fn delay_for(&self, ordinal: u32) -> Duration {
        self.base_delay.saturating_mul(ordinal)
    }
}

/// User-visible texts, overridable for translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub processing: String,
    pub bind_success: String,
    pub login_success: String,
    pub redirecting: String,
    /// `{n}` is replaced with the retry ordinal.
    pub retrying: String,
    pub auth_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            processing: "Processing...".to_string(),
            bind_success: "Account linked successfully!".to_string(),
            login_success: "Logged in successfully!".to_string(),
            redirecting: "Operation failed, redirecting to settings...".to_string(),
            retrying: "An error occurred, retry #{n} in progress...".to_string(),
            auth_error: "Authorization error: ".to_string(),
        }
    }
}

impl Messages {
    pub fn retrying(&self, ordinal: u32) -> String {
        self.retrying.replace("{n}", &ordinal.to_string())
    }

    pub fn provider_error(&self, error: &str, description: Option<&str>) -> String {
        format!("{}{}: {}", self.auth_error, error, description.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineConfig {
    pub policy: RetryPolicy,
    pub messages: Messages,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackState {
    Initializing,
    ErrorFromProvider,
    Exchanging { grant: Grant, attempt: u32 },
    BackingOff { grant: Grant, attempt: u32 },
    Success { bound: bool },
    Exhausted,
}

impl CallbackState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallbackState::ErrorFromProvider | CallbackState::Success { .. } | CallbackState::Exhausted
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    Activated(AuthorizationResponse),
    ExchangeCompleted(ExchangeResponse),
    BackoffElapsed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowSuccess(String),
    ShowError(String),
    SetPrompt(String),
    Navigate(Route),
    Dispatch(SessionAction),
    StoreUser(Value),
    RemoveAffiliate,
    Exchange(Grant),
    Sleep(Duration),
}

pub fn transition(
    state: &CallbackState,
    event: CallbackEvent,
    config: &MachineConfig,
) -> (CallbackState, Vec<Effect>) {
    match (state, event) {
        (CallbackState::Initializing, CallbackEvent::Activated(params)) => match params.error {
            Some(error) => (
                CallbackState::ErrorFromProvider,
                vec![
                    Effect::ShowError(
                        config
                            .messages
                            .provider_error(&error, params.error_description.as_deref()),
                    ),
                    Effect::Navigate(Route::Settings),
                ],
            ),
            None => {
                let grant = Grant {
                    code: params.code,
                    state: params.state,
                };
                (
                    CallbackState::Exchanging {
                        grant: grant.clone(),
                        attempt: 0,
                    },
                    vec![Effect::Exchange(grant)],
                )
            }
        },
        (CallbackState::Exchanging { grant, attempt }, CallbackEvent::ExchangeCompleted(response)) => {
            if response.success {
                on_success(response, config)
            } else {
                on_failure(grant, *attempt, response.message, config)
            }
        }
        (CallbackState::BackingOff { grant, attempt }, CallbackEvent::BackoffElapsed) => (
            CallbackState::Exchanging {
                grant: grant.clone(),
                attempt: *attempt,
            },
            vec![Effect::Exchange(grant.clone())],
        ),
        (state, _) => (state.clone(), Vec::new()),
    }
}

fn on_success(response: ExchangeResponse, config: &MachineConfig) -> (CallbackState, Vec<Effect>) {
    if response.is_bind() {
        (
            CallbackState::Success { bound: true },
            vec![
                Effect::RemoveAffiliate,
                Effect::ShowSuccess(config.messages.bind_success.clone()),
                Effect::Navigate(Route::Settings),
            ],
        )
    } else {
        (
            CallbackState::Success { bound: false },
            vec![
                Effect::RemoveAffiliate,
                Effect::Dispatch(SessionAction::Login(response.data.clone())),
                Effect::StoreUser(response.data),
                Effect::ShowSuccess(config.messages.login_success.clone()),
                Effect::Navigate(Route::Home),
            ],
        )
    }
}

fn on_failure(
    grant: &Grant,
    attempt: u32,
    message: String,
    config: &MachineConfig,
) -> (CallbackState, Vec<Effect>) {
    // The cap is checked before the counter moves.
    if attempt >= config.policy.max_retries {
        return (
            CallbackState::Exhausted,
            vec![
                Effect::ShowError(message),
                Effect::SetPrompt(config.messages.redirecting.clone()),
                Effect::Navigate(Route::Settings),
            ],
        );
    }

    let next = attempt + 1;
    (
        CallbackState::BackingOff {
            grant: grant.clone(),
            attempt: next,
        },
        vec![
            Effect::ShowError(message),
            Effect::SetPrompt(config.messages.retrying(next)),
            Effect::Sleep(config.policy.delay_for(next)),
        ],
    )
}
