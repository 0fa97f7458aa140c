use super::*;

impl App {
    /// Restores the user persisted by a previous login.
    pub fn init(&mut self) {
        match self.storage.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(user) => {
                    self.session = SharedSession::with_user(user);
                    tracing::info!("Restored persisted session");
                }
                Err(e) => self.report_error("Stored session is unreadable", e),
            },
            Ok(None) => {}
            Err(e) => self.report_error("Failed to read local storage", e),
        }
    }

    /// Activates the callback view for a pasted redirect URL.
    pub fn start_callback(&mut self, redirect: &str) -> Result<()> {
        let params = AuthorizationResponse::from_redirect(redirect)?;
        let tx = self
            .app_async_tx
            .clone()
            .ok_or_else(|| anyhow::anyhow!("UI event channel closed"))?;

        self.cancel_callback();
        self.activation += 1;
        let activation = self.activation;

        let ports = CallbackPorts {
            session: Arc::new(self.session.clone()),
            storage: self.storage.clone(),
            notifier: Arc::new(ChannelNotifier::new(tx.clone(), activation)),
            navigator: Arc::new(ChannelNavigator::new(tx, activation)),
        };
        let (view, view_rx) = CallbackView::new(
            self.config.exchange_api(),
            ports,
            self.config.machine_config(),
        );

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        self.spawn_app_task(async move {
            AppAsyncEvent::CallbackFinished {
                activation,
                outcome: view.run(params, token).await,
            }
        });

        self.view_rx = Some(view_rx);
        self.callback_cancel = Some(cancel);
        self.active_activation = Some(activation);
        self.last_outcome = None;
        self.loading_start_time = Some(Instant::now());
        self.screen = Screen::Processing;
        self.clear_error();
        Ok(())
    }

    /// Tears down the running callback view, if any. Pending retries become no-ops.
    pub fn cancel_callback(&mut self) {
        if let Some(cancel) = self.callback_cancel.take() {
            cancel.cancel();
        }
        self.active_activation = None;
        self.view_rx = None;
        self.loading_start_time = None;
    }

    pub fn logout(&mut self) {
        self.session.logout();
        if let Err(e) = self.storage.remove(USER_KEY) {
            self.report_error("Failed to clear stored session", e);
        }
        tracing::info!("Logged out");
    }

    pub fn process_app_events(&mut self) {
        let mut events = Vec::new();
        if let Some(ref mut rx) = self.app_async_rx {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }

        for event in events {
            match event {
                AppAsyncEvent::Notify { activation, toast } => {
                    if self.active_activation == Some(activation) {
                        self.push_toast(toast);
                    } else {
                        tracing::debug!("Dropping notification from activation {}", activation);
                    }
                }
                AppAsyncEvent::Navigate { activation, route } => {
                    if self.active_activation != Some(activation) {
                        tracing::debug!(
                            "Dropping navigation to {} from activation {}",
                            route,
                            activation
                        );
                        continue;
                    }
                    tracing::debug!("Navigate to {}", route);
                    self.cancel_callback();
                    self.screen = route.into();
                }
                AppAsyncEvent::CallbackFinished { activation, outcome } => {
                    tracing::info!(
                        "Callback view {} finished with {:?}",
                        activation,
                        outcome
                    );
                    if activation == self.activation && outcome != CallbackOutcome::Cancelled {
                        self.last_outcome = Some(outcome);
                    }
                }
            }
        }
    }

    pub(super) fn current_prompt(&self) -> String {
        self.view_rx
            .as_ref()
            .map(|rx| rx.borrow().prompt.clone())
            .unwrap_or_else(|| self.config.messages.processing.clone())
    }
}
