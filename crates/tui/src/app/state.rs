use super::*;

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub screen: Screen,
    pub input: InputState,
    pub keybinds: Keybinds,
    pub session: SharedSession,
    pub storage: Arc<dyn LocalStore>,
    pub toasts: VecDeque<Toast>,
    pub view_rx: Option<watch::Receiver<ViewState>>,
    pub callback_cancel: Option<CancellationToken>,
    /// Id of the most recently started activation.
    pub activation: u64,
    /// Set while that activation still owns the screen.
    pub active_activation: Option<u64>,
    pub last_outcome: Option<CallbackOutcome>,
    pub app_async_tx: Option<mpsc::UnboundedSender<AppAsyncEvent>>,
    pub app_async_rx: Option<mpsc::UnboundedReceiver<AppAsyncEvent>>,
    pub loading_start_time: Option<Instant>,
    pub show_help: bool,
    pub last_error: Option<String>,
    pub show_error_details: bool,
}

impl App {
    pub fn new(config: Config, storage: Arc<dyn LocalStore>) -> Self {
        let (app_async_tx, app_async_rx) = mpsc::unbounded_channel();

        Self {
            should_quit: false,
            config,
            screen: Screen::Redirect,
            input: InputState::new(),
            keybinds: Keybinds,
            session: SharedSession::new(),
            storage,
            toasts: VecDeque::new(),
            view_rx: None,
            callback_cancel: None,
            activation: 0,
            active_activation: None,
            last_outcome: None,
            app_async_tx: Some(app_async_tx),
            app_async_rx: Some(app_async_rx),
            loading_start_time: None,
            show_help: false,
            last_error: None,
            show_error_details: false,
        }
    }
}
