//! Shell controller — the event loop driving screens and overlays.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Frame, Terminal, backend::Backend};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, instrument, warn};

use crate::generation::{CredentialHook, GameSource, GenerationError, GenerationErrorKind};
use crate::llm_client::{CredentialStore, LlmProvider};
use crate::schema::{GameConfig, GameRoute};
use crate::settings::AppSettings;
use crate::shell::Shell;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::screens::{
    AlertScreen, ApiKeyScreen, InputScreen, LoadingScreen, MemoryMatchScreen, QuizShowScreen,
    SettingsScreen,
};

type GenerationOutcome = Result<GameConfig, GenerationError>;

/// Credential hook that raises a flag for the event loop to pick up.
///
/// The generation task runs off the UI loop, so the hook only records the
/// request; the controller opens the API-key overlay on its next pass.
#[derive(Debug, Default)]
pub struct FlagHook {
    raised: AtomicBool,
}

impl FlagHook {
    /// Creates a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }
}

impl CredentialHook for FlagHook {
    fn reselect_credential(&self) {
        info!("Credential reselection requested");
        self.raised.store(true, Ordering::SeqCst);
    }
}

/// Active full-screen view.
#[derive(Debug)]
enum ActiveScreen {
    Input(InputScreen),
    Loading(LoadingScreen),
    QuizShow(QuizShowScreen),
    MemoryMatch(MemoryMatchScreen),
}

impl ActiveScreen {
    fn as_screen(&self) -> &dyn Screen {
        match self {
            Self::Input(s) => s,
            Self::Loading(s) => s,
            Self::QuizShow(s) => s,
            Self::MemoryMatch(s) => s,
        }
    }

    fn as_screen_mut(&mut self) -> &mut dyn Screen {
        match self {
            Self::Input(s) => s,
            Self::Loading(s) => s,
            Self::QuizShow(s) => s,
            Self::MemoryMatch(s) => s,
        }
    }

    fn teardown(&mut self) {
        match self {
            Self::QuizShow(s) => s.teardown(),
            Self::MemoryMatch(s) => s.teardown(),
            Self::Input(_) | Self::Loading(_) => {}
        }
    }
}

/// Modal view drawn on top of the active screen.
#[derive(Debug)]
enum Overlay {
    Settings(SettingsScreen),
    ApiKey(ApiKeyScreen),
    Alert(AlertScreen),
}

impl Overlay {
    fn as_screen(&self) -> &dyn Screen {
        match self {
            Self::Settings(s) => s,
            Self::ApiKey(s) => s,
            Self::Alert(s) => s,
        }
    }

    fn as_screen_mut(&mut self) -> &mut dyn Screen {
        match self {
            Self::Settings(s) => s,
            Self::ApiKey(s) => s,
            Self::Alert(s) => s,
        }
    }
}

/// Controller that drives the shell state machine from terminal events.
///
/// Call [`ShellController::run`] to start the event loop.
pub struct ShellController {
    shell: Shell,
    source: Arc<dyn GameSource>,
    credentials: CredentialStore,
    provider: LlmProvider,
    credential_hook: Arc<FlagHook>,
    screen: ActiveScreen,
    overlays: Vec<Overlay>,
    pending: Option<oneshot::Receiver<GenerationOutcome>>,
}

impl std::fmt::Debug for ShellController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellController")
            .field("shell", &self.shell)
            .field("provider", &self.provider)
            .field("screen", &self.screen)
            .field("overlays", &self.overlays.len())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl ShellController {
    /// Creates a controller showing an empty input screen.
    ///
    /// `credential_hook` must be the hook installed on `source`, so that a
    /// rejected key opens the API-key overlay.
    #[instrument(skip(settings, source, credentials, credential_hook))]
    pub fn new(
        settings: AppSettings,
        source: Arc<dyn GameSource>,
        credentials: CredentialStore,
        provider: LlmProvider,
        credential_hook: Arc<FlagHook>,
    ) -> Self {
        info!("Creating ShellController");
        let mut controller = Self {
            shell: Shell::new(settings),
            source,
            credentials,
            provider,
            credential_hook,
            screen: ActiveScreen::Loading(LoadingScreen::new()),
            overlays: Vec::new(),
            pending: None,
        };
        controller.screen = ActiveScreen::Input(controller.input_screen());
        if !controller.credentials.is_set() {
            warn!(var = provider.api_key_var(), "No API key configured");
            controller.open_api_key_overlay();
        }
        controller
    }

    /// The shell state.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Runs the event loop until the user quits.
    #[instrument(skip(self, terminal))]
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()>
    where
        <B as Backend>::Error: Send + Sync + 'static,
    {
        info!("Starting shell event loop");
        let mut last = Instant::now();

        loop {
            let now = Instant::now();
            self.screen.as_screen_mut().on_tick(now - last);
            last = now;

            self.poll_generation();

            terminal.draw(|f| self.render(f))?;

            // Poll for input with short timeout to keep the countdown smooth.
            if event::poll(Duration::from_millis(50))? {
                let keep_running = match event::read()? {
                    // Skip key release events (crossterm fires both press and release).
                    Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                    Event::Paste(text) => {
                        self.handle_paste(&text);
                        true
                    }
                    _ => true,
                };
                if !keep_running {
                    info!("Shell quitting");
                    self.screen.teardown();
                    return Ok(());
                }
            }

            sleep(Duration::from_millis(10)).await;
        }
    }

    fn render(&self, frame: &mut Frame) {
        self.screen.as_screen().render(frame);
        for overlay in &self.overlays {
            overlay.as_screen().render(frame);
        }
    }

    /// Routes a key to the topmost overlay or the active screen.
    ///
    /// Returns `false` when the application should exit.
    #[instrument(skip(self, key))]
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        if key.code == KeyCode::F(2) && self.overlays.is_empty() {
            return self.apply_transition(ScreenTransition::OpenSettings);
        }

        let transition = match self.overlays.last_mut() {
            Some(overlay) => overlay.as_screen_mut().handle_key(key),
            None => self.screen.as_screen_mut().handle_key(key),
        };
        self.apply_transition(transition)
    }

    fn handle_paste(&mut self, text: &str) {
        match self.overlays.last_mut() {
            Some(overlay) => overlay.as_screen_mut().on_paste(text),
            None => self.screen.as_screen_mut().on_paste(text),
        }
    }

    /// Applies a screen transition. Returns `false` to quit.
    #[instrument(skip(self, transition))]
    fn apply_transition(&mut self, transition: ScreenTransition) -> bool {
        debug!(transition = ?transition, "Applying screen transition");
        match transition {
            ScreenTransition::Stay => {}

            ScreenTransition::Submit { text } => {
                self.shell.set_draft(text);
                if let Some(text) = self.shell.begin_generation() {
                    self.spawn_generation(text);
                    self.screen = ActiveScreen::Loading(LoadingScreen::new());
                }
            }

            ScreenTransition::ExitGame => {
                self.screen.teardown();
                if self.shell.exit_game() {
                    info!("Navigating to Input");
                    self.screen = ActiveScreen::Input(self.input_screen());
                }
            }

            ScreenTransition::OpenSettings => {
                info!("Opening settings");
                self.overlays
                    .push(Overlay::Settings(SettingsScreen::new(self.shell.settings())));
            }

            ScreenTransition::SaveSettings(settings) => {
                self.close_overlay();
                if let ActiveScreen::QuizShow(s) = &mut self.screen {
                    s.apply_settings(settings.clone());
                }
                self.shell.set_settings(settings);
            }

            ScreenTransition::SaveApiKey(key) => {
                self.close_overlay();
                self.credentials.set(key);
                info!(provider = ?self.provider, "API key updated");
            }

            ScreenTransition::CloseOverlay => self.close_overlay(),

            ScreenTransition::Quit => return false,
        }
        true
    }

    fn close_overlay(&mut self) {
        if let Some(Overlay::Alert(_)) = self.overlays.pop() {
            self.shell.dismiss_alert();
        }
    }

    fn spawn_generation(&mut self, text: String) {
        let source = Arc::clone(&self.source);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = source.generate_game(&text).await;
            if tx.send(outcome).is_err() {
                warn!("Generation finished after the shell went away");
            }
        });
        self.pending = Some(rx);
    }

    /// Picks up a finished generation, if any, and moves to the next screen.
    #[instrument(skip(self))]
    fn poll_generation(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => {
                error!("Generation task ended without a result");
                Err(GenerationError::new(
                    GenerationErrorKind::Service,
                    "Generation task ended without a result",
                ))
            }
        };
        self.pending = None;
        self.shell.finish_generation(outcome);

        self.screen = match self.shell.game() {
            Some(config) => self.game_screen(config),
            None => ActiveScreen::Input(self.input_screen()),
        };
        if let Some(alert) = self.shell.alert() {
            self.overlays.push(Overlay::Alert(AlertScreen::new(alert.clone())));
        }
        if self.credential_hook.take() {
            self.open_api_key_overlay();
        }
    }

    /// Builds the screen for `config`, dispatching on its route.
    #[instrument(skip(self, config), fields(kind = %config.kind().tag()))]
    fn game_screen(&self, config: &GameConfig) -> ActiveScreen {
        let rng = StdRng::from_entropy();
        match config.route() {
            GameRoute::MemoryMatch => {
                info!("Navigating to MemoryMatch");
                ActiveScreen::MemoryMatch(MemoryMatchScreen::new(
                    config.title().clone(),
                    config.items().pairs().to_vec(),
                    rng,
                ))
            }
            GameRoute::QuizShow => {
                info!("Navigating to QuizShow");
                ActiveScreen::QuizShow(QuizShowScreen::new(
                    config.title().clone(),
                    config.items().questions().to_vec(),
                    self.shell.settings().clone(),
                    rng,
                ))
            }
        }
    }

    fn input_screen(&self) -> InputScreen {
        let label = format!("{:?} · {}", self.provider, self.provider.api_key_var());
        InputScreen::new(self.shell.draft(), label)
    }

    fn open_api_key_overlay(&mut self) {
        self.overlays.push(Overlay::ApiKey(ApiKeyScreen::new(
            self.provider.api_key_var().to_string(),
        )));
    }
}
