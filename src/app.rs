use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, InputMode};
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::storage::SessionStore;
use crate::state::sync::{SyncError, TournamentSync};
use battlesnake_api::TournamentId;
use crossterm::event::KeyCode;
use log::info;
use tokio::sync::mpsc;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Players,
    Controls,
    Help,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [MenuItem::Bracket, MenuItem::Players, MenuItem::Controls, MenuItem::Help];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Bracket => "Bracket",
            MenuItem::Players => "Players",
            MenuItem::Controls => "Controls",
            MenuItem::Help => "Help",
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub sync: TournamentSync,
}

impl App {
    pub fn new(settings: AppSettings, network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        let store = SessionStore::open(settings.state_file.clone());
        Self::with_store(settings, store, network_requests)
    }

    pub fn with_store(
        settings: AppSettings,
        store: SessionStore,
        network_requests: mpsc::Sender<NetworkRequest>,
    ) -> Self {
        if let Some(level) = settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        let sync = TournamentSync::new(network_requests, store, settings.poll_interval);
        Self {
            state: AppState::new(settings.admin),
            sync,
            settings,
        }
    }

    pub fn startup_requests(&mut self) -> Vec<NetworkRequest> {
        self.sync.startup_requests()
    }

    /// Stop background polling before the process goes away.
    pub fn shutdown(&mut self) {
        self.sync.shutdown();
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_network_response(&mut self, response: NetworkResponse) -> Vec<NetworkRequest> {
        let shown_before = self.shown_tournament_id();
        if matches!(response, NetworkResponse::PlayerAdded) {
            self.state.player_form.reset();
            if self.state.input_mode == InputMode::NewPlayer {
                self.state.input_mode = InputMode::Normal;
            }
        }

        let follow_up = self.sync.apply(response);

        if self.shown_tournament_id() != shown_before {
            self.state.bracket_view.reset();
        }
        let roster = self.sync.players().len();
        if self.state.selected_player >= roster {
            self.state.selected_player = roster.saturating_sub(1);
        }
        follow_up
    }

    fn shown_tournament_id(&self) -> Option<TournamentId> {
        self.sync.tournament().map(|t| t.id.clone())
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Players tab
    // -----------------------------------------------------------------------

    pub fn player_down(&mut self) {
        if self.state.selected_player + 1 < self.sync.players().len() {
            self.state.selected_player += 1;
        }
    }

    pub fn player_up(&mut self) {
        self.state.selected_player = self.state.selected_player.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Text input
    // -----------------------------------------------------------------------

    pub fn begin_tournament_id_input(&mut self) {
        self.state.id_input.clear();
        self.state.input_mode = InputMode::TournamentId;
    }

    /// Leave the id prompt and, if the id is usable, request that tournament.
    pub fn submit_tournament_id(&mut self) -> Option<NetworkRequest> {
        self.state.input_mode = InputMode::Normal;
        let raw = std::mem::take(&mut self.state.id_input);
        let result = self.sync.load_tournament(&raw);
        self.settle(result)
    }

    pub fn begin_player_form(&mut self) -> bool {
        if !self.state.admin.unlocked {
            return false;
        }
        self.update_tab(MenuItem::Players);
        self.state.input_mode = InputMode::NewPlayer;
        true
    }

    /// Submit the player form. It stays open until the service accepts the
    /// player.
    pub fn submit_player_form(&mut self) -> Option<NetworkRequest> {
        let result = self.sync.add_player(&self.state.player_form.draft);
        self.settle(result)
    }

    pub fn cancel_input(&mut self) {
        self.state.input_mode = InputMode::Normal;
        self.state.id_input.clear();
    }

    // -----------------------------------------------------------------------
    // Admin controls
    // -----------------------------------------------------------------------

    /// Watch normal-mode key presses for the unlock sequence. Returns true
    /// when this key unlocked the admin controls.
    pub fn observe_key(&mut self, key: KeyCode) -> bool {
        if !self.state.admin.observe(key) {
            return false;
        }
        info!("tournament controls unlocked");
        self.update_tab(MenuItem::Controls);
        true
    }

    pub fn toggle_match_mode(&mut self) {
        if self.state.admin.unlocked {
            self.state.admin.toggle_match_mode();
        }
    }

    pub fn create_tournament(&mut self) -> Option<NetworkRequest> {
        if !self.state.admin.unlocked {
            return None;
        }
        let result = self.sync.create_tournament(self.state.admin.match_mode);
        self.settle(result)
    }

    pub fn generate_matches(&mut self) -> Option<NetworkRequest> {
        if !self.state.admin.unlocked {
            return None;
        }
        let result = self.sync.generate_matches(self.state.admin.match_mode);
        self.settle(result)
    }

    pub fn start_game(&mut self) -> Option<NetworkRequest> {
        if !self.state.admin.unlocked {
            return None;
        }
        let result = self.sync.start_game();
        self.settle(result)
    }

    pub fn advance_round(&mut self) -> Option<NetworkRequest> {
        if !self.state.admin.unlocked {
            return None;
        }
        let result = self.sync.advance_round(self.state.admin.match_mode);
        self.settle(result)
    }

    pub fn toggle_polling(&mut self) {
        if self.sync.is_polling() {
            self.sync.stop_polling();
        } else if let Err(e) = self.sync.start_polling() {
            self.sync.report_error(e.to_string());
        }
    }

    pub fn dismiss_messages(&mut self) {
        self.sync.dismiss_messages();
    }

    fn settle(&mut self, result: Result<NetworkRequest, SyncError>) -> Option<NetworkRequest> {
        match result {
            Ok(request) => Some(request),
            Err(e) => {
                self.sync.report_error(e.to_string());
                None
            }
        }
    }
}
