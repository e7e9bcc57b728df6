use crate::state::messages::{LoadOrigin, NetworkRequest, NetworkResponse, Operation, RequestTicket};
use crate::state::refresher::PollTimer;
use crate::state::storage::SessionStore;
use battlesnake_api::{InvalidTournamentId, MatchMode, Player, PlayerDraft, Tournament, TournamentId};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No tournament loaded.
    Idle,
    /// Snapshot loaded, not refreshing on its own.
    Static,
    /// Snapshot refreshed every poll interval.
    Polling,
    /// The last load or poll failed; the previous snapshot is kept.
    Error,
}

impl SyncPhase {
    pub fn label(self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Static => "static",
            SyncPhase::Polling => "polling",
            SyncPhase::Error => "error",
        }
    }
}

/// Rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    InvalidTournamentId(InvalidTournamentId),
    NoTournament,
    NotEnoughPlayers { available: usize },
    IncompleteDraft { field: &'static str },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::InvalidTournamentId(e) => write!(f, "Invalid tournament id: {e}"),
            SyncError::NoTournament => write!(f, "No tournament loaded"),
            SyncError::NotEnoughPlayers { available } => {
                write!(f, "A tournament needs at least 2 players ({available} registered)")
            }
            SyncError::IncompleteDraft { field } => write!(f, "Player {field} is required"),
        }
    }
}

impl std::error::Error for SyncError {}

/// Owns the tournament snapshot and decides when it should keep refreshing.
///
/// This is the only writer of the snapshot. Every remote call goes out as a
/// [`NetworkRequest`] and comes back through [`TournamentSync::apply`]; the
/// returned requests are follow-ups the caller must dispatch.
pub struct TournamentSync {
    tournament: Option<Tournament>,
    players: Vec<Player>,
    /// Tournament the client is currently watching (or about to).
    selected: Option<TournamentId>,
    /// Bumped whenever `selected` changes, invalidating older responses.
    generation: u64,
    phase: SyncPhase,
    last_error: Option<String>,
    notice: Option<String>,
    last_refresh: Option<DateTime<Local>>,
    poll: PollTimer,
    store: SessionStore,
}

impl TournamentSync {
    pub fn new(
        network_requests: mpsc::Sender<NetworkRequest>,
        store: SessionStore,
        poll_interval: Duration,
    ) -> Self {
        Self {
            tournament: None,
            players: Vec::new(),
            selected: None,
            generation: 0,
            phase: SyncPhase::Idle,
            last_error: None,
            notice: None,
            last_refresh: None,
            poll: PollTimer::new(network_requests, poll_interval),
            store,
        }
    }

    // -----------------------------------------------------------------------
    // Observable state
    // -----------------------------------------------------------------------

    pub fn tournament(&self) -> Option<&Tournament> {
        self.tournament.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_active()
    }

    pub fn active_round(&self) -> Option<usize> {
        self.tournament.as_ref().and_then(Tournament::active_round)
    }

    pub fn selected_id(&self) -> Option<&TournamentId> {
        self.selected.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    /// Surface a message produced outside the controller, e.g. a validation error.
    pub fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.last_error = Some(message);
    }

    pub fn dismiss_messages(&mut self) {
        self.last_error = None;
        self.notice = None;
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Requests issued once on start: the roster, then the remembered tournament.
    pub fn startup_requests(&mut self) -> Vec<NetworkRequest> {
        let mut requests = vec![NetworkRequest::LoadPlayers];
        requests.extend(self.restore());
        requests
    }

    /// Load the tournament id remembered from the last session, if any.
    pub fn restore(&mut self) -> Option<NetworkRequest> {
        let id = self.store.saved_tournament_id()?;
        info!("restoring saved tournament {id}");
        let ticket = self.select(id);
        Some(NetworkRequest::LoadTournament { ticket, origin: LoadOrigin::Restore })
    }

    /// Validate an operator-entered id and request that tournament.
    pub fn load_tournament(&mut self, raw_id: &str) -> Result<NetworkRequest, SyncError> {
        let id: TournamentId = raw_id.parse().map_err(SyncError::InvalidTournamentId)?;
        let ticket = self.select(id);
        Ok(NetworkRequest::LoadTournament { ticket, origin: LoadOrigin::Manual })
    }

    /// Start the periodic refresh for the selected tournament. Idempotent.
    pub fn start_polling(&mut self) -> Result<bool, SyncError> {
        let ticket = self.ticket().ok_or(SyncError::NoTournament)?;
        let started = self.poll.start(ticket);
        self.phase = SyncPhase::Polling;
        Ok(started)
    }

    /// Stop the periodic refresh. A no-op when not polling.
    pub fn stop_polling(&mut self) -> bool {
        let stopped = self.poll.stop();
        if self.phase == SyncPhase::Polling {
            self.phase = self.resting_phase();
        }
        stopped
    }

    pub fn create_tournament(&self, mode: MatchMode) -> Result<NetworkRequest, SyncError> {
        if self.players.len() < 2 {
            return Err(SyncError::NotEnoughPlayers { available: self.players.len() });
        }
        let player_ids = self.players.iter().map(|p| p.id).collect();
        Ok(NetworkRequest::CreateTournament { player_ids, mode })
    }

    pub fn add_player(&self, draft: &PlayerDraft) -> Result<NetworkRequest, SyncError> {
        if let Some(field) = draft.missing_field() {
            return Err(SyncError::IncompleteDraft { field });
        }
        Ok(NetworkRequest::AddPlayer { draft: draft.clone() })
    }

    pub fn generate_matches(&self, mode: MatchMode) -> Result<NetworkRequest, SyncError> {
        let ticket = self.loaded_ticket()?;
        Ok(NetworkRequest::GenerateMatches { ticket, mode })
    }

    pub fn start_game(&self) -> Result<NetworkRequest, SyncError> {
        let ticket = self.loaded_ticket()?;
        Ok(NetworkRequest::StartGame { ticket })
    }

    pub fn advance_round(&self, mode: MatchMode) -> Result<NetworkRequest, SyncError> {
        let ticket = self.loaded_ticket()?;
        Ok(NetworkRequest::AdvanceRound { ticket, mode })
    }

    /// Cancel the poll timer; used when the view goes away.
    pub fn shutdown(&mut self) {
        self.poll.stop();
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Fold a network response into the controller state. Returns follow-up
    /// requests to dispatch.
    pub fn apply(&mut self, response: NetworkResponse) -> Vec<NetworkRequest> {
        match response {
            NetworkResponse::LoadingStateChanged { .. } => {}
            NetworkResponse::PlayersLoaded { players } => {
                debug!("roster loaded: {} players", players.len());
                self.players = players;
            }
            NetworkResponse::PlayerAdded => {
                self.notice = Some("Player added".to_string());
                return vec![NetworkRequest::LoadPlayers];
            }
            NetworkResponse::TournamentLoaded { ticket, origin, tournament } => {
                self.on_tournament_loaded(ticket, origin, tournament);
            }
            NetworkResponse::TournamentPolled { ticket, tournament } => {
                self.on_tournament_polled(ticket, tournament);
            }
            NetworkResponse::TournamentCreated { tournament, mode } => {
                return self.on_tournament_created(tournament, mode);
            }
            NetworkResponse::MatchesGenerated { ticket, tournament } => {
                if self.accepts(&ticket, "generated matches") {
                    self.replace_snapshot(tournament);
                }
            }
            NetworkResponse::GameStarted { ticket } => {
                if self.accepts(&ticket, "game start") {
                    self.poll.start(ticket);
                    self.phase = SyncPhase::Polling;
                    self.notice = Some("Games started".to_string());
                }
            }
            NetworkResponse::RoundAdvanced { ticket, tournament } => {
                if self.accepts(&ticket, "advanced round") {
                    // Advancing is a manual override: it always halts polling.
                    self.poll.stop();
                    self.replace_snapshot(tournament);
                    self.phase = SyncPhase::Static;
                }
            }
            NetworkResponse::Failed { operation, message } => self.on_failure(operation, message),
        }
        Vec::new()
    }

    fn on_tournament_loaded(&mut self, ticket: RequestTicket, origin: LoadOrigin, tournament: Tournament) {
        if !self.accepts(&ticket, "tournament load") {
            return;
        }
        let was_polling = self.poll.is_active();
        self.replace_snapshot(tournament);
        self.store.save_tournament_id(&ticket.tournament_id);

        if was_polling && self.active_round().is_some() {
            self.phase = SyncPhase::Polling;
        } else {
            self.poll.stop();
            self.phase = SyncPhase::Static;
        }
        if origin == LoadOrigin::Restore {
            self.notice = Some(format!("Restored tournament {}", ticket.tournament_id));
        }
        info!("tournament {} loaded", ticket.tournament_id);
    }

    fn on_tournament_polled(&mut self, ticket: RequestTicket, tournament: Tournament) {
        self.poll.complete(&ticket);
        if !self.accepts(&ticket, "poll") || !self.polls(&ticket) {
            return;
        }
        self.replace_snapshot(tournament);
        match self.active_round() {
            Some(round) => {
                debug!("round {round} still in progress");
                self.phase = SyncPhase::Polling;
            }
            None => {
                info!("no round in progress, polling finished");
                self.poll.stop();
                self.phase = SyncPhase::Static;
            }
        }
    }

    fn on_tournament_created(&mut self, tournament: Tournament, mode: MatchMode) -> Vec<NetworkRequest> {
        info!("tournament {} created", tournament.id);
        let ticket = self.select(tournament.id.clone());
        self.store.save_tournament_id(&ticket.tournament_id);
        self.replace_snapshot(tournament);
        self.phase = SyncPhase::Static;
        vec![NetworkRequest::GenerateMatches { ticket, mode }]
    }

    fn on_failure(&mut self, operation: Operation, message: String) {
        let text = format!("{}: {message}", operation.failure_label());
        match &operation {
            Operation::LoadPlayers | Operation::AddPlayer => {}
            Operation::CreateTournament => self.store.clear_tournament_id(),
            Operation::LoadTournament { ticket, origin } => {
                if !self.accepts(ticket, "failed load") {
                    return;
                }
                // Never retry a broken id on the next launch.
                self.store.clear_tournament_id();
                self.poll.stop();
                let fallback = self.tournament.as_ref().map(|t| t.id.clone());
                self.reselect(fallback);
                if *origin == LoadOrigin::Restore {
                    warn!("{text}");
                    self.notice = Some(operation.failure_label().to_string());
                    self.phase = self.resting_phase();
                    return;
                }
                self.phase = SyncPhase::Error;
            }
            Operation::PollTournament { ticket } => {
                self.poll.complete(ticket);
                if !self.accepts(ticket, "failed poll") || !self.polls(ticket) {
                    return;
                }
                // Fail closed: stop hammering a service that is already failing.
                self.poll.stop();
                self.phase = SyncPhase::Error;
            }
            Operation::GenerateMatches { ticket }
            | Operation::StartGame { ticket }
            | Operation::AdvanceRound { ticket } => {
                if !self.accepts(ticket, "failed command") {
                    return;
                }
            }
        }
        self.report_error(text);
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ticket(&self) -> Option<RequestTicket> {
        self.selected.clone().map(|tournament_id| RequestTicket {
            tournament_id,
            generation: self.generation,
        })
    }

    fn loaded_ticket(&self) -> Result<RequestTicket, SyncError> {
        if self.tournament.is_none() {
            return Err(SyncError::NoTournament);
        }
        self.ticket().ok_or(SyncError::NoTournament)
    }

    /// Point the controller at `id`. Switching to a different tournament
    /// cancels the running poll and invalidates in-flight responses.
    fn select(&mut self, id: TournamentId) -> RequestTicket {
        if self.selected.as_ref() != Some(&id) {
            self.reselect(Some(id.clone()));
        }
        RequestTicket { tournament_id: id, generation: self.generation }
    }

    fn reselect(&mut self, id: Option<TournamentId>) {
        self.poll.stop();
        self.generation += 1;
        self.selected = id;
    }

    fn accepts(&self, ticket: &RequestTicket, what: &str) -> bool {
        let current = self.selected.as_ref() == Some(&ticket.tournament_id) && self.generation == ticket.generation;
        if !current {
            debug!(
                "discarding stale {what} response for tournament {} (generation {}, current {})",
                ticket.tournament_id, ticket.generation, self.generation
            );
        }
        current
    }

    /// Whether a poll for `ticket` is still wanted. Late poll results that land
    /// after polling stopped are dropped so they cannot overwrite newer data.
    fn polls(&self, ticket: &RequestTicket) -> bool {
        let wanted = self.poll.is_active() && self.poll.ticket() == Some(ticket);
        if !wanted {
            debug!("discarding poll result for tournament {} after polling stopped", ticket.tournament_id);
        }
        wanted
    }

    fn replace_snapshot(&mut self, tournament: Tournament) {
        self.tournament = Some(tournament);
        self.last_refresh = Some(Local::now());
        self.last_error = None;
    }

    fn resting_phase(&self) -> SyncPhase {
        if self.tournament.is_some() { SyncPhase::Static } else { SyncPhase::Idle }
    }
}
