use crate::state::messages::{NetworkRequest, NetworkResponse};
use battlesnake_api::client::{ApiResult, BattlesnakeApi};
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Executes requests against the tournament service one at a time, in the
/// order they were sent.
pub struct NetworkWorker {
    client: BattlesnakeApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: BattlesnakeApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let operation = request.operation();
            let result = self.handle(request).await;

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                warn!("{}: {err}", operation.failure_label());
                NetworkResponse::Failed { operation, message: err.to_string() }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> ApiResult<NetworkResponse> {
        match request {
            NetworkRequest::LoadPlayers => {
                debug!("loading players");
                let players = self.client.fetch_players().await?;
                Ok(NetworkResponse::PlayersLoaded { players })
            }
            NetworkRequest::AddPlayer { draft } => {
                debug!("adding player {}", draft.name.trim());
                self.client.add_player(&draft).await?;
                Ok(NetworkResponse::PlayerAdded)
            }
            NetworkRequest::LoadTournament { ticket, origin } => {
                debug!("loading tournament {}", ticket.tournament_id);
                let tournament = self.client.fetch_tournament(&ticket.tournament_id).await?;
                Ok(NetworkResponse::TournamentLoaded { ticket, origin, tournament })
            }
            NetworkRequest::PollTournament { ticket } => {
                debug!("polling tournament {}", ticket.tournament_id);
                let tournament = self.client.fetch_tournament(&ticket.tournament_id).await?;
                Ok(NetworkResponse::TournamentPolled { ticket, tournament })
            }
            NetworkRequest::CreateTournament { player_ids, mode } => {
                debug!("creating tournament with {} players", player_ids.len());
                let tournament = self.client.create_tournament(&player_ids).await?;
                Ok(NetworkResponse::TournamentCreated { tournament, mode })
            }
            NetworkRequest::GenerateMatches { ticket, mode } => {
                debug!("generating {} matches for {}", mode.label(), ticket.tournament_id);
                let tournament = self.client.generate_matches(&ticket.tournament_id, mode).await?;
                Ok(NetworkResponse::MatchesGenerated { ticket, tournament })
            }
            NetworkRequest::StartGame { ticket } => {
                debug!("starting games for {}", ticket.tournament_id);
                self.client.start_game(&ticket.tournament_id).await?;
                Ok(NetworkResponse::GameStarted { ticket })
            }
            NetworkRequest::AdvanceRound { ticket, mode } => {
                debug!("advancing {} ({})", ticket.tournament_id, mode.label());
                let tournament = self.client.advance_round(&ticket.tournament_id, mode).await?;
                Ok(NetworkResponse::RoundAdvanced { ticket, tournament })
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
