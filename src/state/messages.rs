use crate::state::network::LoadingState;
use battlesnake_api::{MatchMode, Player, PlayerDraft, PlayerId, Tournament, TournamentId};
use crossterm::event::KeyEvent;

/// Identifies which tournament selection a request was issued for. A response
/// is only applied while its ticket still matches the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub tournament_id: TournamentId,
    pub generation: u64,
}

/// Why a tournament load was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Restoring the id remembered from the previous session.
    Restore,
    /// Operator entered an id.
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadPlayers,
    AddPlayer { draft: PlayerDraft },
    LoadTournament { ticket: RequestTicket, origin: LoadOrigin },
    PollTournament { ticket: RequestTicket },
    CreateTournament { player_ids: Vec<PlayerId>, mode: MatchMode },
    GenerateMatches { ticket: RequestTicket, mode: MatchMode },
    StartGame { ticket: RequestTicket },
    AdvanceRound { ticket: RequestTicket, mode: MatchMode },
}

impl NetworkRequest {
    /// The part of the request needed to route its failure.
    pub fn operation(&self) -> Operation {
        match self {
            NetworkRequest::LoadPlayers => Operation::LoadPlayers,
            NetworkRequest::AddPlayer { .. } => Operation::AddPlayer,
            NetworkRequest::LoadTournament { ticket, origin } => Operation::LoadTournament {
                ticket: ticket.clone(),
                origin: *origin,
            },
            NetworkRequest::PollTournament { ticket } => Operation::PollTournament { ticket: ticket.clone() },
            NetworkRequest::CreateTournament { .. } => Operation::CreateTournament,
            NetworkRequest::GenerateMatches { ticket, .. } => {
                Operation::GenerateMatches { ticket: ticket.clone() }
            }
            NetworkRequest::StartGame { ticket } => Operation::StartGame { ticket: ticket.clone() },
            NetworkRequest::AdvanceRound { ticket, .. } => Operation::AdvanceRound { ticket: ticket.clone() },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    LoadPlayers,
    AddPlayer,
    LoadTournament { ticket: RequestTicket, origin: LoadOrigin },
    PollTournament { ticket: RequestTicket },
    CreateTournament,
    GenerateMatches { ticket: RequestTicket },
    StartGame { ticket: RequestTicket },
    AdvanceRound { ticket: RequestTicket },
}

impl Operation {
    /// Prefix for the message shown when the operation fails.
    pub fn failure_label(&self) -> &'static str {
        match self {
            Operation::LoadPlayers => "Failed to fetch players",
            Operation::AddPlayer => "Failed to add player",
            Operation::LoadTournament { origin: LoadOrigin::Restore, .. } => {
                "Saved tournament could not be loaded"
            }
            Operation::LoadTournament { .. } => "Failed to load tournament",
            Operation::PollTournament { .. } => "Failed to fetch tournament updates",
            Operation::CreateTournament => "Failed to create tournament",
            Operation::GenerateMatches { .. } => "Failed to generate matches",
            Operation::StartGame { .. } => "Failed to start games",
            Operation::AdvanceRound { .. } => "Failed to advance round",
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    PlayersLoaded { players: Vec<Player> },
    PlayerAdded,
    TournamentLoaded { ticket: RequestTicket, origin: LoadOrigin, tournament: Tournament },
    TournamentPolled { ticket: RequestTicket, tournament: Tournament },
    TournamentCreated { tournament: Tournament, mode: MatchMode },
    MatchesGenerated { ticket: RequestTicket, tournament: Tournament },
    GameStarted { ticket: RequestTicket },
    RoundAdvanced { ticket: RequestTicket, tournament: Tournament },
    Failed { operation: Operation, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
