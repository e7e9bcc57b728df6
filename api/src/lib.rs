pub mod client;
pub mod wire;

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Domain types, independent of the JSON wire format
// ---------------------------------------------------------------------------

/// Opaque tournament identifier. The service hands out numeric ids, but they
/// are kept as text so a snapshot id round-trips exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TournamentId(String);

impl TournamentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an id received from the service without validation.
    pub fn from_remote(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for TournamentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Rejected user-entered tournament id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTournamentId(pub String);

impl fmt::Display for InvalidTournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "tournament id is empty")
        } else {
            write!(f, "tournament id {:?} is not numeric", self.0)
        }
    }
}

impl std::error::Error for InvalidTournamentId {}

impl FromStr for TournamentId {
    type Err = InvalidTournamentId;

    /// Accepts a non-empty run of ASCII digits, surrounding whitespace ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTournamentId(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Player identifier, unique across the whole player pool and stable across rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tournament {
    pub id: TournamentId,
    /// Index 0 is the first round, the last entry is the final.
    pub rounds: Vec<Round>,
}

impl Tournament {
    /// Index of the earliest round holding a populated match without a winner.
    ///
    /// Rounds made only of empty placeholder matches never count as active, so
    /// trailing rounds that have not been filled yet do not keep polling alive.
    pub fn active_round(&self) -> Option<usize> {
        self.rounds
            .iter()
            .position(|round| round.matches.iter().any(Match::is_in_progress))
    }

    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(|r| r.matches.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Round {
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// No slots at all, assigned or open.
    Bye,
    InProgress,
    Complete,
}

/// Where a player finished inside one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Winner,
    RunnerUp,
    Unplaced,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: String,
    /// Not fixed at two; free-for-all rounds put more entrants in one match.
    pub players: Vec<Player>,
    /// Slots still waiting for a winner from an earlier match.
    pub open_slots: usize,
    pub winner_player_id: Option<PlayerId>,
    pub second_place_player_id: Option<PlayerId>,
}

impl Match {
    /// Assigned players plus open slots.
    pub fn slot_count(&self) -> usize {
        self.players.len() + self.open_slots
    }

    pub fn status(&self) -> MatchStatus {
        if self.slot_count() == 0 {
            MatchStatus::Bye
        } else if self.winner_player_id.is_none() {
            MatchStatus::InProgress
        } else {
            MatchStatus::Complete
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status() == MatchStatus::InProgress
    }

    pub fn winner(&self) -> Option<&Player> {
        let id = self.winner_player_id?;
        self.players.iter().find(|p| p.id == id)
    }

    pub fn runner_up(&self) -> Option<&Player> {
        let id = self.second_place_player_id?;
        self.players.iter().find(|p| p.id == id)
    }

    pub fn placement(&self, player: PlayerId) -> Placement {
        if self.slot_count() == 0 {
            Placement::Unplaced
        } else if self.winner_player_id == Some(player) {
            Placement::Winner
        } else if self.second_place_player_id == Some(player) {
            Placement::RunnerUp
        } else {
            Placement::Unplaced
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub snake_name: String,
    /// Only present in the roster listing; bracket snapshots usually omit it.
    pub snake_url: Option<String>,
}

/// Fields collected by the "add player" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDraft {
    pub name: String,
    pub snake_name: String,
    pub snake_url: String,
}

impl PlayerDraft {
    /// First required field left blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("snake name", &self.snake_name),
            ("snake url", &self.snake_url),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
    }
}

/// Pairing format passed to match generation and round advancement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    OneVsOne,
    FreeForAll,
}

impl MatchMode {
    /// The service takes the mode as an `isOneVsOne` boolean path segment.
    pub fn as_path_segment(self) -> &'static str {
        match self {
            MatchMode::OneVsOne => "true",
            MatchMode::FreeForAll => "false",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            MatchMode::OneVsOne => MatchMode::FreeForAll,
            MatchMode::FreeForAll => MatchMode::OneVsOne,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchMode::OneVsOne => "1v1",
            MatchMode::FreeForAll => "free-for-all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64) -> Player {
        Player {
            id: PlayerId(id),
            name: format!("Player {id}"),
            snake_name: format!("snake-{id}"),
            snake_url: None,
        }
    }

    fn pending(ids: &[u64]) -> Match {
        Match {
            id: format!("m{}", ids.first().copied().unwrap_or(0)),
            players: ids.iter().copied().map(player).collect(),
            open_slots: 0,
            winner_player_id: None,
            second_place_player_id: None,
        }
    }

    fn decided(ids: &[u64], winner: u64) -> Match {
        Match {
            winner_player_id: Some(PlayerId(winner)),
            ..pending(ids)
        }
    }

    fn tournament(rounds: Vec<Vec<Match>>) -> Tournament {
        Tournament {
            id: TournamentId::from(1),
            rounds: rounds.into_iter().map(|matches| Round { matches }).collect(),
        }
    }

    #[test]
    fn empty_match_is_a_bye_even_with_a_winner_set() {
        let m = Match {
            winner_player_id: Some(PlayerId(3)),
            ..Match::default()
        };
        assert_eq!(m.status(), MatchStatus::Bye);
        assert_eq!(m.placement(PlayerId(3)), Placement::Unplaced);
    }

    #[test]
    fn open_slots_alone_keep_a_match_in_progress() {
        let m = Match { open_slots: 2, ..Match::default() };
        assert_eq!(m.slot_count(), 2);
        assert_eq!(m.status(), MatchStatus::InProgress);
        assert_eq!(tournament(vec![vec![decided(&[1, 2], 1)], vec![m]]).active_round(), Some(1));
    }

    #[test]
    fn match_status_follows_players_and_winner() {
        assert_eq!(pending(&[1, 2]).status(), MatchStatus::InProgress);
        assert_eq!(decided(&[1, 2], 2).status(), MatchStatus::Complete);
    }

    #[test]
    fn winner_and_runner_up_are_looked_up_in_the_match() {
        let mut m = decided(&[1, 2, 3], 3);
        m.second_place_player_id = Some(PlayerId(1));
        assert_eq!(m.winner().map(|p| p.id), Some(PlayerId(3)));
        assert_eq!(m.runner_up().map(|p| p.id), Some(PlayerId(1)));
        assert_eq!(m.placement(PlayerId(2)), Placement::Unplaced);

        // A winner id that is not among the players resolves to nothing.
        let foreign = decided(&[1, 2], 9);
        assert!(foreign.winner().is_none());
    }

    #[test]
    fn active_round_is_none_without_rounds() {
        assert_eq!(tournament(vec![]).active_round(), None);
    }

    #[test]
    fn active_round_ignores_empty_and_decided_matches() {
        let t = tournament(vec![
            vec![decided(&[1, 2], 1), decided(&[3, 4], 4)],
            vec![Match::default()],
        ]);
        assert_eq!(t.active_round(), None);
    }

    #[test]
    fn active_round_progresses_through_the_bracket() {
        let mut t = tournament(vec![
            vec![pending(&[1, 2]), pending(&[3, 4])],
            vec![Match::default()],
        ]);
        assert_eq!(t.active_round(), Some(0));

        t.rounds[0].matches = vec![decided(&[1, 2], 1), decided(&[3, 4], 3)];
        t.rounds[1].matches = vec![pending(&[1, 3])];
        assert_eq!(t.active_round(), Some(1));

        t.rounds[1].matches = vec![decided(&[1, 3], 3)];
        assert_eq!(t.active_round(), None);
    }

    #[test]
    fn active_round_picks_the_earliest_pending_round() {
        let t = tournament(vec![
            vec![decided(&[1, 2], 1), pending(&[3, 4])],
            vec![pending(&[1, 5])],
        ]);
        assert_eq!(t.active_round(), Some(0));
    }

    #[test]
    fn tournament_id_parsing_requires_digits() {
        assert_eq!("42".parse::<TournamentId>().map(|id| id.to_string()), Ok("42".into()));
        assert_eq!(" 7 ".parse::<TournamentId>().map(|id| id.to_string()), Ok("7".into()));
        assert!("".parse::<TournamentId>().is_err());
        assert!("   ".parse::<TournamentId>().is_err());
        assert!("abc".parse::<TournamentId>().is_err());
        assert!("12a".parse::<TournamentId>().is_err());
        assert!("-3".parse::<TournamentId>().is_err());
    }

    #[test]
    fn player_draft_reports_first_blank_field() {
        let mut draft = PlayerDraft::default();
        assert_eq!(draft.missing_field(), Some("name"));
        draft.name = "Ada".into();
        draft.snake_name = "  ".into();
        assert_eq!(draft.missing_field(), Some("snake name"));
        draft.snake_name = "noodle".into();
        draft.snake_url = "http://localhost:8000".into();
        assert_eq!(draft.missing_field(), None);
    }

    #[test]
    fn match_mode_path_segments() {
        assert_eq!(MatchMode::OneVsOne.as_path_segment(), "true");
        assert_eq!(MatchMode::FreeForAll.as_path_segment(), "false");
        assert_eq!(MatchMode::default().toggle(), MatchMode::FreeForAll);
    }
}
