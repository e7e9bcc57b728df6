//! Raw JSON shapes exchanged with the tournament service.
//! These map onto the clean domain types through the `From` impls below.
use crate::{Match, Player, PlayerDraft, PlayerId, Round, Tournament, TournamentId};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// The service is not consistent about ids: some come back as JSON numbers,
/// some as strings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl Default for WireId {
    fn default() -> Self {
        WireId::Text(String::new())
    }
}

impl WireId {
    pub fn into_text(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// Player ids must be numeric; the palette lookup depends on it.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(try_from = "WireId")]
pub struct NumericId(pub u64);

impl TryFrom<WireId> for NumericId {
    type Error = String;

    fn try_from(id: WireId) -> Result<Self, Self::Error> {
        match id {
            WireId::Number(n) => Ok(NumericId(n)),
            WireId::Text(s) => s
                .trim()
                .parse()
                .map(NumericId)
                .map_err(|_| format!("player id {s:?} is not numeric")),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tournament snapshot  (GET /tournament/{id} and the mutating endpoints)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TournamentWire {
    #[serde(default)]
    pub id: WireId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rounds: Vec<RoundWire>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoundWire {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<MatchWire>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWire {
    #[serde(default)]
    pub id: WireId,
    /// Entries can be `null` while a slot is still waiting for a winner upstream.
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<Option<PlayerWire>>,
    #[serde(default)]
    pub winner_player_id: Option<NumericId>,
    #[serde(default)]
    pub second_place_player_id: Option<NumericId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: NumericId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snake_name: String,
    #[serde(default)]
    pub snake_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentBody {
    pub player_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayerBody<'a> {
    pub name: &'a str,
    pub snake_name: &'a str,
    pub snake_url: &'a str,
}

impl<'a> From<&'a PlayerDraft> for NewPlayerBody<'a> {
    fn from(draft: &'a PlayerDraft) -> Self {
        Self {
            name: draft.name.trim(),
            snake_name: draft.snake_name.trim(),
            snake_url: draft.snake_url.trim(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire → domain
// ---------------------------------------------------------------------------

impl From<TournamentWire> for Tournament {
    fn from(raw: TournamentWire) -> Self {
        Tournament {
            id: TournamentId::from_remote(raw.id.into_text()),
            rounds: raw.rounds.into_iter().map(Round::from).collect(),
        }
    }
}

impl From<RoundWire> for Round {
    fn from(raw: RoundWire) -> Self {
        Round {
            matches: raw.matches.into_iter().map(Match::from).collect(),
        }
    }
}

impl From<MatchWire> for Match {
    fn from(raw: MatchWire) -> Self {
        let open_slots = raw.players.iter().filter(|slot| slot.is_none()).count();
        Match {
            id: raw.id.into_text(),
            players: raw.players.into_iter().flatten().map(Player::from).collect(),
            open_slots,
            winner_player_id: raw.winner_player_id.map(|id| PlayerId(id.0)),
            second_place_player_id: raw.second_place_player_id.map(|id| PlayerId(id.0)),
        }
    }
}

impl From<PlayerWire> for Player {
    fn from(raw: PlayerWire) -> Self {
        Player {
            id: PlayerId(raw.id.0),
            name: raw.name,
            snake_name: raw.snake_name,
            snake_url: raw.snake_url.filter(|url| !url.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;

    #[test]
    fn snapshot_with_numeric_ids_maps_to_domain() {
        let raw: TournamentWire = serde_json::from_str(
            r#"{
                "id": 12,
                "rounds": [
                    {"matches": [
                        {"id": 100, "players": [
                            {"id": 1, "name": "Ada", "snakeName": "noodle"},
                            {"id": 2, "name": "Bob", "snakeName": "hiss"}
                        ], "winnerPlayerId": 2, "secondPlacePlayerId": 1}
                    ]},
                    {"matches": [{"id": 101, "players": []}]}
                ]
            }"#,
        )
        .unwrap();
        let t = Tournament::from(raw);
        assert_eq!(t.id.as_str(), "12");
        assert_eq!(t.rounds.len(), 2);
        let first = &t.rounds[0].matches[0];
        assert_eq!(first.id, "100");
        assert_eq!(first.winner().map(|p| p.name.as_str()), Some("Bob"));
        assert_eq!(first.runner_up().map(|p| p.snake_name.as_str()), Some("noodle"));
        assert_eq!(t.rounds[1].matches[0].status(), MatchStatus::Bye);
    }

    #[test]
    fn string_ids_and_nulls_are_tolerated() {
        let raw: TournamentWire = serde_json::from_str(
            r#"{
                "id": "mock-tournament-1",
                "rounds": [
                    {"matches": [
                        {"id": "m1", "players": [{"id": "5", "name": "Mamba", "snakeName": null}, null],
                         "winnerPlayerId": null}
                    ]},
                    {"matches": null}
                ]
            }"#,
        )
        .unwrap();
        let t = Tournament::from(raw);
        assert_eq!(t.id.as_str(), "mock-tournament-1");
        let m = &t.rounds[0].matches[0];
        assert_eq!(m.players.len(), 1);
        assert_eq!(m.open_slots, 1);
        assert_eq!(m.slot_count(), 2);
        assert_eq!(m.players[0].id, PlayerId(5));
        assert_eq!(m.players[0].snake_name, "");
        assert!(m.is_in_progress());
        assert!(t.rounds[1].matches.is_empty());
    }

    #[test]
    fn unfilled_slots_keep_the_next_round_active() {
        let raw: TournamentWire = serde_json::from_str(
            r#"{
                "id": 4,
                "rounds": [
                    {"matches": [
                        {"id": "a", "players": [{"id": 1}, {"id": 2}], "winnerPlayerId": 1},
                        {"id": "b", "players": [{"id": 3}, {"id": 4}], "winnerPlayerId": 4}
                    ]},
                    {"matches": [{"id": "final", "players": [null, null]}]}
                ]
            }"#,
        )
        .unwrap();
        let t = Tournament::from(raw);
        let last = &t.rounds[1].matches[0];
        assert!(last.players.is_empty());
        assert_eq!(last.slot_count(), 2);
        assert_eq!(last.status(), MatchStatus::InProgress);
        assert_eq!(t.active_round(), Some(1));
    }

    #[test]
    fn missing_rounds_deserialize_as_empty() {
        let raw: TournamentWire = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert!(Tournament::from(raw).rounds.is_empty());
        let raw: TournamentWire = serde_json::from_str(r#"{"id": 3, "rounds": null}"#).unwrap();
        assert!(Tournament::from(raw).rounds.is_empty());
    }

    #[test]
    fn non_numeric_player_id_is_rejected() {
        let parsed = serde_json::from_str::<PlayerWire>(r#"{"id": "abc", "name": "x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn request_bodies_use_camel_case() {
        let body = serde_json::to_value(CreateTournamentBody { player_ids: vec![1, 2] }).unwrap();
        assert_eq!(body, serde_json::json!({"playerIds": [1, 2]}));

        let draft = PlayerDraft {
            name: " Ada ".into(),
            snake_name: "noodle".into(),
            snake_url: "http://snake.local".into(),
        };
        let body = serde_json::to_value(NewPlayerBody::from(&draft)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"name": "Ada", "snakeName": "noodle", "snakeUrl": "http://snake.local"})
        );
    }
}
