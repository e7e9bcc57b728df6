use crate::wire::{CreateTournamentBody, NewPlayerBody, PlayerWire, TournamentWire};
use crate::{MatchMode, Player, PlayerDraft, PlayerId, Tournament, TournamentId};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://bs-api.desperate.dk/api";

/// Client for the Battlesnake tournament service.
///
/// Every call is a single request/response exchange: no retries, and any
/// non-2xx status is reported as [`ApiError::Api`].
#[derive(Debug, Clone)]
pub struct BattlesnakeApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for BattlesnakeApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => match e.status() {
                Some(status) => write!(f, "Service returned {status} for {url}"),
                None => write!(f, "API error for {url}: {e}"),
            },
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::Other(_) => None,
        }
    }
}

impl BattlesnakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent("snakebracket/0.1 (terminal tournament viewer)")
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /tournament/{id}`
    pub async fn fetch_tournament(&self, id: &TournamentId) -> ApiResult<Tournament> {
        let url = format!("{}/tournament/{id}", self.base_url);
        let raw: TournamentWire = self.json(self.client.get(&url), &url).await?;
        Ok(raw.into())
    }

    /// `GET /players`
    pub async fn fetch_players(&self) -> ApiResult<Vec<Player>> {
        let url = format!("{}/players", self.base_url);
        let raw: Vec<PlayerWire> = self.json(self.client.get(&url), &url).await?;
        Ok(raw.into_iter().map(Player::from).collect())
    }

    /// `POST /player`. The response body carries nothing we use.
    pub async fn add_player(&self, draft: &PlayerDraft) -> ApiResult<()> {
        let url = format!("{}/player", self.base_url);
        let request = self.client.post(&url).json(&NewPlayerBody::from(draft));
        self.send(request, &url).await.map(drop)
    }

    /// `POST /tournament` with the participating player ids.
    pub async fn create_tournament(&self, player_ids: &[PlayerId]) -> ApiResult<Tournament> {
        let url = format!("{}/tournament", self.base_url);
        let body = CreateTournamentBody {
            player_ids: player_ids.iter().map(|id| id.0).collect(),
        };
        let raw: TournamentWire = self.json(self.client.post(&url).json(&body), &url).await?;
        Ok(raw.into())
    }

    /// `POST /tournament/{id}/generate-matches/{isOneVsOne}`
    pub async fn generate_matches(&self, id: &TournamentId, mode: MatchMode) -> ApiResult<Tournament> {
        let url = format!(
            "{}/tournament/{id}/generate-matches/{}",
            self.base_url,
            mode.as_path_segment()
        );
        let raw: TournamentWire = self.json(self.client.post(&url), &url).await?;
        Ok(raw.into())
    }

    /// `POST /tournament/{id}/start-game`
    pub async fn start_game(&self, id: &TournamentId) -> ApiResult<()> {
        let url = format!("{}/tournament/{id}/start-game", self.base_url);
        self.send(self.client.post(&url), &url).await.map(drop)
    }

    /// `POST /tournament/{id}/advance-round/{isOneVsOne}`
    pub async fn advance_round(&self, id: &TournamentId, mode: MatchMode) -> ApiResult<Tournament> {
        let url = format!(
            "{}/tournament/{id}/advance-round/{}",
            self.base_url,
            mode.as_path_segment()
        );
        let raw: TournamentWire = self.json(self.client.post(&url), &url).await?;
        Ok(raw.into())
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ApiResult<reqwest::Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<T> {
        self.send(request, url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const SNAPSHOT: &str = r#"{
        "id": 7,
        "rounds": [
            {"matches": [
                {"id": 1, "players": [
                    {"id": 1, "name": "Ada", "snakeName": "noodle"},
                    {"id": 2, "name": "Bob", "snakeName": "hiss"}
                ], "winnerPlayerId": null},
                {"id": 2, "players": [
                    {"id": 3, "name": "Cy", "snakeName": "coil"},
                    {"id": 4, "name": "Di", "snakeName": "fang"}
                ], "winnerPlayerId": 4}
            ]},
            {"matches": [{"id": 3, "players": []}]}
        ]
    }"#;

    fn id(n: u64) -> TournamentId {
        TournamentId::from(n)
    }

    #[tokio::test]
    async fn fetch_tournament_maps_the_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tournament/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SNAPSHOT)
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        let tournament = api.fetch_tournament(&id(7)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(tournament.id, id(7));
        assert_eq!(tournament.rounds.len(), 2);
        assert_eq!(tournament.rounds[0].matches[1].winner_player_id, Some(PlayerId(4)));
        assert_eq!(tournament.active_round(), Some(0));
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tournament/99")
            .with_status(404)
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        let err = api.fetch_tournament(&id(99)).await.unwrap_err();

        assert!(matches!(err, ApiError::Api(..)), "got {err:?}");
        assert!(err.to_string().contains("404"), "message: {err}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/players")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        let err = api.fetch_players().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(..)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let api = BattlesnakeApi::with_base_url("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        let err = api.fetch_players().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(..)), "got {err:?}");
    }

    #[tokio::test]
    async fn fetch_players_keeps_snake_urls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/players")
            .with_status(200)
            .with_body(
                r#"[{"id": 1, "name": "Ada", "snakeName": "noodle", "snakeUrl": "http://a.local"},
                    {"id": 2, "name": "Bob", "snakeName": "hiss", "snakeUrl": ""}]"#,
            )
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(format!("{}/", server.url()));
        let players = api.fetch_players().await.unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].snake_url.as_deref(), Some("http://a.local"));
        assert_eq!(players[1].snake_url, None);
    }

    #[tokio::test]
    async fn add_player_posts_camel_case_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/player")
            .match_body(Matcher::Json(json!({
                "name": "Ada",
                "snakeName": "noodle",
                "snakeUrl": "http://a.local"
            })))
            .with_status(201)
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        let draft = PlayerDraft {
            name: "Ada".into(),
            snake_name: "noodle".into(),
            snake_url: "http://a.local".into(),
        };
        api.add_player(&draft).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_tournament_sends_player_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tournament")
            .match_body(Matcher::Json(json!({"playerIds": [1, 2, 3, 4]})))
            .with_status(200)
            .with_body(SNAPSHOT)
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        let ids: Vec<PlayerId> = (1..=4).map(PlayerId).collect();
        let tournament = api.create_tournament(&ids).await.unwrap();
        mock.assert_async().await;
        assert_eq!(tournament.id, id(7));
    }

    #[tokio::test]
    async fn mode_is_encoded_in_the_path() {
        let mut server = mockito::Server::new_async().await;
        let generate = server
            .mock("POST", "/tournament/7/generate-matches/true")
            .with_status(200)
            .with_body(SNAPSHOT)
            .create_async()
            .await;
        let advance = server
            .mock("POST", "/tournament/7/advance-round/false")
            .with_status(200)
            .with_body(SNAPSHOT)
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        api.generate_matches(&id(7), MatchMode::OneVsOne).await.unwrap();
        api.advance_round(&id(7), MatchMode::FreeForAll).await.unwrap();
        generate.assert_async().await;
        advance.assert_async().await;
    }

    #[tokio::test]
    async fn start_game_ignores_the_response_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tournament/7/start-game")
            .with_status(200)
            .with_body("games started")
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        api.start_game(&id(7)).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn start_game_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/tournament/7/start-game")
            .with_status(500)
            .create_async()
            .await;

        let api = BattlesnakeApi::with_base_url(server.url());
        let err = api.start_game(&id(7)).await.unwrap_err();
        assert!(err.to_string().contains("500"), "message: {err}");
    }
}
