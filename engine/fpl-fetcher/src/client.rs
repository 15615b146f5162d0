use anyhow::Context;
use async_trait::async_trait;
use lps_engine::{
    CompletedGameweeks, EntryId, Gameweek, LeagueDataProvider, LeagueId, Participant, ProviderError,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::FplConfig;
use crate::models::{BootstrapStatic, StandingsResponse};

/// HTTP client for the fantasy.premierleague.com API
pub struct FplClient {
    config: FplConfig,
    client: Client,
}

impl FplClient {
    /// Create a new client instance
    pub fn new(config: FplConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured `reqwest` client
    pub fn with_client(config: FplConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &FplConfig {
        &self.config
    }

    pub fn standings_url(&self, league_id: LeagueId, page: u32) -> String {
        self.config.url(&format!("leagues-classic/{league_id}/standings/?page_standings={page}"))
    }

    pub fn entry_picks_url(&self, entry_id: EntryId, gameweek: Gameweek) -> String {
        self.config.url(&format!("entry/{entry_id}/event/{gameweek}/picks/"))
    }

    pub fn bootstrap_url(&self) -> String {
        self.config.url("bootstrap-static/")
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| ProviderError::Http {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound { endpoint: url.to_string() });
        }
        if !status.is_success() {
            return Err(ProviderError::Status { endpoint: url.to_string(), status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(|e| ProviderError::Http {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| ProviderError::Malformed {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl LeagueDataProvider for FplClient {
    async fn league_standings(&self, league_id: LeagueId) -> Result<Vec<Participant>, ProviderError> {
        let mut participants = Vec::new();
        let mut page = 1;

        loop {
            let response: StandingsResponse = self.get_json(&self.standings_url(league_id, page)).await?;
            participants.extend(response.standings.results.iter().map(|row| row.to_participant()));

            if !response.standings.has_next {
                break;
            }
            if page >= self.config.max_pages {
                warn!(
                    "League {} still has more standings after {} pages, stopping",
                    league_id, self.config.max_pages
                );
                break;
            }
            page += 1;
        }

        participants.sort_by_key(|participant| participant.overall_rank);
        info!("Fetched {} standings rows for league {} over {} pages", participants.len(), league_id, page);
        Ok(participants)
    }

    async fn entry_gameweek_score(
        &self,
        entry_id: EntryId,
        gameweek: Gameweek,
    ) -> Result<Value, ProviderError> {
        self.get_json(&self.entry_picks_url(entry_id, gameweek)).await
    }

    async fn completed_gameweeks(&self) -> Result<CompletedGameweeks, ProviderError> {
        let bootstrap: BootstrapStatic = self.get_json(&self.bootstrap_url()).await?;
        Ok(bootstrap.completed_gameweeks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned responses keyed by request path until the test ends
    async fn serve(routes: HashMap<&'static str, (u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(routes);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes.get(path).copied().unwrap_or((404, "{}"));
                    let response = format!(
                        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}/api")
    }

    fn client_with(config: FplConfig) -> FplClient {
        let http = Client::builder().no_proxy().timeout(Duration::from_secs(5)).build().unwrap();
        FplClient::with_client(config, http)
    }

    fn client(base_url: String) -> FplClient {
        client_with(FplConfig { base_url, ..Default::default() })
    }

    #[test]
    fn test_urls() {
        let client = client("https://fantasy.premierleague.com/api".to_string());
        assert_eq!(
            client.standings_url(1124151, 2),
            "https://fantasy.premierleague.com/api/leagues-classic/1124151/standings/?page_standings=2"
        );
        assert_eq!(
            client.entry_picks_url(501, 7),
            "https://fantasy.premierleague.com/api/entry/501/event/7/picks/"
        );
        assert_eq!(client.bootstrap_url(), "https://fantasy.premierleague.com/api/bootstrap-static/");
    }

    #[tokio::test]
    async fn test_standings_follow_pages() {
        let base = serve(HashMap::from([
            (
                "/api/leagues-classic/7/standings/?page_standings=1",
                (200, r#"{"standings": {"has_next": true, "page": 1, "results": [
                    {"entry": 11, "entry_name": "A", "player_name": "Ann", "rank": 2, "total": 90}
                ]}}"#),
            ),
            (
                "/api/leagues-classic/7/standings/?page_standings=2",
                (200, r#"{"standings": {"has_next": false, "page": 2, "results": [
                    {"entry": 12, "entry_name": "B", "player_name": "Ben", "rank": 1, "total": 95}
                ]}}"#),
            ),
        ]))
        .await;

        let standings = client(base).league_standings(7).await.unwrap();
        let ids: Vec<EntryId> = standings.iter().map(|p| p.entry_id).collect();
        assert_eq!(ids, vec![12, 11]);
    }

    #[tokio::test]
    async fn test_max_pages_bounds_pagination() {
        let base = serve(HashMap::from([(
            "/api/leagues-classic/7/standings/?page_standings=1",
            (200, r#"{"standings": {"has_next": true, "results": [{"entry": 11, "rank": 1}]}}"#),
        )]))
        .await;

        let client = client_with(FplConfig { base_url: base, max_pages: 1, ..Default::default() });
        assert_eq!(client.league_standings(7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_entry_score_and_errors() {
        let base = serve(HashMap::from([
            (
                "/api/entry/11/event/3/picks/",
                (200, r#"{"entry_history": {"event": 3, "points": 58, "event_transfers_cost": 4}}"#),
            ),
            ("/api/entry/12/event/3/picks/", (503, "{}")),
            ("/api/entry/13/event/3/picks/", (200, "<html>maintenance</html>")),
        ]))
        .await;
        let client = client(base);

        let payload = client.entry_gameweek_score(11, 3).await.unwrap();
        assert_eq!(payload["entry_history"]["points"], 58);

        assert!(matches!(
            client.entry_gameweek_score(12, 3).await,
            Err(ProviderError::Status { status: 503, .. })
        ));
        assert!(matches!(client.entry_gameweek_score(13, 3).await, Err(ProviderError::Malformed { .. })));
        assert!(matches!(client.entry_gameweek_score(14, 3).await, Err(ProviderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_completed_gameweeks() {
        let base = serve(HashMap::from([(
            "/api/bootstrap-static/",
            (200, r#"{"events": [{"id": 1, "finished": true}, {"id": 2, "finished": true}, {"id": 3, "finished": false}]}"#),
        )]))
        .await;

        let completed = client(base).completed_gameweeks().await.unwrap();
        assert_eq!(completed.latest(), Some(2));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/api")).completed_gameweeks().await.unwrap_err();
        assert!(matches!(err, ProviderError::Http { .. }));
    }
}
