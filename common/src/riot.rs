use core::fmt::Display;
use core::future::Future;
use core::time::Duration;

use metrics::counter;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Pause between attempts when the response carries no `Retry-After` hint.
const TRANSIENT_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("gave up on {url} after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Macro-region that hosts match-v5 data for a group of platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Americas,
    Europe,
    Asia,
}

impl Region {
    pub fn host(self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Europe => "europe",
            Region::Asia => "asia",
        }
    }

    /// Routing table from platform code (NA1, EUW1, ...) to macro-region.
    pub fn from_platform(platform: &str) -> Option<Self> {
        match platform.to_ascii_uppercase().as_str() {
            "NA1" | "BR1" | "LA1" | "LA2" | "OC1" => Some(Region::Americas),
            "EUN1" | "EUW1" | "TR1" | "RU" => Some(Region::Europe),
            "KR" | "JP1" => Some(Region::Asia),
            _ => None,
        }
    }
}

pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) retry_after: Option<u64>,
    pub(crate) body: String,
}

/// Drives a single request closure until it yields a 200 body, a 404, or the
/// attempt ceiling is hit.
///
/// A 429 sleeps for the server-provided `Retry-After` seconds on the calling
/// task only; there is deliberately no shared limiter, so concurrent callers
/// back off independently. Any other non-200 status or transport error counts
/// as a failed attempt with a fixed pause.
pub(crate) async fn fetch_with_retry<F, Fut, E>(
    url: &str,
    max_attempts: u32,
    mut attempt: F,
) -> Result<String, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RawResponse, E>>,
    E: Display,
{
    let mut failures = 0;
    loop {
        match attempt().await {
            Ok(resp) if resp.status == 200 => return Ok(resp.body),
            Ok(resp) if resp.status == 404 => {
                counter!("riot_api.fetch.not_found").increment(1);
                return Err(FetchError::NotFound(url.to_string()));
            }
            Ok(resp) if resp.status == 429 => {
                failures += 1;
                if failures >= max_attempts {
                    break;
                }
                let wait = resp.retry_after.unwrap_or(1);
                debug!(url, wait, "rate limited, backing off");
                tokio::time::sleep(Duration::from_secs(wait)).await;
            }
            Ok(resp) => {
                failures += 1;
                warn!(url, status = resp.status, "unexpected status");
                if failures >= max_attempts {
                    break;
                }
                tokio::time::sleep(TRANSIENT_PAUSE).await;
            }
            Err(e) => {
                failures += 1;
                warn!(url, error = %e, "request failed");
                if failures >= max_attempts {
                    break;
                }
                tokio::time::sleep(TRANSIENT_PAUSE).await;
            }
        }
    }
    counter!("riot_api.fetch.exhausted").increment(1);
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts: failures,
    })
}

/// Thin client over the Riot REST endpoints the pipeline consumes.
pub struct RiotClient {
    http: reqwest::Client,
    api_key: String,
    max_attempts: u32,
}

impl RiotClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_max_attempts(api_key, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(api_key: impl Into<String>, max_attempts: u32) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build http client");
        Self {
            http,
            api_key: api_key.into(),
            max_attempts,
        }
    }

    /// The underlying client, for endpoints outside the rate-limited API
    /// (static asset hosts).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = fetch_with_retry(url, self.max_attempts, || {
            let http = self.http.clone();
            let url = url.to_string();
            async move {
                let resp = http.get(&url).send().await?;
                let status = resp.status().as_u16();
                let retry_after = resp
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                let body = resp.text().await?;
                Ok::<_, reqwest::Error>(RawResponse {
                    status,
                    retry_after,
                    body,
                })
            }
        })
        .await?;
        counter!("riot_api.fetch.success").increment(1);
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn summoner_by_name<T: DeserializeOwned>(
        &self,
        platform: &str,
        name: &str,
    ) -> Result<T, FetchError> {
        let url = format!(
            "https://{platform}.api.riotgames.com/lol/summoner/v4/summoners/by-name/{name}?api_key={}",
            self.api_key
        );
        self.fetch_json(&url).await
    }

    pub async fn league_entries<T: DeserializeOwned>(
        &self,
        platform: &str,
        summoner_id: &str,
    ) -> Result<T, FetchError> {
        let url = format!(
            "https://{platform}.api.riotgames.com/lol/league/v4/entries/by-summoner/{summoner_id}?api_key={}",
            self.api_key
        );
        self.fetch_json(&url).await
    }

    pub async fn match_ids(
        &self,
        region: Region,
        puuid: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<String>, FetchError> {
        let url = format!(
            "https://{}.api.riotgames.com/lol/match/v5/matches/by-puuid/{puuid}/ids?start={start}&count={count}&api_key={}",
            region.host(),
            self.api_key
        );
        self.fetch_json(&url).await
    }

    pub async fn match_detail<T: DeserializeOwned>(
        &self,
        region: Region,
        match_id: &str,
    ) -> Result<T, FetchError> {
        let url = format!(
            "https://{}.api.riotgames.com/lol/match/v5/matches/{match_id}?api_key={}",
            region.host(),
            self.api_key
        );
        self.fetch_json(&url).await
    }

    pub async fn active_game<T: DeserializeOwned>(
        &self,
        platform: &str,
        summoner_id: &str,
    ) -> Result<T, FetchError> {
        let url = format!(
            "https://{platform}.api.riotgames.com/lol/spectator/v4/active-games/by-summoner/{summoner_id}?api_key={}",
            self.api_key
        );
        self.fetch_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(status: u16, retry_after: Option<u64>, body: &str) -> Result<RawResponse, String> {
        Ok(RawResponse {
            status,
            retry_after,
            body: body.to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn honors_retry_after_seconds() {
        let start = tokio::time::Instant::now();
        let mut responses = vec![ok(429, Some(2), ""), ok(200, None, "[1,2]")].into_iter();
        let body = fetch_with_retry("url", 3, || {
            let next = responses.next().expect("ran out of responses");
            async move { next }
        })
        .await
        .unwrap();
        assert_eq!(body, "[1,2]");
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_retry_after_defaults_to_one_second() {
        let start = tokio::time::Instant::now();
        let mut responses = vec![ok(429, None, ""), ok(200, None, "{}")].into_iter();
        fetch_with_retry("url", 3, || {
            let next = responses.next().unwrap();
            async move { next }
        })
        .await
        .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_attempt_ceiling() {
        let mut attempts = 0;
        let err = fetch_with_retry("url", 3, || {
            attempts += 1;
            async { ok(500, None, "") }
        })
        .await
        .unwrap_err();
        assert_eq!(attempts, 3);
        match err {
            FetchError::Exhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_count_as_attempts() {
        let mut responses = vec![Err("connection reset".to_string()), ok(200, None, "1")].into_iter();
        let body = fetch_with_retry("url", 3, || {
            let next = responses.next().unwrap();
            async move { next }
        })
        .await
        .unwrap();
        assert_eq!(body, "1");
    }

    #[tokio::test]
    async fn not_found_is_terminal() {
        let mut attempts = 0;
        let err = fetch_with_retry("url", 3, || {
            attempts += 1;
            async { ok(404, None, "") }
        })
        .await
        .unwrap_err();
        assert_eq!(attempts, 1);
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[test]
    fn platform_routing_table() {
        assert_eq!(Region::from_platform("NA1"), Some(Region::Americas));
        assert_eq!(Region::from_platform("euw1"), Some(Region::Europe));
        assert_eq!(Region::from_platform("KR"), Some(Region::Asia));
        assert_eq!(Region::from_platform("XX9"), None);
    }
}
