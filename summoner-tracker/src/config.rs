use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Development or production Riot API key.
    #[arg(long, env = "RIOT_API_KEY")]
    pub api_key: String,

    /// Platform the summoner lives on (euw1, na1, kr, ...).
    #[arg(long, env, default_value = "euw1")]
    pub platform: String,

    /// Summoner to track.
    #[arg(long, env)]
    pub summoner: String,

    /// Enrich a single stored or remote match instead of updating the profile.
    #[arg(long)]
    pub match_id: Option<String>,

    /// Show the summoner's live game instead of updating the profile.
    #[arg(long, default_value_t = false)]
    pub live: bool,

    /// Keep re-running the profile update with this many seconds in between.
    #[arg(long, env)]
    pub watch_secs: Option<u64>,

    /// Concurrent in-flight match detail requests.
    #[arg(long, env, default_value_t = 10)]
    pub concurrency: usize,

    /// Match details fetched per update run.
    #[arg(long, env, default_value_t = 7)]
    pub page_size: usize,

    /// Match IDs pulled from the matchlist endpoint per run.
    #[arg(long, env, default_value_t = 100)]
    pub matchlist_count: usize,

    /// Attempt ceiling per request, rate-limit retries included.
    #[arg(long, env, default_value_t = 3)]
    pub max_fetch_attempts: u32,
}
