use common::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// Upstream 404 on the identity lookup. Terminal for the whole request.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// The requesting player's puuid is missing from a match payload. This is
    /// an invariant violation for well-formed input, not something to retry.
    #[error("player is not a participant of match {match_id}")]
    PlayerNotInMatch { match_id: String },

    /// Match-ID prefix not covered by the platform routing table.
    #[error("no routing region for platform prefix {0:?}")]
    UnknownPlatform(String),

    #[error("malformed match payload for {match_id}: {source}")]
    Payload {
        match_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
