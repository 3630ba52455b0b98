// crates/vouch-client/src/votes.rs
//
// Vote casting and retrieval.

use std::sync::Arc;

use tracing::debug;

use vouch_core::{Assertion, ContentHash, Rating, SignedVote, Vote, VouchError};
use vouch_dht::DomainMultiMap;

use crate::import::ImportService;

/// Content property rated by the up/down-vote conveniences.
pub const DEFAULT_CONTENT_PROPERTY: &str = "appraisal";

/// Thin vote surface over the vote domain and the import service.
pub struct VoteService {
    vote_map: Arc<DomainMultiMap<SignedVote>>,
    import: Arc<ImportService>,
}

impl VoteService {
    pub fn new(vote_map: Arc<DomainMultiMap<SignedVote>>, import: Arc<ImportService>) -> Self {
        Self { vote_map, import }
    }

    /// Sign `vote` with the current identity and publish it.
    pub async fn cast_vote(&self, vote: &Vote) -> bool {
        self.import.import_vote(vote).await
    }

    /// Cast a single-assertion vote on the default content property.
    pub async fn cast_rating(&self, content_hash: &ContentHash, rating: Rating) -> bool {
        let vote = Vote::new(
            self.import.key_pair().public_key.clone(),
            content_hash.clone(),
        )
        .with_assertion(Assertion::new(DEFAULT_CONTENT_PROPERTY, rating));
        self.cast_vote(&vote).await
    }

    /// Every vote stored for a content hash, projected out of its signed
    /// envelope. Validation is the caller's concern.
    pub async fn votes_on(&self, content_hash: &ContentHash) -> Result<Vec<Vote>, VouchError> {
        debug!("fetching votes on {}", content_hash);
        Ok(self
            .vote_map
            .get_all(content_hash)
            .await?
            .into_iter()
            .map(|signed| signed.vote)
            .collect())
    }

    /// The raw signed records for a content hash — the full vote history.
    pub async fn vote_history(
        &self,
        content_hash: &ContentHash,
    ) -> Result<Vec<SignedVote>, VouchError> {
        self.vote_map.get_all(content_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::{crypto, SignedUser};
    use vouch_dht::{user_map, vote_map, InMemoryDhtNode};

    fn service() -> VoteService {
        let users: Arc<vouch_dht::DomainMultiMap<SignedUser>> =
            Arc::new(user_map(Arc::new(InMemoryDhtNode::new())));
        let votes = Arc::new(vote_map(Arc::new(InMemoryDhtNode::new())));
        let import = Arc::new(ImportService::new(
            crypto::generate_key_pair(),
            users,
            votes.clone(),
        ));
        VoteService::new(votes, import)
    }

    #[tokio::test]
    async fn cast_rating_stores_an_appraisal_assertion() {
        let service = service();
        let hash = crypto::hash_of(b"some torrent");

        assert!(service.cast_rating(&hash, Rating::Good).await);

        let votes = service.votes_on(&hash).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].assertions.len(), 1);
        assert_eq!(votes[0].assertions[0].content_property, DEFAULT_CONTENT_PROPERTY);
        assert_eq!(votes[0].assertions[0].rating, Rating::Good);
    }

    #[tokio::test]
    async fn history_keeps_the_signed_envelopes() {
        let service = service();
        let hash = crypto::hash_of(b"content");
        service.cast_rating(&hash, Rating::Bad).await;

        let history = service.vote_history(&hash).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].vote.content_hash, hash);
    }

    #[tokio::test]
    async fn votes_on_an_unknown_hash_is_empty() {
        let service = service();
        let hash = crypto::hash_of(b"nobody voted");
        assert!(service.votes_on(&hash).await.unwrap().is_empty());
    }
}
