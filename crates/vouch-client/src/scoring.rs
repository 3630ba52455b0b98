// crates/vouch-client/src/scoring.rs
//
// Trust-weighted vote aggregation: one score for one content object from
// the viewpoint of one identity.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use vouch_core::{
    Assertion, ContentHash, TrustGenerator, TrustMetric, User, Vote, VouchError,
};
use vouch_dht::KeyLookupService;

use crate::votes::VoteService;

/// Aggregates every vote on an object into a single weighted score.
pub struct TrustScoreService {
    votes: Arc<VoteService>,
    lookup: Arc<KeyLookupService>,
    generator: Arc<dyn TrustGenerator>,
}

impl TrustScoreService {
    pub fn new(
        votes: Arc<VoteService>,
        lookup: Arc<KeyLookupService>,
        generator: Arc<dyn TrustGenerator>,
    ) -> Self {
        Self {
            votes,
            lookup,
            generator,
        }
    }

    /// Score `object_hash` from `viewer`'s viewpoint.
    ///
    /// Sums `correlation * trust * agreement` over every vote on the
    /// object, where agreement compares the vote's first assertion
    /// against `query_assertion` (+1.0 equal, -1.0 otherwise). The result
    /// is unbounded; sign and magnitude both carry meaning.
    ///
    /// Failure handling is deliberately asymmetric and kept as documented
    /// behavior (flagged for product-level review, do not symmetrize):
    /// a failed or empty vote fetch is "no evidence" and scores 0.0,
    /// while a vote whose owner cannot be resolved — or that carries no
    /// assertions — is a data-integrity failure that aborts the whole
    /// call. Per-vote resolution fans out concurrently and aborts on the
    /// first failure; nothing is retried here.
    pub async fn trust_for_object(
        &self,
        viewer: &User,
        query_assertion: &Assertion,
        object_hash: &ContentHash,
        metric: TrustMetric,
    ) -> Result<f64, VouchError> {
        let votes = match self.votes.votes_on(object_hash).await {
            Ok(votes) => votes,
            Err(e) => {
                debug!("vote fetch for {} failed, scoring 0.0: {}", object_hash, e);
                return Ok(0.0);
            }
        };

        let resolutions = votes.into_iter().map(|vote| self.resolve_voter(vote));
        let resolved: Vec<(Vote, User)> = try_join_all(resolutions).await?;

        let mut score = 0.0;
        for (vote, voting_user) in &resolved {
            let correlation = self.generator.correlation_coefficient(viewer, voting_user);
            let trust = self
                .generator
                .trust_coefficient(viewer, voting_user, metric);
            let agreement = if vote.assertions[0].rating == query_assertion.rating {
                1.0
            } else {
                -1.0
            };
            score += correlation * trust * agreement;
        }
        Ok(score)
    }

    /// Resolve one vote's owner to its network identity, failing the
    /// whole computation when the owner is unknown or the vote is
    /// malformed.
    async fn resolve_voter(&self, vote: Vote) -> Result<(Vote, User), VouchError> {
        let owner = self
            .lookup
            .find_owner(&vote.owner_public_key.hash)
            .await?
            .ok_or_else(|| {
                VouchError::Integrity(format!(
                    "vote on {} from unknown signer {}",
                    vote.content_hash, vote.owner_public_key
                ))
            })?;
        if vote.assertions.is_empty() {
            return Err(VouchError::Integrity(format!(
                "stored vote on {} carries no assertions",
                vote.content_hash
            )));
        }
        Ok((vote, owner.user))
    }
}
