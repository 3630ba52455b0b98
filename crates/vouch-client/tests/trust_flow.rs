// crates/vouch-client/tests/trust_flow.rs
//
// End-to-end flows over the in-memory node: registration, trust-list
// management, vote casting, and trust-weighted scoring, wired the same
// way the daemon wires the real thing.

use std::sync::Arc;

use vouch_client::{
    AssertionPatternGenerator, ImportService, TrustNetworkService, TrustScoreService, VoteService,
};
use vouch_core::{
    crypto, Assertion, KeyPair, Rating, SignedUser, SignedVote, TrustMetric, User, VouchError,
};
use vouch_dht::{
    user_map, vote_map, DomainMultiMap, InMemoryDhtNode, KeyLookupService,
    SignatureValidationService,
};

/// One participant's fully wired client stack. All participants share the
/// same two DHT nodes, as peers sharing one network would.
struct Client {
    key_pair: KeyPair,
    import: Arc<ImportService>,
    trust: TrustNetworkService,
    votes: Arc<VoteService>,
    scoring: TrustScoreService,
}

struct Network {
    users: Arc<InMemoryDhtNode<SignedUser>>,
    votes: Arc<InMemoryDhtNode<SignedVote>>,
}

impl Network {
    fn new() -> Self {
        Self {
            users: Arc::new(InMemoryDhtNode::new()),
            votes: Arc::new(InMemoryDhtNode::new()),
        }
    }

    fn client(&self) -> Client {
        self.client_with(crypto::generate_key_pair())
    }

    fn client_with(&self, key_pair: KeyPair) -> Client {
        let users: Arc<DomainMultiMap<SignedUser>> = Arc::new(user_map(self.users.clone()));
        let votes: Arc<DomainMultiMap<SignedVote>> = Arc::new(vote_map(self.votes.clone()));
        let lookup = Arc::new(KeyLookupService::new(users.clone()));
        let validation = Arc::new(SignatureValidationService::new(lookup.clone()));
        let import = Arc::new(ImportService::new(key_pair.clone(), users, votes.clone()));
        let vote_service = Arc::new(VoteService::new(votes, import.clone()));
        let scoring = TrustScoreService::new(
            vote_service.clone(),
            lookup.clone(),
            Arc::new(AssertionPatternGenerator::new()),
        );
        let trust = TrustNetworkService::new(lookup, validation, import.clone());
        Client {
            key_pair,
            import,
            trust,
            votes: vote_service,
            scoring,
        }
    }
}

#[tokio::test]
async fn import_then_lookup_round_trips_the_profile() {
    let network = Network::new();
    let client = network.client();

    let user = User::new("alice", client.key_pair.public_key.clone());
    assert!(client.import.import_user(&user).await);

    let resolved = client
        .trust
        .user_identity_for(&client.key_pair.public_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved, user);
}

#[tokio::test]
async fn trust_list_updates_survive_republish() {
    let network = Network::new();
    let alice = network.client();
    let bob = network.client();

    assert!(alice
        .trust
        .register_existing_user_identity("alice", &alice.key_pair)
        .await
        .unwrap());
    assert!(bob
        .trust
        .register_existing_user_identity("bob", &bob.key_pair)
        .await
        .unwrap());

    assert!(alice
        .trust
        .add_user_as_trusted(&bob.key_pair.public_key)
        .await
        .unwrap());

    let profile = alice.trust.user_identity().await.unwrap().unwrap();
    let resolved = alice.trust.local_trust_network(&profile).await;
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].handle, "bob");

    // Distrust republishes; the network no longer resolves bob.
    assert!(alice
        .trust
        .remove_user_as_trusted(&bob.key_pair.public_key)
        .await
        .unwrap());
    let profile = alice.trust.user_identity().await.unwrap().unwrap();
    assert!(alice.trust.local_trust_network(&profile).await.is_empty());
}

#[tokio::test]
async fn two_voters_one_object_scores_from_the_viewers_seat() {
    let network = Network::new();
    let viewer = network.client();
    let supporter = network.client();
    let detractor = network.client();
    let mutual = network.client();

    for (client, handle) in [
        (&viewer, "viewer"),
        (&supporter, "supporter"),
        (&detractor, "detractor"),
        (&mutual, "mutual"),
    ] {
        assert!(client
            .trust
            .register_existing_user_identity(handle, &client.key_pair)
            .await
            .unwrap());
    }

    // Viewer trusts the supporter and a mutual friend; the supporter
    // trusts the mutual friend too. The detractor trusts nobody and is
    // not trusted by the viewer.
    assert!(viewer
        .trust
        .add_user_as_trusted(&supporter.key_pair.public_key)
        .await
        .unwrap());
    assert!(viewer
        .trust
        .add_user_as_trusted(&mutual.key_pair.public_key)
        .await
        .unwrap());
    assert!(supporter
        .trust
        .add_user_as_trusted(&mutual.key_pair.public_key)
        .await
        .unwrap());

    let object = crypto::hash_of(b"the content object");
    assert!(supporter.votes.cast_rating(&object, Rating::Good).await);
    assert!(detractor.votes.cast_rating(&object, Rating::Bad).await);

    let viewer_profile = viewer.trust.user_identity().await.unwrap().unwrap();
    let score = viewer
        .scoring
        .trust_for_object(
            &viewer_profile,
            &Assertion::new("appraisal", Rating::Good),
            &object,
            TrustMetric::OnlyFriends,
        )
        .await
        .unwrap();

    // Supporter: correlation 0.5 (one agreement over a two-key union),
    // direct trust 1.0, agreement +1.0. Detractor: direct trust 0.0
    // under OnlyFriends, so its Bad vote contributes nothing.
    assert!((score - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn vote_from_an_unregistered_owner_poisons_scoring() {
    let network = Network::new();
    let viewer = network.client();
    let ghost = network.client();

    assert!(viewer
        .trust
        .register_existing_user_identity("viewer", &viewer.key_pair)
        .await
        .unwrap());

    // ghost casts a vote without ever registering an identity.
    let object = crypto::hash_of(b"object");
    assert!(ghost.votes.cast_rating(&object, Rating::Good).await);

    let viewer_profile = viewer.trust.user_identity().await.unwrap().unwrap();
    let result = viewer
        .scoring
        .trust_for_object(
            &viewer_profile,
            &Assertion::new("appraisal", Rating::Good),
            &object,
            TrustMetric::OnlyFriends,
        )
        .await;
    assert!(matches!(result, Err(VouchError::Integrity(_))));
}

#[tokio::test]
async fn unvoted_object_scores_zero_not_error() {
    let network = Network::new();
    let viewer = network.client();
    assert!(viewer
        .trust
        .register_existing_user_identity("viewer", &viewer.key_pair)
        .await
        .unwrap());

    let viewer_profile = viewer.trust.user_identity().await.unwrap().unwrap();
    let score = viewer
        .scoring
        .trust_for_object(
            &viewer_profile,
            &Assertion::new("appraisal", Rating::Good),
            &crypto::hash_of(b"nobody voted on this"),
            TrustMetric::Network,
        )
        .await
        .unwrap();
    assert_eq!(score, 0.0);
}

#[tokio::test]
async fn identity_republish_is_last_write_wins() {
    let network = Network::new();
    let alice = network.client();

    assert!(alice
        .trust
        .register_existing_user_identity("alice", &alice.key_pair)
        .await
        .unwrap());
    assert!(alice
        .trust
        .register_existing_user_identity("alice-v2", &alice.key_pair)
        .await
        .unwrap());

    let resolved = alice.trust.user_identity().await.unwrap().unwrap();
    assert_eq!(resolved.handle, "alice-v2");
}
