// crates/vouch-dht/src/domains.rs
//
// Per-domain wiring: names and collision predicates for the record types
// the network stores. Replaces ambient registry bindings with explicit
// constructor functions.

use std::sync::Arc;

use vouch_core::{DhtNode, SignedUser, SignedVote};

use crate::keyspace::Domain;
use crate::multimap::DomainMultiMap;

/// Identity records, keyed by the hash of the owner's public key.
pub const USER_DOMAIN: Domain = Domain::new("user");

/// Vote records, keyed by the content hash being voted on.
pub const VOTE_DOMAIN: Domain = Domain::new("vote");

/// The identity map: one current [`SignedUser`] per owner-key hash
/// (overwrite semantics). A record belongs at a key only when that key is
/// the hash of the embedded owner's public key.
pub fn user_map(node: Arc<dyn DhtNode<SignedUser>>) -> DomainMultiMap<SignedUser> {
    DomainMultiMap::new(
        node,
        USER_DOMAIN,
        Box::new(|hash| USER_DOMAIN.reduce(hash)),
        Box::new(|hash, signed: &SignedUser| signed.user.public_key.hash == *hash),
    )
}

/// The vote map: many [`SignedVote`] records per content hash (append
/// semantics). A record belongs at a key only when that key is the
/// content hash the embedded vote rates.
pub fn vote_map(node: Arc<dyn DhtNode<SignedVote>>) -> DomainMultiMap<SignedVote> {
    DomainMultiMap::new(
        node,
        VOTE_DOMAIN,
        Box::new(|hash| VOTE_DOMAIN.reduce(hash)),
        Box::new(|hash, signed: &SignedVote| signed.vote.content_hash == *hash),
    )
}
