// crates/vouch-client/src/generator.rs
//
// Assertion-pattern trust generator: correlation and propagated-trust
// coefficients computed from two identities' published profiles alone.

use std::collections::HashMap;

use vouch_core::{Trust, TrustGenerator, TrustMetric, User};

/// Weight applied to the shared-neighbor estimate when no direct
/// assertion exists under the network-wide metric.
const INDIRECT_DAMPING: f64 = 0.5;

/// Coefficients derived from overlap between two users' trust lists.
#[derive(Debug, Default)]
pub struct AssertionPatternGenerator;

impl AssertionPatternGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The viewer's direct assertion on `other`, if any: 1.0 for
    /// `Trusted`, 0.0 for `NotTrusted`.
    fn direct(&self, viewer: &User, other: &User) -> Option<f64> {
        viewer
            .trusted
            .iter()
            .find(|assertion| assertion.public_key == other.public_key)
            .map(|assertion| match assertion.trust {
                Trust::Trusted => 1.0,
                Trust::NotTrusted => 0.0,
            })
    }

    /// Fraction of the viewer's trusted keys that `other` also trusts.
    fn shared_neighbor_estimate(&self, viewer: &User, other: &User) -> f64 {
        let viewer_trusted: Vec<&[u8]> = viewer
            .trusted
            .iter()
            .filter(|assertion| assertion.trust == Trust::Trusted)
            .map(|assertion| assertion.public_key.hash.digest.as_slice())
            .collect();
        if viewer_trusted.is_empty() {
            return 0.0;
        }
        let mut shared = 0usize;
        for digest in &viewer_trusted {
            let also_trusted = other.trusted.iter().any(|assertion| {
                assertion.trust == Trust::Trusted
                    && assertion.public_key.hash.digest.as_slice() == *digest
            });
            if also_trusted {
                shared += 1;
            }
        }
        shared as f64 / viewer_trusted.len() as f64
    }
}

impl TrustGenerator for AssertionPatternGenerator {
    /// Agreement minus disagreement over the union of asserted target
    /// keys, normalized to [-1.0, 1.0]. Targets asserted by only one
    /// side contribute nothing; identical lists score 1.0, fully
    /// opposed lists -1.0, disjoint or empty lists 0.0.
    fn correlation_coefficient(&self, a: &User, b: &User) -> f64 {
        let mut flags_a: HashMap<&[u8], Trust> = HashMap::new();
        for assertion in &a.trusted {
            flags_a.insert(assertion.public_key.hash.digest.as_slice(), assertion.trust);
        }
        let mut flags_b: HashMap<&[u8], Trust> = HashMap::new();
        for assertion in &b.trusted {
            flags_b.insert(assertion.public_key.hash.digest.as_slice(), assertion.trust);
        }
        if flags_a.is_empty() || flags_b.is_empty() {
            return 0.0;
        }

        let mut union: Vec<&[u8]> = flags_a.keys().copied().collect();
        for key in flags_b.keys().copied() {
            if !flags_a.contains_key(key) {
                union.push(key);
            }
        }

        let mut agreement = 0.0;
        for key in &union {
            match (flags_a.get(key), flags_b.get(key)) {
                (Some(fa), Some(fb)) if fa == fb => agreement += 1.0,
                (Some(_), Some(_)) => agreement -= 1.0,
                _ => {}
            }
        }
        agreement / union.len() as f64
    }

    fn trust_coefficient(&self, viewer: &User, other: &User, metric: TrustMetric) -> f64 {
        match metric {
            TrustMetric::OnlyFriends => self.direct(viewer, other).unwrap_or(0.0),
            TrustMetric::Network => match self.direct(viewer, other) {
                Some(direct) => direct,
                None => INDIRECT_DAMPING * self.shared_neighbor_estimate(viewer, other),
            },
        }
    }
}
